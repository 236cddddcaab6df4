use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*, sea_query::OnConflict};

use crate::{Category, EngineError, LimitPolicy, Money, ResultEngine, Session, limits};

use super::{Engine, with_tx};

impl Engine {
    pub(super) async fn load_policy(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<LimitPolicy> {
        let rows = limits::Entity::find().all(db).await?;
        rows.into_iter()
            .map(|row| {
                Category::try_from(row.category.as_str())
                    .map(|c| (c, Money::new(row.daily_limit_paise)))
            })
            .collect::<Result<LimitPolicy, _>>()
    }

    /// Current cap configuration, readable by any session.
    pub async fn get_policy(&self) -> ResultEngine<LimitPolicy> {
        with_tx!(self, |db_tx| self.load_policy(&db_tx).await)
    }

    /// Sets (or replaces) the daily cap for one category. Zero disables the
    /// limit. Admin only.
    pub async fn update_limit(
        &self,
        session: &Session,
        category: Category,
        cap: Money,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        self.require_admin(session)?;
        if cap.is_negative() {
            return Err(EngineError::InvalidAmount(
                "cap must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = limits::ActiveModel {
                category: ActiveValue::Set(category.as_str().to_string()),
                daily_limit_paise: ActiveValue::Set(cap.paise()),
                updated_by: ActiveValue::Set(Some(session.user_id)),
                updated_at: ActiveValue::Set(now),
            };
            limits::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(limits::Column::Category)
                        .update_columns([
                            limits::Column::DailyLimitPaise,
                            limits::Column::UpdatedBy,
                            limits::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
