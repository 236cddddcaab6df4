use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseStatus, Money, ResultEngine, Session, Settlement, expenses, settlements,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Records a payment made to a user. Admin only.
    ///
    /// When `settle_expenses` is set (the "pay full" path), the user's
    /// currently approved entries are marked `settled` in the same
    /// transaction.
    pub async fn record_settlement(
        &self,
        session: &Session,
        user_id: Uuid,
        mission_id: Option<Uuid>,
        amount: Money,
        proof_url: &str,
        note: Option<&str>,
        settle_expenses: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Settlement> {
        self.require_admin(session)?;
        let proof_url = normalize_required_text(proof_url, "settlement proof")?;

        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, user_id).await?;
            if let Some(id) = mission_id {
                self.require_mission(&db_tx, id).await?;
            }

            let settlement = Settlement::new(
                user_id,
                mission_id,
                amount,
                proof_url,
                normalize_optional_text(note),
                session.user_id,
                now,
            )?;
            settlements::ActiveModel::from(&settlement)
                .insert(&db_tx)
                .await?;

            if settle_expenses {
                let settled = expenses::Entity::update_many()
                    .col_expr(
                        expenses::Column::Status,
                        Expr::value(ExpenseStatus::Settled.as_str()),
                    )
                    .col_expr(expenses::Column::UpdatedAt, Expr::value(now))
                    .filter(expenses::Column::UserId.eq(user_id))
                    .filter(expenses::Column::Status.eq(ExpenseStatus::Approved.as_str()))
                    .exec(&db_tx)
                    .await?;
                tracing::debug!(
                    user = %user_id,
                    rows = settled.rows_affected,
                    "approved entries marked settled"
                );
            }

            Ok(settlement)
        })
    }

    /// Lists settlements, newest first. Non-admin sessions only see their
    /// own.
    pub async fn list_settlements(
        &self,
        session: &Session,
        user: Option<Uuid>,
    ) -> ResultEngine<Vec<Settlement>> {
        let user = if session.is_admin() {
            user
        } else {
            Some(session.user_id)
        };

        with_tx!(self, |db_tx| {
            let mut query =
                settlements::Entity::find().order_by_desc(settlements::Column::CreatedAt);
            if let Some(user) = user {
                query = query.filter(settlements::Column::UserId.eq(user));
            }
            let models = query.all(&db_tx).await?;
            Ok(models.into_iter().map(Settlement::from).collect())
        })
    }

    /// Lets the owning user confirm they have seen a settlement.
    pub async fn acknowledge_settlement(
        &self,
        session: &Session,
        settlement_id: Uuid,
    ) -> ResultEngine<Settlement> {
        with_tx!(self, |db_tx| {
            let model = settlements::Entity::find_by_id(settlement_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("settlement not exists".to_string()))?;
            if model.user_id != session.user_id {
                return Err(EngineError::KeyNotFound(
                    "settlement not exists".to_string(),
                ));
            }

            let update = settlements::ActiveModel {
                id: ActiveValue::Set(settlement_id),
                user_acknowledged: ActiveValue::Set(true),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            Ok(Settlement::from(updated))
        })
    }
}
