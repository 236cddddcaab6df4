use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ResultEngine, Session, expenses,
    validator::{self, DraftGroup},
};

use super::{Engine, with_tx};

impl Engine {
    /// Submits a batch of draft expense rows for one day.
    ///
    /// A batch with no non-empty rows is an error, not a silent no-op. The
    /// limit check runs inside the same transaction that reads the user's
    /// already-persisted entries for that day, so concurrent submits
    /// serialize on the database. All-or-nothing: one violating category
    /// rejects the whole batch and nothing is written.
    pub async fn submit_expenses(
        &self,
        session: &Session,
        date: NaiveDate,
        mission_id: Option<Uuid>,
        drafts: &[DraftGroup],
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Expense>> {
        let rows = validator::non_empty_rows(drafts);
        if rows.is_empty() {
            return Err(EngineError::EmptySubmission);
        }

        with_tx!(self, |db_tx| {
            if let Some(id) = mission_id {
                self.require_mission_access(&db_tx, session, id).await?;
            }

            let policy = self.load_policy(&db_tx).await?;
            let today = self.expenses_on_day(&db_tx, session.user_id, date).await?;

            validator::validate_submission(&policy, &today, drafts)
                .map_err(|violating| EngineError::LimitExceeded(violating.into_iter().collect()))?;

            let mut created = Vec::new();
            for row in rows {
                let expense = Expense::new(
                    session.user_id,
                    mission_id,
                    date,
                    row.category,
                    row.description,
                    row.amount,
                    row.image_url,
                    now,
                )?;
                expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
                created.push(expense);
            }

            tracing::debug!(
                user = %session.user_id,
                %date,
                count = created.len(),
                "expense batch submitted"
            );
            Ok(created)
        })
    }
}
