use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BalanceSummary, EngineError, Expense, MissionStats, ResultEngine, Session, Settlement,
    expenses, reconciler, settlements,
};

use super::{Engine, with_tx};

impl Engine {
    /// Reimbursement position for a user, recomputed from the full ledger.
    ///
    /// Non-admin sessions may only ask about themselves.
    pub async fn user_balance(
        &self,
        session: &Session,
        user: Option<Uuid>,
    ) -> ResultEngine<BalanceSummary> {
        let user = user.unwrap_or(session.user_id);
        if user != session.user_id {
            self.require_admin(session)?;
        }

        with_tx!(self, |db_tx| {
            let expense_rows = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user))
                .all(&db_tx)
                .await?;
            let expense_rows: Vec<Expense> = expense_rows
                .into_iter()
                .map(Expense::try_from)
                .collect::<Result<_, _>>()?;

            let settlement_rows: Vec<Settlement> = settlements::Entity::find()
                .filter(settlements::Column::UserId.eq(user))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Settlement::from)
                .collect();

            Ok(reconciler::balance(&expense_rows, &settlement_rows, user))
        })
    }

    /// Spend/received totals for one mission.
    pub async fn mission_stats(
        &self,
        session: &Session,
        mission_id: Uuid,
    ) -> ResultEngine<MissionStats> {
        with_tx!(self, |db_tx| {
            let mission = self.require_mission(&db_tx, mission_id).await?;
            if mission.user_id != session.user_id && !session.is_admin() {
                return Err(EngineError::KeyNotFound("mission not exists".to_string()));
            }

            let expense_rows: Vec<Expense> = expenses::Entity::find()
                .filter(expenses::Column::MissionId.eq(mission_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::try_from)
                .collect::<Result<_, _>>()?;

            let settlement_rows: Vec<Settlement> = settlements::Entity::find()
                .filter(settlements::Column::MissionId.eq(mission_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Settlement::from)
                .collect();

            Ok(reconciler::mission_stats(
                &expense_rows,
                &settlement_rows,
                mission.user_id,
                mission_id,
            ))
        })
    }
}
