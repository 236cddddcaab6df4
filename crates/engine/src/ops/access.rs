use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, Mission, ResultEngine, Role, Session, expenses, missions, profiles, roles,
};

use super::Engine;

impl Engine {
    /// Admin gate used by every privileged operation.
    pub(super) fn require_admin(&self, session: &Session) -> ResultEngine<()> {
        if !session.is_admin() {
            return Err(EngineError::Forbidden(
                "admin role required".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
    ) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        Expense::try_from(model)
    }

    pub(super) async fn require_mission(
        &self,
        db: &DatabaseTransaction,
        mission_id: Uuid,
    ) -> ResultEngine<Mission> {
        let model = missions::Entity::find_by_id(mission_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("mission not exists".to_string()))?;
        Mission::try_from(model)
    }

    pub(super) async fn require_profile(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<profiles::Model> {
        profiles::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// A user's assigned role; accounts without a row default to `user`.
    pub(super) async fn role_of(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Role> {
        let row = roles::Entity::find_by_id(user_id).one(db).await?;
        match row {
            Some(model) => Role::try_from(model.role.as_str()),
            None => Ok(Role::User),
        }
    }

    /// Entries a mission draft attaches to must belong to the caller unless
    /// the caller is an admin.
    pub(super) async fn require_mission_access(
        &self,
        db: &DatabaseTransaction,
        session: &Session,
        mission_id: Uuid,
    ) -> ResultEngine<Mission> {
        let mission = self.require_mission(db, mission_id).await?;
        if mission.user_id != session.user_id && !session.is_admin() {
            return Err(EngineError::KeyNotFound("mission not exists".to_string()));
        }
        Ok(mission)
    }

    pub(super) async fn expenses_on_day(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        date: chrono::NaiveDate,
    ) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Date.eq(date))
            .all(db)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }
}
