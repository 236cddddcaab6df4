use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Mission, MissionStatus, ResultEngine, Session, missions,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

fn open_statuses() -> [&'static str; 2] {
    [
        MissionStatus::Active.as_str(),
        MissionStatus::Pending.as_str(),
    ]
}

impl Engine {
    /// Starts a mission for the calling user.
    ///
    /// A user can have at most one open mission; starting a second one is a
    /// conflict.
    pub async fn start_mission(
        &self,
        session: &Session,
        name: &str,
        start_date: NaiveDate,
        details: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Mission> {
        let name = normalize_required_text(name, "mission name")?;

        with_tx!(self, |db_tx| {
            let open = missions::Entity::find()
                .filter(missions::Column::UserId.eq(session.user_id))
                .filter(missions::Column::Status.is_in(open_statuses()))
                .one(&db_tx)
                .await?;
            if let Some(existing) = open {
                return Err(EngineError::ExistingKey(existing.name));
            }

            let mission = Mission::new(
                session.user_id,
                name,
                start_date,
                normalize_optional_text(details),
                now,
            );
            missions::ActiveModel::from(&mission).insert(&db_tx).await?;
            Ok(mission)
        })
    }

    /// Archives a mission, stamping its end date. Owner or admin.
    pub async fn finish_mission(
        &self,
        session: &Session,
        mission_id: Uuid,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> ResultEngine<Mission> {
        with_tx!(self, |db_tx| {
            let mut mission = self
                .require_mission_access(&db_tx, session, mission_id)
                .await?;
            if !mission.status.is_open() {
                return Err(EngineError::NotEditable(
                    "mission already archived".to_string(),
                ));
            }

            mission.status = MissionStatus::Completed;
            mission.end_date = Some(end_date);
            mission.updated_at = now;
            missions::ActiveModel::from(&mission).update(&db_tx).await?;
            Ok(mission)
        })
    }

    /// The calling user's open mission, if any.
    pub async fn active_mission(&self, session: &Session) -> ResultEngine<Option<Mission>> {
        with_tx!(self, |db_tx| {
            let model = missions::Entity::find()
                .filter(missions::Column::UserId.eq(session.user_id))
                .filter(missions::Column::Status.is_in(open_statuses()))
                .one(&db_tx)
                .await?;
            model.map(Mission::try_from).transpose()
        })
    }

    /// Lists missions, newest first. Non-admin sessions only see their own.
    pub async fn list_missions(
        &self,
        session: &Session,
        user: Option<Uuid>,
    ) -> ResultEngine<Vec<Mission>> {
        let user = if session.is_admin() {
            user
        } else {
            Some(session.user_id)
        };

        with_tx!(self, |db_tx| {
            let mut query = missions::Entity::find().order_by_desc(missions::Column::StartDate);
            if let Some(user) = user {
                query = query.filter(missions::Column::UserId.eq(user));
            }
            let models = query.all(&db_tx).await?;
            models.into_iter().map(Mission::try_from).collect()
        })
    }
}
