//! Mission (trip) primitives.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Lifecycle state of a mission.
///
/// `Active`/`Pending` are both "open" (the original data carries both
/// spellings); `Completed`/`Finished` are both "archived".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Active,
    Pending,
    Completed,
    Finished,
}

impl MissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Finished => "finished",
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Active | Self::Pending)
    }
}

impl TryFrom<&str> for MissionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "finished" => Ok(Self::Finished),
            other => Err(EngineError::InvalidId(format!(
                "invalid mission status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub status: MissionStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    pub fn new(
        user_id: Uuid,
        name: String,
        start_date: NaiveDate,
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            status: MissionStatus::Active,
            start_date,
            end_date: None,
            details,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "missions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub status: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub details: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::settlements::Entity")]
    Settlements,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::settlements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Mission> for ActiveModel {
    fn from(mission: &Mission) -> Self {
        Self {
            id: ActiveValue::Set(mission.id),
            user_id: ActiveValue::Set(mission.user_id),
            name: ActiveValue::Set(mission.name.clone()),
            status: ActiveValue::Set(mission.status.as_str().to_string()),
            start_date: ActiveValue::Set(mission.start_date),
            end_date: ActiveValue::Set(mission.end_date),
            details: ActiveValue::Set(mission.details.clone()),
            created_at: ActiveValue::Set(mission.created_at),
            updated_at: ActiveValue::Set(mission.updated_at),
        }
    }
}

impl TryFrom<Model> for Mission {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            status: MissionStatus::try_from(model.status.as_str())?,
            start_date: model.start_date,
            end_date: model.end_date,
            details: model.details,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
