//! Settlement ledger primitives.
//!
//! A `Settlement` records money paid by the organization to a user, always
//! a credit against outstanding balance. Rows are created by admins and are
//! immutable afterwards, except for the owner's acknowledgement flag.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub amount: Money,
    pub proof_url: String,
    pub note: Option<String>,
    pub settled_by: Uuid,
    pub user_acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        user_id: Uuid,
        mission_id: Option<Uuid>,
        amount: Money,
        proof_url: String,
        note: Option<String>,
        settled_by: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "settlement amount must be > 0".to_string(),
            ));
        }
        if proof_url.trim().is_empty() {
            return Err(EngineError::MissingField("settlement proof".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            mission_id,
            amount,
            proof_url,
            note,
            settled_by,
            user_acknowledged: false,
            created_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub amount_paise: i64,
    pub proof_url: String,
    pub note: Option<String>,
    pub settled_by: Uuid,
    pub user_acknowledged: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::missions::Entity",
        from = "Column::MissionId",
        to = "super::missions::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Missions,
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::UserId",
        to = "super::profiles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Profiles,
}

impl Related<super::missions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Missions.def()
    }
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Settlement> for ActiveModel {
    fn from(settlement: &Settlement) -> Self {
        Self {
            id: ActiveValue::Set(settlement.id),
            user_id: ActiveValue::Set(settlement.user_id),
            mission_id: ActiveValue::Set(settlement.mission_id),
            amount_paise: ActiveValue::Set(settlement.amount.paise()),
            proof_url: ActiveValue::Set(settlement.proof_url.clone()),
            note: ActiveValue::Set(settlement.note.clone()),
            settled_by: ActiveValue::Set(settlement.settled_by),
            user_acknowledged: ActiveValue::Set(settlement.user_acknowledged),
            created_at: ActiveValue::Set(settlement.created_at),
        }
    }
}

impl From<Model> for Settlement {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            mission_id: model.mission_id,
            amount: Money::new(model.amount_paise),
            proof_url: model.proof_url,
            note: model.note,
            settled_by: model.settled_by,
            user_acknowledged: model.user_acknowledged,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amounts_and_missing_proof() {
        let admin = Uuid::new_v4();
        let user = Uuid::new_v4();
        assert!(
            Settlement::new(user, None, Money::ZERO, "p.png".into(), None, admin, Utc::now())
                .is_err()
        );
        assert!(
            Settlement::new(user, None, Money::new(100), "  ".into(), None, admin, Utc::now())
                .is_err()
        );
        assert!(
            Settlement::new(user, None, Money::new(100), "p.png".into(), None, admin, Utc::now())
                .is_ok()
        );
    }
}
