//! Expense ledger primitives.
//!
//! An `Expense` is one logged cost (or, for the `cash` category, one
//! received advance) on a given calendar day, owned by a user and optionally
//! tied to a mission.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
    Settled,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Settled => "settled",
        }
    }

    /// Whether the owning user may still change description/amount/receipt.
    ///
    /// Only `pending` entries are editable; approval (and everything after
    /// it) freezes the row for the owner.
    #[must_use]
    pub const fn editable_by_owner(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the amount counts as approved spend for reconciliation.
    #[must_use]
    pub const fn counts_as_spent(self) -> bool {
        matches!(self, Self::Approved | Self::Settled)
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "settled" => Ok(Self::Settled),
            other => Err(EngineError::InvalidId(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub date: NaiveDate,
    pub category: Category,
    pub description: String,
    pub amount: Money,
    pub image_url: Option<String>,
    pub status: ExpenseStatus,
    pub admin_note: Option<String>,
    pub rejected_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Creates a new `pending` entry.
    ///
    /// Amounts must be non-negative; negative values never reach the ledger.
    pub fn new(
        user_id: Uuid,
        mission_id: Option<Uuid>,
        date: NaiveDate,
        category: Category,
        description: String,
        amount: Money,
        image_url: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            mission_id,
            date,
            category,
            description,
            amount,
            image_url,
            status: ExpenseStatus::Pending,
            admin_note: None,
            rejected_reason: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub date: Date,
    pub category: String,
    pub description: String,
    pub amount_paise: i64,
    pub image_url: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub rejected_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id),
            user_id: ActiveValue::Set(expense.user_id),
            mission_id: ActiveValue::Set(expense.mission_id),
            date: ActiveValue::Set(expense.date),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount_paise: ActiveValue::Set(expense.amount.paise()),
            image_url: ActiveValue::Set(expense.image_url.clone()),
            status: ActiveValue::Set(expense.status.as_str().to_string()),
            admin_note: ActiveValue::Set(expense.admin_note.clone()),
            rejected_reason: ActiveValue::Set(expense.rejected_reason.clone()),
            approved_by: ActiveValue::Set(expense.approved_by),
            approved_at: ActiveValue::Set(expense.approved_at),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            mission_id: model.mission_id,
            date: model.date,
            category: Category::try_from(model.category.as_str())?,
            description: model.description,
            amount: Money::new(model.amount_paise),
            image_url: model.image_url,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            admin_note: model.admin_note,
            rejected_reason: model.rejected_reason,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_owner_editable() {
        assert!(ExpenseStatus::Pending.editable_by_owner());
        assert!(!ExpenseStatus::Approved.editable_by_owner());
        assert!(!ExpenseStatus::Rejected.editable_by_owner());
        assert!(!ExpenseStatus::Settled.editable_by_owner());
    }

    #[test]
    fn approved_and_settled_count_as_spent() {
        assert!(ExpenseStatus::Approved.counts_as_spent());
        assert!(ExpenseStatus::Settled.counts_as_spent());
        assert!(!ExpenseStatus::Pending.counts_as_spent());
        assert!(!ExpenseStatus::Rejected.counts_as_spent());
    }

    #[test]
    fn new_rejects_negative_amounts() {
        let err = Expense::new(
            Uuid::new_v4(),
            None,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            Category::Meal,
            "lunch".to_string(),
            Money::new(-1),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}
