use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, Expense, ExpenseStatus, Money, ResultEngine, Session, expenses,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Filters for listing expenses.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`).
#[derive(Clone, Debug, Default)]
pub struct ExpenseListFilter {
    pub owner: Option<Uuid>,
    pub mission: Option<Uuid>,
    pub category: Option<Category>,
    pub status: Option<ExpenseStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub(super) fn validate_list_filter(filter: &ExpenseListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

pub(super) fn apply_expense_filters(
    mut query: sea_orm::Select<expenses::Entity>,
    filter: &ExpenseListFilter,
) -> sea_orm::Select<expenses::Entity> {
    if let Some(owner) = filter.owner {
        query = query.filter(expenses::Column::UserId.eq(owner));
    }
    if let Some(mission) = filter.mission {
        query = query.filter(expenses::Column::MissionId.eq(mission));
    }
    if let Some(category) = filter.category {
        query = query.filter(expenses::Column::Category.eq(category.as_str()));
    }
    if let Some(status) = filter.status {
        query = query.filter(expenses::Column::Status.eq(status.as_str()));
    }
    if let Some(from) = filter.from {
        query = query.filter(expenses::Column::Date.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(expenses::Column::Date.lt(to));
    }
    query
}

/// Fields the owner may change while an entry is still `pending`.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub amount: Option<Money>,
    /// Replaces the receipt; the superseded URL is returned to the caller
    /// for best-effort cleanup.
    pub image_url: Option<String>,
}

impl Engine {
    /// Approves an entry, optionally correcting its amount. Admin only.
    ///
    /// Also reverts a previous rejection: a `rejected` entry moves back to
    /// `approved` and its reason is cleared.
    pub async fn approve_expense(
        &self,
        session: &Session,
        expense_id: Uuid,
        corrected_amount: Option<Money>,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Expense> {
        self.require_admin(session)?;
        if let Some(amount) = corrected_amount
            && amount.is_negative()
        {
            return Err(EngineError::InvalidAmount(
                "corrected amount must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let mut expense = self.require_expense(&db_tx, expense_id).await?;
            if expense.status == ExpenseStatus::Settled {
                return Err(EngineError::NotEditable(
                    "entry already settled".to_string(),
                ));
            }

            if let Some(amount) = corrected_amount {
                expense.amount = amount;
            }
            expense.status = ExpenseStatus::Approved;
            expense.admin_note = normalize_optional_text(note);
            expense.rejected_reason = None;
            expense.approved_by = Some(session.user_id);
            expense.approved_at = Some(now);
            expense.updated_at = now;

            expenses::ActiveModel::from(&expense).update(&db_tx).await?;
            Ok(expense)
        })
    }

    /// Rejects an entry with a mandatory reason. Admin only.
    ///
    /// A blank reason is an error and the ledger stays untouched. Also
    /// reverts a previous approval.
    pub async fn reject_expense(
        &self,
        session: &Session,
        expense_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Expense> {
        self.require_admin(session)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EngineError::MissingReason);
        }

        with_tx!(self, |db_tx| {
            let mut expense = self.require_expense(&db_tx, expense_id).await?;
            if expense.status == ExpenseStatus::Settled {
                return Err(EngineError::NotEditable(
                    "entry already settled".to_string(),
                ));
            }

            expense.status = ExpenseStatus::Rejected;
            expense.rejected_reason = Some(reason.to_string());
            expense.approved_by = None;
            expense.approved_at = None;
            expense.updated_at = now;

            expenses::ActiveModel::from(&expense).update(&db_tx).await?;
            Ok(expense)
        })
    }

    /// Owner edit of a still-pending entry.
    ///
    /// Returns the updated entry and the superseded receipt URL, if the
    /// update replaced one.
    pub async fn update_expense(
        &self,
        session: &Session,
        expense_id: Uuid,
        update: ExpenseUpdate,
        now: DateTime<Utc>,
    ) -> ResultEngine<(Expense, Option<String>)> {
        if let Some(amount) = update.amount
            && amount.is_negative()
        {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let mut expense = self.require_expense(&db_tx, expense_id).await?;
            if expense.user_id != session.user_id {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }
            if !expense.status.editable_by_owner() {
                return Err(EngineError::NotEditable(format!(
                    "entry is {}",
                    expense.status.as_str()
                )));
            }

            if let Some(description) = update.description {
                expense.description = description.trim().to_string();
            }
            if let Some(amount) = update.amount {
                expense.amount = amount;
            }
            let mut superseded = None;
            if let Some(url) = update.image_url {
                superseded = expense.image_url.replace(url);
            }
            expense.updated_at = now;

            expenses::ActiveModel::from(&expense).update(&db_tx).await?;
            Ok((expense, superseded))
        })
    }

    /// Hard delete. Admin only. Returns the orphaned receipt URL so the
    /// caller can clean up storage.
    pub async fn delete_expense(
        &self,
        session: &Session,
        expense_id: Uuid,
    ) -> ResultEngine<Option<String>> {
        self.require_admin(session)?;

        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id).await?;
            let model = expenses::ActiveModel {
                id: ActiveValue::Set(expense.id),
                ..Default::default()
            };
            model.delete(&db_tx).await?;
            Ok(expense.image_url)
        })
    }

    /// Lists entries, newest day first. Non-admin sessions only ever see
    /// their own rows, whatever the filter says.
    pub async fn list_expenses(
        &self,
        session: &Session,
        filter: &ExpenseListFilter,
    ) -> ResultEngine<Vec<Expense>> {
        validate_list_filter(filter)?;
        let mut filter = filter.clone();
        if !session.is_admin() {
            filter.owner = Some(session.user_id);
        }

        with_tx!(self, |db_tx| {
            let query = apply_expense_filters(expenses::Entity::find(), &filter)
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::CreatedAt);
            let models = query.all(&db_tx).await?;
            models.into_iter().map(Expense::try_from).collect()
        })
    }
}
