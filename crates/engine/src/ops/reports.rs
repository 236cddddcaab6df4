use chrono::NaiveDate;
use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{Category, Expense, ExpenseStatus, Money, ResultEngine, Session, expenses, profiles};

use super::{
    Engine,
    review::{ExpenseListFilter, apply_expense_filters, validate_list_filter},
    with_tx,
};

/// One line of the expense report, ready for CSV serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub user: String,
    pub category: Category,
    pub description: String,
    pub amount: Money,
    pub status: ExpenseStatus,
}

impl Engine {
    /// Report rows for export. Admin only; the filter predicate is the same
    /// one listing uses.
    pub async fn report_rows(
        &self,
        session: &Session,
        filter: &ExpenseListFilter,
    ) -> ResultEngine<Vec<ReportRow>> {
        self.require_admin(session)?;
        validate_list_filter(filter)?;

        with_tx!(self, |db_tx| {
            let rows: Vec<(expenses::Model, Option<profiles::Model>)> =
                apply_expense_filters(expenses::Entity::find(), filter)
                    .order_by_asc(expenses::Column::Date)
                    .order_by_asc(expenses::Column::CreatedAt)
                    .find_also_related(profiles::Entity)
                    .all(&db_tx)
                    .await?;

            let mut out = Vec::with_capacity(rows.len());
            for (model, profile) in rows {
                let user = profile.map(|p| p.name).unwrap_or_default();
                let expense = Expense::try_from(model)?;
                out.push(ReportRow {
                    date: expense.date,
                    user,
                    category: expense.category,
                    description: expense.description,
                    amount: expense.amount,
                    status: expense.status,
                });
            }
            Ok(out)
        })
    }
}
