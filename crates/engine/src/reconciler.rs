//! Settlement reconciliation.
//!
//! Balances are always recomputed from scratch over the full ledger; there
//! is no running counter to drift. Only approved or settled non-cash
//! expenses count as spend, and every settlement counts as received.

use serde::Serialize;
use uuid::Uuid;

use crate::{Expense, Money, Settlement};

/// Reimbursement position for one user.
///
/// `balance = received - spent`; a negative balance means the organization
/// still owes the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    pub spent: Money,
    pub received: Money,
    pub balance: Money,
}

/// Totals scoped to a single mission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MissionStats {
    pub expense: Money,
    pub received: Money,
}

fn spent_of<'a>(expenses: impl Iterator<Item = &'a Expense>) -> Money {
    Money::sum(
        expenses
            .filter(|e| e.status.counts_as_spent() && e.category.counts_toward_spend())
            .map(|e| e.amount),
    )
}

#[must_use]
pub fn balance(expenses: &[Expense], settlements: &[Settlement], user: Uuid) -> BalanceSummary {
    let spent = spent_of(expenses.iter().filter(|e| e.user_id == user));
    let received = Money::sum(
        settlements
            .iter()
            .filter(|s| s.user_id == user)
            .map(|s| s.amount),
    );
    BalanceSummary {
        spent,
        received,
        balance: received - spent,
    }
}

#[must_use]
pub fn mission_stats(
    expenses: &[Expense],
    settlements: &[Settlement],
    user: Uuid,
    mission: Uuid,
) -> MissionStats {
    let expense = spent_of(
        expenses
            .iter()
            .filter(|e| e.user_id == user && e.mission_id == Some(mission)),
    );
    let received = Money::sum(
        settlements
            .iter()
            .filter(|s| s.user_id == user && s.mission_id == Some(mission))
            .map(|s| s.amount),
    );
    MissionStats { expense, received }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::{Category, ExpenseStatus};

    fn expense(user: Uuid, category: Category, amount: i64, status: ExpenseStatus) -> Expense {
        let mut e = Expense::new(
            user,
            None,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            category,
            "x".to_string(),
            Money::new(amount),
            None,
            Utc::now(),
        )
        .unwrap();
        e.status = status;
        e
    }

    fn settlement(user: Uuid, amount: i64) -> Settlement {
        Settlement::new(
            user,
            None,
            Money::new(amount),
            "proof.png".to_string(),
            None,
            Uuid::new_v4(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn spent_minus_received_sign_convention() {
        let user = Uuid::new_v4();
        let expenses = vec![
            expense(user, Category::Travel, 1200_00, ExpenseStatus::Approved),
            expense(user, Category::Meal, 800_00, ExpenseStatus::Settled),
            expense(user, Category::Hotel, 5000_00, ExpenseStatus::Pending),
            expense(user, Category::Other, 300_00, ExpenseStatus::Rejected),
        ];
        let settlements = vec![settlement(user, 1500_00)];
        let summary = balance(&expenses, &settlements, user);
        assert_eq!(summary.spent, Money::new(2000_00));
        assert_eq!(summary.received, Money::new(1500_00));
        assert_eq!(summary.balance, Money::new(-500_00));
    }

    #[test]
    fn cash_entries_do_not_count_as_spend() {
        let user = Uuid::new_v4();
        let expenses = vec![
            expense(user, Category::Cash, 1000_00, ExpenseStatus::Approved),
            expense(user, Category::Meal, 400_00, ExpenseStatus::Approved),
        ];
        let summary = balance(&expenses, &[], user);
        assert_eq!(summary.spent, Money::new(400_00));
    }

    #[test]
    fn no_settlements_means_owed_in_full() {
        let user = Uuid::new_v4();
        let expenses = vec![expense(user, Category::Travel, 750_00, ExpenseStatus::Approved)];
        let summary = balance(&expenses, &[], user);
        assert_eq!(summary.balance, Money::new(-750_00));
    }

    #[test]
    fn order_independent() {
        let user = Uuid::new_v4();
        let mut expenses = vec![
            expense(user, Category::Travel, 100_00, ExpenseStatus::Approved),
            expense(user, Category::Meal, 200_00, ExpenseStatus::Settled),
            expense(user, Category::Hotel, 300_00, ExpenseStatus::Approved),
        ];
        let forward = balance(&expenses, &[], user);
        expenses.reverse();
        assert_eq!(balance(&expenses, &[], user), forward);
    }

    #[test]
    fn other_users_rows_are_ignored() {
        let user = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let expenses = vec![expense(stranger, Category::Travel, 999_00, ExpenseStatus::Approved)];
        let settlements = vec![settlement(stranger, 999_00)];
        let summary = balance(&expenses, &settlements, user);
        assert_eq!(summary.spent, Money::ZERO);
        assert_eq!(summary.received, Money::ZERO);
    }

    #[test]
    fn mission_stats_scope_to_one_mission() {
        let user = Uuid::new_v4();
        let mission = Uuid::new_v4();
        let mut on_mission = expense(user, Category::Travel, 500_00, ExpenseStatus::Approved);
        on_mission.mission_id = Some(mission);
        let off_mission = expense(user, Category::Travel, 900_00, ExpenseStatus::Approved);
        let mut scoped = settlement(user, 200_00);
        scoped.mission_id = Some(mission);
        let general = settlement(user, 700_00);

        let stats = mission_stats(
            &[on_mission, off_mission],
            &[scoped, general],
            user,
            mission,
        );
        assert_eq!(stats.expense, Money::new(500_00));
        assert_eq!(stats.received, Money::new(200_00));
    }
}
