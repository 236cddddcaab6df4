//! Daily-limit validation.
//!
//! Everything here is pure: callers fetch the policy and the day's persisted
//! entries, hand them in together with the draft rows, and get back either a
//! per-category usage report or the set of violating categories. The engine
//! runs this inside the same transaction that reads today's entries, so the
//! check and the insert see one consistent snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Category, Expense, LimitPolicy, Money};

/// One draft row as typed by the user. The amount stays text until
/// validation; anything non-numeric counts as zero. A row may carry the URL
/// of a receipt uploaded in an earlier call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRow {
    pub description: String,
    pub amount: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl DraftRow {
    /// A row is empty when it carries neither a description nor an amount.
    /// Empty rows are dropped from validation and never persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty() && Money::parse_lenient(&self.amount).is_zero()
    }

    #[must_use]
    pub fn amount_paise(&self) -> Money {
        Money::parse_lenient(&self.amount)
    }
}

/// A batch of rows under one category. A submission may carry several groups
/// with the same category; their rows are summed together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftGroup {
    pub category: Category,
    pub rows: Vec<DraftRow>,
}

/// Usage of one category's daily cap, existing entries plus draft.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryUsage {
    pub existing: Money,
    pub draft: Money,
    pub total: Money,
    pub cap: Option<Money>,
    pub remaining: Option<Money>,
    pub exceeded: bool,
    pub percent_used: Option<f64>,
}

fn existing_spend(today: &[Expense], category: Category) -> Money {
    Money::sum(
        today
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.amount),
    )
}

fn draft_spend(drafts: &[DraftGroup], category: Category) -> Money {
    Money::sum(
        drafts
            .iter()
            .filter(|g| g.category == category)
            .flat_map(|g| g.rows.iter())
            .filter(|r| !r.is_empty())
            .map(DraftRow::amount_paise),
    )
}

/// Computes the usage report for one category.
///
/// `today` is every entry the user already persisted on the submission date,
/// regardless of status: a pending entry holds its share of the cap until an
/// admin rejects it. The boundary is inclusive: a total exactly equal to the
/// cap passes.
#[must_use]
pub fn evaluate(
    policy: &LimitPolicy,
    today: &[Expense],
    drafts: &[DraftGroup],
    category: Category,
) -> CategoryUsage {
    let existing = existing_spend(today, category);
    let draft = draft_spend(drafts, category);
    let total = existing + draft;
    let cap = policy.cap_for(category);
    match cap {
        Some(cap) => CategoryUsage {
            existing,
            draft,
            total,
            cap: Some(cap),
            remaining: Some(cap - total),
            exceeded: total > cap,
            percent_used: Some((total.paise() as f64 / cap.paise() as f64).min(1.0)),
        },
        None => CategoryUsage {
            existing,
            draft,
            total,
            cap: None,
            remaining: None,
            exceeded: false,
            percent_used: None,
        },
    }
}

/// Checks a whole submission against the policy.
///
/// All-or-nothing: if any category would exceed its cap, the full set of
/// violating categories comes back and the caller must persist nothing.
/// Only categories with at least one non-empty row are checked; a card the
/// user left blank contributes nothing, even when existing spend already
/// sits over that category's cap.
pub fn validate_submission(
    policy: &LimitPolicy,
    today: &[Expense],
    drafts: &[DraftGroup],
) -> Result<(), BTreeSet<Category>> {
    let mut violating = BTreeSet::new();
    for category in drafts
        .iter()
        .filter(|g| g.rows.iter().any(|r| !r.is_empty()))
        .map(|g| g.category)
        .collect::<BTreeSet<_>>()
    {
        if evaluate(policy, today, drafts, category).exceeded {
            violating.insert(category);
        }
    }
    if violating.is_empty() {
        Ok(())
    } else {
        Err(violating)
    }
}

/// One row that survived the blank-row filter and will be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub category: Category,
    pub description: String,
    pub amount: Money,
    pub image_url: Option<String>,
}

/// Flattens draft groups into the rows that actually get persisted, blank
/// rows excluded.
#[must_use]
pub fn non_empty_rows(drafts: &[DraftGroup]) -> Vec<NewEntry> {
    drafts
        .iter()
        .flat_map(|g| {
            g.rows.iter().filter(|r| !r.is_empty()).map(|r| NewEntry {
                category: g.category,
                description: r.description.trim().to_string(),
                amount: r.amount_paise(),
                image_url: r.image_url.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;

    fn entry(category: Category, amount: i64) -> Expense {
        Expense::new(
            Uuid::new_v4(),
            None,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            category,
            "existing".to_string(),
            Money::new(amount),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    fn group(category: Category, amounts: &[&str]) -> DraftGroup {
        DraftGroup {
            category,
            rows: amounts
                .iter()
                .map(|a| DraftRow {
                    description: "row".to_string(),
                    amount: (*a).to_string(),
                    image_url: None,
                })
                .collect(),
        }
    }

    fn travel_policy(cap: i64) -> LimitPolicy {
        [(Category::Travel, Money::new(cap))].into_iter().collect()
    }

    #[test]
    fn boundary_is_inclusive() {
        let policy = travel_policy(1000_00);
        let today = vec![entry(Category::Travel, 700_00)];

        let at_cap = vec![group(Category::Travel, &["300.00"])];
        assert!(validate_submission(&policy, &today, &at_cap).is_ok());

        let over = vec![group(Category::Travel, &["300.01"])];
        let violating = validate_submission(&policy, &today, &over).unwrap_err();
        assert_eq!(violating, BTreeSet::from([Category::Travel]));
    }

    #[test]
    fn pending_entries_hold_their_share() {
        // 700 existing + 250 draft fits a 1000 cap; a further 100 does not.
        let policy = travel_policy(1000_00);
        let today = vec![entry(Category::Travel, 700_00)];
        let ok = vec![group(Category::Travel, &["250"])];
        assert!(validate_submission(&policy, &today, &ok).is_ok());

        let today = vec![entry(Category::Travel, 700_00), entry(Category::Travel, 250_00)];
        let over = vec![group(Category::Travel, &["100"])];
        assert!(validate_submission(&policy, &today, &over).is_err());
    }

    #[test]
    fn duplicate_category_groups_are_summed() {
        let policy = travel_policy(1000_00);
        let drafts = vec![
            group(Category::Travel, &["600"]),
            group(Category::Travel, &["500"]),
        ];
        let usage = evaluate(&policy, &[], &drafts, Category::Travel);
        assert_eq!(usage.draft, Money::new(1100_00));
        assert!(usage.exceeded);
    }

    #[test]
    fn cash_and_zero_cap_never_reject() {
        let policy: LimitPolicy = [
            (Category::Cash, Money::new(10_00)),
            (Category::Meal, Money::ZERO),
        ]
        .into_iter()
        .collect();
        let drafts = vec![
            group(Category::Cash, &["99999"]),
            group(Category::Meal, &["99999"]),
        ];
        assert!(validate_submission(&policy, &[], &drafts).is_ok());
        assert_eq!(
            evaluate(&policy, &[], &drafts, Category::Cash).percent_used,
            None
        );
    }

    #[test]
    fn blank_rows_are_excluded() {
        let drafts = vec![DraftGroup {
            category: Category::Meal,
            rows: vec![
                DraftRow {
                    description: "lunch".to_string(),
                    amount: "120".to_string(),
                    image_url: None,
                },
                DraftRow {
                    description: "  ".to_string(),
                    amount: "".to_string(),
                    image_url: None,
                },
                DraftRow {
                    description: "chai".to_string(),
                    amount: "not a number".to_string(),
                    image_url: None,
                },
            ],
        }];
        let rows = non_empty_rows(&drafts);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "lunch");
        assert_eq!(rows[0].amount, Money::new(120_00));
        // non-numeric amount coerces to zero but the description keeps the row
        assert_eq!(rows[1].amount, Money::ZERO);
    }

    fn blank_group(category: Category) -> DraftGroup {
        DraftGroup {
            category,
            rows: vec![DraftRow::default(), DraftRow::default()],
        }
    }

    #[test]
    fn blank_only_groups_do_not_trigger_limit_checks() {
        // Existing travel spend already sits over a later-lowered cap; a
        // blank travel card must not block the meal row.
        let policy = travel_policy(500_00);
        let today = vec![entry(Category::Travel, 1200_00)];
        let drafts = vec![blank_group(Category::Travel), group(Category::Meal, &["120"])];
        assert!(validate_submission(&policy, &today, &drafts).is_ok());

        // One real row on the card brings the category back into the check.
        let drafts = vec![blank_group(Category::Travel), group(Category::Travel, &["1"])];
        let violating = validate_submission(&policy, &today, &drafts).unwrap_err();
        assert_eq!(violating, BTreeSet::from([Category::Travel]));
    }

    #[test]
    fn usage_reports_remaining_and_percent() {
        let policy = travel_policy(1000_00);
        let drafts = vec![group(Category::Travel, &["250"])];
        let usage = evaluate(&policy, &[entry(Category::Travel, 500_00)], &drafts, Category::Travel);
        assert_eq!(usage.total, Money::new(750_00));
        assert_eq!(usage.remaining, Some(Money::new(250_00)));
        assert_eq!(usage.percent_used, Some(0.75));
        assert!(!usage.exceeded);
    }
}
