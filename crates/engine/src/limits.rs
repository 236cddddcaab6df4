//! Per-category daily cap configuration.
//!
//! The policy table holds at most one row per category. A cap of zero (or a
//! missing row) means "no limit". Reads happen on every submission; writes
//! are admin-only and last-writer-wins, like the rest of the system.

use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{Category, Money};

/// In-memory snapshot of the cap configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LimitPolicy {
    caps: HashMap<Category, Money>,
}

impl LimitPolicy {
    #[must_use]
    pub fn new(caps: HashMap<Category, Money>) -> Self {
        Self { caps }
    }

    /// Effective cap for a category.
    ///
    /// Returns `None` when the category is uncapped: no row, cap of zero,
    /// or the `cash` category (received money is never limited).
    #[must_use]
    pub fn cap_for(&self, category: Category) -> Option<Money> {
        if !category.counts_toward_spend() {
            return None;
        }
        self.caps
            .get(&category)
            .copied()
            .filter(|cap| cap.is_positive())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Money)> + '_ {
        self.caps.iter().map(|(c, m)| (*c, *m))
    }
}

impl FromIterator<(Category, Money)> for LimitPolicy {
    fn from_iter<T: IntoIterator<Item = (Category, Money)>>(iter: T) -> Self {
        Self {
            caps: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "category_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub category: String,
    pub daily_limit_paise: i64,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_missing_caps_are_unlimited() {
        let policy: LimitPolicy = [
            (Category::Travel, Money::new(1000_00)),
            (Category::Meal, Money::ZERO),
        ]
        .into_iter()
        .collect();

        assert_eq!(policy.cap_for(Category::Travel), Some(Money::new(1000_00)));
        assert_eq!(policy.cap_for(Category::Meal), None);
        assert_eq!(policy.cap_for(Category::Hotel), None);
    }

    #[test]
    fn cash_is_never_capped() {
        let policy: LimitPolicy = [(Category::Cash, Money::new(50_00))].into_iter().collect();
        assert_eq!(policy.cap_for(Category::Cash), None);
    }
}
