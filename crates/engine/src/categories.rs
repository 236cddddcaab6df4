//! The fixed expense category set.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Classification of an expense entry.
///
/// `Cash` is special: it records money *handed to* the user (an advance),
/// not money spent, so it never counts toward daily limits or reimbursement
/// cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Travel,
    Meal,
    Hotel,
    Luggage,
    Cash,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Travel,
        Self::Meal,
        Self::Hotel,
        Self::Luggage,
        Self::Cash,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Meal => "meal",
            Self::Hotel => "hotel",
            Self::Luggage => "luggage",
            Self::Cash => "cash",
            Self::Other => "other",
        }
    }

    /// Whether entries in this category count as money spent.
    ///
    /// `cash` entries are credits and are excluded from both limit checks
    /// and reimbursement totals.
    #[must_use]
    pub const fn counts_toward_spend(self) -> bool {
        !matches!(self, Self::Cash)
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "travel" => Ok(Self::Travel),
            "meal" => Ok(Self::Meal),
            "hotel" => Ok(Self::Hotel),
            "luggage" => Ok(Self::Luggage),
            "cash" => Ok(Self::Cash),
            "other" => Ok(Self::Other),
            other => Err(EngineError::InvalidId(format!(
                "invalid category: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
