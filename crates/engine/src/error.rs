//! The module contains the errors the engine can produce.
//!
//! Validation errors (`LimitExceeded`, `InvalidAmount`, `MissingField`,
//! `EmptySubmission`, `MissingReason`, `NotEditable`) are raised before
//! anything is written; `Database` wraps sea-orm failures after the
//! transaction has rolled back.

use sea_orm::DbErr;
use thiserror::Error;

use crate::Category;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// One or more categories would exceed their daily cap. The submission
    /// is rejected as a whole; the offending categories are reported so the
    /// caller can annotate them.
    #[error("daily limit exceeded for: {}", format_categories(.0))]
    LimitExceeded(Vec<Category>),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// A required text field (mission name, settlement proof, ...) was blank.
    #[error("{0} must not be empty")]
    MissingField(String),
    /// Every draft row in the batch was blank.
    #[error("add at least one expense entry")]
    EmptySubmission,
    #[error("rejection requires a reason")]
    MissingReason,
    #[error("entry is no longer editable: {0}")]
    NotEditable(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

fn format_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.as_str().to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::LimitExceeded(a), Self::LimitExceeded(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::EmptySubmission, Self::EmptySubmission) => true,
            (Self::MissingReason, Self::MissingReason) => true,
            (Self::NotEditable(a), Self::NotEditable(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
