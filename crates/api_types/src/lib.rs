use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Expense category as it appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
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
    /// Returns the canonical category string used by the engine/database.
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
}

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
}

pub mod expense {
    use super::*;

    /// One draft row of a submission. Amounts stay as text; the engine
    /// coerces anything non-numeric to zero.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DraftRow {
        pub description: String,
        pub amount: String,
        #[serde(default)]
        pub image_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DraftGroup {
        pub category: Category,
        pub rows: Vec<DraftRow>,
    }

    /// Request body for `POST /expenses`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubmitExpenses {
        pub date: NaiveDate,
        #[serde(default)]
        pub mission_id: Option<Uuid>,
        pub groups: Vec<DraftGroup>,
    }

    /// Request body for `PATCH /expenses/{id}` (owner edit).
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UpdateExpense {
        #[serde(default)]
        pub description: Option<String>,
        /// Amount in paise.
        #[serde(default)]
        pub amount_paise: Option<i64>,
        #[serde(default)]
        pub image_url: Option<String>,
    }

    /// Request body for `POST /expenses/{id}/approve`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ApproveExpense {
        /// Overrides the submitted amount when set (paise).
        #[serde(default)]
        pub corrected_amount_paise: Option<i64>,
        #[serde(default)]
        pub note: Option<String>,
    }

    /// Request body for `POST /expenses/{id}/reject`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RejectExpense {
        pub reason: String,
    }

    /// Query/body filter for listing and report export.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ListFilter {
        #[serde(default)]
        pub user_id: Option<Uuid>,
        #[serde(default)]
        pub mission_id: Option<Uuid>,
        #[serde(default)]
        pub category: Option<Category>,
        #[serde(default)]
        pub status: Option<ExpenseStatus>,
        /// Inclusive lower bound.
        #[serde(default)]
        pub from: Option<NaiveDate>,
        /// Exclusive upper bound.
        #[serde(default)]
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub mission_id: Option<Uuid>,
        pub date: NaiveDate,
        pub category: Category,
        pub description: String,
        pub amount_paise: i64,
        pub image_url: Option<String>,
        pub status: ExpenseStatus,
        pub admin_note: Option<String>,
        pub rejected_reason: Option<String>,
        pub approved_by: Option<Uuid>,
        pub approved_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod limits {
    use super::*;

    /// Request body for `PUT /limits/{category}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SetLimit {
        /// Daily cap in paise; zero disables the limit.
        pub daily_limit_paise: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LimitView {
        pub category: Category,
        pub daily_limit_paise: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LimitsResponse {
        pub limits: Vec<LimitView>,
    }
}

pub mod mission {
    use super::*;

    /// Request body for `POST /missions`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StartMission {
        pub name: String,
        pub start_date: NaiveDate,
        #[serde(default)]
        pub details: Option<String>,
    }

    /// Request body for `POST /missions/{id}/finish`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FinishMission {
        pub end_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MissionView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        pub status: String,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub details: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MissionsResponse {
        pub missions: Vec<MissionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MissionStats {
        pub expense_paise: i64,
        pub received_paise: i64,
    }
}

pub mod settlement {
    use super::*;

    /// Request body for `POST /settlements` (admin).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordSettlement {
        pub user_id: Uuid,
        #[serde(default)]
        pub mission_id: Option<Uuid>,
        pub amount_paise: i64,
        pub proof_url: String,
        #[serde(default)]
        pub note: Option<String>,
        /// Marks the user's approved entries as settled ("pay full").
        #[serde(default)]
        pub settle_expenses: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub mission_id: Option<Uuid>,
        pub amount_paise: i64,
        pub proof_url: String,
        pub note: Option<String>,
        pub settled_by: Uuid,
        pub user_acknowledged: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementsResponse {
        pub settlements: Vec<SettlementView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub spent_paise: i64,
        pub received_paise: i64,
        /// `received - spent`; negative means the organization owes the user.
        pub balance_paise: i64,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        Admin,
        User,
    }

    impl Role {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "admin",
                Self::User => "user",
            }
        }
    }

    /// Request body for `POST /register` (unauthenticated).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    /// Request body for `PUT /users/{id}/role`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SetRole {
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub is_approved: bool,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod receipt {
    use super::*;

    /// Response body for `POST /receipts`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptUploaded {
        pub url: String,
    }

    /// Query for `POST /receipts`: original file name (for its extension)
    /// and the URL this upload replaces, if any.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReceiptUpload {
        pub filename: String,
        #[serde(default)]
        pub replaces: Option<String>,
    }
}
