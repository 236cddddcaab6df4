pub use categories::Category;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseStatus};
pub use limits::LimitPolicy;
pub use missions::{Mission, MissionStatus};
pub use money::Money;
pub use ops::{Account, Engine, EngineBuilder, ExpenseListFilter, ExpenseUpdate, ReportRow};
pub use reconciler::{BalanceSummary, MissionStats};
pub use session::{Role, Session};
pub use settlements::Settlement;
pub use validator::{CategoryUsage, DraftGroup, DraftRow};

mod categories;
mod error;
pub mod expenses;
pub mod limits;
pub mod missions;
mod money;
mod ops;
pub mod profiles;
pub mod reconciler;
pub mod roles;
mod session;
pub mod settlements;
pub mod validator;

type ResultEngine<T> = Result<T, EngineError>;
