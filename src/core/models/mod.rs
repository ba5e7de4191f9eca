pub mod event;
pub mod expense;
pub mod money;
pub mod plan;
pub mod settlement;

pub use event::LedgerEvent;
pub use expense::{Expense, ExpenseWithShares, Share, SplitType};
pub use money::Money;
pub use plan::{MemberStatus, Plan, PlanMember, Role};
pub use settlement::{DebtItem, DebtToCreditor, ExpenseSummary, MemberBalance, Transfer};
