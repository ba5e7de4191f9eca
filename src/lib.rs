pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::{ErrorKind, LedgerError};
pub use crate::core::models::{
    DebtToCreditor, Expense, ExpenseSummary, ExpenseWithShares, LedgerEvent, MemberBalance,
    MemberStatus, Money, Plan, PlanMember, Role, Share, SplitType, Transfer,
};
pub use crate::core::services::{LedgerService, NewExpense, ShareAmount, UpdateExpense};
pub use crate::infrastructure::notify::in_memory::InMemoryNotifier;
pub use crate::infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests;
