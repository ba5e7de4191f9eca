use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::errors::LedgerError;
use crate::core::models::{Expense, ExpenseWithShares, Plan, Share};

/// Persistence boundary for the ledger. Compound operations are atomic: a
/// failed create or replace leaves the prior state untouched, and readers
/// always observe a full share set for every expense, never a partial one.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_plan(&self, plan: Plan) -> Result<(), LedgerError>;
    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, LedgerError>;
    async fn is_active_member(&self, plan_id: Uuid, user_id: Uuid) -> Result<bool, LedgerError>;

    /// Inserts the expense and its full share set as one unit; rejects the
    /// whole operation if any row violates the ledger invariants.
    async fn create_expense(&self, expense: Expense, shares: Vec<Share>)
    -> Result<(), LedgerError>;
    /// Metadata-only update; the stored share set must still sum to the
    /// expense amount.
    async fn update_expense(&self, expense: Expense) -> Result<(), LedgerError>;
    /// Replaces the expense row and its entire share set atomically.
    async fn replace_expense(
        &self,
        expense: Expense,
        new_shares: Vec<Share>,
    ) -> Result<(), LedgerError>;
    /// Explicit two-step delete: shares first, then the expense row.
    async fn delete_expense(&self, expense_id: Uuid) -> Result<(), LedgerError>;
    async fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>, LedgerError>;
    async fn get_shares(&self, expense_id: Uuid) -> Result<Vec<Share>, LedgerError>;
    /// Conditional update on exactly one row: fails with `ShareAlreadyPaid`
    /// if the row is already settled, so racing callers can tell "settled
    /// now" from "already settled".
    async fn mark_share_paid(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Share, LedgerError>;
    /// All expenses of a plan with their shares, read from one consistent
    /// snapshot, ordered by creation time.
    async fn expenses_for_plan(&self, plan_id: Uuid) -> Result<Vec<ExpenseWithShares>, LedgerError>;
}

pub mod in_memory;
