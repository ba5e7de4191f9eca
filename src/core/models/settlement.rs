use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::models::money::Money;

/// One member's line of the plan balance sheet. `balance` is the gross net
/// position (everything they fronted minus everything allocated to them);
/// `outstanding` and `owed_to_you` track only shares still unpaid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemberBalance {
    pub user_id: Uuid,
    pub paid: Money,
    pub owed: Money,
    pub balance: Money,
    pub outstanding: Money,
    pub owed_to_you: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub plan_id: Uuid,
    pub total_spent: Money,
    pub expense_count: usize,
    pub balances: Vec<MemberBalance>,
    pub currency: String,
}

/// A recommended peer-to-peer payment. Advisory only: emitting a transfer
/// changes nothing in the ledger.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DebtItem {
    pub expense_id: Uuid,
    pub title: String,
    pub amount: Money,
}

/// Unpaid shares one member owes a single creditor, grouped for display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DebtToCreditor {
    pub creditor: Uuid,
    pub total_owed: Money,
    pub expenses: Vec<DebtItem>,
}
