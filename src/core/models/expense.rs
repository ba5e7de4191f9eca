use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::models::money::Money;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitType {
    Equal,
    Custom,
    ByItem,
}

/// A single cost entry fronted by one member (the payer) on behalf of the
/// plan. Only the payer may edit it; the payer or the plan owner may
/// delete it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub payer_id: Uuid,
    pub activity_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub amount: Money,
    pub currency: String,
    pub split_type: SplitType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One member's allocated portion of an expense. (expense_id, user_id) is
/// unique; `paid_at` is set exactly once, on the unpaid-to-paid transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Share {
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount: Money,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpenseWithShares {
    pub expense: Expense,
    pub shares: Vec<Share>,
}
