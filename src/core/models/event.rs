use serde::Serialize;
use uuid::Uuid;

use crate::core::models::money::Money;

/// Outbound event emitted after a successful mutation. Delivery is
/// fire-and-forget; the request path never waits on it.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEvent {
    ExpenseCreated {
        plan_id: Uuid,
        expense_id: Uuid,
        payer_id: Uuid,
        amount: Money,
    },
    ExpenseUpdated {
        plan_id: Uuid,
        expense_id: Uuid,
    },
    ExpenseDeleted {
        plan_id: Uuid,
        expense_id: Uuid,
    },
    ShareSettled {
        plan_id: Uuid,
        expense_id: Uuid,
        user_id: Uuid,
        amount: Money,
    },
}
