mod expense_tests;

use uuid::Uuid;

use crate::core::models::Plan;
use crate::core::services::{LedgerService, NewExpense, ShareAmount};
use crate::core::models::SplitType;
use crate::infrastructure::notify::in_memory::InMemoryNotifier;
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub(crate) fn test_service() -> LedgerService<InMemoryStorage, InMemoryNotifier> {
    LedgerService::new(InMemoryStorage::new(), InMemoryNotifier::new())
}

/// Seeds a plan with `member_count` members and returns its id plus the
/// member ids in ascending order; the first member is the owner.
pub(crate) async fn seed_plan(
    service: &LedgerService<InMemoryStorage, InMemoryNotifier>,
    member_count: usize,
) -> (Uuid, Vec<Uuid>) {
    let mut ids: Vec<Uuid> = (0..member_count).map(|_| Uuid::new_v4()).collect();
    ids.sort();
    let mut plan = Plan::new("Weekend trip", ids[0], "USD");
    for id in &ids[1..] {
        plan.add_member(*id);
    }
    let plan_id = plan.id;
    service.storage().save_plan(plan).await.unwrap();
    (plan_id, ids)
}

pub(crate) fn equal_expense(title: &str, amount: f64) -> NewExpense {
    NewExpense {
        title: title.to_string(),
        description: None,
        amount,
        currency: None,
        split_type: SplitType::Equal,
        shares: None,
        activity_id: None,
    }
}

pub(crate) fn custom_expense(title: &str, amount: f64, shares: &[(Uuid, f64)]) -> NewExpense {
    NewExpense {
        title: title.to_string(),
        description: None,
        amount,
        currency: None,
        split_type: SplitType::Custom,
        shares: Some(
            shares
                .iter()
                .map(|(user_id, amount)| ShareAmount {
                    user_id: *user_id,
                    amount: *amount,
                })
                .collect(),
        ),
        activity_id: None,
    }
}
