use std::time::Duration;
use uuid::Uuid;

use crate::core::errors::{ErrorKind, LedgerError};
use crate::core::models::{LedgerEvent, Money, SplitType};
use crate::core::services::{LedgerService, UpdateExpense};
use crate::infrastructure::notify::in_memory::InMemoryNotifier;
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use crate::tests::{custom_expense, equal_expense, seed_plan, test_service};

#[tokio::test]
async fn scenario_a_equal_split_three_members() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 3).await;
    let payer = ids[0];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();

    assert_eq!(created.expense.amount, Money::from_cents(3000));
    assert_eq!(created.expense.currency, "USD");
    assert_eq!(created.shares.len(), 3);
    for share in &created.shares {
        assert_eq!(share.amount, Money::from_cents(1000));
        assert_eq!(share.is_paid, share.user_id == payer);
    }
}

#[tokio::test]
async fn create_rejects_non_member_payer_and_unknown_plan() {
    let service = test_service();
    let (plan_id, _ids) = seed_plan(&service, 2).await;
    let stranger = Uuid::new_v4();

    let result = service
        .create_expense(plan_id, stranger, equal_expense("Dinner", 30.0))
        .await;
    assert!(matches!(result, Err(LedgerError::NotPlanMember(id)) if id == stranger));

    let missing = Uuid::new_v4();
    let result = service
        .create_expense(missing, stranger, equal_expense("Dinner", 30.0))
        .await;
    assert!(matches!(result, Err(LedgerError::PlanNotFound(id)) if id == missing));
}

#[tokio::test]
async fn create_validates_activity_reference() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 2).await;

    let dangling = Uuid::new_v4();
    let mut input = equal_expense("Kayak rental", 60.0);
    input.activity_id = Some(dangling);
    let result = service.create_expense(plan_id, ids[0], input).await;
    assert!(matches!(result, Err(LedgerError::ActivityNotFound(id)) if id == dangling));

    let activity = Uuid::new_v4();
    let mut plan = service.storage().get_plan(plan_id).await.unwrap().unwrap();
    plan.activity_ids.push(activity);
    service.storage().save_plan(plan).await.unwrap();

    let mut input = equal_expense("Kayak rental", 60.0);
    input.activity_id = Some(activity);
    let created = service.create_expense(plan_id, ids[0], input).await.unwrap();
    assert_eq!(created.expense.activity_id, Some(activity));
}

#[tokio::test]
async fn scenario_c_custom_sum_off_by_one_cent() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 3).await;

    let result = service
        .create_expense(
            plan_id,
            ids[0],
            custom_expense("Dinner", 30.0, &[(ids[0], 9.99), (ids[1], 10.0), (ids[2], 10.0)]),
        )
        .await;
    assert!(matches!(
        result,
        Err(LedgerError::ShareSumMismatch { shares, .. }) if shares == Money::from_cents(2999)
    ));
}

#[tokio::test]
async fn create_validates_amount_title_and_currency() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 2).await;
    let payer = ids[0];

    for bad_amount in [0.0, -5.0, 10.999, f64::NAN] {
        let result = service
            .create_expense(plan_id, payer, equal_expense("Dinner", bad_amount))
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidAmount)));
    }

    let result = service
        .create_expense(plan_id, payer, equal_expense("   ", 10.0))
        .await;
    assert!(matches!(result, Err(LedgerError::EmptyTitle)));

    let mut input = equal_expense("Dinner", 10.0);
    input.currency = Some("usd".to_string());
    let result = service.create_expense(plan_id, payer, input).await;
    assert!(matches!(result, Err(LedgerError::InvalidCurrency(_))));

    // well-formed but different from the plan's currency
    let mut input = equal_expense("Dinner", 10.0);
    input.currency = Some("EUR".to_string());
    let result = service.create_expense(plan_id, payer, input).await;
    assert!(matches!(result, Err(LedgerError::CurrencyMismatch { .. })));
}

#[tokio::test]
async fn only_the_payer_may_edit() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 2).await;

    let created = service
        .create_expense(plan_id, ids[0], equal_expense("Dinner", 30.0))
        .await
        .unwrap();

    let result = service
        .update_expense(created.expense.id, ids[1], UpdateExpense::default())
        .await;
    assert!(matches!(result, Err(LedgerError::NotExpensePayer(id)) if id == ids[1]));
}

#[tokio::test]
async fn amount_change_rebuilds_equal_shares() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 3).await;
    let payer = ids[0];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();

    let updated = service
        .update_expense(
            created.expense.id,
            payer,
            UpdateExpense {
                amount: Some(60.0),
                ..UpdateExpense::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.expense.amount, Money::from_cents(6000));
    assert_eq!(updated.shares.len(), 3);
    for share in &updated.shares {
        assert_eq!(share.amount, Money::from_cents(2000));
        assert_eq!(share.is_paid, share.user_id == payer);
    }
}

#[tokio::test]
async fn p5_failed_update_leaves_the_share_set_intact() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 3).await;
    let payer = ids[0];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();

    // switching to CUSTOM without supplying shares must fail...
    let result = service
        .update_expense(
            created.expense.id,
            payer,
            UpdateExpense {
                split_type: Some(SplitType::Custom),
                ..UpdateExpense::default()
            },
        )
        .await;
    assert!(matches!(result, Err(LedgerError::MissingSplitShares)));

    // ...and the stored expense and shares are exactly as before
    let stored = service
        .storage()
        .get_expense(created.expense.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.amount, Money::from_cents(3000));
    assert_eq!(stored.split_type, SplitType::Equal);
    let shares = service
        .storage()
        .get_shares(created.expense.id)
        .await
        .unwrap();
    assert_eq!(shares.len(), 3);
    assert!(shares.iter().all(|s| s.amount == Money::from_cents(1000)));
}

#[tokio::test]
async fn metadata_edit_keeps_paid_state() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 2).await;
    let payer = ids[0];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();
    service.settle_share(created.expense.id, ids[1], payer).await.unwrap();

    let updated = service
        .update_expense(
            created.expense.id,
            payer,
            UpdateExpense {
                title: Some("Dinner at the pier".to_string()),
                ..UpdateExpense::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.expense.title, "Dinner at the pier");
    assert!(updated.shares.iter().all(|s| s.is_paid));
}

#[tokio::test]
async fn delete_requires_payer_or_owner() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 3).await;
    let owner = ids[0];
    let payer = ids[1];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();

    let result = service.delete_expense(created.expense.id, ids[2]).await;
    assert!(matches!(result, Err(LedgerError::NotPayerOrOwner(id)) if id == ids[2]));

    // the plan owner may delete another member's expense
    service.delete_expense(created.expense.id, owner).await.unwrap();
    let stored = service
        .storage()
        .get_expense(created.expense.id)
        .await
        .unwrap();
    assert!(stored.is_none());
    let shares = service
        .storage()
        .get_shares(created.expense.id)
        .await
        .unwrap();
    assert!(shares.is_empty());

    let summary = service.plan_expense_summary(plan_id, owner).await.unwrap();
    assert_eq!(summary.expense_count, 0);
}

#[tokio::test]
async fn p4_second_settle_is_a_conflict() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 2).await;
    let payer = ids[0];
    let debtor = ids[1];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();

    let settled = service
        .settle_share(created.expense.id, debtor, payer)
        .await
        .unwrap();
    assert!(settled.is_paid);
    assert!(settled.paid_at.is_some());

    let result = service.settle_share(created.expense.id, debtor, payer).await;
    assert!(matches!(result, Err(LedgerError::ShareAlreadyPaid { .. })));

    // the balance moved exactly once
    let summary = service.plan_expense_summary(plan_id, payer).await.unwrap();
    let debtor_line = summary
        .balances
        .iter()
        .find(|l| l.user_id == debtor)
        .unwrap();
    assert_eq!(debtor_line.outstanding, Money::ZERO);
}

#[tokio::test]
async fn settle_authorization_and_lookup_failures() {
    let service = test_service();
    let (plan_id, ids) = seed_plan(&service, 3).await;
    let payer = ids[0];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();

    // only the person owed the money can confirm
    let result = service.settle_share(created.expense.id, ids[2], ids[1]).await;
    assert!(matches!(result, Err(LedgerError::NotExpensePayer(id)) if id == ids[1]));

    let stranger = Uuid::new_v4();
    let result = service.settle_share(created.expense.id, stranger, payer).await;
    assert!(matches!(result, Err(LedgerError::ShareNotFound { .. })));

    // the payer's own share was settled at creation
    let result = service.settle_share(created.expense.id, payer, payer).await;
    assert!(matches!(result, Err(LedgerError::ShareAlreadyPaid { .. })));
}

#[test]
fn error_kinds_follow_the_taxonomy() {
    assert_eq!(LedgerError::InvalidAmount.kind(), ErrorKind::Validation);
    assert_eq!(
        LedgerError::PlanNotFound(Uuid::nil()).kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        LedgerError::NotExpensePayer(Uuid::nil()).kind(),
        ErrorKind::Forbidden
    );
    assert_eq!(
        LedgerError::ShareAlreadyPaid {
            expense_id: Uuid::nil(),
            user_id: Uuid::nil(),
        }
        .kind(),
        ErrorKind::Conflict
    );
    assert_eq!(
        LedgerError::Storage("lost".to_string()).kind(),
        ErrorKind::Internal
    );
}

#[tokio::test]
async fn mutations_emit_notification_events() {
    let notifier = InMemoryNotifier::new();
    let service = LedgerService::new(InMemoryStorage::new(), notifier.clone());
    let (plan_id, ids) = seed_plan(&service, 2).await;
    let payer = ids[0];

    let created = service
        .create_expense(plan_id, payer, equal_expense("Dinner", 30.0))
        .await
        .unwrap();
    service
        .settle_share(created.expense.id, ids[1], payer)
        .await
        .unwrap();

    // dispatch is fire-and-forget; give the spawned tasks a beat
    tokio::time::sleep(Duration::from_millis(50)).await;

    let events = notifier.events().await;
    assert!(events.iter().any(|e| matches!(
        e,
        LedgerEvent::ExpenseCreated { expense_id, .. } if *expense_id == created.expense.id
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        LedgerEvent::ShareSettled { user_id, .. } if *user_id == ids[1]
    )));
}
