use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use plansplit::config::CONFIG;
use plansplit::{
    InMemoryNotifier, InMemoryStorage, LedgerError, LedgerService, NewExpense, Plan, ShareAmount,
    SplitType,
};
use plansplit::infrastructure::storage::Storage;

#[tokio::main]
async fn main() -> Result<(), LedgerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_level)),
        )
        .init();

    let service = LedgerService::new(InMemoryStorage::new(), InMemoryNotifier::new());

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let carol = Uuid::new_v4();
    let mut plan = Plan::new("Road trip", alice, CONFIG.default_currency.as_str());
    plan.add_member(bob);
    plan.add_member(carol);
    let plan_id = plan.id;
    service.storage().save_plan(plan).await?;
    info!("seeded plan {plan_id} with three members");

    let dinner = service
        .create_expense(
            plan_id,
            alice,
            NewExpense {
                title: "Dinner".to_string(),
                description: None,
                amount: 30.0,
                currency: None,
                split_type: SplitType::Equal,
                shares: None,
                activity_id: None,
            },
        )
        .await?;

    service
        .create_expense(
            plan_id,
            bob,
            NewExpense {
                title: "Fuel".to_string(),
                description: Some("two tanks".to_string()),
                amount: 45.0,
                currency: None,
                split_type: SplitType::Custom,
                shares: Some(vec![
                    ShareAmount { user_id: alice, amount: 20.0 },
                    ShareAmount { user_id: bob, amount: 15.0 },
                    ShareAmount { user_id: carol, amount: 10.0 },
                ]),
                activity_id: None,
            },
        )
        .await?;

    service.settle_share(dinner.expense.id, bob, alice).await?;

    let summary = service.plan_expense_summary(plan_id, alice).await?;
    println!(
        "plan spent {} {} across {} expenses",
        summary.total_spent, summary.currency, summary.expense_count
    );
    for line in &summary.balances {
        println!(
            "  {}  paid {}  owed {}  net {}  still owes {}  still owed {}",
            line.user_id, line.paid, line.owed, line.balance, line.outstanding, line.owed_to_you
        );
    }

    println!("suggested settlement:");
    for transfer in service.plan_settlements(plan_id).await? {
        println!("  {} pays {} {}", transfer.from, transfer.to, transfer.amount);
    }

    let debts = service.user_debts(plan_id, carol).await?;
    println!(
        "carol's open debts: {}",
        serde_json::to_string_pretty(&debts).unwrap_or_default()
    );

    Ok(())
}
