use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::models::{ExpenseSummary, ExpenseWithShares, MemberBalance, Money};

#[derive(Default)]
struct Account {
    paid: Money,
    owed: Money,
    outstanding: Money,
    owed_to_you: Money,
}

/// Recomputes the plan balance sheet from stored rows. Pure function of the
/// ledger: nothing is cached and nothing is mutated. Active members always
/// get a line, even with no expenses; members who have since left keep
/// their line as long as their rows are on the books.
pub fn summarize(
    plan_id: Uuid,
    currency: &str,
    records: &[ExpenseWithShares],
    active_members: &[Uuid],
) -> ExpenseSummary {
    let mut accounts: BTreeMap<Uuid, Account> = active_members
        .iter()
        .map(|id| (*id, Account::default()))
        .collect();
    let mut total_spent = Money::ZERO;

    for record in records {
        let expense = &record.expense;
        total_spent += expense.amount;
        accounts.entry(expense.payer_id).or_default().paid += expense.amount;

        for share in &record.shares {
            let account = accounts.entry(share.user_id).or_default();
            account.owed += share.amount;
            if !share.is_paid && share.user_id != expense.payer_id {
                account.outstanding += share.amount;
            }
        }

        let unpaid_to_payer: Money = record
            .shares
            .iter()
            .filter(|s| !s.is_paid && s.user_id != expense.payer_id)
            .map(|s| s.amount)
            .sum();
        accounts.entry(expense.payer_id).or_default().owed_to_you += unpaid_to_payer;
    }

    let balances = accounts
        .into_iter()
        .map(|(user_id, account)| MemberBalance {
            user_id,
            paid: account.paid,
            owed: account.owed,
            balance: account.paid - account.owed,
            outstanding: account.outstanding,
            owed_to_you: account.owed_to_you,
        })
        .collect();

    ExpenseSummary {
        plan_id,
        total_spent,
        expense_count: records.len(),
        balances,
        currency: currency.to_string(),
    }
}
