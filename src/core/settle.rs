use uuid::Uuid;

use crate::core::models::{Money, Transfer};

/// Greedy minimal-transaction debt simplification. Members are sorted by
/// balance ascending (ties broken by user id so the plan is deterministic);
/// a debtor pointer walks up while a creditor pointer walks down, each step
/// transferring `min(-debt, credit)` and zeroing at least one side, so at
/// most n-1 transfers come out. An empty result means the plan is settled.
pub fn plan_transfers(balances: &[(Uuid, Money)]) -> Vec<Transfer> {
    let mut ordered: Vec<(Uuid, i64)> = balances
        .iter()
        .map(|(user_id, balance)| (*user_id, balance.cents()))
        .collect();
    ordered.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    if ordered.is_empty() {
        return transfers;
    }

    let mut i = 0;
    let mut j = ordered.len() - 1;
    while i < j {
        let debt = ordered[i].1;
        let credit = ordered[j].1;
        if debt >= 0 || credit <= 0 {
            break;
        }

        let amount = (-debt).min(credit);
        if amount > 0 {
            transfers.push(Transfer {
                from: ordered[i].0,
                to: ordered[j].0,
                amount: Money::from_cents(amount),
            });
        }

        ordered[i].1 += amount;
        ordered[j].1 -= amount;
        if ordered[i].1 == 0 {
            i += 1;
        }
        if ordered[j].1 == 0 {
            j -= 1;
        }
    }

    transfers
}
