use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::core::errors::LedgerError;
use crate::core::models::{Money, Share, SplitType};

/// Explicit per-member allocation supplied by the caller for CUSTOM and
/// BY_ITEM splits.
#[derive(Clone, Copy, Debug)]
pub struct ShareSpec {
    pub user_id: Uuid,
    pub amount: Money,
}

/// Allocates an expense amount across the plan's active members under the
/// given split policy. The payer's own row comes back already paid; every
/// other row starts unpaid. The returned rows always sum exactly to
/// `amount`.
pub fn compute_shares(
    expense_id: Uuid,
    amount: Money,
    split_type: SplitType,
    active_members: &[Uuid],
    payer_id: Uuid,
    explicit: Option<&[ShareSpec]>,
    now: DateTime<Utc>,
) -> Result<Vec<Share>, LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount);
    }
    if active_members.is_empty() {
        return Err(LedgerError::EmptyMemberList);
    }
    if !active_members.contains(&payer_id) {
        return Err(LedgerError::NotPlanMember(payer_id));
    }

    let allocations = match split_type {
        SplitType::Equal => equal_allocations(amount, active_members),
        SplitType::Custom | SplitType::ByItem => {
            let specs = explicit.ok_or(LedgerError::MissingSplitShares)?;
            explicit_allocations(amount, active_members, specs)?
        }
    };

    Ok(allocations
        .into_iter()
        .map(|(user_id, share_amount)| Share {
            expense_id,
            user_id,
            amount: share_amount,
            is_paid: user_id == payer_id,
            paid_at: (user_id == payer_id).then_some(now),
        })
        .collect())
}

/// Largest-remainder equal split: every member gets `amount / n` cents and
/// the first `amount % n` members in ascending user-id order absorb one
/// extra cent each, so the rows sum back to the expense amount exactly.
fn equal_allocations(amount: Money, members: &[Uuid]) -> Vec<(Uuid, Money)> {
    let mut ordered = members.to_vec();
    ordered.sort();

    let n = ordered.len() as i64;
    let base = amount.cents() / n;
    let remainder = amount.cents() % n;

    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, user_id)| {
            let extra = i64::from((idx as i64) < remainder);
            (user_id, Money::from_cents(base + extra))
        })
        .collect()
}

fn explicit_allocations(
    amount: Money,
    members: &[Uuid],
    specs: &[ShareSpec],
) -> Result<Vec<(Uuid, Money)>, LedgerError> {
    let mut seen = HashSet::new();
    for spec in specs {
        if spec.amount.is_negative() {
            return Err(LedgerError::NegativeShareAmount(spec.user_id));
        }
        if !members.contains(&spec.user_id) {
            return Err(LedgerError::UnknownShareMember(spec.user_id));
        }
        if !seen.insert(spec.user_id) {
            return Err(LedgerError::DuplicateShareMember(spec.user_id));
        }
    }
    for member in members {
        if !seen.contains(member) {
            return Err(LedgerError::MemberNotCovered(*member));
        }
    }

    let total: Money = specs.iter().map(|s| s.amount).sum();
    if total != amount {
        return Err(LedgerError::ShareSumMismatch {
            amount,
            shares: total,
        });
    }

    Ok(specs.iter().map(|s| (s.user_id, s.amount)).collect())
}
