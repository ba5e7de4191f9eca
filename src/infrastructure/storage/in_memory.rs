use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::errors::LedgerError;
use crate::core::models::{Expense, ExpenseWithShares, Money, Plan, Share};
use crate::infrastructure::storage::Storage;

/// In-memory persistence over `tokio::sync::RwLock` maps. Compound
/// operations hold the expense and share write guards together (always in
/// that order), which gives the transactional behavior the trait promises.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    plans: Arc<RwLock<HashMap<Uuid, Plan>>>,
    expenses: Arc<RwLock<HashMap<Uuid, Expense>>>,
    shares: Arc<RwLock<HashMap<Uuid, Vec<Share>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate_rows(expense: &Expense, shares: &[Share]) -> Result<(), LedgerError> {
    if !expense.amount.is_positive() {
        return Err(LedgerError::InvalidAmount);
    }

    let mut seen = HashSet::new();
    let mut total = Money::ZERO;
    for share in shares {
        if share.expense_id != expense.id {
            return Err(LedgerError::Storage(format!(
                "share for user {} is bound to expense {}, not {}",
                share.user_id, share.expense_id, expense.id
            )));
        }
        if share.amount.is_negative() {
            return Err(LedgerError::NegativeShareAmount(share.user_id));
        }
        if !seen.insert(share.user_id) {
            return Err(LedgerError::DuplicateShareRow(share.user_id));
        }
        total += share.amount;
    }

    if total != expense.amount {
        return Err(LedgerError::ShareSumMismatch {
            amount: expense.amount,
            shares: total,
        });
    }
    Ok(())
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_plan(&self, plan: Plan) -> Result<(), LedgerError> {
        let mut plans = self.plans.write().await;
        plans.insert(plan.id, plan);
        Ok(())
    }

    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, LedgerError> {
        let plans = self.plans.read().await;
        Ok(plans.get(&plan_id).cloned())
    }

    async fn is_active_member(&self, plan_id: Uuid, user_id: Uuid) -> Result<bool, LedgerError> {
        let plans = self.plans.read().await;
        Ok(plans
            .get(&plan_id)
            .map(|p| p.is_active_member(user_id))
            .unwrap_or(false))
    }

    async fn create_expense(
        &self,
        expense: Expense,
        shares: Vec<Share>,
    ) -> Result<(), LedgerError> {
        validate_rows(&expense, &shares)?;
        let mut expenses = self.expenses.write().await;
        let mut share_map = self.shares.write().await;
        if expenses.contains_key(&expense.id) {
            return Err(LedgerError::Storage(format!(
                "expense {} already exists",
                expense.id
            )));
        }
        share_map.insert(expense.id, shares);
        expenses.insert(expense.id, expense);
        Ok(())
    }

    async fn update_expense(&self, expense: Expense) -> Result<(), LedgerError> {
        let mut expenses = self.expenses.write().await;
        let share_map = self.shares.read().await;
        if !expenses.contains_key(&expense.id) {
            return Err(LedgerError::ExpenseNotFound(expense.id));
        }
        let existing = share_map.get(&expense.id).map(Vec::as_slice).unwrap_or(&[]);
        validate_rows(&expense, existing)?;
        expenses.insert(expense.id, expense);
        Ok(())
    }

    async fn replace_expense(
        &self,
        expense: Expense,
        new_shares: Vec<Share>,
    ) -> Result<(), LedgerError> {
        validate_rows(&expense, &new_shares)?;
        let mut expenses = self.expenses.write().await;
        let mut share_map = self.shares.write().await;
        if !expenses.contains_key(&expense.id) {
            return Err(LedgerError::ExpenseNotFound(expense.id));
        }
        share_map.insert(expense.id, new_shares);
        expenses.insert(expense.id, expense);
        Ok(())
    }

    async fn delete_expense(&self, expense_id: Uuid) -> Result<(), LedgerError> {
        let mut expenses = self.expenses.write().await;
        let mut share_map = self.shares.write().await;
        if !expenses.contains_key(&expense_id) {
            return Err(LedgerError::ExpenseNotFound(expense_id));
        }
        share_map.remove(&expense_id);
        expenses.remove(&expense_id);
        Ok(())
    }

    async fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>, LedgerError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(&expense_id).cloned())
    }

    async fn get_shares(&self, expense_id: Uuid) -> Result<Vec<Share>, LedgerError> {
        let share_map = self.shares.read().await;
        Ok(share_map.get(&expense_id).cloned().unwrap_or_default())
    }

    async fn mark_share_paid(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Share, LedgerError> {
        let mut share_map = self.shares.write().await;
        let rows = share_map
            .get_mut(&expense_id)
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        let share = rows
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .ok_or(LedgerError::ShareNotFound {
                expense_id,
                user_id,
            })?;
        if share.is_paid {
            return Err(LedgerError::ShareAlreadyPaid {
                expense_id,
                user_id,
            });
        }
        share.is_paid = true;
        share.paid_at = Some(at);
        Ok(share.clone())
    }

    async fn expenses_for_plan(
        &self,
        plan_id: Uuid,
    ) -> Result<Vec<ExpenseWithShares>, LedgerError> {
        let expenses = self.expenses.read().await;
        let share_map = self.shares.read().await;
        let mut records: Vec<ExpenseWithShares> = expenses
            .values()
            .filter(|e| e.plan_id == plan_id)
            .map(|e| ExpenseWithShares {
                expense: e.clone(),
                shares: share_map.get(&e.id).cloned().unwrap_or_default(),
            })
            .collect();
        records.sort_by(|a, b| {
            a.expense
                .created_at
                .cmp(&b.expense.created_at)
                .then(a.expense.id.cmp(&b.expense.id))
        });
        Ok(records)
    }
}
