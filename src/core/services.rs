use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::core::errors::LedgerError;
use crate::core::models::{
    DebtItem, DebtToCreditor, Expense, ExpenseSummary, ExpenseWithShares, LedgerEvent, Money,
    Plan, Share, SplitType, Transfer,
};
use crate::core::split::ShareSpec;
use crate::core::{balance, settle, split};
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::storage::Storage;

/// Per-member decimal amount supplied by the caller for CUSTOM and BY_ITEM
/// splits.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ShareAmount {
    pub user_id: Uuid,
    pub amount: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub currency: Option<String>,
    pub split_type: SplitType,
    pub shares: Option<Vec<ShareAmount>>,
    pub activity_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateExpense {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub split_type: Option<SplitType>,
    pub shares: Option<Vec<ShareAmount>>,
    pub activity_id: Option<Uuid>,
}

/// The expense ledger and settlement engine. Stateless: everything is
/// recomputed from the injected storage handle on each call, and every
/// mutation either fully succeeds or fully fails.
pub struct LedgerService<S: Storage, N: Notifier + 'static> {
    storage: S,
    notifier: Arc<N>,
}

impl<S: Storage, N: Notifier + 'static> LedgerService<S, N> {
    pub fn new(storage: S, notifier: N) -> Self {
        LedgerService {
            storage,
            notifier: Arc::new(notifier),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Fire-and-forget event dispatch; the mutation that triggered it has
    /// already committed and does not wait for delivery.
    fn dispatch(&self, event: LedgerEvent) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.notify(event).await {
                warn!("notification dispatch failed: {err}");
            }
        });
    }

    pub async fn create_expense(
        &self,
        plan_id: Uuid,
        payer_id: Uuid,
        input: NewExpense,
    ) -> Result<ExpenseWithShares, LedgerError> {
        info!("creating expense in plan {plan_id} paid by {payer_id}");
        let plan = self
            .storage
            .get_plan(plan_id)
            .await?
            .ok_or(LedgerError::PlanNotFound(plan_id))?;
        if !plan.is_active_member(payer_id) {
            return Err(LedgerError::NotPlanMember(payer_id));
        }

        let title = validate_title(&input.title)?;
        let amount = parse_amount(input.amount)?;
        let currency = resolve_currency(&plan, input.currency)?;
        if let Some(activity_id) = input.activity_id {
            if !plan.has_activity(activity_id) {
                return Err(LedgerError::ActivityNotFound(activity_id));
            }
        }

        let now = Utc::now();
        let expense_id = Uuid::new_v4();
        let members = plan.active_member_ids();
        let specs = convert_specs(input.shares)?;
        let shares = split::compute_shares(
            expense_id,
            amount,
            input.split_type,
            &members,
            payer_id,
            specs.as_deref(),
            now,
        )?;

        let expense = Expense {
            id: expense_id,
            plan_id,
            payer_id,
            activity_id: input.activity_id,
            title,
            description: input.description,
            amount,
            currency,
            split_type: input.split_type,
            created_at: now,
            updated_at: now,
        };
        self.storage
            .create_expense(expense.clone(), shares.clone())
            .await?;
        debug!(
            "expense {} created with {} shares",
            expense.id,
            shares.len()
        );

        self.dispatch(LedgerEvent::ExpenseCreated {
            plan_id,
            expense_id,
            payer_id,
            amount,
        });
        Ok(ExpenseWithShares { expense, shares })
    }

    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        requester_id: Uuid,
        changes: UpdateExpense,
    ) -> Result<ExpenseWithShares, LedgerError> {
        info!("updating expense {expense_id} as user {requester_id}");
        let mut expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        if expense.payer_id != requester_id {
            warn!(
                "user {requester_id} attempted to edit expense {expense_id} without being the payer"
            );
            return Err(LedgerError::NotExpensePayer(requester_id));
        }
        let plan = self
            .storage
            .get_plan(expense.plan_id)
            .await?
            .ok_or(LedgerError::PlanNotFound(expense.plan_id))?;

        if let Some(ref title) = changes.title {
            expense.title = validate_title(title)?;
        }
        if let Some(description) = changes.description {
            expense.description = Some(description);
        }
        if let Some(activity_id) = changes.activity_id {
            if !plan.has_activity(activity_id) {
                return Err(LedgerError::ActivityNotFound(activity_id));
            }
            expense.activity_id = Some(activity_id);
        }

        // Any change to the amount, policy or explicit shares invalidates
        // the stored share set; it is rebuilt and swapped in whole.
        let resplit =
            changes.amount.is_some() || changes.split_type.is_some() || changes.shares.is_some();
        if let Some(amount) = changes.amount {
            expense.amount = parse_amount(amount)?;
        }
        if let Some(split_type) = changes.split_type {
            expense.split_type = split_type;
        }
        expense.updated_at = Utc::now();

        let shares = if resplit {
            let members = plan.active_member_ids();
            let specs = convert_specs(changes.shares)?;
            let new_shares = split::compute_shares(
                expense.id,
                expense.amount,
                expense.split_type,
                &members,
                expense.payer_id,
                specs.as_deref(),
                expense.updated_at,
            )?;
            self.storage
                .replace_expense(expense.clone(), new_shares.clone())
                .await?;
            debug!("expense {} shares replaced", expense.id);
            new_shares
        } else {
            self.storage.update_expense(expense.clone()).await?;
            self.storage.get_shares(expense.id).await?
        };

        self.dispatch(LedgerEvent::ExpenseUpdated {
            plan_id: expense.plan_id,
            expense_id: expense.id,
        });
        Ok(ExpenseWithShares { expense, shares })
    }

    pub async fn delete_expense(
        &self,
        expense_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), LedgerError> {
        info!("deleting expense {expense_id} as user {requester_id}");
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        let plan = self
            .storage
            .get_plan(expense.plan_id)
            .await?
            .ok_or(LedgerError::PlanNotFound(expense.plan_id))?;
        if requester_id != expense.payer_id && requester_id != plan.owner_id {
            return Err(LedgerError::NotPayerOrOwner(requester_id));
        }

        self.storage.delete_expense(expense_id).await?;
        self.dispatch(LedgerEvent::ExpenseDeleted {
            plan_id: expense.plan_id,
            expense_id,
        });
        Ok(())
    }

    /// Confirms that one member's share was paid back in the real world.
    /// Only the payer (the person owed the money) may confirm, and each
    /// share is settled individually; a racing second confirmation gets
    /// `ShareAlreadyPaid`, never a silent duplicate.
    pub async fn settle_share(
        &self,
        expense_id: Uuid,
        share_user_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Share, LedgerError> {
        info!("settling share of {share_user_id} on expense {expense_id}");
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        if requester_id != expense.payer_id {
            warn!(
                "user {requester_id} attempted to settle a share on expense {expense_id} without being the payer"
            );
            return Err(LedgerError::NotExpensePayer(requester_id));
        }

        let share = self
            .storage
            .mark_share_paid(expense_id, share_user_id, Utc::now())
            .await?;
        self.dispatch(LedgerEvent::ShareSettled {
            plan_id: expense.plan_id,
            expense_id,
            user_id: share_user_id,
            amount: share.amount,
        });
        Ok(share)
    }

    pub async fn plan_expense_summary(
        &self,
        plan_id: Uuid,
        requester_id: Uuid,
    ) -> Result<ExpenseSummary, LedgerError> {
        let plan = self
            .storage
            .get_plan(plan_id)
            .await?
            .ok_or(LedgerError::PlanNotFound(plan_id))?;
        if !plan.is_active_member(requester_id) {
            return Err(LedgerError::NotPlanMember(requester_id));
        }

        let records = self.storage.expenses_for_plan(plan_id).await?;
        Ok(balance::summarize(
            plan_id,
            &plan.currency,
            &records,
            &plan.active_member_ids(),
        ))
    }

    /// Unpaid shares where `user_id` owes others, grouped by creditor and
    /// ordered by descending total.
    pub async fn user_debts(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<DebtToCreditor>, LedgerError> {
        let plan = self
            .storage
            .get_plan(plan_id)
            .await?
            .ok_or(LedgerError::PlanNotFound(plan_id))?;
        if !plan.is_active_member(user_id) {
            return Err(LedgerError::NotPlanMember(user_id));
        }

        let records = self.storage.expenses_for_plan(plan_id).await?;
        let mut by_creditor: BTreeMap<Uuid, Vec<DebtItem>> = BTreeMap::new();
        for record in &records {
            let expense = &record.expense;
            if expense.payer_id == user_id {
                continue;
            }
            for share in &record.shares {
                if share.user_id == user_id && !share.is_paid && share.amount.is_positive() {
                    by_creditor
                        .entry(expense.payer_id)
                        .or_default()
                        .push(DebtItem {
                            expense_id: expense.id,
                            title: expense.title.clone(),
                            amount: share.amount,
                        });
                }
            }
        }

        let mut debts: Vec<DebtToCreditor> = by_creditor
            .into_iter()
            .map(|(creditor, expenses)| DebtToCreditor {
                creditor,
                total_owed: expenses.iter().map(|e| e.amount).sum(),
                expenses,
            })
            .collect();
        debts.sort_by(|a, b| {
            b.total_owed
                .cmp(&a.total_owed)
                .then(a.creditor.cmp(&b.creditor))
        });
        Ok(debts)
    }

    /// The minimal transfer list that settles the plan. Pure read: the
    /// planner consumes what is still unpaid (owed-to-you minus
    /// outstanding), so confirmed settlements drop out of the plan.
    pub async fn plan_settlements(&self, plan_id: Uuid) -> Result<Vec<Transfer>, LedgerError> {
        let plan = self
            .storage
            .get_plan(plan_id)
            .await?
            .ok_or(LedgerError::PlanNotFound(plan_id))?;
        let records = self.storage.expenses_for_plan(plan_id).await?;
        let summary = balance::summarize(
            plan_id,
            &plan.currency,
            &records,
            &plan.active_member_ids(),
        );
        let balances: Vec<(Uuid, Money)> = summary
            .balances
            .iter()
            .map(|b| (b.user_id, b.owed_to_you - b.outstanding))
            .collect();
        Ok(settle::plan_transfers(&balances))
    }
}

fn validate_title(title: &str) -> Result<String, LedgerError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn parse_amount(amount: f64) -> Result<Money, LedgerError> {
    Money::from_decimal(amount)
        .filter(|m| m.is_positive())
        .ok_or(LedgerError::InvalidAmount)
}

fn resolve_currency(plan: &Plan, currency: Option<String>) -> Result<String, LedgerError> {
    let currency = currency.unwrap_or_else(|| CONFIG.default_currency.clone());
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(LedgerError::InvalidCurrency(currency));
    }
    // One currency per plan; cross-currency netting is out of scope.
    if currency != plan.currency {
        return Err(LedgerError::CurrencyMismatch {
            plan: plan.currency.clone(),
            expense: currency,
        });
    }
    Ok(currency)
}

fn convert_specs(shares: Option<Vec<ShareAmount>>) -> Result<Option<Vec<ShareSpec>>, LedgerError> {
    shares
        .map(|entries| {
            entries
                .into_iter()
                .map(|entry| {
                    let amount =
                        Money::from_decimal(entry.amount).ok_or(LedgerError::InvalidAmount)?;
                    Ok(ShareSpec {
                        user_id: entry.user_id,
                        amount,
                    })
                })
                .collect()
        })
        .transpose()
}
