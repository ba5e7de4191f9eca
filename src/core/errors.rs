use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::models::money::Money;

/// Coarse classification of a [`LedgerError`], for transport layers that
/// need to map errors onto a status code.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Internal,
}

#[derive(Error, Debug, Serialize)]
pub enum LedgerError {
    #[error("amount must be a positive decimal with at most two decimal places")]
    InvalidAmount,
    #[error("share amount for user {0} cannot be negative")]
    NegativeShareAmount(Uuid),
    #[error("currency must be a three-letter uppercase code, got `{0}`")]
    InvalidCurrency(String),
    #[error("expense currency {expense} does not match plan currency {plan}")]
    CurrencyMismatch { plan: String, expense: String },
    #[error("plan has no active members to split across")]
    EmptyMemberList,
    #[error("split type requires explicit share amounts")]
    MissingSplitShares,
    #[error("share amounts must equal total: shares sum to {shares}, expense amount is {amount}")]
    ShareSumMismatch { amount: Money, shares: Money },
    #[error("user {0} in shares is not an active plan member")]
    UnknownShareMember(Uuid),
    #[error("user {0} appears more than once in shares")]
    DuplicateShareMember(Uuid),
    #[error("active member {0} is missing from shares")]
    MemberNotCovered(Uuid),
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("plan {0} not found")]
    PlanNotFound(Uuid),
    #[error("expense {0} not found")]
    ExpenseNotFound(Uuid),
    #[error("no share for user {user_id} on expense {expense_id}")]
    ShareNotFound { expense_id: Uuid, user_id: Uuid },
    #[error("activity {0} not found in plan")]
    ActivityNotFound(Uuid),
    #[error("user {0} is not an active plan member")]
    NotPlanMember(Uuid),
    #[error("user {0} is not the expense payer")]
    NotExpensePayer(Uuid),
    #[error("user {0} is neither the expense payer nor the plan owner")]
    NotPayerOrOwner(Uuid),
    #[error("share for user {user_id} on expense {expense_id} is already paid")]
    ShareAlreadyPaid { expense_id: Uuid, user_id: Uuid },
    #[error("duplicate share row for user {0}")]
    DuplicateShareRow(Uuid),
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount
            | LedgerError::NegativeShareAmount(_)
            | LedgerError::InvalidCurrency(_)
            | LedgerError::CurrencyMismatch { .. }
            | LedgerError::EmptyMemberList
            | LedgerError::MissingSplitShares
            | LedgerError::ShareSumMismatch { .. }
            | LedgerError::UnknownShareMember(_)
            | LedgerError::DuplicateShareMember(_)
            | LedgerError::MemberNotCovered(_)
            | LedgerError::EmptyTitle => ErrorKind::Validation,
            LedgerError::PlanNotFound(_)
            | LedgerError::ExpenseNotFound(_)
            | LedgerError::ShareNotFound { .. }
            | LedgerError::ActivityNotFound(_) => ErrorKind::NotFound,
            LedgerError::NotPlanMember(_)
            | LedgerError::NotExpensePayer(_)
            | LedgerError::NotPayerOrOwner(_) => ErrorKind::Forbidden,
            LedgerError::ShareAlreadyPaid { .. } | LedgerError::DuplicateShareRow(_) => {
                ErrorKind::Conflict
            }
            LedgerError::Storage(_) => ErrorKind::Internal,
        }
    }
}
