use async_trait::async_trait;

use crate::core::errors::LedgerError;
use crate::core::models::LedgerEvent;

/// Outbound notification fan-out (push, real-time relay). The service
/// dispatches events on a spawned task and never blocks a mutation on
/// delivery; a failed delivery is logged, not surfaced.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: LedgerEvent) -> Result<(), LedgerError>;
}

pub mod in_memory;
