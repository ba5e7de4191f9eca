use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::errors::LedgerError;
use crate::core::models::LedgerEvent;
use crate::infrastructure::notify::Notifier;

/// Records every event it is handed. Used by the tests and the demo
/// binary in place of a real push gateway.
#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    events: Arc<RwLock<Vec<LedgerEvent>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, event: LedgerEvent) -> Result<(), LedgerError> {
        let mut events = self.events.write().await;
        events.push(event);
        Ok(())
    }
}
