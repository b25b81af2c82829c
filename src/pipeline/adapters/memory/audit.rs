//! In-memory audit sink for service tests.

use crate::pipeline::domain::{AuditAction, AuditEvent};
use crate::pipeline::ports::AuditSink;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Thread-safe in-memory audit sink recording events in arrival order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEvent>> {
        // A poisoned lock only means another thread panicked mid-push; the
        // recorded prefix is still coherent.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Returns the recorded actions in arrival order.
    #[must_use]
    pub fn actions(&self) -> Vec<AuditAction> {
        self.lock().iter().map(|event| event.action).collect()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.lock().push(event);
    }
}
