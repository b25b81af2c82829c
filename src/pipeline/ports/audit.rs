//! Write-only audit sink port.

use crate::pipeline::domain::AuditEvent;
use async_trait::async_trait;

/// Fire-and-forget audit side-channel.
///
/// Recording has no failable return value: an audit failure must never
/// unwind the primary operation, so implementations absorb their own errors
/// (typically logging them) rather than handing them back to the caller.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    async fn record(&self, event: AuditEvent);
}
