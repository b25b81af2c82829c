//! Process-local in-memory adapters.

mod audit;
mod repository;

pub use audit::InMemoryAuditSink;
pub use repository::InMemoryCrmRepository;
