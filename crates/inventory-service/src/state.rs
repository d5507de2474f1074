//! Application state.

use std::sync::Arc;

use inventory_store::Store;

use crate::audit::AuditWriter;
use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Audit log writer over the same store.
    pub audit: AuditWriter,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let audit = AuditWriter::new(Arc::clone(&store));
        Self {
            store,
            config,
            audit,
        }
    }
}
