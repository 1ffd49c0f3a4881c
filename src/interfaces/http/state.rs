use super::auth::SessionTable;
use crate::application::service::LedgerService;
use std::sync::Arc;

/// Shared state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
    pub sessions: SessionTable,
}

impl AppState {
    pub fn new(service: LedgerService) -> Self {
        Self {
            service: Arc::new(service),
            sessions: SessionTable::new(),
        }
    }
}
