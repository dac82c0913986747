use std::sync::Arc;

use veobot_db::DbPool;
use veobot_pipeline::{CallbackProcessor, Orchestrator};

use crate::config::ServerConfig;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub orchestrator: Arc<Orchestrator>,
    pub callbacks: Arc<CallbackProcessor>,
}
