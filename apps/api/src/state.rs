use crate::analysis::Analyzer;
use crate::config::Config;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Analysis pipelines over the model client built at startup.
    pub analyzer: Analyzer,
}
