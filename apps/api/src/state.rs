use crate::config::Config;
use crate::session::coach::Coach;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single in-memory coaching session and its model connection.
    pub coach: Coach,
    pub config: Config,
}
