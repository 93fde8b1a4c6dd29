//! Application state for the web layer.

use std::sync::Arc;

use crate::feed::FeedHandle;
use crate::planner::PlannerConfig;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Current feed snapshot
    pub feed: FeedHandle,

    /// Trip planner configuration
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(feed: FeedHandle, config: PlannerConfig) -> Self {
        Self {
            feed,
            config: Arc::new(config),
        }
    }
}
