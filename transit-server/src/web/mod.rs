//! Web layer for the trip planner.
//!
//! Provides JSON endpoints for stop search and trip planning.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
