//! HTTP route handlers.

pub mod categories;
pub mod context;
pub mod health;
pub mod metrics;
pub mod products;
pub mod suppliers;

use std::str::FromStr;

use mediator::Mediator;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub mediator: Mediator,
}

fn parse_id<T>(id: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = uuid::Error>,
{
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
