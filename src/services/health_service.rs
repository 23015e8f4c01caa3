use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload and the number of connected players.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let connections = state.connections().len();
    debug!(connections, "health check");
    HealthResponse::ok(connections)
}
