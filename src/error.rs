use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::catalog::CatalogError;

/// Errors reported to the player that triggered a game operation.
///
/// None of them are fatal: they are sent back as an `error` event to the caller only and
/// never broadcast to the rest of the room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No live room uses this code.
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    /// The room already left the waiting lobby.
    #[error("game already started")]
    GameAlreadyStarted,
    /// Only the host may start the game.
    #[error("only the host can start the game")]
    NotHost,
    /// Too few players are present to start.
    #[error("at least {required} players are required to start the game")]
    InsufficientPlayers {
        /// Minimum number of players.
        required: usize,
    },
    /// The catalog returned no album usable as a round.
    #[error("no album covers available to build the rounds")]
    NoContentAvailable,
    /// The music catalog could not be reached.
    #[error("music catalog unavailable")]
    UpstreamUnavailable,
}

/// Machine-readable classification of a [`GameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`GameError::RoomNotFound`].
    RoomNotFound,
    /// See [`GameError::GameAlreadyStarted`].
    GameAlreadyStarted,
    /// See [`GameError::NotHost`].
    NotHost,
    /// See [`GameError::InsufficientPlayers`].
    InsufficientPlayers,
    /// See [`GameError::NoContentAvailable`].
    NoContentAvailable,
    /// See [`GameError::UpstreamUnavailable`].
    UpstreamUnavailable,
}

impl GameError {
    /// Classification sent alongside the human-readable message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::RoomNotFound(_) => ErrorKind::RoomNotFound,
            GameError::GameAlreadyStarted => ErrorKind::GameAlreadyStarted,
            GameError::NotHost => ErrorKind::NotHost,
            GameError::InsufficientPlayers { .. } => ErrorKind::InsufficientPlayers,
            GameError::NoContentAvailable => ErrorKind::NoContentAvailable,
            GameError::UpstreamUnavailable => ErrorKind::UpstreamUnavailable,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Upstream service unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::RoomNotFound(_) | GameError::NoContentAvailable => {
                AppError::NotFound(err.to_string())
            }
            GameError::GameAlreadyStarted
            | GameError::NotHost
            | GameError::InsufficientPlayers { .. } => AppError::BadRequest(err.to_string()),
            GameError::UpstreamUnavailable => AppError::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::ServiceUnavailable(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_snake_case() {
        let kind = GameError::InsufficientPlayers { required: 2 }.kind();
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            "\"insufficient_players\""
        );
    }

    #[test]
    fn upstream_failures_map_to_service_unavailable() {
        let response = AppError::from(GameError::UpstreamUnavailable).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = AppError::from(GameError::NoContentAvailable).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn lobby_rule_violations_map_to_bad_request() {
        for err in [
            GameError::GameAlreadyStarted,
            GameError::NotHost,
            GameError::InsufficientPlayers { required: 2 },
        ] {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
