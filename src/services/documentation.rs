use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the album-cover trivia server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::catalog::search_albums,
        crate::routes::catalog::list_covers,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::catalog::AlbumSummary,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::PlayerSummary,
            crate::dto::ws::RoomSnapshot,
            crate::dto::ws::PlayersPayload,
            crate::dto::ws::ErrorPayload,
            crate::dto::ws::GameStartingPayload,
            crate::dto::ws::RoundStartPayload,
            crate::dto::ws::TimerTickPayload,
            crate::dto::ws::AnswerReveal,
            crate::dto::ws::RoundEndPayload,
            crate::dto::ws::PlayerLeftPayload,
            crate::dto::ws::NewHostPayload,
            crate::error::ErrorKind,
            crate::state::state_machine::RoomPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Music catalog proxy"),
        (name = "players", description = "WebSocket game protocol for players"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/healthcheck", "/ws", "/api/search", "/api/covers"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn player_identity_payloads_are_documented() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in [
            "PlayerSummary",
            "RoomSnapshot",
            "PlayerLeftPayload",
            "NewHostPayload",
        ] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
