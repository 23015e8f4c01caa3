/// Music catalog proxy operations.
pub mod catalog_service;
/// Session coordinator owning every room.
pub mod coordinator;
/// OpenAPI documentation generation.
pub mod documentation;
/// Guess normalisation and matching.
pub mod guess_arbiter;
/// Health check service.
pub mod health_service;
/// Per-room round countdown.
pub mod round_timer;
/// Delayed commands for the coordinator.
pub mod scheduler;
/// Outbound event delivery abstraction.
pub mod transport;
/// WebSocket connection and message handling service.
pub mod websocket_service;
