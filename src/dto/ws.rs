use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    dto::validation::{validate_display_name, validate_guess, validate_room_code},
    error::{ErrorKind, GameError},
    state::{
        deck::RoundTarget,
        room::Player,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Messages accepted from player WebSocket clients.
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Open a new room and host it.
    #[serde(rename = "create_room")]
    CreateRoom {
        #[serde(default)]
        name: Option<String>,
    },
    /// Join an existing room by code.
    #[serde(rename = "join_room")]
    JoinRoom {
        code: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// Host-only: start the game.
    #[serde(rename = "start_game")]
    StartGame { code: String },
    /// Try to name the current cover.
    #[serde(rename = "submit_guess")]
    SubmitGuess { code: String, guess: String },
    #[serde(other)]
    Unknown,
}

/// Failure to turn a text frame into a [`ClientMessage`].
#[derive(Debug, Error)]
pub enum InboundError {
    /// The frame is not a JSON message of a known shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The message carries invalid fields.
    #[error("invalid message: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl ClientMessage {
    /// Parse and validate a text frame. Display names come back trimmed, with blank names
    /// turned into `None`.
    pub fn from_json_str(text: &str) -> Result<Self, InboundError> {
        let message: Self = serde_json::from_str(text)?;
        message.validate()?;
        Ok(message.normalized())
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let (code, name, guess) = match self {
            Self::CreateRoom { name } => (None, name.as_deref(), None),
            Self::JoinRoom { code, name } => (Some(code.as_str()), name.as_deref(), None),
            Self::StartGame { code } => (Some(code.as_str()), None, None),
            Self::SubmitGuess { code, guess } => (Some(code.as_str()), None, Some(guess.as_str())),
            Self::Unknown => (None, None, None),
        };

        if let Some(Err(e)) = code.map(validate_room_code) {
            errors.add("code", e);
        }
        if let Some(Err(e)) = name.map(validate_display_name) {
            errors.add("name", e);
        }
        if let Some(Err(e)) = guess.map(validate_guess) {
            errors.add("guess", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn normalized(self) -> Self {
        match self {
            Self::CreateRoom { name } => Self::CreateRoom {
                name: clean_name(name),
            },
            Self::JoinRoom { code, name } => Self::JoinRoom {
                code,
                name: clean_name(name),
            },
            other => other,
        }
    }
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Public projection of a player.
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            score: player.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Room membership confirmation sent to the creator or a joining player.
pub struct RoomSnapshot {
    pub code: String,
    pub host_id: Uuid,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Current player list of a room.
pub struct PlayersPayload {
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Error reported to the player that triggered it.
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&GameError> for ErrorPayload {
    fn from(err: &GameError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Broadcast once the deck is ready, shortly before the first round.
pub struct GameStartingPayload {
    pub total_rounds: usize,
    pub starts_in_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Broadcast when a round opens.
pub struct RoundStartPayload {
    pub round: usize,
    pub total_rounds: usize,
    pub image: String,
    pub time_left: u32,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Broadcast every second while a round is open.
pub struct TimerTickPayload {
    pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Answer revealed at the end of a round.
pub struct AnswerReveal {
    pub title: String,
    pub artist: String,
    pub image: String,
}

impl From<&RoundTarget> for AnswerReveal {
    fn from(target: &RoundTarget) -> Self {
        Self {
            title: target.title.clone(),
            artist: target.artist.clone(),
            image: target.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Broadcast when a round is won or runs out of time (`winner` is `null`).
pub struct RoundEndPayload {
    pub winner: Option<PlayerSummary>,
    pub answer: AnswerReveal,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Broadcast when a player leaves a room that stays alive.
pub struct PlayerLeftPayload {
    pub player_id: Uuid,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Broadcast when hosting passes to another player.
pub struct NewHostPayload {
    pub host_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Events pushed to player WebSocket clients, serialised as `{"event": .., "data": ..}`.
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated(RoomSnapshot),
    PlayerJoined(PlayersPayload),
    JoinedSuccess(RoomSnapshot),
    Error(ErrorPayload),
    GameStarting(GameStartingPayload),
    RoundStart(RoundStartPayload),
    TimerTick(TimerTickPayload),
    RoundEnd(RoundEndPayload),
    GameOver(PlayersPayload),
    PlayerLeft(PlayerLeftPayload),
    NewHost(NewHostPayload),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_room_and_trims_name() {
        let message =
            ClientMessage::from_json_str(r#"{"type":"join_room","code":"ab12","name":"  Bob "}"#)
                .unwrap();
        assert_eq!(
            message,
            ClientMessage::JoinRoom {
                code: "ab12".into(),
                name: Some("Bob".into()),
            }
        );
    }

    #[test]
    fn blank_name_means_default() {
        let message = ClientMessage::from_json_str(r#"{"type":"create_room","name":"   "}"#).unwrap();
        assert_eq!(message, ClientMessage::CreateRoom { name: None });

        let message = ClientMessage::from_json_str(r#"{"type":"create_room"}"#).unwrap();
        assert_eq!(message, ClientMessage::CreateRoom { name: None });
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let message = ClientMessage::from_json_str(r#"{"type":"dance","moves":3}"#).unwrap();
        assert_eq!(message, ClientMessage::Unknown);
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(
            ClientMessage::from_json_str("not json"),
            Err(InboundError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"type":"submit_guess","code":"AB12"}"#),
            Err(InboundError::Malformed(_))
        ));
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let long_name = "x".repeat(64);
        let frame = format!(r#"{{"type":"create_room","name":"{long_name}"}}"#);
        assert!(matches!(
            ClientMessage::from_json_str(&frame),
            Err(InboundError::Invalid(_))
        ));

        assert!(matches!(
            ClientMessage::from_json_str(r#"{"type":"start_game","code":"AB 12"}"#),
            Err(InboundError::Invalid(_))
        ));
    }

    #[test]
    fn server_messages_are_tagged_by_event() {
        let message = ServerMessage::TimerTick(TimerTickPayload { seconds: 7 });
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({ "event": "timer_tick", "data": { "seconds": 7 } })
        );
    }

    #[test]
    fn round_end_without_winner_serialises_null() {
        let message = ServerMessage::RoundEnd(RoundEndPayload {
            winner: None,
            answer: AnswerReveal {
                title: "Discovery".into(),
                artist: "Daft Punk".into(),
                image: "cover.jpg".into(),
            },
            players: vec![PlayerSummary {
                id: Uuid::nil(),
                name: "Alice".into(),
                score: 0,
            }],
        });

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["event"], "round_end");
        assert!(value["data"]["winner"].is_null());
        assert_eq!(value["data"]["answer"]["title"], "Discovery");
    }
}
