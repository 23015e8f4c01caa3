use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Phases a room goes through during one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    /// Lobby: players can join, the host can start.
    Waiting,
    /// Start accepted; the round deck is being built or the first round is imminent.
    Starting,
    /// A round is open for guesses.
    Playing,
    /// The answer of the last round is being revealed.
    RoundEnd,
    /// Every round was played; final standings are shown.
    Finished,
}

/// Events that move a room between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// The host asked to start the game.
    StartRequested,
    /// Deck construction failed or the start was no longer valid once it completed.
    StartAborted,
    /// A new round target was drawn and the countdown began.
    RoundBegan,
    /// A player found the answer.
    GuessWon,
    /// The countdown reached zero without a winner.
    TimeExpired,
    /// The deck has no round left.
    DeckExhausted,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the room was in when the invalid event was received.
    pub from: RoomPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoomEvent,
}

/// Per-room state machine enforcing the strict phase ordering.
#[derive(Debug, Clone)]
pub struct RoomStateMachine {
    phase: RoomPhase,
}

impl Default for RoomStateMachine {
    fn default() -> Self {
        Self {
            phase: RoomPhase::Waiting,
        }
    }
}

impl RoomStateMachine {
    /// Create a state machine initialised in the waiting lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Apply `event`, returning the new phase, or leave the phase untouched when the
    /// transition is not allowed.
    pub fn apply(&mut self, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
        let next = compute_transition(self.phase, event)?;
        self.phase = next;
        Ok(next)
    }
}

/// Transition table: `phase × event → next phase`.
pub fn compute_transition(from: RoomPhase, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
    let next = match (from, event) {
        (RoomPhase::Waiting, RoomEvent::StartRequested) => RoomPhase::Starting,
        (RoomPhase::Starting, RoomEvent::StartAborted) => RoomPhase::Waiting,
        (RoomPhase::Starting | RoomPhase::RoundEnd, RoomEvent::RoundBegan) => RoomPhase::Playing,
        (RoomPhase::Playing, RoomEvent::GuessWon | RoomEvent::TimeExpired) => RoomPhase::RoundEnd,
        (RoomPhase::RoundEnd, RoomEvent::DeckExhausted) => RoomPhase::Finished,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}
