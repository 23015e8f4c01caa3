//! Session coordinator: the single writer of every room.
//!
//! Client messages, disconnects, catalog results, delayed round starts and countdown
//! callbacks all arrive as [`Command`]s on one channel and are handled one at a time, to
//! completion. Handlers mutate the room first and only then flush the broadcasts they
//! queued, so state and emitted events never disagree.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    catalog::Catalog,
    config::AppConfig,
    dto::ws::{
        AnswerReveal, ClientMessage, ErrorPayload, GameStartingPayload, NewHostPayload,
        PlayerLeftPayload, PlayerSummary, PlayersPayload, RoomSnapshot, RoundEndPayload,
        RoundStartPayload, ServerMessage, TimerTickPayload,
    },
    error::GameError,
    services::{
        guess_arbiter::{self, Ruling},
        round_timer::TimerId,
        scheduler::Scheduler,
        transport::{Outbox, Transport},
    },
    state::{
        deck::RoundDeck,
        registry::{RoomRegistry, normalize_code},
        room::{ClientId, DEFAULT_HOST_NAME, Player, Room, RoomId},
        state_machine::{RoomEvent, RoomPhase},
    },
};

/// Inputs of the coordinator stream.
#[derive(Debug, Clone)]
pub enum Command {
    /// A parsed message from a connected client.
    Client {
        /// Sender identity.
        client: ClientId,
        /// Message payload.
        message: ClientMessage,
    },
    /// The client's connection closed.
    Disconnect {
        /// Identity of the closed connection.
        client: ClientId,
    },
    /// Deck construction requested by a start finished.
    DeckReady {
        /// Room being started.
        code: String,
        /// Instance of the room being started.
        room: RoomId,
        /// Player that asked for the start.
        requester: ClientId,
        /// Start attempt the deck belongs to.
        attempt: u64,
        /// Built deck or the reason it could not be built.
        result: Result<RoundDeck, GameError>,
    },
    /// Delayed request to open the next round (or finish the game).
    BeginRound {
        /// Target room.
        code: String,
        /// Instance the request was scheduled for.
        room: RoomId,
        /// Round generation the request was scheduled for.
        generation: u64,
    },
    /// One second elapsed in a round countdown.
    TimerTick {
        /// Target room.
        code: String,
        /// Instance that started the countdown.
        room: RoomId,
        /// Countdown that produced the tick.
        timer: TimerId,
        /// Seconds left.
        remaining: u32,
    },
    /// A round countdown reached zero.
    TimerExpired {
        /// Target room.
        code: String,
        /// Instance that started the countdown.
        room: RoomId,
        /// Countdown that expired.
        timer: TimerId,
    },
}

/// Orchestrates rooms, rounds and guesses.
pub struct SessionCoordinator {
    registry: RoomRegistry,
    memberships: HashMap<ClientId, String>,
    config: Arc<AppConfig>,
    catalog: Arc<dyn Catalog>,
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionCoordinator {
    /// Build a coordinator. `commands` must feed the channel the coordinator is run on:
    /// countdowns and deck construction report back through it.
    pub fn new(
        config: Arc<AppConfig>,
        catalog: Arc<dyn Catalog>,
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
        commands: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            registry: RoomRegistry::new(),
            memberships: HashMap::new(),
            config,
            catalog,
            transport,
            scheduler,
            commands,
        }
    }

    /// Process commands until every sender is gone.
    pub async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Command>) {
        info!("session coordinator started");
        while let Some(command) = receiver.recv().await {
            self.handle(command);
        }
        info!("session coordinator stopped");
    }

    /// Live rooms.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Code of the room `client` belongs to.
    pub fn room_of(&self, client: ClientId) -> Option<&str> {
        self.memberships.get(&client).map(String::as_str)
    }

    /// Handle one command to completion, then flush its broadcasts.
    pub fn handle(&mut self, command: Command) {
        let mut outbox = Outbox::new();

        match command {
            Command::Client { client, message } => {
                let result = match message {
                    ClientMessage::CreateRoom { name } => {
                        self.create_room(client, name, &mut outbox);
                        Ok(())
                    }
                    ClientMessage::JoinRoom { code, name } => {
                        self.join_room(client, &normalize_code(&code), name, &mut outbox)
                    }
                    ClientMessage::StartGame { code } => {
                        self.start_game(client, &normalize_code(&code))
                    }
                    ClientMessage::SubmitGuess { code, guess } => {
                        self.submit_guess(client, &normalize_code(&code), &guess, &mut outbox)
                    }
                    ClientMessage::Unknown => {
                        debug!(%client, "ignoring unknown client message");
                        Ok(())
                    }
                };

                if let Err(err) = result {
                    info!(%client, error = %err, "rejected client request");
                    outbox.to_client(client, ServerMessage::Error(ErrorPayload::from(&err)));
                }
            }
            Command::Disconnect { client } => self.disconnect(client, &mut outbox),
            Command::DeckReady {
                code,
                room,
                requester,
                attempt,
                result,
            } => self.deck_ready(&code, room, requester, attempt, result, &mut outbox),
            Command::BeginRound {
                code,
                room,
                generation,
            } => self.begin_round(&code, room, generation, &mut outbox),
            Command::TimerTick {
                code,
                room,
                timer,
                remaining,
            } => self.timer_tick(&code, room, timer, remaining, &mut outbox),
            Command::TimerExpired { code, room, timer } => {
                self.timer_expired(&code, room, timer, &mut outbox)
            }
        }

        outbox.flush(self.transport.as_ref());
    }

    fn create_room(&mut self, client: ClientId, name: Option<String>, outbox: &mut Outbox) {
        self.leave_current_room(client, outbox);

        let host = Player::new(client, name.unwrap_or_else(|| DEFAULT_HOST_NAME.to_string()));
        let room = self.registry.create_room(host);
        let code = room.code().to_string();
        outbox.to_client(client, ServerMessage::RoomCreated(room_snapshot(room)));

        info!(%code, %client, "room created");
        self.memberships.insert(client, code);
    }

    fn join_room(
        &mut self,
        client: ClientId,
        code: &str,
        name: Option<String>,
        outbox: &mut Outbox,
    ) -> Result<(), GameError> {
        let room = self.registry.lookup(code)?;
        if room.contains(client) {
            outbox.to_client(client, ServerMessage::JoinedSuccess(room_snapshot(room)));
            return Ok(());
        }
        if room.phase() != RoomPhase::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }

        self.leave_current_room(client, outbox);

        let room = self.registry.lookup_mut(code)?;
        let player = room.add_player(client, name);
        info!(%code, %client, name = %player.name, "player joined");

        outbox.to_room(
            room,
            ServerMessage::PlayerJoined(PlayersPayload {
                players: player_summaries(room),
            }),
        );
        outbox.to_client(client, ServerMessage::JoinedSuccess(room_snapshot(room)));

        self.memberships.insert(client, code.to_string());
        Ok(())
    }

    fn start_game(&mut self, client: ClientId, code: &str) -> Result<(), GameError> {
        let min_players = self.config.min_players;
        let room = self.registry.lookup_mut(code)?;

        if !room.is_host(client) {
            return Err(GameError::NotHost);
        }
        if room.phase() != RoomPhase::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if room.player_count() < min_players {
            return Err(GameError::InsufficientPlayers {
                required: min_players,
            });
        }

        let attempt = room
            .begin_start()
            .map_err(|_| GameError::GameAlreadyStarted)?;
        let room_id = room.id();
        info!(%code, attempt, "building round deck");

        let catalog = self.catalog.clone();
        let settings = self.config.deck_settings();
        let commands = self.commands.clone();
        let code = code.to_string();
        tokio::spawn(async move {
            let result = RoundDeck::build(catalog.as_ref(), &settings).await;
            let command = Command::DeckReady {
                code,
                room: room_id,
                requester: client,
                attempt,
                result,
            };
            if commands.send(command).is_err() {
                debug!("coordinator stopped before deck was ready");
            }
        });

        Ok(())
    }

    fn deck_ready(
        &mut self,
        code: &str,
        room_id: RoomId,
        requester: ClientId,
        attempt: u64,
        result: Result<RoundDeck, GameError>,
        outbox: &mut Outbox,
    ) {
        let min_players = self.config.min_players;
        let starting_delay = self.config.starting_delay();

        let Some(room) = self.registry.instance_mut(code, room_id) else {
            debug!(%code, room_id, "room closed while its deck was being built");
            return;
        };
        if room.phase() != RoomPhase::Starting || room.start_attempt() != attempt {
            debug!(%code, attempt, "discarding deck of a stale start attempt");
            return;
        }

        // Everything may have changed while the catalog was queried.
        let outcome = result.and_then(|deck| {
            if !room.is_host(requester) {
                Err(GameError::NotHost)
            } else if room.player_count() < min_players {
                Err(GameError::InsufficientPlayers {
                    required: min_players,
                })
            } else {
                Ok(deck)
            }
        });

        let deck = match outcome {
            Ok(deck) => deck,
            Err(err) => {
                if let Err(invalid) = room.abort_start() {
                    warn!(%code, error = %invalid, "failed to abort start");
                }
                warn!(%code, %requester, error = %err, "game start aborted");
                if !room.is_host(requester) {
                    info!(%code, host_id = %room.host(), "lobby reopened for the new host");
                }
                outbox.to_client(requester, ServerMessage::Error(ErrorPayload::from(&err)));
                return;
            }
        };

        room.install_deck(deck);
        let generation = room.next_round_generation();
        info!(%code, rounds = room.total_rounds(), "game starting");

        outbox.to_room(
            room,
            ServerMessage::GameStarting(GameStartingPayload {
                total_rounds: room.total_rounds(),
                starts_in_ms: self.config.starting_delay_ms,
            }),
        );
        self.scheduler.schedule(
            starting_delay,
            Command::BeginRound {
                code: code.to_string(),
                room: room_id,
                generation,
            },
        );
    }

    fn begin_round(&mut self, code: &str, room_id: RoomId, generation: u64, outbox: &mut Outbox) {
        let round_duration = self.config.round_duration_secs;
        let commands = self.commands.clone();

        let Some(room) = self.registry.instance_mut(code, room_id) else {
            debug!(%code, room_id, "round scheduled for a closed room");
            return;
        };
        if room.round_generation() != generation {
            debug!(%code, generation, "ignoring stale round start");
            return;
        }
        if !matches!(room.phase(), RoomPhase::Starting | RoomPhase::RoundEnd) {
            warn!(%code, phase = ?room.phase(), "round start outside of a round transition");
            return;
        }

        room.timer_mut().cancel();

        if room.draw_round().is_none() {
            match room.apply(RoomEvent::DeckExhausted) {
                Ok(_) => {
                    room.clear_round();
                    info!(%code, "game over");
                    outbox.to_room(
                        room,
                        ServerMessage::GameOver(PlayersPayload {
                            players: player_summaries(room),
                        }),
                    );
                }
                Err(err) => {
                    warn!(%code, error = %err, "empty deck before the first round");
                    if let Err(err) = room.abort_start() {
                        warn!(%code, error = %err, "failed to abort start");
                    }
                }
            }
            return;
        }

        if let Err(err) = room.apply(RoomEvent::RoundBegan) {
            warn!(%code, error = %err, "cannot open round");
            return;
        }
        room.set_time_left(round_duration);

        let tick_code = code.to_string();
        let tick_commands = commands.clone();
        let expire_code = code.to_string();
        let started = room.timer_mut().start(
            round_duration,
            move |timer, remaining| {
                let _ = tick_commands.send(Command::TimerTick {
                    code: tick_code.clone(),
                    room: room_id,
                    timer,
                    remaining,
                });
            },
            move |timer| {
                let _ = commands.send(Command::TimerExpired {
                    code: expire_code,
                    room: room_id,
                    timer,
                });
            },
        );
        if let Err(err) = started {
            warn!(%code, error = %err, "round timer still running");
        }

        let Some(target) = room.current_target() else {
            return;
        };
        info!(%code, round = room.round_number(), album_id = target.album_id, "round started");
        outbox.to_room(
            room,
            ServerMessage::RoundStart(RoundStartPayload {
                round: room.round_number(),
                total_rounds: room.total_rounds(),
                image: target.image.clone(),
                time_left: room.time_left(),
                players: player_summaries(room),
            }),
        );
    }

    fn timer_tick(
        &mut self,
        code: &str,
        room_id: RoomId,
        timer: TimerId,
        remaining: u32,
        outbox: &mut Outbox,
    ) {
        let Some(room) = self.registry.instance_mut(code, room_id) else {
            return;
        };
        if !room.timer().is_running(timer) {
            return;
        }

        room.set_time_left(remaining);
        outbox.to_room(
            room,
            ServerMessage::TimerTick(TimerTickPayload { seconds: remaining }),
        );
    }

    fn timer_expired(&mut self, code: &str, room_id: RoomId, timer: TimerId, outbox: &mut Outbox) {
        let Some(room) = self.registry.instance_mut(code, room_id) else {
            return;
        };
        if !room.timer_mut().mark_expired(timer) {
            debug!(%code, timer, "ignoring stale expiry");
            return;
        }

        if let Err(err) = room.apply(RoomEvent::TimeExpired) {
            warn!(%code, error = %err, "expiry outside of a round");
            return;
        }
        room.set_time_left(0);
        info!(%code, round = room.round_number(), "round expired without winner");

        self.finish_round(code, None, outbox);
    }

    fn submit_guess(
        &mut self,
        client: ClientId,
        code: &str,
        guess: &str,
        outbox: &mut Outbox,
    ) -> Result<(), GameError> {
        let room = self.registry.lookup_mut(code)?;
        if !room.contains(client) {
            warn!(%code, %client, "guess from a player outside the room");
            return Ok(());
        }

        let title = room
            .current_target()
            .map(|target| target.title.as_str())
            .unwrap_or_default();
        match guess_arbiter::judge(room.phase(), guess, title) {
            Ruling::Late => {
                debug!(%code, %client, "ignoring guess outside of a running round");
                return Ok(());
            }
            Ruling::Miss => return Ok(()),
            Ruling::Win => {}
        }

        room.timer_mut().cancel();
        room.award_point(client);
        if let Err(err) = room.apply(RoomEvent::GuessWon) {
            warn!(%code, error = %err, "winning guess outside of a round");
            return Ok(());
        }
        info!(%code, %client, round = room.round_number(), "round won");

        self.finish_round(code, Some(client), outbox);
        Ok(())
    }

    /// Broadcast the answer and schedule what comes next.
    fn finish_round(&mut self, code: &str, winner: Option<ClientId>, outbox: &mut Outbox) {
        let delay = self.config.round_end_delay();
        let Ok(room) = self.registry.lookup_mut(code) else {
            return;
        };

        let answer = room
            .current_target()
            .map(AnswerReveal::from)
            .unwrap_or_else(|| AnswerReveal {
                title: String::new(),
                artist: String::new(),
                image: String::new(),
            });
        let winner = winner
            .and_then(|id| room.player(id))
            .map(PlayerSummary::from);
        let generation = room.next_round_generation();
        let room_id = room.id();

        outbox.to_room(
            room,
            ServerMessage::RoundEnd(RoundEndPayload {
                winner,
                answer,
                players: player_summaries(room),
            }),
        );
        self.scheduler.schedule(
            delay,
            Command::BeginRound {
                code: code.to_string(),
                room: room_id,
                generation,
            },
        );
    }

    fn disconnect(&mut self, client: ClientId, outbox: &mut Outbox) {
        info!(%client, "client disconnected");
        self.leave_current_room(client, outbox);
    }

    /// Remove `client` from the room it belongs to, destroying the room when it empties.
    fn leave_current_room(&mut self, client: ClientId, outbox: &mut Outbox) {
        let Some(code) = self.memberships.remove(&client) else {
            return;
        };
        let Ok(room) = self.registry.lookup_mut(&code) else {
            return;
        };
        let Some(departure) = room.remove_player(client) else {
            return;
        };
        info!(%code, %client, name = %departure.player.name, "player left");

        if room.is_empty() {
            room.timer_mut().cancel();
            self.registry.remove(&code);
            info!(%code, "room destroyed");
            return;
        }

        outbox.to_room(
            room,
            ServerMessage::PlayerLeft(PlayerLeftPayload {
                player_id: client,
                players: player_summaries(room),
            }),
        );
        if let Some(host_id) = departure.new_host {
            info!(%code, %host_id, "host reassigned");
            outbox.to_room(room, ServerMessage::NewHost(NewHostPayload { host_id }));
        }
    }
}

fn player_summaries(room: &Room) -> Vec<PlayerSummary> {
    room.players().map(PlayerSummary::from).collect()
}

fn room_snapshot(room: &Room) -> RoomSnapshot {
    RoomSnapshot {
        code: room.code().to_string(),
        host_id: room.host(),
        players: player_summaries(room),
    }
}
