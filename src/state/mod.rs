pub mod connections;
pub mod deck;
pub mod registry;
pub mod room;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    catalog::Catalog,
    config::AppConfig,
    services::{
        coordinator::{Command, SessionCoordinator},
        scheduler::TokioScheduler,
    },
};

use self::connections::ConnectionRegistry;

pub type SharedState = Arc<AppState>;

/// Central application state: configuration, catalog client, open sockets and the handle
/// to the session coordinator task.
pub struct AppState {
    config: Arc<AppConfig>,
    catalog: Arc<dyn Catalog>,
    connections: Arc<ConnectionRegistry>,
    commands: mpsc::UnboundedSender<Command>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Spawns the session coordinator, so this must be called from within a Tokio runtime.
    pub fn new(config: AppConfig, catalog: Arc<dyn Catalog>) -> SharedState {
        let config = Arc::new(config);
        let connections = Arc::new(ConnectionRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let coordinator = SessionCoordinator::new(
            config.clone(),
            catalog.clone(),
            connections.clone(),
            Arc::new(TokioScheduler::new(tx.clone())),
            tx.clone(),
        );
        tokio::spawn(coordinator.run(rx));

        Arc::new(Self {
            config,
            catalog,
            connections,
            commands: tx,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Music catalog client.
    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    /// Registry of open player sockets.
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Hand a command to the session coordinator.
    pub fn dispatch(&self, command: Command) {
        if let Err(err) = self.commands.send(command) {
            warn!(command = ?err.0, "session coordinator is gone, dropping command");
        }
    }
}
