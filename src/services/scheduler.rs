//! Delayed re-entry of commands into the coordinator stream.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::services::coordinator::Command;

/// Schedules a command to be fed back into the coordinator after a delay.
pub trait Scheduler: Send + Sync {
    /// Deliver `command` once `delay` elapsed.
    fn schedule(&self, delay: Duration, command: Command);
}

/// [`Scheduler`] backed by Tokio timers.
#[derive(Clone)]
pub struct TokioScheduler {
    commands: mpsc::UnboundedSender<Command>,
}

impl TokioScheduler {
    /// Schedule onto the given coordinator channel.
    pub fn new(commands: mpsc::UnboundedSender<Command>) -> Self {
        Self { commands }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, command: Command) {
        let commands = self.commands.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if commands.send(command).is_err() {
                debug!("coordinator stopped before scheduled command fired");
            }
        });
    }
}
