//! Per-room countdown with one-second granularity.

use std::time::Duration;

use thiserror::Error;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

/// Identifier of one started countdown. Never reused within a [`RoundTimer`].
pub type TimerId = u64;

const TICK: Duration = Duration::from_secs(1);

/// Lifecycle of the most recently started countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Nothing was ever started.
    Idle,
    /// Countdown in progress.
    Running(TimerId),
    /// Countdown reached zero and its expiry was acknowledged.
    Expired(TimerId),
    /// Countdown stopped before reaching zero.
    Cancelled(TimerId),
}

/// Errors raised by [`RoundTimer::start`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The caller must cancel the running countdown first.
    #[error("timer {0} is still running")]
    AlreadyRunning(TimerId),
}

/// Countdown scheduler owned by a room.
///
/// Ticks and expiry are produced by a background task and handed to callbacks. Callbacks
/// only report; the owner acknowledges an expiry through [`RoundTimer::mark_expired`] and
/// must drop any callback whose [`TimerId`] is no longer [`RoundTimer::is_running`].
#[derive(Debug)]
pub struct RoundTimer {
    state: TimerState,
    handle: Option<JoinHandle<()>>,
    issued: TimerId,
    cancels: usize,
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundTimer {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            handle: None,
            issued: 0,
            cancels: 0,
        }
    }

    /// Start a countdown of `duration_secs` seconds.
    ///
    /// `on_tick` receives the seconds remaining after each elapsed second (never zero);
    /// `on_expire` is called once when the countdown reaches zero.
    pub fn start<T, E>(
        &mut self,
        duration_secs: u32,
        on_tick: T,
        on_expire: E,
    ) -> Result<TimerId, TimerError>
    where
        T: Fn(TimerId, u32) + Send + 'static,
        E: FnOnce(TimerId) + Send + 'static,
    {
        if let TimerState::Running(id) = self.state {
            return Err(TimerError::AlreadyRunning(id));
        }

        self.issued += 1;
        let id = self.issued;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut remaining = duration_secs;
            while remaining > 0 {
                ticker.tick().await;
                remaining -= 1;
                if remaining > 0 {
                    on_tick(id, remaining);
                }
            }
            on_expire(id);
        });

        self.handle = Some(handle);
        self.state = TimerState::Running(id);
        Ok(id)
    }

    /// Stop the running countdown. Returns whether a countdown was running.
    ///
    /// Once this returns the background task is aborted and the timer id is retired, so any
    /// tick or expiry already in flight is rejected by [`RoundTimer::is_running`].
    pub fn cancel(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }

        match self.state {
            TimerState::Running(id) => {
                self.state = TimerState::Cancelled(id);
                self.cancels += 1;
                true
            }
            _ => false,
        }
    }

    /// Acknowledge the expiry reported for `id`. Returns `false` for stale or repeated
    /// reports, which must be ignored.
    pub fn mark_expired(&mut self, id: TimerId) -> bool {
        if self.state != TimerState::Running(id) {
            return false;
        }

        self.handle = None;
        self.state = TimerState::Expired(id);
        true
    }

    /// Whether `id` is the countdown currently running.
    pub fn is_running(&self, id: TimerId) -> bool {
        self.state == TimerState::Running(id)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Id of the running countdown, if any.
    pub fn current(&self) -> Option<TimerId> {
        match self.state {
            TimerState::Running(id) => Some(id),
            _ => None,
        }
    }

    /// Number of countdowns started so far.
    pub fn starts(&self) -> usize {
        self.issued as usize
    }

    /// Number of countdowns cancelled while running.
    pub fn cancels(&self) -> usize {
        self.cancels
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Signal {
        Tick(TimerId, u32),
        Expired(TimerId),
    }

    fn start(timer: &mut RoundTimer, secs: u32) -> (TimerId, mpsc::UnboundedReceiver<Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tick_tx = tx.clone();
        let id = timer
            .start(
                secs,
                move |id, remaining| {
                    let _ = tick_tx.send(Signal::Tick(id, remaining));
                },
                move |id| {
                    let _ = tx.send(Signal::Expired(id));
                },
            )
            .unwrap();
        (id, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_every_second_then_expires_once() {
        let mut timer = RoundTimer::new();
        let (id, mut rx) = start(&mut timer, 3);

        assert_eq!(rx.recv().await, Some(Signal::Tick(id, 2)));
        assert_eq!(rx.recv().await, Some(Signal::Tick(id, 1)));
        assert_eq!(rx.recv().await, Some(Signal::Expired(id)));
        assert_eq!(rx.recv().await, None);

        assert!(timer.mark_expired(id));
        assert!(!timer.mark_expired(id));
        assert_eq!(timer.state(), TimerState::Expired(id));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_after_cancel() {
        let mut timer = RoundTimer::new();
        let (id, mut rx) = start(&mut timer, 5);

        assert_eq!(rx.recv().await, Some(Signal::Tick(id, 4)));
        assert!(timer.cancel());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
        assert!(!timer.is_running(id));
        assert!(!timer.mark_expired(id));
        assert_eq!(timer.state(), TimerState::Cancelled(id));
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_without_cancel_is_rejected() {
        let mut timer = RoundTimer::new();
        let (first, _rx) = start(&mut timer, 20);

        let err = timer.start(20, |_, _| {}, |_| {}).unwrap_err();
        assert_eq!(err, TimerError::AlreadyRunning(first));

        timer.cancel();
        let (second, _rx) = start(&mut timer, 20);
        assert_ne!(first, second);
        assert_eq!(timer.starts(), 2);
        assert_eq!(timer.cancels(), 1);
        assert_eq!(timer.current(), Some(second));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_when_idle_is_a_no_op() {
        let mut timer = RoundTimer::new();
        assert!(!timer.cancel());
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.cancels(), 0);
    }
}
