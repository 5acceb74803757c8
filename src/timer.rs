//! Cancellable countdown timers feeding the session event queue.
//!
//! At most one timer runs at a time. Every timer carries a unique id;
//! the controller only acts on tick and elapsed events whose id matches
//! the active timer, so a cancellation racing an already-queued tick
//! suppresses that tick's downstream effects.

use crate::error::Error;
use crate::session::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running,
    Cancelled,
    Elapsed,
}

/// The lifecycle record for one countdown.
#[derive(Debug)]
pub struct TimerHandle {
    id: u64,
    step_index: usize,
    total: Duration,
    remaining: Duration,
    status: TimerStatus,
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Produces countdown events: `Idle -> Running -> {Elapsed, Cancelled} -> Idle`.
pub struct TimerEngine {
    events: mpsc::UnboundedSender<SessionEvent>,
    simulate: bool,
    next_id: u64,
    active: Option<TimerHandle>,
}

impl TimerEngine {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>, simulate: bool) -> Self {
        Self {
            events,
            simulate,
            next_id: 0,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&TimerHandle> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(TimerHandle::is_running)
    }

    /// Start a countdown for the given step.
    ///
    /// A no-op when a timer is already running: callers must cancel
    /// first, so this only happens on a contract violation and the
    /// existing timer's id is returned unchanged.
    ///
    /// In simulated mode the timer resolves synchronously: the elapsed
    /// event is queued before `start` returns and no ticks are emitted.
    pub fn start(&mut self, step_index: usize, total: Duration) -> u64 {
        if let Some(handle) = self.active.as_ref() {
            if handle.is_running() {
                // Contract violation by the caller; never user-visible.
                let err = Error::TimerState(format!(
                    "timer {} still running for step {}; start for step {step_index} ignored",
                    handle.id, handle.step_index
                ));
                debug!(error = %err, "timer start rejected");
                return handle.id;
            }
        }

        self.next_id += 1;
        let id = self.next_id;

        let (status, task) = if self.simulate {
            let _ = self.events.send(SessionEvent::TimerElapsed { timer_id: id });
            (TimerStatus::Elapsed, None)
        } else {
            let events = self.events.clone();
            let task = tokio::spawn(run_countdown(id, total, events));
            (TimerStatus::Running, Some(task))
        };

        debug!(timer_id = id, step_index, ?total, simulate = self.simulate, "timer started");
        self.active = Some(TimerHandle {
            id,
            step_index,
            total,
            remaining: total,
            status,
            task,
        });
        id
    }

    /// Cancel the active timer. Idempotent on terminal handles.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.as_mut() {
            if handle.is_running() {
                handle.status = TimerStatus::Cancelled;
                if let Some(task) = handle.task.take() {
                    task.abort();
                }
                debug!(timer_id = handle.id, "timer cancelled");
            }
        }
    }

    /// Record a tick for the identified timer.
    ///
    /// Returns false for stale ids and for timers no longer running,
    /// in which case the tick must produce no downstream effects.
    pub fn record_tick(&mut self, timer_id: u64, remaining: Duration) -> bool {
        match self.active.as_mut() {
            Some(handle) if handle.id == timer_id && handle.is_running() => {
                handle.remaining = remaining;
                true
            }
            _ => false,
        }
    }

    /// Mark the identified timer elapsed.
    ///
    /// Returns false when the event belongs to a cancelled or replaced
    /// timer; the caller must then treat it as a no-op.
    pub fn acknowledge_elapsed(&mut self, timer_id: u64) -> bool {
        match self.active.as_mut() {
            Some(handle) if handle.id == timer_id && handle.status != TimerStatus::Cancelled => {
                handle.status = TimerStatus::Elapsed;
                handle.remaining = Duration::ZERO;
                true
            }
            _ => false,
        }
    }
}

async fn run_countdown(id: u64, total: Duration, events: mpsc::UnboundedSender<SessionEvent>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    // The first tick of a tokio interval completes immediately.
    interval.tick().await;

    let mut remaining = total;
    while remaining > Duration::ZERO {
        interval.tick().await;
        remaining = remaining.saturating_sub(TICK_INTERVAL);
        if remaining > Duration::ZERO {
            let tick = SessionEvent::TimerTick {
                timer_id: id,
                remaining,
            };
            if events.send(tick).is_err() {
                return;
            }
        }
    }
    let _ = events.send(SessionEvent::TimerElapsed { timer_id: id });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(simulate: bool) -> (TimerEngine, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TimerEngine::new(tx, simulate), rx)
    }

    #[tokio::test]
    async fn simulated_timer_elapses_synchronously_with_no_ticks() {
        let (mut timers, mut rx) = engine(true);
        let id = timers.start(0, Duration::from_secs(1800));

        // Queued before start returned, with nothing ahead of it.
        match rx.try_recv() {
            Ok(SessionEvent::TimerElapsed { timer_id }) => assert_eq!(timer_id, id),
            other => panic!("expected elapsed event, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(timers.active().unwrap().status(), TimerStatus::Elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_then_elapses() {
        let (mut timers, mut rx) = engine(false);
        let id = timers.start(1, Duration::from_secs(2));

        match rx.recv().await {
            Some(SessionEvent::TimerTick { timer_id, remaining }) => {
                assert_eq!(timer_id, id);
                assert_eq!(remaining, Duration::from_secs(1));
            }
            other => panic!("expected tick, got {other:?}"),
        }
        match rx.recv().await {
            Some(SessionEvent::TimerElapsed { timer_id }) => assert_eq!(timer_id, id),
            other => panic!("expected elapsed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_transitions_to_cancelled_and_suppresses_events() {
        let (mut timers, mut rx) = engine(false);
        let id = timers.start(0, Duration::from_secs(60));

        // A tick arrives while the timer is healthy.
        match rx.recv().await {
            Some(SessionEvent::TimerTick { timer_id, remaining }) => {
                assert!(timers.record_tick(timer_id, remaining));
            }
            other => panic!("expected tick, got {other:?}"),
        }

        timers.cancel();
        assert_eq!(timers.active().unwrap().status(), TimerStatus::Cancelled);

        // Events queued before cancellation must no longer have effects.
        assert!(!timers.record_tick(id, Duration::from_secs(58)));
        assert!(!timers.acknowledge_elapsed(id));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let (mut timers, _rx) = engine(false);
        timers.start(0, Duration::from_secs(10));
        timers.cancel();
        timers.cancel();
        assert_eq!(timers.active().unwrap().status(), TimerStatus::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_returns_existing_timer() {
        let (mut timers, _rx) = engine(false);
        let first = timers.start(0, Duration::from_secs(30));
        let second = timers.start(1, Duration::from_secs(5));
        assert_eq!(first, second);
        assert_eq!(timers.active().unwrap().step_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_ids_are_rejected_after_replacement() {
        let (mut timers, _rx) = engine(false);
        let first = timers.start(0, Duration::from_secs(30));
        timers.cancel();
        let second = timers.start(1, Duration::from_secs(30));

        assert!(!timers.acknowledge_elapsed(first));
        assert!(!timers.record_tick(first, Duration::from_secs(29)));
        assert!(timers.record_tick(second, Duration::from_secs(29)));
        assert_eq!(
            timers.active().unwrap().remaining(),
            Duration::from_secs(29)
        );
    }
}
