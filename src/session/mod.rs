//! Session orchestration: one event queue, one state machine.
//!
//! Every producer (input reader, timer tasks, backend request tasks)
//! feeds the same unbounded channel and the controller consumes it one
//! event at a time, so session state needs no locks. Cancellation is
//! cooperative: timers carry ids, backend requests carry tokens, and
//! results whose id or token has been invalidated are discarded.

pub mod command;
pub mod events;

pub use command::Command;
pub use events::SessionEvent;

use crate::error::{Error, Result};
use crate::interaction::Interaction;
use crate::llm::LlmService;
use crate::recipe::{Progress, Step, StepStore};
use crate::timer::TimerEngine;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

const LLM_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    TimerActive,
    Complete,
}

/// Drives one recipe session to completion or quit.
pub struct SessionController<I: Interaction> {
    steps: StepStore,
    state: SessionState,
    timers: TimerEngine,
    llm: Arc<dyn LlmService>,
    interaction: I,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    next_token: u64,
    pending_suggestion: Option<u64>,
    pending_answer: Option<u64>,
}

impl<I: Interaction> SessionController<I> {
    pub fn new(steps: StepStore, llm: Arc<dyn LlmService>, interaction: I, simulate: bool) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let timers = TimerEngine::new(events_tx.clone(), simulate);
        Self {
            steps,
            state: SessionState::AwaitingCommand,
            timers,
            llm,
            interaction,
            events_tx,
            events_rx,
            next_token: 0,
            pending_suggestion: None,
            pending_answer: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_timer(&self) -> Option<&crate::timer::TimerHandle> {
        self.timers.active()
    }

    /// A sender for feeding events into the session queue; clone one
    /// per producer.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Pop the next queued event without waiting, if any.
    pub fn poll_queued(&mut self) -> Option<SessionEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Render the initial step and start its timer if it has one.
    pub fn begin(&mut self) -> Result<()> {
        match self.steps.current()? {
            Progress::Step(step) => self.enter_step(step),
            Progress::Complete => self.finish(),
        }
        Ok(())
    }

    /// Run the session until quit, input EOF, or queue shutdown.
    pub async fn run(&mut self) -> Result<()> {
        self.begin()?;
        while let Some(event) = self.events_rx.recv().await {
            if !self.process_event(event) {
                break;
            }
        }
        // Tear down any in-flight work; pending results are discarded.
        self.timers.cancel();
        self.pending_suggestion = None;
        self.pending_answer = None;
        Ok(())
    }

    /// Handle one event. Returns false when the session should end.
    pub fn process_event(&mut self, event: SessionEvent) -> bool {
        trace!(kind = event.kind(), "handling session event");
        match event {
            SessionEvent::Command(command) => self.handle_command(command),
            SessionEvent::InputClosed => {
                debug!("input stream closed");
                false
            }
            SessionEvent::TimerTick {
                timer_id,
                remaining,
            } => {
                if self.timers.record_tick(timer_id, remaining) {
                    self.interaction.timer_tick(remaining);
                }
                true
            }
            SessionEvent::TimerElapsed { timer_id } => {
                self.handle_elapsed(timer_id);
                true
            }
            SessionEvent::SuggestionReady { token, result } => {
                self.handle_suggestion(token, result);
                true
            }
            SessionEvent::AnswerReady { token, result } => {
                self.handle_answer(token, result);
                true
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> bool {
        // A fresh command supersedes any idle suggestion still in flight.
        self.pending_suggestion = None;

        if self.state == SessionState::Complete && command != Command::Quit {
            self.interaction
                .notice("Recipe finished. Type 'quit' to leave.");
            return true;
        }

        match command {
            Command::Quit => {
                self.interaction.notice("Ending session.");
                false
            }
            Command::Question(question) => {
                self.dispatch_question(question);
                true
            }
            Command::Advance => {
                self.timers.cancel();
                match self.steps.advance() {
                    Ok(Progress::Step(step)) => self.enter_step(step),
                    Ok(Progress::Complete) => self.finish(),
                    Err(err) => {
                        warn!(error = %err, "step store rejected advance");
                        self.interaction.notice("No steps to advance through.");
                    }
                }
                true
            }
            Command::Repeat => {
                // Policy: repeating mid-timer resets the timer for the
                // current step rather than leaving the old one running.
                self.timers.cancel();
                match self.steps.repeat_current() {
                    Ok(step) => self.enter_step(step),
                    Err(err) => {
                        warn!(error = %err, "step store rejected repeat");
                        self.interaction.notice("No step to repeat.");
                    }
                }
                true
            }
        }
    }

    fn enter_step(&mut self, step: Step) {
        self.interaction.step(&step, self.steps.len());
        if let Some(duration) = step.duration {
            self.timers.start(step.index, duration);
            self.interaction.timer_started(&step, duration);
            self.state = SessionState::TimerActive;
            self.request_suggestion(step);
        } else {
            self.state = SessionState::AwaitingCommand;
        }
    }

    fn finish(&mut self) {
        self.timers.cancel();
        self.pending_suggestion = None;
        self.state = SessionState::Complete;
        self.interaction.complete();
    }

    fn handle_elapsed(&mut self, timer_id: u64) {
        if !self.timers.acknowledge_elapsed(timer_id) {
            debug!(timer_id, "ignoring elapsed event from a stale timer");
            return;
        }
        // The step the cook left is no longer idle time.
        self.pending_suggestion = None;
        if let Ok(step) = self.steps.repeat_current() {
            self.interaction.times_up(&step);
        }
        if self.state == SessionState::TimerActive {
            self.state = SessionState::AwaitingCommand;
        }
    }

    fn handle_suggestion(&mut self, token: u64, result: Result<String>) {
        if self.pending_suggestion != Some(token) {
            debug!(token, "discarding superseded suggestion result");
            return;
        }
        self.pending_suggestion = None;
        match result {
            Ok(text) => self.interaction.suggestion(&text),
            // A missing idle tip never interrupts the session.
            Err(err) => warn!(error = %err, "idle suggestion unavailable"),
        }
    }

    fn handle_answer(&mut self, token: u64, result: Result<String>) {
        if self.pending_answer != Some(token) {
            debug!(token, "discarding superseded answer result");
            return;
        }
        self.pending_answer = None;
        match result {
            Ok(text) => self.interaction.answer(&text),
            Err(err) => {
                warn!(error = %err, "question answering failed");
                self.interaction.notice("Sorry, couldn't get an answer.");
            }
        }
    }

    fn request_suggestion(&mut self, step: Step) {
        self.next_token += 1;
        let token = self.next_token;
        self.pending_suggestion = Some(token);

        let llm = Arc::clone(&self.llm);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match timeout(LLM_REQUEST_TIMEOUT, llm.complete_suggestion(&step)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Suggestion("request timed out".to_string())),
            };
            let _ = events.send(SessionEvent::SuggestionReady { token, result });
        });
    }

    fn dispatch_question(&mut self, question: String) {
        let step = match self.steps.repeat_current() {
            Ok(step) => step,
            Err(err) => {
                warn!(error = %err, "no step context available for question");
                return;
            }
        };

        self.next_token += 1;
        let token = self.next_token;
        // A newer question supersedes the one in flight; the stale
        // result is dropped when it arrives.
        self.pending_answer = Some(token);

        let llm = Arc::clone(&self.llm);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result =
                match timeout(LLM_REQUEST_TIMEOUT, llm.complete_answer(&question, &step)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Answer("request timed out".to_string())),
                };
            let _ = events.send(SessionEvent::AnswerReady { token, result });
        });
    }
}

/// Read lines from the given source on a blocking thread and feed
/// decoded commands into the session queue. EOF closes the session.
///
/// The source is stdin when the recipe came from a file, and the
/// controlling terminal when stdin was consumed by the recipe itself.
pub fn spawn_command_reader<R>(
    source: R,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> tokio::task::JoinHandle<()>
where
    R: std::io::Read + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut reader = std::io::BufReader::new(source);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    let _ = events.send(SessionEvent::InputClosed);
                    break;
                }
                Ok(_) => {
                    if let Some(command) = Command::decode(&line) {
                        if events.send(SessionEvent::Command(command)).is_err() {
                            break;
                        }
                    }
                }
            }
        }
    })
}
