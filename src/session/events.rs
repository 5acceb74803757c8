//! Events merged into the single session queue.

use super::Command;
use crate::error;
use std::time::Duration;

/// Everything the controller can receive, from any producer.
///
/// Timer events carry the id of the timer that produced them;
/// suggestion and answer results carry the request token they belong
/// to. Stale ids and tokens are discarded by the controller.
#[derive(Debug)]
pub enum SessionEvent {
    /// A decoded command from the input stream.
    Command(Command),
    /// The input stream reached EOF.
    InputClosed,
    /// Countdown progress for the identified timer.
    TimerTick { timer_id: u64, remaining: Duration },
    /// The identified timer ran to completion.
    TimerElapsed { timer_id: u64 },
    /// An idle-time suggestion request resolved.
    SuggestionReady {
        token: u64,
        result: error::Result<String>,
    },
    /// A question request resolved.
    AnswerReady {
        token: u64,
        result: error::Result<String>,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Command(_) => "command",
            SessionEvent::InputClosed => "input-closed",
            SessionEvent::TimerTick { .. } => "timer-tick",
            SessionEvent::TimerElapsed { .. } => "timer-elapsed",
            SessionEvent::SuggestionReady { .. } => "suggestion-ready",
            SessionEvent::AnswerReady { .. } => "answer-ready",
        }
    }
}
