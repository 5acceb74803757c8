//! Testing utilities: a scripted backend and a recording display.

use crate::error::{Error, Result};
use crate::interaction::Interaction;
use crate::llm::LlmService;
use crate::recipe::Step;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Backend double that returns fixed responses, or fails on demand.
pub struct MockLlm {
    suggestion: Option<String>,
    answer: Option<String>,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            suggestion: Some("Wipe down the counter while you wait.".to_string()),
            answer: Some("Preheating brings the oven to temperature before use.".to_string()),
        }
    }

    /// A backend where every request fails.
    pub fn failing() -> Self {
        Self {
            suggestion: None,
            answer: None,
        }
    }

    pub fn with_suggestion(mut self, text: &str) -> Self {
        self.suggestion = Some(text.to_string());
        self
    }

    pub fn with_answer(mut self, text: &str) -> Self {
        self.answer = Some(text.to_string());
        self
    }
}

#[async_trait]
impl LlmService for MockLlm {
    async fn complete_suggestion(&self, _context: &Step) -> Result<String> {
        self.suggestion
            .clone()
            .ok_or_else(|| Error::Suggestion("mock backend failure".to_string()))
    }

    async fn complete_answer(&self, _question: &str, _context: &Step) -> Result<String> {
        self.answer
            .clone()
            .ok_or_else(|| Error::Answer("mock backend failure".to_string()))
    }
}

/// Display double that records everything rendered, in order.
///
/// Clones share the same log, so tests can keep one handle while the
/// controller owns another.
#[derive(Clone, Default)]
pub struct RecordingInteraction {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("recording lock poisoned").clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events().iter().any(|line| line.contains(needle))
    }

    fn record(&self, line: String) {
        self.events.lock().expect("recording lock poisoned").push(line);
    }
}

impl Interaction for RecordingInteraction {
    fn step(&self, step: &Step, total_steps: usize) {
        self.record(format!(
            "step {}/{}: {}",
            step.index + 1,
            total_steps,
            step.text
        ));
    }

    fn timer_started(&self, step: &Step, total: Duration) {
        self.record(format!("timer started {}s: {}", total.as_secs(), step.text));
    }

    fn timer_tick(&self, remaining: Duration) {
        self.record(format!("tick {}s", remaining.as_secs()));
    }

    fn times_up(&self, step: &Step) {
        self.record(format!("time's up: {}", step.text));
    }

    fn suggestion(&self, text: &str) {
        self.record(format!("suggestion: {text}"));
    }

    fn answer(&self, text: &str) {
        self.record(format!("answer: {text}"));
    }

    fn notice(&self, message: &str) {
        self.record(format!("notice: {message}"));
    }

    fn complete(&self) {
        self.record("complete".to_string());
    }
}
