//! Language-model backend abstraction and prompt construction.

pub mod azure;

pub use azure::AzureOpenAiClient;

use crate::error::Result;
use crate::recipe::Step;
use async_trait::async_trait;

/// Which kind of completion a request is for. Each kind may be served
/// by a different model deployment (see [`crate::config::ModelConfig`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Suggestion,
    Answer,
}

/// A text-completion backend.
///
/// Both operations are fallible network calls; callers are responsible
/// for bounding them with a timeout and degrading gracefully.
#[async_trait]
pub trait LlmService: Send + Sync {
    /// An idle-time tip to show while a timer counts down.
    async fn complete_suggestion(&self, context: &Step) -> Result<String>;

    /// An answer to a free-form cooking question.
    async fn complete_answer(&self, question: &str, context: &Step) -> Result<String>;
}

pub(crate) const SUGGESTION_SYSTEM_PROMPT: &str = "You are a helpful cooking assistant. \
    The cook is waiting on a timer. Offer exactly one short, practical tip they can \
    use during this idle time. One or two sentences, no lists.";

pub(crate) const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful cooking assistant. \
    Answer the cook's question plainly and concisely, using the current recipe step \
    as context when it is relevant.";

pub(crate) fn suggestion_prompt(context: &Step) -> String {
    format!(
        "The cook is currently on this step: \"{}\". What is a useful thing to do or check while waiting?",
        context.text
    )
}

pub(crate) fn answer_prompt(question: &str, context: &Step) -> String {
    format!("Current step: \"{}\"\nQuestion: {}", context.text, question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_carry_step_context() {
        let step = Step {
            index: 1,
            text: "Bake for 30 minutes".to_string(),
            duration: Some(std::time::Duration::from_secs(1800)),
        };
        assert!(suggestion_prompt(&step).contains("Bake for 30 minutes"));

        let prompt = answer_prompt("what does preheat mean?", &step);
        assert!(prompt.contains("Bake for 30 minutes"));
        assert!(prompt.contains("what does preheat mean?"));
    }
}
