//! Recipe text parsing and the step data model.
//!
//! Parsing is best-effort: numbered and bulleted lines become steps,
//! everything else is ignored. Unparseable input yields zero steps,
//! which is not an error here; callers decide what to do about it.

pub mod store;

pub use store::{Progress, StepStore};

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// One parsed instruction unit of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Ordinal position, 0-based and contiguous.
    pub index: usize,
    /// Instruction content with the list marker stripped.
    pub text: String,
    /// Embedded duration, if the instruction mentions one.
    pub duration: Option<Duration>,
}

static STEP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:step\s+)?\d+\s*[.):]\s*|[-*•]\s+)(?P<text>\S.*)$")
        .expect("step line pattern is valid")
});

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<value>\d+)\s*(?P<unit>hours?|hrs?|minutes?|mins?|seconds?|secs?)\b")
        .expect("duration pattern is valid")
});

/// Extract an ordered step list from free-form recipe text.
pub fn parse(raw: &str) -> Vec<Step> {
    let mut steps = Vec::new();
    for line in raw.lines() {
        if let Some(caps) = STEP_LINE.captures(line) {
            let text = caps["text"].trim().to_string();
            steps.push(Step {
                index: steps.len(),
                text: text.clone(),
                duration: extract_duration(&text),
            });
        }
    }
    steps
}

/// Find the duration embedded in a step's text.
///
/// The first duration expression wins; an immediately following unit
/// ("1 hour 30 minutes") is folded into it. Later, unrelated mentions
/// in the same step are ignored.
fn extract_duration(text: &str) -> Option<Duration> {
    let mut total_secs: u64 = 0;
    let mut last_end: Option<usize> = None;

    for caps in DURATION.captures_iter(text) {
        let whole = caps.get(0).expect("match has a whole capture");
        if let Some(end) = last_end {
            let gap = &text[end..whole.start()];
            if !gap.chars().all(|c| c.is_whitespace() || c == ',') && gap.trim() != "and" {
                break;
            }
        }
        let value: u64 = match caps["value"].parse() {
            Ok(v) => v,
            Err(_) => break,
        };
        // Absurd values overflow u64 seconds; treat that as no duration
        // rather than failing the parse.
        let seconds = match value.checked_mul(unit_secs(&caps["unit"])) {
            Some(seconds) => seconds,
            None => return None,
        };
        total_secs = match total_secs.checked_add(seconds) {
            Some(total) => total,
            None => return None,
        };
        last_end = Some(whole.end());
    }

    if total_secs > 0 {
        Some(Duration::from_secs(total_secs))
    } else {
        None
    }
}

fn unit_secs(unit: &str) -> u64 {
    match unit.to_lowercase().as_str() {
        u if u.starts_with('h') => 3600,
        u if u.starts_with('m') => 60,
        _ => 1,
    }
}
