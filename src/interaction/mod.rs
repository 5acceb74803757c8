//! Terminal rendering for the session.
//!
//! The controller talks to a trait so tests can record output instead
//! of printing it; the console implementation is plain stdout with a
//! carriage-return countdown line.

use crate::recipe::Step;
use std::io::{self, Write};
use std::time::Duration;

/// Everything the session renders to the user.
pub trait Interaction: Send + Sync {
    /// Render a step as the cook arrives on it.
    fn step(&self, step: &Step, total_steps: usize);

    /// A countdown just started for the given step.
    fn timer_started(&self, step: &Step, total: Duration);

    /// Refresh the countdown display.
    fn timer_tick(&self, remaining: Duration);

    /// The countdown for the given step ran out.
    fn times_up(&self, step: &Step);

    /// Show an idle-time suggestion.
    fn suggestion(&self, text: &str);

    /// Show the answer to a question.
    fn answer(&self, text: &str);

    /// Brief non-fatal notice.
    fn notice(&self, message: &str);

    /// The recipe is finished.
    fn complete(&self);
}

/// Stdout implementation used by the binary.
#[derive(Default)]
pub struct ConsoleInteraction;

impl ConsoleInteraction {
    pub fn new() -> Self {
        Self
    }
}

impl Interaction for ConsoleInteraction {
    fn step(&self, step: &Step, total_steps: usize) {
        println!();
        println!("👩‍🍳 Step {}/{}: {}", step.index + 1, total_steps, step.text);
    }

    fn timer_started(&self, _step: &Step, total: Duration) {
        println!("⏲️  Timer started: {}", format_duration(total));
    }

    fn timer_tick(&self, remaining: Duration) {
        // Overwrite the countdown line in place.
        print!("\r⏳ {} remaining   ", format_duration(remaining));
        let _ = io::stdout().flush();
    }

    fn times_up(&self, step: &Step) {
        println!("\r⏰ Time's up: {}                ", step.text);
    }

    fn suggestion(&self, text: &str) {
        println!("\r💡 While you wait: {text}");
    }

    fn answer(&self, text: &str) {
        println!("\r🍳 {text}");
    }

    fn notice(&self, message: &str) {
        println!("ℹ️  {message}");
    }

    fn complete(&self) {
        println!();
        println!("✅ Recipe complete. Enjoy your meal!");
    }
}

/// `mm:ss`, or `h:mm:ss` once hours are involved.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
