//! # Souschef
//!
//! An interactive CLI cooking assistant: it parses free-form recipe
//! text into steps, walks the cook through them, runs countdown timers
//! for steps with durations, surfaces idle-time suggestions while a
//! timer runs, and answers free-form cooking questions through an LLM
//! backend.
//!
//! ## Modules
//!
//! - `config` - Backend configuration loaded from the environment
//! - `error` - Error types shared across the crate
//! - `interaction` - Terminal rendering behind a testable trait
//! - `llm` - LLM backend abstraction and the Azure OpenAI client
//! - `recipe` - Recipe parsing, the step model, and the step cursor
//! - `session` - Command decoding and the session event loop
//! - `timer` - Cancellable countdown timers
//! - `testing` - Test doubles for the backend and the display

pub mod config;
pub mod error;
pub mod interaction;
pub mod llm;
pub mod recipe;
pub mod session;
pub mod timer;

pub mod testing;
