//! Cursor state over the ordered step list.

use super::Step;
use crate::error::{Error, Result};

/// Where the session cursor currently points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The step under the cursor.
    Step(Step),
    /// The cursor has moved past the last step.
    Complete,
}

/// Owns the parsed steps and the cursor over them.
///
/// The cursor satisfies `0 <= cursor <= len`; `cursor == len` means the
/// session is complete. Steps are immutable once stored.
#[derive(Debug)]
pub struct StepStore {
    steps: Vec<Step>,
    cursor: usize,
}

impl StepStore {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.cursor >= self.steps.len()
    }

    /// The step under the cursor, or `Complete` past the end.
    ///
    /// Errors with `OutOfRange` only on an empty step list; callers are
    /// expected to check for zero parsed steps before starting a session.
    pub fn current(&self) -> Result<Progress> {
        if self.steps.is_empty() {
            return Err(Error::OutOfRange);
        }
        Ok(match self.steps.get(self.cursor) {
            Some(step) => Progress::Step(step.clone()),
            None => Progress::Complete,
        })
    }

    /// Move the cursor forward one step.
    ///
    /// Advancing past the last step is idempotent: the store stays in
    /// the `Complete` state and keeps returning it.
    pub fn advance(&mut self) -> Result<Progress> {
        if self.steps.is_empty() {
            return Err(Error::OutOfRange);
        }
        if self.cursor < self.steps.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// The current step without moving the cursor.
    ///
    /// Once complete, this keeps returning the last step so callers
    /// still have context for rendering and questions.
    pub fn repeat_current(&self) -> Result<Step> {
        if self.steps.is_empty() {
            return Err(Error::OutOfRange);
        }
        match self.steps.get(self.cursor) {
            Some(step) => Ok(step.clone()),
            None => Ok(self.steps[self.steps.len() - 1].clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(n: usize) -> Vec<Step> {
        (0..n)
            .map(|index| Step {
                index,
                text: format!("step {index}"),
                duration: None,
            })
            .collect()
    }

    #[test]
    fn advances_to_complete_after_len_steps() {
        let mut store = StepStore::new(steps(3));
        assert!(matches!(store.current(), Ok(Progress::Step(s)) if s.index == 0));

        assert!(matches!(store.advance(), Ok(Progress::Step(s)) if s.index == 1));
        assert!(matches!(store.advance(), Ok(Progress::Step(s)) if s.index == 2));
        assert!(matches!(store.advance(), Ok(Progress::Complete)));
        assert!(store.is_complete());
    }

    #[test]
    fn advance_past_complete_is_idempotent() {
        let mut store = StepStore::new(steps(1));
        assert!(matches!(store.advance(), Ok(Progress::Complete)));
        for _ in 0..5 {
            assert!(matches!(store.advance(), Ok(Progress::Complete)));
        }
    }

    #[test]
    fn repeat_never_moves_the_cursor() {
        let mut store = StepStore::new(steps(3));
        store.advance().unwrap();

        let before = store.repeat_current().unwrap();
        let again = store.repeat_current().unwrap();
        assert_eq!(before, again);
        assert!(matches!(store.current(), Ok(Progress::Step(s)) if s.index == 1));
    }

    #[test]
    fn repeat_after_complete_returns_last_step() {
        let mut store = StepStore::new(steps(2));
        store.advance().unwrap();
        store.advance().unwrap();
        assert_eq!(store.repeat_current().unwrap().index, 1);
    }

    #[test]
    fn empty_store_is_out_of_range() {
        let mut store = StepStore::new(Vec::new());
        assert!(matches!(store.current(), Err(Error::OutOfRange)));
        assert!(matches!(store.advance(), Err(Error::OutOfRange)));
        assert!(matches!(store.repeat_current(), Err(Error::OutOfRange)));
    }
}
