//! Scripted solvers for unit tests.

use std::cell::{Cell, RefCell};

use crate::error::TrialError;
use crate::trial::{Solver, TrialConfig};

/// Replays a fixed sequence of timings, cycling when exhausted.
pub struct ScriptedSolver {
    timings: Vec<f64>,
    calls: Cell<usize>,
    fail_on: Option<usize>,
    fail_when: Option<Box<dyn Fn(&TrialConfig<'_>) -> bool>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedSolver {
    pub fn new(timings: impl IntoIterator<Item = f64>) -> Self {
        let timings: Vec<f64> = timings.into_iter().collect();
        assert!(!timings.is_empty(), "at least one timing is required");
        Self {
            timings,
            calls: Cell::new(0),
            fail_on: None,
            fail_when: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Fails the given 1-based call with malformed output.
    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Fails every call whose configuration matches `predicate`.
    pub fn fail_when(mut self, predicate: impl Fn(&TrialConfig<'_>) -> bool + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Solver for ScriptedSolver {
    fn run(&self, config: &TrialConfig<'_>) -> Result<f64, TrialError> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        self.requests.borrow_mut().push(config.request());

        let scripted_failure = self.fail_on == Some(call)
            || self.fail_when.as_ref().is_some_and(|predicate| predicate(config));
        if scripted_failure {
            return Err(TrialError::malformed("scripted failure", ""));
        }
        Ok(self.timings[(call - 1) % self.timings.len()])
    }
}
