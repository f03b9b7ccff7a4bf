use crate::TimeSpan;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State represents the context for querying a pattern
///
/// It contains the timespan being queried and any control-bus values the
/// scheduler wants to expose to patterns. Controls are threaded through
/// every combinator unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The timespan being queried
    pub span: TimeSpan,

    /// Control parameters (e.g. tempo, fader positions)
    pub controls: HashMap<String, f64>,
}

impl State {
    /// Create a new State with the given timespan
    pub fn new(span: TimeSpan) -> Self {
        State {
            span,
            controls: HashMap::new(),
        }
    }

    /// Create a new State with the given timespan and controls
    pub fn with_controls(span: TimeSpan, controls: HashMap<String, f64>) -> Self {
        State { span, controls }
    }

    /// Return a new State with a different span
    pub fn set_span(&self, span: TimeSpan) -> State {
        State {
            span,
            controls: self.controls.clone(),
        }
    }

    /// Return a new State with the span modified by a function
    pub fn with_span<F>(&self, func: F) -> State
    where
        F: FnOnce(&TimeSpan) -> TimeSpan,
    {
        self.set_span(func(&self.span))
    }

    /// Return a new State with a single control added
    pub fn set_control(&self, key: String, value: f64) -> State {
        let mut controls = self.controls.clone();
        controls.insert(key, value);
        State {
            span: self.span,
            controls,
        }
    }

    /// Get a control value by key
    pub fn get_control(&self, key: &str) -> Option<f64> {
        self.controls.get(key).copied()
    }
}
