use crate::{Fraction, TimeSpan};
use serde::{Deserialize, Serialize};

/// A Hap (happening) is a value active during a timespan
///
/// The `part` is the fragment of the event that fell inside the queried
/// span; it may be smaller than the `whole` if the query cut the event
/// short, but never extends outside it. Continuous events, which have no
/// discrete onset, carry no `whole` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hap<T> {
    /// The full timespan of the event (`None` for continuous events)
    pub whole: Option<TimeSpan>,

    /// The active fragment timespan (always present)
    pub part: TimeSpan,

    /// The value of this event
    pub value: T,
}

impl<T> Hap<T> {
    /// Create a new Hap with the given timespans and value
    pub fn new(whole: Option<TimeSpan>, part: TimeSpan, value: T) -> Self {
        Hap { whole, part, value }
    }

    /// Get the whole timespan or fall back to part
    ///
    /// For continuous events this yields the queried span itself, so the
    /// onset point of a continuous event is the query start.
    pub fn whole_or_part(&self) -> TimeSpan {
        self.whole.unwrap_or(self.part)
    }

    /// Check if this hap contains its onset (the part begins where the
    /// whole begins)
    pub fn has_onset(&self) -> bool {
        match self.whole {
            Some(w) => w.begin == self.part.begin,
            None => false,
        }
    }

    /// Apply a function to the value, returning a new Hap
    pub fn with_value<U, F>(&self, func: F) -> Hap<U>
    where
        F: FnOnce(&T) -> U,
    {
        Hap {
            whole: self.whole,
            part: self.part,
            value: func(&self.value),
        }
    }

    /// Apply a function to the timespans, returning a new Hap
    pub fn with_span<F>(&self, func: F) -> Hap<T>
    where
        F: Fn(&TimeSpan) -> TimeSpan,
        T: Clone,
    {
        Hap {
            whole: self.whole.map(|w| func(&w)),
            part: func(&self.part),
            value: self.value.clone(),
        }
    }

    /// Get the duration of this event
    pub fn duration(&self) -> Fraction {
        self.whole_or_part().duration()
    }
}
