use crate::Fraction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a span of time from begin to end
///
/// Spans are half-open intervals: a span contains its begin but not its end.
/// The unit span `[n, n+1)` for integer `n` is one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    pub begin: Fraction,
    pub end: Fraction,
}

impl TimeSpan {
    /// Create a new timespan
    pub fn new(begin: Fraction, end: Fraction) -> Self {
        TimeSpan { begin, end }
    }

    /// Create a timespan from two integers (whole numbers)
    pub fn from_ints(begin: i64, end: i64) -> Self {
        TimeSpan {
            begin: Fraction::from_int(begin),
            end: Fraction::from_int(end),
        }
    }

    /// Get the duration of this timespan
    pub fn duration(&self) -> Fraction {
        self.end - self.begin
    }

    /// Check if this timespan contains a point in time
    pub fn contains(&self, time: Fraction) -> bool {
        time >= self.begin && time < self.end
    }

    /// Check if two timespans overlap
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// Get the intersection of two timespans, if it has positive width
    pub fn intersection(&self, other: &TimeSpan) -> Option<TimeSpan> {
        if !self.overlaps(other) {
            return None;
        }
        Some(TimeSpan::new(
            self.begin.max(other.begin),
            self.end.min(other.end),
        ))
    }

    /// Get the midpoint of the timespan
    pub fn midpoint(&self) -> Fraction {
        (self.begin + self.end) * Fraction::new(1, 2)
    }

    /// Check if the timespan is empty (begin == end)
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Shift the timespan by an offset
    pub fn shift(&self, offset: Fraction) -> TimeSpan {
        TimeSpan::new(self.begin + offset, self.end + offset)
    }

    /// Scale the timespan by a factor
    pub fn scale(&self, factor: Fraction) -> TimeSpan {
        TimeSpan::new(self.begin * factor, self.end * factor)
    }

    /// Partition this span at cycle boundaries
    ///
    /// Each returned span lies wholly within a single cycle. Empty and
    /// reversed spans produce nothing.
    pub fn span_cycles(&self) -> Vec<TimeSpan> {
        let mut spans = Vec::new();
        let mut begin = self.begin;
        while begin < self.end {
            let end = begin.next_sam().min(self.end);
            spans.push(TimeSpan::new(begin, end));
            begin = end;
        }
        spans
    }

    /// Like [`span_cycles`](Self::span_cycles), but a zero-width span is
    /// kept as a single zero-width span rather than discarded
    pub fn span_cycles_zw(&self) -> Vec<TimeSpan> {
        if self.begin == self.end {
            vec![*self]
        } else {
            self.span_cycles()
        }
    }

    /// The whole-cycle spans `(n, n+1)` touched by this span
    pub fn cycle_spans(&self) -> Vec<TimeSpan> {
        let mut spans = Vec::new();
        let mut sam = self.begin.floor();
        let end = self.end.ceil();
        while sam < end {
            let next = sam + Fraction::from_int(1);
            spans.push(TimeSpan::new(sam, next));
            sam = next;
        }
        spans
    }

    /// Reflect this span around the point `mirror_point`
    pub fn mirror(&self, mirror_point: Fraction) -> TimeSpan {
        TimeSpan::new(
            mirror_point + (mirror_point - self.end),
            mirror_point + (mirror_point - self.begin),
        )
    }

    /// Apply a function to both endpoints measured relative to the start of
    /// the cycle containing `begin`
    pub fn map_cycle<F>(&self, func: F) -> TimeSpan
    where
        F: Fn(Fraction) -> Fraction,
    {
        let sam = self.begin.sam();
        TimeSpan::new(sam + func(self.begin - sam), sam + func(self.end - sam))
    }

    /// Apply a function to both endpoints
    pub fn with_time<F>(&self, func: F) -> TimeSpan
    where
        F: Fn(Fraction) -> Fraction,
    {
        TimeSpan::new(func(self.begin), func(self.end))
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.begin, self.end)
    }
}
