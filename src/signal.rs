use crate::combinators::append;
use crate::{Fraction, Hap, Pattern};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Create a continuous pattern from a function of time
///
/// A signal has no discrete events: any query yields exactly one hap
/// covering the queried span, with no whole, valued at the span's start.
pub fn signal<T, F>(func: F) -> Pattern<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Fraction) -> T + Send + Sync + 'static,
{
    Pattern::new(move |state| {
        if state.span.begin > state.span.end {
            return Vec::new();
        }
        vec![Hap::new(None, state.span, func(state.span.begin))]
    })
}

/// A sine wave, one period per cycle, scaled to `[0, 1]`
pub fn sine() -> Pattern<f64> {
    signal(|t| ((t.to_float() * TAU).sin() + 1.0) / 2.0)
}

/// [`sine`] shifted a quarter cycle later
pub fn cosine() -> Pattern<f64> {
    sine().late(Fraction::new(1, 4))
}

/// A sawtooth rising from 0 to 1 over each cycle
pub fn saw() -> Pattern<f64> {
    signal(|t| t.cycle_pos().to_float())
}

/// A triangle wave: a rising cycle followed by a falling one
pub fn tri() -> Pattern<f64> {
    append(saw(), saw().rev())
}

/// A square wave: 0 for the first half of each cycle, 1 for the second
pub fn square() -> Pattern<f64> {
    signal(|t| (t.cycle_pos() * Fraction::from_int(2)).floor().to_float())
}

/// A linear rise from 0 to 1 over the first cycle, holding at 1 after
pub fn env_l() -> Pattern<f64> {
    signal(|t| t.to_float().clamp(0.0, 1.0))
}

/// A linear fall from 1 to 0 over the first cycle
pub fn env_lr() -> Pattern<f64> {
    signal(|t| 1.0 - t.to_float().clamp(0.0, 1.0))
}

/// An equal-power fade out over the first cycle
pub fn env_eq() -> Pattern<f64> {
    signal(|t| (FRAC_PI_2 * (1.0 - t.to_float()).clamp(0.0, 1.0)).sin())
}

/// An equal-power fade in over the first cycle
pub fn env_eqr() -> Pattern<f64> {
    signal(|t| (FRAC_PI_2 * t.to_float().clamp(0.0, 1.0)).sin())
}
