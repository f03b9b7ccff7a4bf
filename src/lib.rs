//! Core pattern algebra for the Ostinato live coding system
//!
//! A pattern is a function from a timespan to the events that occur within
//! it, over a cyclic, rational timeline. This crate provides the pattern
//! type and the combinators that build, warp and layer patterns; parsing
//! textual notation and scheduling real-time playback live elsewhere and
//! consume patterns purely through [`Pattern::query`].
//!
//! # Examples
//!
//! ```
//! use ostinato_core::{fastcat, pure, TimeSpan};
//!
//! // Two sounds per cycle, doubled in speed
//! let pattern = fastcat(vec![pure("bd"), pure("sd")]).fast(2);
//! let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
//! assert_eq!(haps.len(), 4);
//! ```
//!
//! # Main Components
//!
//! - **Pattern**: the core pattern type, a wrapped query function
//! - **Hap**: a pattern event with its timing and value
//! - **TimeSpan** / **Fraction**: exact rational time intervals
//! - **Combinators**: concatenation, stacking, sequencing
//! - **Signals**: continuous waveforms sampled at query time

pub mod combinators;
pub mod euclid;
pub mod fraction;
pub mod hap;
pub mod ops;
pub mod pattern;
pub mod signal;
pub mod state;
pub mod timespan;

pub use combinators::{
    append, cat, fast_append, fastcat, from_list, from_maybes, overlay, pure, randcat, sequence,
    silence, slowcat, stack,
};
pub use euclid::{bjorklund, euclid};
pub use fraction::{Fraction, ParseFractionError};
pub use hap::Hap;
pub use pattern::{temporal_param, temporal_param2, temporal_param3, Pattern, ValFn};
pub use signal::{cosine, env_eq, env_eqr, env_l, env_lr, saw, signal, sine, square, tri};
pub use state::State;
pub use timespan::TimeSpan;
