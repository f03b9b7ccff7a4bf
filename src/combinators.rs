use crate::{Fraction, Hap, Pattern, TimeSpan};
use std::sync::Arc;

/// Create an empty/silent pattern
///
/// Returns no events for any query
pub fn silence<T: Clone + Send + Sync + 'static>() -> Pattern<T> {
    Pattern::new(|_state| Vec::new())
}

/// Create a pattern that repeats a single value once per cycle
///
/// Each cycle that the query touches yields one event whose whole is that
/// cycle; the part is whatever fragment of the cycle was asked for. A
/// zero-width query yields a single zero-width fragment.
pub fn pure<T: Clone + Send + Sync + 'static>(value: T) -> Pattern<T> {
    Pattern::new(move |state| {
        state
            .span
            .span_cycles_zw()
            .into_iter()
            .map(|part| {
                let whole = TimeSpan::new(part.begin.sam(), part.begin.next_sam());
                Hap::new(Some(whole), part, value.clone())
            })
            .collect()
    })
}

/// Concatenate patterns, switching between them successively per cycle
///
/// Each pattern plays one of its own cycles before handing over to the
/// next, so `n` patterns repeat over `n` cycles. Cycle numbers may be
/// negative; the rotation continues backwards.
pub fn slowcat<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    if patterns.is_empty() {
        return silence();
    }

    if patterns.len() == 1 {
        return patterns.into_iter().next().unwrap_or_else(silence);
    }

    let pat_count = patterns.len() as i64;
    let patterns = Arc::new(patterns);

    Pattern::new(move |state| {
        let cycle = state.span.begin.floor().numerator;
        let index = cycle.rem_euclid(pat_count);

        // Re-base the query into the chosen pattern's own cycle, so each
        // pattern advances one of its cycles per appearance
        let offset = Fraction::from_int(cycle - (cycle - index) / pat_count);

        let pattern = &patterns[index as usize];
        pattern
            .query(&state.with_span(|span| span.shift(-offset)))
            .into_iter()
            .map(|hap| hap.with_span(|ts| ts.shift(offset)))
            .collect()
    })
    .split_queries()
}

/// Alias for [`slowcat`]
pub fn cat<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    slowcat(patterns)
}

/// Concatenate patterns, cramming them all into one cycle
pub fn fastcat<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    let pat_count = patterns.len() as i64;
    if pat_count == 0 {
        return silence();
    }
    slowcat(patterns).fast(Fraction::from_int(pat_count))
}

/// Alias for [`fastcat`]
pub fn sequence<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    fastcat(patterns)
}

/// Layer one pattern over another
///
/// The result's events are the first pattern's followed by the second's.
pub fn overlay<T: Clone + Send + Sync + 'static>(a: Pattern<T>, b: Pattern<T>) -> Pattern<T> {
    Pattern::new(move |state| {
        let mut haps = a.query(state);
        haps.extend(b.query(state));
        haps
    })
}

/// Stack/layer any number of patterns on top of each other
pub fn stack<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    patterns.into_iter().rev().fold(silence(), |acc, pattern| {
        overlay(pattern, acc)
    })
}

/// Alternate between two patterns, one cycle each
pub fn append<T: Clone + Send + Sync + 'static>(a: Pattern<T>, b: Pattern<T>) -> Pattern<T> {
    slowcat(vec![a, b])
}

/// Play both patterns within a single cycle, one after the other
pub fn fast_append<T: Clone + Send + Sync + 'static>(a: Pattern<T>, b: Pattern<T>) -> Pattern<T> {
    fastcat(vec![a, b])
}

/// A cycle containing each value in order
pub fn from_list<T: Clone + Send + Sync + 'static>(values: Vec<T>) -> Pattern<T> {
    fastcat(values.into_iter().map(pure).collect())
}

/// Like [`from_list`], but `None` slots are silent
pub fn from_maybes<T: Clone + Send + Sync + 'static>(values: Vec<Option<T>>) -> Pattern<T> {
    fastcat(
        values
            .into_iter()
            .map(|value| match value {
                Some(value) => pure(value),
                None => silence(),
            })
            .collect(),
    )
}

/// Randomly pick one pattern per cycle
///
/// The choice is a pure function of the cycle number and seed, so queries
/// are repeatable.
pub fn randcat<T: Clone + Send + Sync + 'static>(
    patterns: Vec<Pattern<T>>,
    seed: u64,
) -> Pattern<T> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    if patterns.is_empty() {
        return silence();
    }

    let pat_count = patterns.len();
    let patterns = Arc::new(patterns);

    Pattern::new(move |state| {
        let cycle = state.span.begin.floor().numerator;
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(cycle as u64));
        let choice = rng.gen_range(0..pat_count);
        patterns[choice].query(state)
    })
    .split_queries()
}
