use crate::combinators::silence;
use crate::{Fraction, Hap, State, TimeSpan};
use std::sync::Arc;

/// A shareable function value, for patterns of functions
///
/// Applying a `Pattern<ValFn<A, B>>` to a `Pattern<A>` with one of the
/// `app_*` methods yields a `Pattern<B>`.
pub type ValFn<A, B> = Arc<dyn Fn(&A) -> B + Send + Sync>;

/// A Pattern represents a time-varying sequence of values
///
/// Patterns are queried with a State (containing a timespan) and return a
/// list of Haps (events) that occur within that timespan. A pattern is
/// nothing more than its query function; every combinator works by wrapping
/// that function in another one. Queries are pure, so patterns can be shared
/// freely across threads.
pub struct Pattern<T> {
    /// The query function that produces events for a given state
    query_func: Arc<dyn Fn(&State) -> Vec<Hap<T>> + Send + Sync>,
}

impl<T> Clone for Pattern<T> {
    fn clone(&self) -> Self {
        Pattern {
            query_func: self.query_func.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Pattern<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("query", &"<closure>")
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Pattern<T> {
    /// Create a new Pattern with a query function
    pub fn new<F>(query_func: F) -> Self
    where
        F: Fn(&State) -> Vec<Hap<T>> + Send + Sync + 'static,
    {
        Pattern {
            query_func: Arc::new(query_func),
        }
    }

    /// Query this pattern with the given state
    pub fn query(&self, state: &State) -> Vec<Hap<T>> {
        (self.query_func)(state)
    }

    /// Query this pattern over a bare timespan
    pub fn query_span(&self, span: TimeSpan) -> Vec<Hap<T>> {
        self.query(&State::new(span))
    }

    /// Apply a function to each value in the pattern
    ///
    /// This is the functor map operation; timespans are untouched.
    pub fn fmap<U, F>(self, func: F) -> Pattern<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        Pattern::new(move |state| {
            self.query(state)
                .into_iter()
                .map(|hap| hap.with_value(&func))
                .collect()
        })
    }

    /// Apply a function to each hap
    pub fn with_hap<F>(self, func: F) -> Pattern<T>
    where
        F: Fn(&Hap<T>) -> Hap<T> + Send + Sync + 'static,
    {
        Pattern::new(move |state| self.query(state).iter().map(&func).collect())
    }

    /// Apply a function to all haps at once
    pub fn with_haps<F>(self, func: F) -> Pattern<T>
    where
        F: Fn(Vec<Hap<T>>) -> Vec<Hap<T>> + Send + Sync + 'static,
    {
        Pattern::new(move |state| func(self.query(state)))
    }

    /// Apply a function to query time (before querying)
    pub fn with_query_time<F>(self, func: F) -> Pattern<T>
    where
        F: Fn(Fraction) -> Fraction + Send + Sync + 'static + Copy,
    {
        Pattern::new(move |state| {
            let new_span = TimeSpan::new(func(state.span.begin), func(state.span.end));
            self.query(&state.set_span(new_span))
        })
    }

    /// Apply a function to hap time (after querying)
    pub fn with_hap_time<F>(self, func: F) -> Pattern<T>
    where
        F: Fn(Fraction) -> Fraction + Send + Sync + 'static + Copy,
    {
        Pattern::new(move |state| {
            self.query(state)
                .into_iter()
                .map(|hap| hap.with_span(|ts| TimeSpan::new(func(ts.begin), func(ts.end))))
                .collect()
        })
    }

    /// Apply a function to the query span (before querying)
    pub fn with_query_span<F>(self, func: F) -> Pattern<T>
    where
        F: Fn(&TimeSpan) -> TimeSpan + Send + Sync + 'static,
    {
        Pattern::new(move |state| self.query(&state.with_span(&func)))
    }

    /// Apply a function to each hap's spans (after querying)
    pub fn with_hap_span<F>(self, func: F) -> Pattern<T>
    where
        F: Fn(&TimeSpan) -> TimeSpan + Send + Sync + 'static,
    {
        Pattern::new(move |state| {
            self.query(state)
                .into_iter()
                .map(|hap| hap.with_span(&func))
                .collect()
        })
    }

    /// Split queries at cycle boundaries
    ///
    /// Transformers whose behaviour depends on which cycle they are in
    /// (`rev`, `zoom`, `fast_gap`, `when`, the concatenations) only see
    /// queries that lie within a single cycle. Zero-width queries are
    /// passed through as-is.
    pub fn split_queries(self) -> Pattern<T> {
        Pattern::new(move |state| {
            state
                .span
                .span_cycles_zw()
                .into_iter()
                .flat_map(|span| self.query(&state.set_span(span)))
                .collect()
        })
    }

    /// Keep only haps whose predicate holds
    pub fn filter_haps<F>(self, pred: F) -> Pattern<T>
    where
        F: Fn(&Hap<T>) -> bool + Send + Sync + 'static,
    {
        Pattern::new(move |state| {
            self.query(state)
                .into_iter()
                .filter(|hap| pred(hap))
                .collect()
        })
    }

    /// Keep only haps whose value satisfies the predicate
    pub fn filter_values<F>(self, pred: F) -> Pattern<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_haps(move |hap| pred(&hap.value))
    }

    /// Speed up the pattern by a factor
    ///
    /// A factor of zero silences the pattern; a negative factor plays the
    /// speeded-up pattern reversed.
    pub fn fast(self, factor: impl Into<Fraction>) -> Pattern<T> {
        let factor: Fraction = factor.into();
        if factor.is_zero() {
            return silence();
        }
        if factor.is_negative() {
            return self.fast(-factor).rev();
        }
        self.with_query_time(move |t| t * factor)
            .with_hap_time(move |t| t / factor)
    }

    /// Slow down the pattern by a factor
    pub fn slow(self, factor: impl Into<Fraction>) -> Pattern<T> {
        let factor: Fraction = factor.into();
        if factor.is_zero() {
            return silence();
        }
        self.fast(factor.reciprocal())
    }

    /// Alias for [`fast`](Self::fast)
    pub fn density(self, factor: impl Into<Fraction>) -> Pattern<T> {
        self.fast(factor)
    }

    /// Alias for [`slow`](Self::slow)
    pub fn sparsity(self, factor: impl Into<Fraction>) -> Pattern<T> {
        self.slow(factor)
    }

    /// Shift pattern in time (nudge forward or backward)
    ///
    /// Positive values shift the pattern later in time, negative values
    /// earlier. Implemented by subtracting the offset from query time and
    /// adding it back to hap time.
    pub fn shift(self, amount: impl Into<Fraction>) -> Pattern<T> {
        let amount: Fraction = amount.into();
        self.with_query_time(move |t| t - amount)
            .with_hap_time(move |t| t + amount)
    }

    /// Nudge the pattern earlier by the given number of cycles
    pub fn early(self, amount: impl Into<Fraction>) -> Pattern<T> {
        let amount: Fraction = amount.into();
        self.shift(-amount)
    }

    /// Nudge the pattern later by the given number of cycles
    pub fn late(self, amount: impl Into<Fraction>) -> Pattern<T> {
        self.shift(amount)
    }

    /// Reverse the pattern within each cycle
    ///
    /// Each cycle-local query is reflected around the middle of its cycle,
    /// served by the source pattern, and the resulting haps are reflected
    /// back. Events keep their durations; only their positions within the
    /// cycle are mirrored.
    pub fn rev(self) -> Pattern<T> {
        Pattern::new(move |state| {
            let mid = state.span.begin.sam() + Fraction::new(1, 2);
            let mirrored = state.span.mirror(mid);
            let mut haps: Vec<Hap<T>> = self
                .query(&state.set_span(mirrored))
                .into_iter()
                .map(|hap| hap.with_span(|ts| ts.mirror(mid)))
                .collect();
            // Mirroring reverses chronological order; restore it
            haps.sort_by(|a, b| a.part.begin.cmp(&b.part.begin));
            haps
        })
        .split_queries()
    }

    /// Play a slice of the pattern, stretched to fill each cycle
    ///
    /// `zoom((1/4, 3/4), p)` plays the middle half of every cycle of `p`
    /// at double speed. An empty or reversed slice silences the pattern.
    pub fn zoom(self, span: TimeSpan) -> Pattern<T> {
        let begin = span.begin;
        let duration = span.duration();
        if duration <= Fraction::from_int(0) {
            return silence();
        }
        self.with_query_span(move |qs| qs.map_cycle(|t| begin + t * duration))
            .with_hap_span(move |ts| ts.map_cycle(|t| (t - begin) / duration))
            .split_queries()
    }

    /// Squash each cycle's content into the first `1/factor` of the cycle,
    /// leaving the rest silent
    pub fn fast_gap(self, factor: impl Into<Fraction>) -> Pattern<T> {
        let factor: Fraction = factor.into();
        if factor <= Fraction::from_int(0) {
            return silence();
        }
        let one = Fraction::from_int(1);
        Pattern::new(move |state| {
            let sam = state.span.begin.sam();
            // Query points past the active window collapse onto the next
            // cycle boundary
            let munge = |t: Fraction| sam + one.min(factor * (t - sam));
            let munged = TimeSpan::new(munge(state.span.begin), munge(state.span.end));
            if munged.begin == sam + one {
                return Vec::new();
            }
            self.query(&state.set_span(munged))
                .into_iter()
                .map(|hap| {
                    hap.with_span(|ts| {
                        TimeSpan::new(sam + (ts.begin - sam) / factor, sam + (ts.end - sam) / factor)
                    })
                })
                .collect()
        })
        .split_queries()
    }

    /// Play the pattern inside the given sub-span of each cycle
    ///
    /// Both endpoints must lie within `[0, 1]` and the span must have
    /// positive width, otherwise the result is silence.
    pub fn compress(self, span: TimeSpan) -> Pattern<T> {
        let zero = Fraction::from_int(0);
        let one = Fraction::from_int(1);
        if span.begin >= span.end || span.begin < zero || span.end > one {
            return silence();
        }
        self.fast_gap(one / span.duration()).late(span.begin)
    }

    /// Apply a transformation on cycles whose number passes the test
    pub fn when<P, F>(self, test: P, func: F) -> Pattern<T>
    where
        P: Fn(i64) -> bool + Send + Sync + 'static,
        F: FnOnce(Pattern<T>) -> Pattern<T>,
    {
        let transformed = func(self.clone());
        Pattern::new(move |state| {
            let cycle = state.span.begin.floor().numerator;
            if test(cycle) {
                transformed.query(state)
            } else {
                self.query(state)
            }
        })
        .split_queries()
    }

    /// Apply a transformation on cycle-local queries whose start time
    /// passes the test
    pub fn when_time<P, F>(self, test: P, func: F) -> Pattern<T>
    where
        P: Fn(Fraction) -> bool + Send + Sync + 'static,
        F: FnOnce(Pattern<T>) -> Pattern<T>,
    {
        let transformed = func(self.clone());
        Pattern::new(move |state| {
            if test(state.span.begin) {
                transformed.query(state)
            } else {
                self.query(state)
            }
        })
        .split_queries()
    }

    /// Apply a transformation every `n` cycles
    pub fn every<F>(self, n: i64, func: F) -> Pattern<T>
    where
        F: FnOnce(Pattern<T>) -> Pattern<T>,
    {
        if n <= 0 {
            return self;
        }
        self.when(move |cycle| cycle.rem_euclid(n) == 0, func)
    }

    /// Combine with another pattern, keeping structure from both sides
    ///
    /// For every pair of overlapping events, the output part is the
    /// intersection of the two parts and the output whole the intersection
    /// of the two wholes. Pairs that do not overlap produce nothing.
    pub fn zip_both<B, C, F>(self, other: Pattern<B>, func: F) -> Pattern<C>
    where
        B: Clone + Send + Sync + 'static,
        C: Clone + Send + Sync + 'static,
        F: Fn(&T, &B) -> C + Send + Sync + 'static,
    {
        Pattern::new(move |state| {
            let mut haps = Vec::new();
            for this_hap in self.query(state) {
                for other_hap in other.query(&state.set_span(this_hap.part)) {
                    let part = match this_hap.part.intersection(&other_hap.part) {
                        Some(part) => part,
                        None => continue,
                    };
                    let whole = match (this_hap.whole, other_hap.whole) {
                        (Some(a), Some(b)) => match a.intersection(&b) {
                            Some(whole) => Some(whole),
                            None => continue,
                        },
                        _ => None,
                    };
                    haps.push(Hap::new(whole, part, func(&this_hap.value, &other_hap.value)));
                }
            }
            haps
        })
    }

    /// Combine with another pattern, keeping structure from the left
    ///
    /// For each of this pattern's events, the other pattern is sampled at
    /// the event's onset with a zero-width query ("what is sounding right
    /// now?"); the event's own spans are kept unchanged.
    pub fn zip_left<B, C, F>(self, other: Pattern<B>, func: F) -> Pattern<C>
    where
        B: Clone + Send + Sync + 'static,
        C: Clone + Send + Sync + 'static,
        F: Fn(&T, &B) -> C + Send + Sync + 'static,
    {
        Pattern::new(move |state| {
            let mut haps = Vec::new();
            for this_hap in self.query(state) {
                let onset = this_hap.whole_or_part().begin;
                let point = TimeSpan::new(onset, onset);
                for other_hap in other.query(&state.set_span(point)) {
                    haps.push(Hap::new(
                        this_hap.whole,
                        this_hap.part,
                        func(&this_hap.value, &other_hap.value),
                    ));
                }
            }
            haps
        })
    }

    /// Combine with another pattern, keeping structure from the right
    pub fn zip_right<B, C, F>(self, other: Pattern<B>, func: F) -> Pattern<C>
    where
        B: Clone + Send + Sync + 'static,
        C: Clone + Send + Sync + 'static,
        F: Fn(&T, &B) -> C + Send + Sync + 'static,
    {
        Pattern::new(move |state| {
            let mut haps = Vec::new();
            for other_hap in other.query(state) {
                let onset = other_hap.whole_or_part().begin;
                let point = TimeSpan::new(onset, onset);
                for this_hap in self.query(&state.set_span(point)) {
                    haps.push(Hap::new(
                        other_hap.whole,
                        other_hap.part,
                        func(&this_hap.value, &other_hap.value),
                    ));
                }
            }
            haps
        })
    }

    /// Monadic bind: replace every event with a whole pattern
    pub fn bind<B, F>(self, func: F) -> Pattern<B>
    where
        B: Clone + Send + Sync + 'static,
        F: Fn(&T) -> Pattern<B> + Send + Sync + 'static,
    {
        self.fmap(func).join()
    }

    /// Like [`bind`](Self::bind), but each inner pattern is squeezed into
    /// the event it replaces
    pub fn squeeze_bind<B, F>(self, func: F) -> Pattern<B>
    where
        B: Clone + Send + Sync + 'static,
        F: Fn(&T) -> Pattern<B> + Send + Sync + 'static,
    {
        self.fmap(func).squeeze_join()
    }

    /// Impose a boolean rhythm on this pattern
    ///
    /// Events occur where the structure pattern is true, taking their
    /// timing from the structure and their values from this pattern.
    pub fn struct_with(self, structure: Pattern<bool>) -> Pattern<T> {
        structure
            .filter_values(|on| *on)
            .zip_left(self, |_, value| value.clone())
    }

    /// Randomly drop events with the given probability
    ///
    /// Randomness is seeded per event onset, so a given event is kept or
    /// dropped consistently no matter how the pattern is queried.
    pub fn degrade_by(self, amount: f64, seed: u64) -> Pattern<T> {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        self.filter_haps(move |hap| {
            let onset = hap.whole_or_part().begin;
            let mix = (onset.numerator as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
                ^ (onset.denominator as u64).rotate_left(31);
            let mut rng = StdRng::seed_from_u64(seed ^ mix);
            rng.gen::<f64>() >= amount
        })
    }

    /// Randomly drop half of the events
    pub fn degrade(self) -> Pattern<T> {
        self.degrade_by(0.5, 0)
    }

    /// Speed the pattern up by a time-varying factor
    pub fn fast_p(self, factor: Pattern<Fraction>) -> Pattern<T> {
        temporal_param(|f: &Fraction, p: Pattern<T>| p.fast(*f), factor, self)
    }

    /// Slow the pattern down by a time-varying factor
    pub fn slow_p(self, factor: Pattern<Fraction>) -> Pattern<T> {
        temporal_param(|f: &Fraction, p: Pattern<T>| p.slow(*f), factor, self)
    }

    /// Shift the pattern earlier by a time-varying amount
    pub fn early_p(self, amount: Pattern<Fraction>) -> Pattern<T> {
        temporal_param(|a: &Fraction, p: Pattern<T>| p.early(*a), amount, self)
    }

    /// Shift the pattern later by a time-varying amount
    pub fn late_p(self, amount: Pattern<Fraction>) -> Pattern<T> {
        temporal_param(|a: &Fraction, p: Pattern<T>| p.late(*a), amount, self)
    }
}

impl<A, B> Pattern<ValFn<A, B>>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    /// Apply a pattern of functions to a pattern of values, keeping
    /// structure from both sides
    pub fn app_both(self, values: Pattern<A>) -> Pattern<B> {
        self.zip_both(values, |func, value| func(value))
    }

    /// Apply a pattern of functions to a pattern of values, keeping
    /// structure from the functions
    pub fn app_left(self, values: Pattern<A>) -> Pattern<B> {
        self.zip_left(values, |func, value| func(value))
    }

    /// Apply a pattern of functions to a pattern of values, keeping
    /// structure from the values
    pub fn app_right(self, values: Pattern<A>) -> Pattern<B> {
        self.zip_right(values, |func, value| func(value))
    }
}

impl<T: Clone + Send + Sync + 'static> Pattern<Pattern<T>> {
    /// Flatten a pattern of patterns
    ///
    /// Each outer event is replaced by the inner pattern's events within
    /// the outer part; wholes and parts are intersected so inner events
    /// never escape their outer window.
    pub fn join(self) -> Pattern<T> {
        Pattern::new(move |state| {
            let mut haps = Vec::new();
            for outer in self.query(state) {
                for inner in outer.value.query(&state.set_span(outer.part)) {
                    let part = match outer.part.intersection(&inner.part) {
                        Some(part) => part,
                        None => continue,
                    };
                    let whole = match (outer.whole, inner.whole) {
                        (Some(a), Some(b)) => match a.intersection(&b) {
                            Some(whole) => Some(whole),
                            None => continue,
                        },
                        _ => None,
                    };
                    haps.push(Hap::new(whole, part, inner.value.clone()));
                }
            }
            haps
        })
    }

    /// Flatten a pattern of patterns, compressing each inner pattern into
    /// the event that carries it
    ///
    /// One cycle of the inner pattern plays inside each outer event's
    /// whole, at whatever speed makes it fit.
    pub fn squeeze_join(self) -> Pattern<T> {
        Pattern::new(move |state| {
            let mut haps = Vec::new();
            for outer in self.query(state) {
                let window = outer.whole_or_part();
                let begin = window.begin.cycle_pos();
                let focus = TimeSpan::new(begin, begin + window.duration());
                let squeezed = outer.value.clone().compress(focus);
                for inner in squeezed.query(&state.set_span(outer.part)) {
                    let part = match outer.part.intersection(&inner.part) {
                        Some(part) => part,
                        None => continue,
                    };
                    let whole = match (outer.whole, inner.whole) {
                        (Some(a), Some(b)) => match a.intersection(&b) {
                            Some(whole) => Some(whole),
                            None => continue,
                        },
                        _ => None,
                    };
                    haps.push(Hap::new(whole, part, inner.value.clone()));
                }
            }
            haps
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Pattern<Option<T>> {
    /// Drop empty values and unwrap the rest
    pub fn filter_some(self) -> Pattern<T> {
        Pattern::new(move |state| {
            self.query(state)
                .into_iter()
                .filter_map(|hap| {
                    let value = hap.value.clone()?;
                    Some(Hap::new(hap.whole, hap.part, value))
                })
                .collect()
        })
    }
}

/// Lift an operator over a plain parameter to one over a patterned
/// parameter
///
/// The parameter pattern's structure decides when each parameter value is
/// in force; the operator is applied with that value over the matching
/// window.
pub fn temporal_param<A, B, C, F>(func: F, param: Pattern<A>, pattern: Pattern<B>) -> Pattern<C>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    F: Fn(&A, Pattern<B>) -> Pattern<C> + Send + Sync + 'static,
{
    param.fmap(move |a| func(a, pattern.clone())).join()
}

/// Two-parameter version of [`temporal_param`]
pub fn temporal_param2<A, B, C, D, F>(
    func: F,
    first: Pattern<A>,
    second: Pattern<B>,
    pattern: Pattern<C>,
) -> Pattern<D>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    F: Fn(&A, &B, Pattern<C>) -> Pattern<D> + Send + Sync + 'static,
{
    first
        .zip_both(second, |a, b| (a.clone(), b.clone()))
        .fmap(move |(a, b)| func(a, b, pattern.clone()))
        .join()
}

/// Three-parameter version of [`temporal_param`]
pub fn temporal_param3<A, B, C, D, E, F>(
    func: F,
    first: Pattern<A>,
    second: Pattern<B>,
    third: Pattern<C>,
    pattern: Pattern<D>,
) -> Pattern<E>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(&A, &B, &C, Pattern<D>) -> Pattern<E> + Send + Sync + 'static,
{
    first
        .zip_both(second, |a, b| (a.clone(), b.clone()))
        .zip_both(third, |(a, b), c| (a.clone(), b.clone(), c.clone()))
        .fmap(move |(a, b, c)| func(a, b, c, pattern.clone()))
        .join()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{fastcat, from_list, pure, slowcat};

    fn span(b: (i64, i64), e: (i64, i64)) -> TimeSpan {
        TimeSpan::new(Fraction::new(b.0, b.1), Fraction::new(e.0, e.1))
    }

    fn frac(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d)
    }

    #[test]
    fn test_fmap() {
        let pattern = pure(10).fmap(|n| n + 5);
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 1);
        assert_eq!(haps[0].value, 15);
    }

    #[test]
    fn test_fast() {
        let pattern = pure("x").fast(2);
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].part, span((0, 1), (1, 2)));
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 2))));
        assert_eq!(haps[1].part, span((1, 2), (1, 1)));
        assert_eq!(haps[1].whole, Some(span((1, 2), (1, 1))));
    }

    #[test]
    fn test_fast_zero_is_silence() {
        let pattern = pure("x").fast(0);
        assert!(pattern.query_span(TimeSpan::from_ints(0, 4)).is_empty());
    }

    #[test]
    fn test_fast_negative_reverses() {
        let forward = fastcat(vec![pure("a"), pure("b")]).fast(2).rev();
        let negative = fastcat(vec![pure("a"), pure("b")]).fast(-2);
        let span = TimeSpan::from_ints(0, 1);
        assert_eq!(forward.query_span(span), negative.query_span(span));
    }

    #[test]
    fn test_slow_matches_fast_reciprocal() {
        let slowed = fastcat(vec![pure(1), pure(2)]).slow(frac(3, 2));
        let fasted = fastcat(vec![pure(1), pure(2)]).fast(frac(2, 3));
        let span = TimeSpan::from_ints(0, 3);
        assert_eq!(slowed.query_span(span), fasted.query_span(span));
    }

    #[test]
    fn test_early() {
        let pattern = pure("x").early(frac(1, 4));
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].whole, Some(span((-1, 4), (3, 4))));
        assert_eq!(haps[0].part, span((0, 1), (3, 4)));
        assert_eq!(haps[1].whole, Some(span((3, 4), (7, 4))));
        assert_eq!(haps[1].part, span((3, 4), (1, 1)));
    }

    #[test]
    fn test_rotation_inverse() {
        let pattern = fastcat(vec![pure("a"), pure("b")])
            .late(frac(1, 3))
            .early(frac(1, 3));
        let plain = fastcat(vec![pure("a"), pure("b")]);
        let span = TimeSpan::from_ints(0, 2);
        assert_eq!(pattern.query_span(span), plain.query_span(span));
    }

    #[test]
    fn test_rev() {
        let pattern = fastcat(vec![pure("a"), pure("b")]).rev();
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, "b");
        assert_eq!(haps[0].part, span((0, 1), (1, 2)));
        assert_eq!(haps[1].value, "a");
        assert_eq!(haps[1].part, span((1, 2), (1, 1)));
    }

    #[test]
    fn test_rev_rev_is_identity() {
        let pattern = fastcat(vec![pure(1), pure(2), pure(3)]);
        let twice = pattern.clone().rev().rev();
        let span = TimeSpan::from_ints(0, 2);
        assert_eq!(twice.query_span(span), pattern.query_span(span));
    }

    #[test]
    fn test_rev_across_cycles() {
        // Each cycle reverses independently
        let pattern = slowcat(vec![pure("a"), pure("b")]).fast(2).rev();
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, "b");
        assert_eq!(haps[1].value, "a");
    }

    #[test]
    fn test_zoom() {
        let pattern =
            fastcat(vec![pure("a"), pure("b"), pure("c"), pure("d")]).zoom(span((1, 4), (3, 4)));
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, "b");
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 2))));
        assert_eq!(haps[1].value, "c");
        assert_eq!(haps[1].whole, Some(span((1, 2), (1, 1))));
    }

    #[test]
    fn test_zoom_empty_slice_is_silence() {
        let pattern = pure("x").zoom(span((1, 2), (1, 2)));
        assert!(pattern.query_span(TimeSpan::from_ints(0, 1)).is_empty());
    }

    #[test]
    fn test_fast_gap() {
        let pattern = fastcat(vec![pure("a"), pure("b")]).fast_gap(2);
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].part, span((0, 1), (1, 4)));
        assert_eq!(haps[1].part, span((1, 4), (1, 2)));

        // The second half of the cycle is a gap
        let tail = pattern.query_span(span((1, 2), (1, 1)));
        assert!(tail.is_empty());
    }

    #[test]
    fn test_fast_gap_second_cycle() {
        let pattern = pure("x").fast_gap(2);
        let haps = pattern.query_span(TimeSpan::from_ints(1, 2));
        assert_eq!(haps.len(), 1);
        assert_eq!(haps[0].part, span((1, 1), (3, 2)));
        assert_eq!(haps[0].whole, Some(span((1, 1), (3, 2))));
    }

    #[test]
    fn test_fast_gap_zero_is_silence() {
        let pattern = pure("x").fast_gap(0);
        assert!(pattern.query_span(TimeSpan::from_ints(0, 1)).is_empty());
    }

    #[test]
    fn test_compress() {
        let pattern = fastcat(vec![pure("a"), pure("b")]).compress(span((1, 4), (3, 4)));
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, "a");
        assert_eq!(haps[0].part, span((1, 4), (1, 2)));
        assert_eq!(haps[1].value, "b");
        assert_eq!(haps[1].part, span((1, 2), (3, 4)));
    }

    #[test]
    fn test_compress_full_cycle_is_identity() {
        let pattern = fastcat(vec![pure(1), pure(2)]);
        let compressed = pattern.clone().compress(span((0, 1), (1, 1)));
        let span = TimeSpan::from_ints(0, 2);
        assert_eq!(compressed.query_span(span), pattern.query_span(span));
    }

    #[test]
    fn test_compress_invalid_bounds_is_silence() {
        let span01 = TimeSpan::from_ints(0, 1);
        assert!(pure("x")
            .compress(span((3, 4), (1, 4)))
            .query_span(span01)
            .is_empty());
        assert!(pure("x")
            .compress(span((1, 2), (1, 2)))
            .query_span(span01)
            .is_empty());
        assert!(pure("x")
            .compress(span((1, 2), (3, 2)))
            .query_span(span01)
            .is_empty());
        assert!(pure("x")
            .compress(span((-1, 4), (1, 2)))
            .query_span(span01)
            .is_empty());
    }

    #[test]
    fn test_when() {
        let pattern = pure("x").when(|cycle| cycle % 2 == 0, |p| p.fast(2));
        assert_eq!(pattern.query_span(TimeSpan::from_ints(0, 1)).len(), 2);
        assert_eq!(pattern.query_span(TimeSpan::from_ints(1, 2)).len(), 1);
        // A query across both cycles sees both behaviours
        assert_eq!(pattern.query_span(TimeSpan::from_ints(0, 2)).len(), 3);
    }

    #[test]
    fn test_when_negative_cycles() {
        let pattern = pure("x").when(|cycle| cycle % 2 == 0, |p| p.fast(2));
        assert_eq!(pattern.query_span(TimeSpan::from_ints(-2, -1)).len(), 2);
        assert_eq!(pattern.query_span(TimeSpan::from_ints(-1, 0)).len(), 1);
    }

    #[test]
    fn test_when_time() {
        let pattern = pure("x").when_time(|t| t < Fraction::from_int(2), |p| p.fast(2));
        assert_eq!(pattern.query_span(TimeSpan::from_ints(0, 1)).len(), 2);
        assert_eq!(pattern.query_span(TimeSpan::from_ints(2, 3)).len(), 1);
    }

    #[test]
    fn test_every() {
        let pattern = pure("x").every(3, |p| p.fast(2));
        assert_eq!(pattern.query_span(TimeSpan::from_ints(0, 1)).len(), 2);
        assert_eq!(pattern.query_span(TimeSpan::from_ints(1, 2)).len(), 1);
        assert_eq!(pattern.query_span(TimeSpan::from_ints(2, 3)).len(), 1);
        assert_eq!(pattern.query_span(TimeSpan::from_ints(3, 4)).len(), 2);
    }

    #[test]
    fn test_app_both() {
        let funcs: Pattern<ValFn<i64, i64>> = pure(Arc::new(|x: &i64| x + 1) as ValFn<i64, i64>);
        let haps = funcs.app_both(pure(10)).query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 1);
        assert_eq!(haps[0].value, 11);
        assert_eq!(haps[0].whole, Some(TimeSpan::from_ints(0, 1)));
        assert_eq!(haps[0].part, TimeSpan::from_ints(0, 1));
    }

    #[test]
    fn test_zip_both_intersects_structure() {
        let left = fastcat(vec![pure(1), pure(2)]);
        let right = fastcat(vec![pure(10), pure(20), pure(30)]);
        let haps = left
            .zip_both(right, |a, b| a + b)
            .query_span(TimeSpan::from_ints(0, 1));
        // Thirds against halves give four fragments
        assert_eq!(haps.len(), 4);
        assert_eq!(haps[0].value, 11);
        assert_eq!(haps[0].part, span((0, 1), (1, 3)));
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 3))));
        assert_eq!(haps[1].value, 21);
        assert_eq!(haps[1].part, span((1, 3), (1, 2)));
        assert_eq!(haps[1].whole, Some(span((1, 3), (1, 2))));
        assert_eq!(haps[2].value, 22);
        assert_eq!(haps[2].part, span((1, 2), (2, 3)));
        assert_eq!(haps[3].value, 32);
        assert_eq!(haps[3].part, span((2, 3), (1, 1)));
    }

    #[test]
    fn test_zip_left_keeps_left_structure() {
        let left = fastcat(vec![pure(1), pure(2)]);
        let right = fastcat(vec![pure(10), pure(20), pure(30)]);
        let haps = left
            .zip_left(right, |a, b| a + b)
            .query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        // Values are sampled at each left event's onset
        assert_eq!(haps[0].value, 11);
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 2))));
        assert_eq!(haps[0].part, span((0, 1), (1, 2)));
        assert_eq!(haps[1].value, 22);
        assert_eq!(haps[1].whole, Some(span((1, 2), (1, 1))));
        assert_eq!(haps[1].part, span((1, 2), (1, 1)));
    }

    #[test]
    fn test_zip_right_keeps_right_structure() {
        let left = fastcat(vec![pure(1), pure(2)]);
        let right = fastcat(vec![pure(10), pure(20), pure(30)]);
        let haps = left
            .zip_right(right, |a, b| a + b)
            .query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 3);
        assert_eq!(haps[0].value, 11);
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 3))));
        assert_eq!(haps[1].value, 21);
        assert_eq!(haps[1].whole, Some(span((1, 3), (2, 3))));
        assert_eq!(haps[2].value, 32);
        assert_eq!(haps[2].whole, Some(span((2, 3), (1, 1))));
    }

    #[test]
    fn test_bind() {
        let pattern = from_list(vec![0, 1]).bind(|n| {
            if *n == 0 {
                pure("a")
            } else {
                pure("b")
            }
        });
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, "a");
        assert_eq!(haps[0].part, span((0, 1), (1, 2)));
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 2))));
        assert_eq!(haps[1].value, "b");
        assert_eq!(haps[1].part, span((1, 2), (1, 1)));
    }

    #[test]
    fn test_join_clips_inner_to_outer() {
        let inner = pure("x");
        let outer = fastcat(vec![pure(inner), crate::combinators::silence()]);
        let haps = outer.join().query_span(TimeSpan::from_ints(0, 1));
        // The inner cycle-long event is clipped to the first half
        assert_eq!(haps.len(), 1);
        assert_eq!(haps[0].part, span((0, 1), (1, 2)));
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 2))));
    }

    #[test]
    fn test_squeeze_join() {
        let outer = from_list(vec![
            fastcat(vec![pure("a"), pure("b")]),
            pure("c"),
        ]);
        let haps = outer.squeeze_join().query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 3);
        assert_eq!(haps[0].value, "a");
        assert_eq!(haps[0].part, span((0, 1), (1, 4)));
        assert_eq!(haps[1].value, "b");
        assert_eq!(haps[1].part, span((1, 4), (1, 2)));
        assert_eq!(haps[2].value, "c");
        assert_eq!(haps[2].part, span((1, 2), (1, 1)));
    }

    #[test]
    fn test_filter_values() {
        let pattern = from_list(vec![1, 2, 3, 4]).filter_values(|n| n % 2 == 0);
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, 2);
        assert_eq!(haps[1].value, 4);
    }

    #[test]
    fn test_filter_some() {
        let pattern = from_list(vec![Some("a"), None, Some("b")]).filter_some();
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, "a");
        assert_eq!(haps[1].value, "b");
    }

    #[test]
    fn test_temporal_param_fast() {
        let pattern = pure("x").fast_p(from_list(vec![frac(1, 1), frac(2, 1)]));
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        // First half plays at normal speed, second half doubled
        assert_eq!(haps[0].part, span((0, 1), (1, 2)));
        assert_eq!(haps[1].part, span((1, 2), (1, 1)));
        assert_eq!(haps[1].whole, Some(span((1, 2), (1, 1))));
    }

    #[test]
    fn test_temporal_param2() {
        let pattern = temporal_param2(
            |b: &Fraction, e: &Fraction, p: Pattern<&'static str>| {
                p.compress(TimeSpan::new(*b, *e))
            },
            pure(frac(1, 4)),
            pure(frac(3, 4)),
            pure("x"),
        );
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 1);
        assert_eq!(haps[0].part, span((1, 4), (3, 4)));
    }

    #[test]
    fn test_struct_with() {
        let rhythm = from_list(vec![true, false, true, false]);
        let pattern = pure("bd").struct_with(rhythm);
        let haps = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].value, "bd");
        assert_eq!(haps[0].whole, Some(span((0, 1), (1, 4))));
        assert_eq!(haps[1].value, "bd");
        assert_eq!(haps[1].whole, Some(span((1, 2), (3, 4))));
    }

    #[test]
    fn test_degrade_extremes() {
        let pattern = from_list(vec![1, 2, 3, 4]);
        let all = pattern.clone().degrade_by(0.0, 0);
        let none = pattern.degrade_by(1.0, 0);
        assert_eq!(all.query_span(TimeSpan::from_ints(0, 1)).len(), 4);
        assert!(none.query_span(TimeSpan::from_ints(0, 1)).is_empty());
    }

    #[test]
    fn test_degrade_deterministic() {
        let pattern = from_list(vec![1, 2, 3, 4, 5, 6, 7, 8]).degrade_by(0.5, 7);
        let first = pattern.query_span(TimeSpan::from_ints(0, 1));
        let second = pattern.query_span(TimeSpan::from_ints(0, 1));
        assert_eq!(first, second);

        // Keeping or dropping is per event, independent of the query arc
        let halves: Vec<_> = pattern
            .query_span(span((0, 1), (1, 2)))
            .into_iter()
            .chain(pattern.query_span(span((1, 2), (1, 1))))
            .collect();
        assert_eq!(halves, first);
    }

    #[test]
    fn test_split_queries_multi_cycle() {
        let pattern = pure("x").rev();
        let haps = pattern.query_span(TimeSpan::from_ints(0, 3));
        assert_eq!(haps.len(), 3);
        for (i, hap) in haps.iter().enumerate() {
            assert_eq!(hap.part, TimeSpan::from_ints(i as i64, i as i64 + 1));
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_fraction() -> impl Strategy<Value = Fraction> {
            (-16i64..16, 1i64..8).prop_map(|(n, d)| Fraction::new(n, d))
        }

        fn arb_span() -> impl Strategy<Value = TimeSpan> {
            (arb_fraction(), arb_fraction())
                .prop_map(|(a, b)| TimeSpan::new(a.min(b), a.max(b)))
        }

        fn sample_pattern() -> Pattern<i64> {
            fastcat(vec![pure(1), pure(2), pure(3)])
        }

        proptest! {
            #[test]
            fn parts_stay_inside_query_and_whole(span in arb_span()) {
                for hap in sample_pattern().query_span(span) {
                    prop_assert!(hap.part.begin >= span.begin);
                    prop_assert!(hap.part.end <= span.end);
                    let whole = hap.whole.unwrap();
                    prop_assert!(hap.part.begin >= whole.begin);
                    prop_assert!(hap.part.end <= whole.end);
                }
            }

            #[test]
            fn fast_composes_multiplicatively(
                r in (1i64..6, 1i64..4).prop_map(|(n, d)| Fraction::new(n, d)),
                s in (1i64..6, 1i64..4).prop_map(|(n, d)| Fraction::new(n, d)),
                span in arb_span(),
            ) {
                let nested = sample_pattern().fast(r).fast(s);
                let flat = sample_pattern().fast(r * s);
                prop_assert_eq!(nested.query_span(span), flat.query_span(span));
            }

            #[test]
            fn slow_is_fast_reciprocal(
                r in (1i64..6, 1i64..4).prop_map(|(n, d)| Fraction::new(n, d)),
                span in arb_span(),
            ) {
                let slowed = sample_pattern().slow(r);
                let fasted = sample_pattern().fast(r.reciprocal());
                prop_assert_eq!(slowed.query_span(span), fasted.query_span(span));
            }

            #[test]
            fn rotation_round_trips(t in arb_fraction(), span in arb_span()) {
                let rotated = sample_pattern().late(t).early(t);
                prop_assert_eq!(
                    rotated.query_span(span),
                    sample_pattern().query_span(span)
                );
            }

            #[test]
            fn rotations_accumulate(
                t in arb_fraction(),
                u in arb_fraction(),
                span in arb_span(),
            ) {
                let stepped = sample_pattern().early(t).early(u);
                let joined = sample_pattern().early(t + u);
                prop_assert_eq!(stepped.query_span(span), joined.query_span(span));
            }

            #[test]
            fn rev_is_an_involution(begin in -8i64..8, len in 1i64..4) {
                let span = TimeSpan::from_ints(begin, begin + len);
                let twice = sample_pattern().rev().rev();
                prop_assert_eq!(
                    twice.query_span(span),
                    sample_pattern().query_span(span)
                );
            }

            #[test]
            fn compress_full_cycle_is_identity(span in arb_span()) {
                let compressed = sample_pattern()
                    .compress(TimeSpan::from_ints(0, 1));
                prop_assert_eq!(
                    compressed.query_span(span),
                    sample_pattern().query_span(span)
                );
            }
        }
    }
}
