//! Euclidean rhythm generation
//!
//! The Bjorklund algorithm distributes a number of pulses as evenly as
//! possible across a number of steps. Combined with
//! [`struct_with`](crate::Pattern::struct_with), the resulting boolean
//! pattern imposes the classic Euclidean rhythms on any value pattern.

use crate::combinators::{from_list, silence};
use crate::Pattern;

/// Distribute `pulses` onsets as evenly as possible over `steps` slots
///
/// Returns one boolean per slot, `true` marking an onset.
///
/// # Examples
/// ```
/// use ostinato_core::bjorklund;
///
/// let pattern = bjorklund(3, 8);
/// assert_eq!(pattern.len(), 8);
/// assert_eq!(pattern.iter().filter(|&&on| on).count(), 3);
/// ```
pub fn bjorklund(pulses: usize, steps: usize) -> Vec<bool> {
    if steps == 0 {
        return Vec::new();
    }
    if pulses == 0 {
        return vec![false; steps];
    }
    if pulses >= steps {
        return vec![true; steps];
    }

    // Repeatedly pair the leading groups with the remainder until at most
    // one remainder group is left
    let mut groups: Vec<Vec<bool>> = vec![vec![true]; pulses];
    let mut remainder: Vec<Vec<bool>> = vec![vec![false]; steps - pulses];

    while remainder.len() > 1 {
        let pairs = groups.len().min(remainder.len());
        let mut paired = Vec::with_capacity(pairs);
        for _ in 0..pairs {
            let mut group = groups.remove(0);
            group.extend(remainder.remove(0));
            paired.push(group);
        }
        let leftover = if groups.is_empty() {
            std::mem::take(&mut remainder)
        } else {
            std::mem::take(&mut groups)
        };
        groups = paired;
        remainder = leftover;
    }

    groups.into_iter().chain(remainder).flatten().collect()
}

/// A one-cycle boolean pattern carrying a Euclidean rhythm
///
/// `rotation` shifts the rhythm left by that many steps; negative values
/// shift right.
pub fn euclid(pulses: usize, steps: usize, rotation: i64) -> Pattern<bool> {
    let mut rhythm = bjorklund(pulses, steps);
    if rhythm.is_empty() {
        return silence();
    }
    if rotation != 0 {
        let rot = rotation.rem_euclid(rhythm.len() as i64) as usize;
        rhythm.rotate_left(rot);
    }
    from_list(rhythm)
}
