//! Trail cleanup.
//!
//! An ant wanders: it may pass through the same node several times before
//! reaching the goal. Only the loop-free route is worth reinforcing, so a
//! trail is "unlooped" before its pheromone is laid down.

use std::collections::HashMap;
use std::hash::Hash;

/// Remove every revisit cycle from a trail.
///
/// For each node the last occurrence wins: walking from the start, the
/// current node is kept and the walk jumps straight past its final
/// occurrence. `[1, 2, 4, 5, 2, 6, 7]` becomes `[1, 2, 6, 7]`.
///
/// The first and last elements always survive, every element in the
/// result is distinct, and unlooping an unlooped trail changes nothing.
pub fn unloop<T: Copy + Eq + Hash>(steps: &[T]) -> Vec<T> {
    let mut last_index: HashMap<T, usize> = HashMap::with_capacity(steps.len());
    for (idx, step) in steps.iter().enumerate() {
        last_index.insert(*step, idx);
    }

    let mut unlooped = Vec::with_capacity(steps.len());
    let mut idx = 0;
    while idx < steps.len() {
        let step = steps[idx];
        unlooped.push(step);
        idx = last_index[&step] + 1;
    }
    unlooped
}

/// Consecutive pairs of a trail, i.e. the edges it walked.
pub fn hops<T: Copy>(steps: &[T]) -> impl Iterator<Item = (T, T)> + '_ {
    steps.windows(2).map(|w| (w[0], w[1]))
}
