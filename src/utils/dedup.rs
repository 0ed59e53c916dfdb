//! Exact duplicate detection for exported rows.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Find items that are exactly equal to each other
///
/// Returns groups of indices, in order of first occurrence. Items without an
/// equal partner are not reported.
pub fn find_duplicates<T: Eq + Hash>(items: &[T]) -> Vec<Vec<usize>> {
    let mut groups: HashMap<&T, Vec<usize>> = HashMap::new();
    let mut order: Vec<&T> = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let group = groups.entry(item).or_default();
        if group.is_empty() {
            order.push(item);
        }
        group.push(idx);
    }

    order
        .into_iter()
        .filter_map(|item| groups.remove(item))
        .filter(|group| group.len() > 1)
        .collect()
}

/// Indices to drop so that the first item of each duplicate group survives
pub fn duplicate_indices(groups: &[Vec<usize>]) -> HashSet<usize> {
    groups
        .iter()
        .flat_map(|group| group.iter().skip(1).copied())
        .collect()
}
