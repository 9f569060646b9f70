//! # Categorical Aggregator
//!
//! Group-by-key counting over the full dataset. Failed messages count here
//! too: every observation lands in exactly one group, so the counts always
//! sum to the number of observations.

use crate::record::{Dataset, Observation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Ordering applied to the aggregated groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountOrder {
    /// Ascending by key
    ByKeyAscending,
    /// Descending by count; ties keep first-encountered key order
    ByCountDescending,
}

/// Number of observations sharing one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount<K> {
    pub key: K,
    pub count: usize,
}

impl<K> CategoryCount<K> {
    /// Share of `total` as a percentage, 0 when `total` is 0
    pub fn percentage_of(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            100.0 * self.count as f64 / total as f64
        }
    }
}

/// Count observations per key and order the groups
pub fn aggregate_by<K, F>(
    observations: &[Observation],
    key_fn: F,
    order: CountOrder,
) -> Vec<CategoryCount<K>>
where
    K: Eq + Hash + Ord + Clone,
    F: Fn(&Observation) -> K,
{
    // Groups are kept in first-encountered order so the stable sort below
    // breaks count ties deterministically.
    let mut groups: Vec<CategoryCount<K>> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for observation in observations {
        let key = key_fn(observation);
        match index.get(&key) {
            Some(&slot) => groups[slot].count += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(CategoryCount { key, count: 1 });
            }
        }
    }

    match order {
        CountOrder::ByKeyAscending => groups.sort_by(|a, b| a.key.cmp(&b.key)),
        CountOrder::ByCountDescending => groups.sort_by(|a, b| b.count.cmp(&a.count)),
    }

    groups
}

/// Messages per room, ascending by room id
pub fn room_breakdown(dataset: &Dataset) -> Vec<CategoryCount<i32>> {
    aggregate_by(dataset.observations(), |o| o.room_id, CountOrder::ByKeyAscending)
}

/// Messages per type, most frequent first
pub fn message_type_breakdown(dataset: &Dataset) -> Vec<CategoryCount<String>> {
    aggregate_by(
        dataset.observations(),
        |o| o.message_type.clone(),
        CountOrder::ByCountDescending,
    )
}
