//! Latest-observation-per-key selection.

use std::collections::HashMap;
use std::hash::Hash;

use perimeter_common::Feature;
use tracing::debug;

use crate::config::DedupConfig;

/// Keep one item per key: the one with the greatest tiebreak value.
///
/// Items missing either the key or the tiebreak are dropped. Output keeps
/// the order in which each key was first seen; a replacement takes the slot
/// of the item it replaces. Ties keep the earlier item.
pub fn dedup_by<T, K, V, FK, FV>(items: Vec<T>, key_fn: FK, tiebreak_fn: FV) -> Vec<T>
where
    K: Eq + Hash,
    V: PartialOrd,
    FK: Fn(&T) -> Option<K>,
    FV: Fn(&T) -> Option<V>,
{
    let mut slots: Vec<(V, T)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for item in items {
        let (Some(key), Some(rank)) = (key_fn(&item), tiebreak_fn(&item)) else {
            continue;
        };

        match index.get(&key) {
            Some(&slot) => {
                if rank > slots[slot].0 {
                    slots[slot] = (rank, item);
                }
            }
            None => {
                index.insert(key, slots.len());
                slots.push((rank, item));
            }
        }
    }

    slots.into_iter().map(|(_, item)| item).collect()
}

/// Keep the latest observation of each mission.
///
/// The tiebreak may be a JSON number or a numeric string (`"12"`). A feature
/// whose tiebreak is neither, or whose key is null or missing, is dropped.
pub fn dedup_features(features: Vec<Feature>, config: &DedupConfig) -> Vec<Feature> {
    let before = features.len();
    let kept = dedup_by(
        features,
        |f| f.attribute_key(&config.key_field),
        |f| f.attribute_number(&config.tiebreak_field),
    );
    debug!(
        key = %config.key_field,
        before,
        after = kept.len(),
        "Deduplicated features"
    );
    kept
}
