//! Keyed dedup and index building.
//!
//! Both sides use last-write-wins: the record seen latest for a key is the one
//! kept. The left side keeps the position of the key's first appearance.

use std::collections::HashMap;

use crate::key::MatchKey;
use crate::model::{DuplicateKey, Side};

/// A record that survived filtering, with its input position and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyed {
    pub index: usize,
    pub key: MatchKey,
}

/// Ordered last-wins dedup.
///
/// Iterates in input order and overwrites on key collision. The output holds
/// one entry per distinct key, placed where the key first appeared, carrying
/// the last record's index.
pub fn dedup_last_wins(side: Side, keyed: &[Keyed]) -> (Vec<Keyed>, Vec<DuplicateKey>) {
    let mut slots: HashMap<&MatchKey, usize> = HashMap::new();
    let mut unique: Vec<Keyed> = Vec::new();
    let mut seen: Vec<Vec<usize>> = Vec::new();

    for k in keyed {
        match slots.get(&k.key) {
            Some(&slot) => {
                unique[slot].index = k.index;
                seen[slot].push(k.index);
            }
            None => {
                slots.insert(&k.key, unique.len());
                unique.push(k.clone());
                seen.push(vec![k.index]);
            }
        }
    }

    let duplicates = collect_duplicates(side, &unique, seen);
    (unique, duplicates)
}

/// One-to-one key -> index map (last wins), plus the duplicate report.
pub fn index_last_wins(
    side: Side,
    keyed: &[Keyed],
) -> (HashMap<MatchKey, usize>, Vec<DuplicateKey>) {
    let (unique, duplicates) = dedup_last_wins(side, keyed);
    let index = unique.into_iter().map(|k| (k.key, k.index)).collect();
    (index, duplicates)
}

fn collect_duplicates(side: Side, unique: &[Keyed], seen: Vec<Vec<usize>>) -> Vec<DuplicateKey> {
    unique
        .iter()
        .zip(seen)
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(k, mut indices)| {
            let kept_index = indices.pop().unwrap_or(k.index);
            DuplicateKey {
                side,
                key: k.key.clone(),
                count: indices.len() + 1,
                kept_index,
                dropped_indices: indices,
            }
        })
        .collect()
}
