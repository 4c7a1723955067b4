// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Merge Engine's pure types (§3, §4.7, §9). The actual rewiring of
//! edges and claims is storage-aware and lives in `discograph-usecases`;
//! this module holds the immutable `MergeRecord` and the cycle-detection
//! algorithm over an abstract `merged_into` relation.

use serde::{Deserialize, Serialize};

use crate::{
    entity::{EntityKind, Id},
    util::clock::Timestamp,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeRecord {
    pub merge_id: String,
    pub survivor_id: Id,
    pub absorbed_id: Id,
    pub kind: EntityKind,
    pub reason: Option<String>,
    pub event_hash: String,
    pub timestamp: Timestamp,
}

/// Reasons a merge is rejected before anything is written (§4.7, §7).
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    #[error("cannot merge an entity into itself")]
    SelfMerge,
    #[error("merge would create a cycle in the merged_into relation")]
    Cycle,
}

/// Walks the `merged_into` chain starting from `absorbed`, using `lookup`
/// to resolve one hop at a time, and fails if the chain ever reaches
/// `survivor` — which covers both the direct A↔B case and longer
/// transitive cycles A→B→C→A (§4.7, §8).
///
/// `lookup(id)` returns `Some(merged_into)` if `id` is currently a
/// tombstone, `None` if it is live (chain ends there).
pub fn check_no_cycle<F>(survivor: &Id, absorbed: &[Id], mut lookup: F) -> Result<(), CycleError>
where
    F: FnMut(&Id) -> Option<Id>,
{
    for absorbed_id in absorbed {
        if absorbed_id == survivor {
            return Err(CycleError::SelfMerge);
        }
        // Would merging `absorbed_id` into `survivor` let a later walk from
        // `survivor` loop back to `absorbed_id`? Equivalently: does
        // `survivor`'s existing tombstone chain already reach `absorbed_id`?
        let mut current = survivor.clone();
        let mut steps = 0usize;
        while let Some(next) = lookup(&current) {
            steps += 1;
            if steps > 10_000 {
                // A pre-existing malformed chain; treat as a cycle rather
                // than looping forever.
                return Err(CycleError::Cycle);
            }
            if &next == absorbed_id {
                return Err(CycleError::Cycle);
            }
            current = next;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_fn(map: &HashMap<&str, &str>) -> impl Fn(&Id) -> Option<Id> + '_ {
        move |id| map.get(id.as_str()).map(|s| Id::new(*s))
    }

    #[test]
    fn self_merge_rejected() {
        let a = Id::new("a");
        let map = HashMap::new();
        assert_eq!(
            check_no_cycle(&a, &[a.clone()], lookup_fn(&map)),
            Err(CycleError::SelfMerge)
        );
    }

    #[test]
    fn direct_cycle_rejected() {
        // B was already merged into A; merging A into B would cycle.
        let mut map = HashMap::new();
        map.insert("b", "a");
        let a = Id::new("a");
        let b = Id::new("b");
        assert_eq!(
            check_no_cycle(&b, &[a], lookup_fn(&map)),
            Err(CycleError::Cycle)
        );
    }

    #[test]
    fn transitive_cycle_rejected() {
        // C -> B -> A already; merging A into C would close the loop.
        let mut map = HashMap::new();
        map.insert("c", "b");
        map.insert("b", "a");
        let a = Id::new("a");
        let c = Id::new("c");
        assert_eq!(
            check_no_cycle(&c, &[a], lookup_fn(&map)),
            Err(CycleError::Cycle)
        );
    }

    #[test]
    fn unrelated_merge_accepted() {
        let map = HashMap::new();
        let survivor = Id::new("a");
        let absorbed = Id::new("b");
        assert_eq!(check_no_cycle(&survivor, &[absorbed], lookup_fn(&map)), Ok(()));
    }
}
