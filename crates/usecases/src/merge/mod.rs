// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Merge Engine (§4.7): absorbs one or more entities into a survivor,
//! rewiring edges, copying missing scalar attributes, and tombstoning the
//! absorbed nodes. Cycle detection is the pure algorithm in
//! [`discograph_core::merge`]; this module supplies the storage-backed
//! `merged_into` lookup and drives the transaction.

use discograph_core::{
    entity::{EntityKind, EntityStatus, Id},
    merge::{check_no_cycle, MergeRecord},
    util::clock::Timestamp,
};
use discograph_repo::graph::GraphTransaction;

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct MergeInput {
    pub kind: EntityKind,
    pub survivor_id: Id,
    pub absorbed_ids: Vec<Id>,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    pub survivor_id: Id,
    pub absorbed_ids: Vec<Id>,
    pub rewired_edge_count: usize,
}

/// `mergeEntities(survivorId, absorbedIds[], options)` (§4.7).
pub async fn merge_entities(
    txn: &mut dyn GraphTransaction,
    event_hash: &str,
    input: MergeInput,
    merged_at: Timestamp,
) -> Result<MergeOutcome> {
    if input.absorbed_ids.is_empty() {
        return Err(Error::Rejected("mergeEntities requires at least one absorbed id".to_owned()));
    }

    // `check_no_cycle` walks the `merged_into` chain starting at `survivor`
    // hop by hop; its `lookup` must resolve *every* node on that path, not
    // just the ids named in this request, or a cycle closed through an
    // intermediate node absent from `absorbed_ids` (merge A into B, merge B
    // into C, then request "merge C into A") goes undetected. So the whole
    // chain is resolved live, from the store, before the pure check runs.
    let chain = resolve_merged_into_chain(txn, input.kind, &input.survivor_id).await?;

    check_no_cycle(&input.survivor_id, &input.absorbed_ids, |id| chain.get(id).cloned())
        .map_err(|err| Error::Rejected(err.to_string()))?;

    let mut rewired_edge_count = 0;
    for absorbed_id in &input.absorbed_ids {
        rewired_edge_count += txn.rewire_edges(absorbed_id, &input.survivor_id).await?;
        txn.merge_node_attributes(input.kind, &input.survivor_id, absorbed_id, event_hash)
            .await?;

        let merge_id = format!(
            "{}:{}",
            event_hash,
            discograph_core::util::hash::sha256_hex_prefix(absorbed_id.as_str().as_bytes(), 16)
        );
        txn.insert_merge_record(MergeRecord {
            merge_id,
            survivor_id: input.survivor_id.clone(),
            absorbed_id: absorbed_id.clone(),
            kind: input.kind,
            reason: input.reason.clone(),
            event_hash: event_hash.to_owned(),
            timestamp: merged_at,
        })
        .await?;
    }

    Ok(MergeOutcome {
        survivor_id: input.survivor_id,
        absorbed_ids: input.absorbed_ids,
        rewired_edge_count,
    })
}

/// Follows `start`'s `merged_into` pointer hop by hop through the live
/// store, recording every hop (not just ids named in the caller's request)
/// so `check_no_cycle` can detect a cycle closed through an intermediate
/// node neither the survivor nor an absorbed id. Stops at the first live
/// node, a missing node, or a repeated id (a malformed existing chain must
/// not hang this walk).
async fn resolve_merged_into_chain(
    txn: &mut dyn GraphTransaction,
    kind: EntityKind,
    start: &Id,
) -> Result<std::collections::HashMap<Id, Id>> {
    let mut chain = std::collections::HashMap::new();
    let mut visited = std::collections::HashSet::new();
    let mut current = start.clone();

    while visited.insert(current.clone()) {
        let Some(node) = txn.get_node(kind, &current).await? else {
            break;
        };
        if node.header.status != EntityStatus::Merged {
            break;
        }
        let Some(target) = node.header.merged_into else {
            break;
        };
        chain.insert(current.clone(), target.clone());
        current = target;
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use discograph_core::entity::{Id, IdKind, NodeHeader};
    use discograph_repo::graph::{EdgeKind, EdgeUpsert, GraphStore};
    use discograph_repo_memory::InMemoryGraphStore;
    use serde_json::json;

    use super::*;

    async fn seed_group(txn: &mut dyn GraphTransaction, id: &str, name: &str) {
        let header = NodeHeader::new(EntityKind::Group, Id::new(id), IdKind::Provisional);
        txn.upsert_node(header, json!({ "name": name })).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_self_merge() {
        let store = InMemoryGraphStore::new();
        let mut txn = store.begin_transaction().await.unwrap();
        seed_group(&mut *txn, "prov:group:aaaaaaaaaaaaaaaa", "A").await;

        let err = merge_entities(
            &mut *txn,
            "event-hash",
            MergeInput {
                kind: EntityKind::Group,
                survivor_id: Id::new("prov:group:aaaaaaaaaaaaaaaa"),
                absorbed_ids: vec![Id::new("prov:group:aaaaaaaaaaaaaaaa")],
                reason: None,
            },
            Timestamp::from_millis(0),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Rejected(_)));
    }

    #[tokio::test]
    async fn tombstones_absorbed_and_rewires_edges() {
        let store = InMemoryGraphStore::new();

        // `rewire_edges` only sees committed edges (§5: a transaction's own
        // writes are invisible to itself until commit), so the fixture edge
        // is committed in its own transaction before the merge begins.
        let mut setup_txn = store.begin_transaction().await.unwrap();
        seed_group(&mut *setup_txn, "prov:group:survivor000000", "Survivor").await;
        seed_group(&mut *setup_txn, "prov:group:absorbed000000", "Absorbed").await;
        let person_header = NodeHeader::new(
            EntityKind::Person,
            Id::new("prov:person:cccccccccccccccc"),
            IdKind::Provisional,
        );
        setup_txn.upsert_node(person_header, json!({ "name": "Someone" })).await.unwrap();
        setup_txn
            .upsert_edge(EdgeUpsert {
                from_kind: EntityKind::Person,
                from_id: Id::new("prov:person:cccccccccccccccc"),
                kind: EdgeKind::MemberOf,
                to_kind: EntityKind::Group,
                to_id: Id::new("prov:group:absorbed000000"),
                properties: json!({}),
            })
            .await
            .unwrap();
        setup_txn.commit().await.unwrap();

        let mut txn = store.begin_transaction().await.unwrap();
        let outcome = merge_entities(
            &mut *txn,
            "event-hash",
            MergeInput {
                kind: EntityKind::Group,
                survivor_id: Id::new("prov:group:survivor000000"),
                absorbed_ids: vec![Id::new("prov:group:absorbed000000")],
                reason: Some("duplicate submission".to_owned()),
            },
            Timestamp::from_millis(0),
        )
        .await
        .unwrap();

        assert_eq!(outcome.rewired_edge_count, 1);

        let absorbed = txn
            .get_node(EntityKind::Group, &Id::new("prov:group:absorbed000000"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(absorbed.header.status, EntityStatus::Merged);
        assert_eq!(
            absorbed.header.merged_into,
            Some(Id::new("prov:group:survivor000000"))
        );
    }

    #[tokio::test]
    async fn rejects_transitive_cycle() {
        let store = InMemoryGraphStore::new();
        let mut txn = store.begin_transaction().await.unwrap();
        seed_group(&mut *txn, "prov:group:a000000000000a", "A").await;
        seed_group(&mut *txn, "prov:group:b000000000000b", "B").await;

        merge_entities(
            &mut *txn,
            "event-hash-1",
            MergeInput {
                kind: EntityKind::Group,
                survivor_id: Id::new("prov:group:b000000000000b"),
                absorbed_ids: vec![Id::new("prov:group:a000000000000a")],
                reason: None,
            },
            Timestamp::from_millis(0),
        )
        .await
        .unwrap();

        let err = merge_entities(
            &mut *txn,
            "event-hash-2",
            MergeInput {
                kind: EntityKind::Group,
                survivor_id: Id::new("prov:group:a000000000000a"),
                absorbed_ids: vec![Id::new("prov:group:b000000000000b")],
                reason: None,
            },
            Timestamp::from_millis(1),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Rejected(_)));
    }

    /// merge A into B, then merge B into C, then request "merge C into A" —
    /// B sits on the chain but is named in neither `survivor_id` nor
    /// `absorbed_ids` of the final request, so the cycle is only visible by
    /// walking the live `merged_into` chain past the request's own ids.
    #[tokio::test]
    async fn rejects_cycle_through_unnamed_intermediate_node() {
        let store = InMemoryGraphStore::new();
        let mut txn = store.begin_transaction().await.unwrap();
        seed_group(&mut *txn, "prov:group:a000000000000a", "A").await;
        seed_group(&mut *txn, "prov:group:b000000000000b", "B").await;
        seed_group(&mut *txn, "prov:group:c000000000000c", "C").await;

        merge_entities(
            &mut *txn,
            "event-hash-1",
            MergeInput {
                kind: EntityKind::Group,
                survivor_id: Id::new("prov:group:b000000000000b"),
                absorbed_ids: vec![Id::new("prov:group:a000000000000a")],
                reason: None,
            },
            Timestamp::from_millis(0),
        )
        .await
        .unwrap();

        merge_entities(
            &mut *txn,
            "event-hash-2",
            MergeInput {
                kind: EntityKind::Group,
                survivor_id: Id::new("prov:group:c000000000000c"),
                absorbed_ids: vec![Id::new("prov:group:b000000000000b")],
                reason: None,
            },
            Timestamp::from_millis(1),
        )
        .await
        .unwrap();

        let err = merge_entities(
            &mut *txn,
            "event-hash-3",
            MergeInput {
                kind: EntityKind::Group,
                survivor_id: Id::new("prov:group:a000000000000a"),
                absorbed_ids: vec![Id::new("prov:group:c000000000000c")],
                reason: None,
            },
            Timestamp::from_millis(2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Rejected(_)));
    }
}
