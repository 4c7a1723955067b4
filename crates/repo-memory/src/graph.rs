// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use dashmap::DashMap;
use discograph_core::{
    claim::Claim,
    entity::{EntityKind, EntityStatus, Id, NodeHeader},
    merge::MergeRecord,
    util::clock::Timestamp,
};
use discograph_repo::{
    graph::{EdgeUpsert, GraphStore, GraphTransaction, StoredNode},
    RepoError, RepoResult,
};
use serde_json::Value;

type NodeKey = (EntityKind, String);
type EdgeKey = (String, &'static str, String);

#[derive(Debug, Default)]
struct Shared {
    nodes: DashMap<NodeKey, StoredNode>,
    edges: DashMap<EdgeKey, EdgeUpsert>,
    claims: DashMap<String, Claim>,
    merge_records: DashMap<String, MergeRecord>,
}

/// An in-memory graph store. A single [`Mutex`] serializes transactions —
/// this crate favors a correct "one transaction at a time" model over
/// concurrent throughput, which is the right trade for tests and small
/// deployments; a real backend would use the database's own MVCC instead.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    shared: Arc<Shared>,
    write_lock: Arc<Mutex<()>>,
}

impl InMemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn begin_transaction(&self) -> RepoResult<Box<dyn GraphTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            shared: Arc::clone(&self.shared),
            write_lock: Arc::clone(&self.write_lock),
            node_overlay: HashMap::new(),
            claim_overlay: HashMap::new(),
            pending: Vec::new(),
            committed: false,
        }))
    }
}

enum PendingOp {
    Node(NodeKey, StoredNode),
    Edge(EdgeKey, EdgeUpsert),
    RemoveEdge(EdgeKey),
    Claim(String, Claim),
    MergeRecord(String, MergeRecord),
}

/// Buffers all writes locally; nothing is visible to other transactions
/// until [`commit`](GraphTransaction::commit) flushes the buffer while
/// holding the store-wide write lock (§4.5: "either fully commits or fully
/// rolls back").
pub struct InMemoryTransaction {
    shared: Arc<Shared>,
    write_lock: Arc<Mutex<()>>,
    node_overlay: HashMap<NodeKey, StoredNode>,
    claim_overlay: HashMap<String, Claim>,
    pending: Vec<PendingOp>,
    committed: bool,
}

impl InMemoryTransaction {
    fn read_node(&self, key: &NodeKey) -> Option<StoredNode> {
        self.node_overlay
            .get(key)
            .cloned()
            .or_else(|| self.shared.nodes.get(key).map(|entry| entry.value().clone()))
    }

    fn read_claim(&self, claim_id: &str) -> Option<Claim> {
        self.claim_overlay.get(claim_id).cloned().or_else(|| {
            self.shared
                .claims
                .get(claim_id)
                .map(|entry| entry.value().clone())
        })
    }
}

#[async_trait]
impl GraphTransaction for InMemoryTransaction {
    async fn upsert_node(&mut self, header: NodeHeader, attributes: Value) -> RepoResult<bool> {
        let key = (header.kind, header.id.as_str().to_owned());
        let existing = self.read_node(&key);
        let is_new = existing.is_none();
        let merged_attributes = match existing {
            Some(StoredNode {
                attributes: Value::Object(mut existing_attrs),
                ..
            }) => {
                if let Value::Object(new_attrs) = attributes {
                    for (field, value) in new_attrs {
                        existing_attrs.insert(field, value);
                    }
                }
                Value::Object(existing_attrs)
            }
            _ => attributes,
        };
        let node = StoredNode {
            header,
            attributes: merged_attributes,
        };
        self.node_overlay.insert(key.clone(), node.clone());
        self.pending.push(PendingOp::Node(key, node));
        Ok(is_new)
    }

    async fn get_node(&mut self, kind: EntityKind, id: &Id) -> RepoResult<Option<StoredNode>> {
        Ok(self.read_node(&(kind, id.as_str().to_owned())))
    }

    async fn resolve_live_id(&mut self, kind: EntityKind, id: &Id) -> RepoResult<Id> {
        let mut current = id.clone();
        for _ in 0..10_000 {
            let Some(node) = self.read_node(&(kind, current.as_str().to_owned())) else {
                return Ok(current);
            };
            if node.header.status != EntityStatus::Merged {
                return Ok(current);
            }
            let Some(next) = node.header.merged_into else {
                return Ok(current);
            };
            current = next;
        }
        Err(RepoError::Conflict)
    }

    async fn upsert_edge(&mut self, edge: EdgeUpsert) -> RepoResult<()> {
        let key = (
            edge.from_id.as_str().to_owned(),
            edge.kind.label(),
            edge.to_id.as_str().to_owned(),
        );
        self.pending.push(PendingOp::Edge(key, edge));
        Ok(())
    }

    async fn insert_claim(&mut self, claim: Claim) -> RepoResult<()> {
        let claim_id = claim.claim_id.clone();
        self.claim_overlay.insert(claim_id.clone(), claim.clone());
        self.pending.push(PendingOp::Claim(claim_id, claim));
        Ok(())
    }

    async fn get_claim(&mut self, claim_id: &str) -> RepoResult<Option<Claim>> {
        Ok(self.read_claim(claim_id))
    }

    async fn supersede_claim(
        &mut self,
        old_claim_id: &str,
        new_claim_id: &str,
        superseded_at: Timestamp,
    ) -> RepoResult<()> {
        let Some(mut old_claim) = self.read_claim(old_claim_id) else {
            return Err(RepoError::NotFound);
        };
        old_claim.superseded_by = Some(new_claim_id.to_owned());
        old_claim.superseded_at = Some(superseded_at);
        self.claim_overlay
            .insert(old_claim_id.to_owned(), old_claim.clone());
        self.pending
            .push(PendingOp::Claim(old_claim_id.to_owned(), old_claim));
        Ok(())
    }

    async fn rewire_edges(&mut self, absorbed: &Id, survivor: &Id) -> RepoResult<usize> {
        let mut moved = 0usize;
        let mut rewired = Vec::new();
        for entry in self.shared.edges.iter() {
            let ((from, kind, to), edge) = (entry.key().clone(), entry.value().clone());
            if from == absorbed.as_str() {
                let mut new_edge = edge.clone();
                new_edge.from_id = survivor.clone();
                rewired.push((
                    (from.clone(), kind, to.clone()),
                    ((survivor.as_str().to_owned(), kind, to), new_edge),
                ));
                moved += 1;
            } else if to == absorbed.as_str() {
                let mut new_edge = edge.clone();
                new_edge.to_id = survivor.clone();
                rewired.push((
                    (from.clone(), kind, to.clone()),
                    ((from, kind, survivor.as_str().to_owned()), new_edge),
                ));
                moved += 1;
            }
        }
        for (old_key, (new_key, edge)) in rewired {
            self.pending.push(PendingOp::RemoveEdge(old_key));
            self.pending.push(PendingOp::Edge(new_key, edge));
        }
        Ok(moved)
    }

    async fn merge_node_attributes(
        &mut self,
        kind: EntityKind,
        survivor: &Id,
        absorbed: &Id,
        event_hash: &str,
    ) -> RepoResult<()> {
        let absorbed_key = (kind, absorbed.as_str().to_owned());
        let Some(mut absorbed_node) = self.read_node(&absorbed_key) else {
            return Err(RepoError::NotFound);
        };

        if let Some(survivor_node) = self.read_node(&(kind, survivor.as_str().to_owned())) {
            let merged = merge_attribute_objects(survivor_node.attributes, absorbed_node.attributes.clone());
            let survivor_key = (kind, survivor.as_str().to_owned());
            let merged_node = StoredNode {
                header: survivor_node.header,
                attributes: merged,
            };
            self.node_overlay.insert(survivor_key.clone(), merged_node.clone());
            self.pending.push(PendingOp::Node(survivor_key, merged_node));
        }

        absorbed_node.header.status = EntityStatus::Merged;
        absorbed_node.header.merged_into = Some(survivor.clone());
        absorbed_node.header.merge_event_hash = Some(event_hash.to_owned());
        self.node_overlay
            .insert(absorbed_key.clone(), absorbed_node.clone());
        self.pending.push(PendingOp::Node(absorbed_key, absorbed_node));
        Ok(())
    }

    async fn insert_merge_record(&mut self, record: MergeRecord) -> RepoResult<()> {
        let merge_id = record.merge_id.clone();
        self.pending.push(PendingOp::MergeRecord(merge_id, record));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> RepoResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| RepoError::Aborted)?;
        for op in self.pending.drain(..) {
            match op {
                PendingOp::Node(key, node) => {
                    self.shared.nodes.insert(key, node);
                }
                PendingOp::Edge(key, edge) => {
                    self.shared.edges.insert(key, edge);
                }
                PendingOp::RemoveEdge(key) => {
                    self.shared.edges.remove(&key);
                }
                PendingOp::Claim(claim_id, claim) => {
                    self.shared.claims.insert(claim_id, claim);
                }
                PendingOp::MergeRecord(merge_id, record) => {
                    self.shared.merge_records.insert(merge_id, record);
                }
            }
        }
        self.committed = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        // Pending writes were only ever buffered locally; dropping `self`
        // discards them.
        Ok(())
    }
}

/// §4.7: "copy missing scalar attributes from absorbed to survivor (union
/// alt_names; fill null fields from absorbed)".
fn merge_attribute_objects(survivor: Value, absorbed: Value) -> Value {
    let (Value::Object(mut survivor_obj), Value::Object(absorbed_obj)) = (survivor, absorbed)
    else {
        return Value::Null;
    };
    for (field, absorbed_value) in absorbed_obj {
        match survivor_obj.get(&field) {
            None | Some(Value::Null) => {
                survivor_obj.insert(field, absorbed_value);
            }
            Some(Value::Array(existing)) => {
                if field == "alt_names" {
                    if let Value::Array(more) = absorbed_value {
                        let mut union = existing.clone();
                        for item in more {
                            if !union.contains(&item) {
                                union.push(item);
                            }
                        }
                        survivor_obj.insert(field, Value::Array(union));
                    }
                }
            }
            Some(_) => {}
        }
    }
    Value::Object(survivor_obj)
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.committed && !self.pending.is_empty() {
            tracing::debug!("discarding uncommitted graph transaction");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discograph_core::entity::IdKind;

    #[tokio::test]
    async fn uncommitted_writes_are_invisible() {
        let store = InMemoryGraphStore::new();
        let mut txn = store.begin_transaction().await.unwrap();
        let header = NodeHeader::new(EntityKind::Person, Id::new("prov:person:a"), IdKind::Provisional);
        txn.upsert_node(header, Value::Null).await.unwrap();
        drop(txn);

        let mut txn2 = store.begin_transaction().await.unwrap();
        let found = txn2
            .get_node(EntityKind::Person, &Id::new("prov:person:a"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_later_transactions() {
        let store = InMemoryGraphStore::new();
        let mut txn = store.begin_transaction().await.unwrap();
        let header = NodeHeader::new(EntityKind::Person, Id::new("prov:person:a"), IdKind::Provisional);
        txn.upsert_node(header, Value::Null).await.unwrap();
        txn.commit().await.unwrap();

        let mut txn2 = store.begin_transaction().await.unwrap();
        let found = txn2
            .get_node(EntityKind::Person, &Id::new("prov:person:a"))
            .await
            .unwrap();
        assert!(found.is_some());
    }
}
