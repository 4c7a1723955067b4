// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Claim Engine (§4.6): an append-only audit log over arbitrary
//! non-protected fields. `ADD_CLAIM` writes a fresh claim and updates the
//! target node's field; `EDIT_CLAIM` writes a claim that supersedes an
//! older one and updates the same field to the new value. Superseded
//! claims are never deleted.
//!
//! `CLAIMS_ABOUT`, `SUPERSEDES`, and `SOURCED_FROM` are not written as graph
//! edges here: a claim and a source are not entities in the eight-kind
//! whitelist `discograph_repo::graph::EdgeUpsert` requires at both
//! endpoints, so that relationship information lives entirely in
//! `Claim::target_kind`/`target_id`/`source`/`superseded_by` instead, which
//! `insert_claim`/`get_claim`/`supersede_claim` already persist.

use discograph_core::{
    claim::{is_protected_field, is_safe_field_name, Claim, ClaimValue},
    entity::{EntityKind, Id},
    util::clock::Timestamp,
};
use discograph_repo::graph::GraphTransaction;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct AddClaimInput {
    pub target_kind: EntityKind,
    pub target_id: Id,
    pub field: String,
    pub value: Value,
    pub source: Option<Id>,
}

#[derive(Clone, Debug)]
pub struct EditClaimInput {
    pub claim_id: String,
    pub value: Value,
    pub source: Option<Id>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub claim_id: String,
    pub superseded_claim_id: Option<String>,
}

/// `ADD_CLAIM(eventHash, {target, field, value, source?}, author)` (§4.6).
///
/// `claim_id` is `SHA-256(eventHash || ":0")`, making the operation
/// idempotent under replay: a second call with the same `event_hash`
/// overwrites the same claim and leaves the target's field unchanged.
pub async fn add_claim(
    txn: &mut dyn GraphTransaction,
    event_hash: &str,
    input: AddClaimInput,
    created_at: Timestamp,
) -> Result<ClaimOutcome> {
    check_field(input.target_kind, &input.field)?;

    let claim_id = discograph_core::util::hash::deterministic_op_id(event_hash, 0);
    let claim_value = ClaimValue::from_json(input.value);
    let claim = Claim {
        claim_id: claim_id.clone(),
        target_kind: input.target_kind,
        target_id: input.target_id.clone(),
        field: input.field.clone(),
        value: claim_value.clone(),
        event_hash: event_hash.to_owned(),
        created_at,
        superseded_by: None,
        superseded_at: None,
        source: input.source.clone(),
    };
    txn.insert_claim(claim).await?;

    apply_claim_value(txn, input.target_kind, &input.target_id, &input.field, &claim_value).await?;

    Ok(ClaimOutcome {
        claim_id,
        superseded_claim_id: None,
    })
}

/// `EDIT_CLAIM(eventHash, {claim_id, value, source?}, author)` (§4.6):
/// loads the old claim for its `target_kind`/`target_id`/`field`, mints a
/// new claim id from `event_hash`, links `SUPERSEDES` to the old claim, and
/// updates the target's field to the new value.
pub async fn edit_claim(
    txn: &mut dyn GraphTransaction,
    event_hash: &str,
    input: EditClaimInput,
    created_at: Timestamp,
) -> Result<ClaimOutcome> {
    let old_claim = txn
        .get_claim(&input.claim_id)
        .await?
        .ok_or_else(|| Error::Rejected(format!("no such claim: {}", input.claim_id)))?;

    check_field(old_claim.target_kind, &old_claim.field)?;

    let new_claim_id = discograph_core::util::hash::deterministic_op_id(event_hash, 0);
    let claim_value = ClaimValue::from_json(input.value);
    let new_claim = Claim {
        claim_id: new_claim_id.clone(),
        target_kind: old_claim.target_kind,
        target_id: old_claim.target_id.clone(),
        field: old_claim.field.clone(),
        value: claim_value.clone(),
        event_hash: event_hash.to_owned(),
        created_at,
        superseded_by: None,
        superseded_at: None,
        source: input.source.clone(),
    };
    txn.insert_claim(new_claim).await?;
    txn.supersede_claim(&old_claim.claim_id, &new_claim_id, created_at).await?;

    apply_claim_value(
        txn,
        old_claim.target_kind,
        &old_claim.target_id,
        &old_claim.field,
        &claim_value,
    )
    .await?;

    Ok(ClaimOutcome {
        claim_id: new_claim_id,
        superseded_claim_id: Some(old_claim.claim_id),
    })
}

/// §4.6 checks the protected-field set (on the trimmed name) before the
/// safety regex (on the raw name), so a padded protected field like
/// `"  id  "` is rejected as protected rather than as unsafe.
fn check_field(kind: EntityKind, field: &str) -> Result<()> {
    if is_protected_field(kind, field) {
        return Err(Error::Rejected(format!(
            "Invalid claim field: '{}' is protected",
            field.trim()
        )));
    }
    if !is_safe_field_name(field) {
        return Err(Error::Rejected(format!(
            "Invalid claim field: '{field}' does not match the field-name grammar"
        )));
    }
    Ok(())
}

async fn apply_claim_value(
    txn: &mut dyn GraphTransaction,
    kind: EntityKind,
    target_id: &Id,
    field: &str,
    value: &ClaimValue,
) -> Result<()> {
    let header = txn
        .get_node(kind, target_id)
        .await?
        .ok_or_else(|| Error::Rejected(format!("claim target not found: {}", target_id.as_str())))?
        .header;
    let normalized = match value.to_storage_value() {
        discograph_core::claim::StorageValue::Primitive(primitive) => primitive_to_json(&primitive),
        discograph_core::claim::StorageValue::PrimitiveList(items) => {
            Value::Array(items.iter().map(primitive_to_json).collect())
        }
        discograph_core::claim::StorageValue::Json(s) => Value::String(s),
    };
    let mut attributes = serde_json::Map::new();
    attributes.insert(field.trim().to_owned(), normalized);
    txn.upsert_node(header, Value::Object(attributes)).await?;
    Ok(())
}

fn primitive_to_json(primitive: &discograph_core::claim::Primitive) -> Value {
    use discograph_core::claim::Primitive;
    match primitive {
        Primitive::String(s) => Value::String(s.clone()),
        Primitive::Number(n) => Value::Number(n.clone()),
        Primitive::Bool(b) => Value::Bool(*b),
        Primitive::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use discograph_core::entity::{IdKind, NodeHeader};
    use discograph_repo::graph::GraphStore;
    use discograph_repo_memory::InMemoryGraphStore;
    use serde_json::json;

    use super::*;

    async fn seed_person(txn: &mut dyn GraphTransaction, id: &str) {
        let header = NodeHeader::new(EntityKind::Person, Id::new(id), IdKind::Provisional);
        txn.upsert_node(header, json!({ "name": "Alice" })).await.unwrap();
    }

    #[tokio::test]
    async fn add_claim_rejects_protected_field_even_when_padded() {
        let store = InMemoryGraphStore::new();
        let mut txn = store.begin_transaction().await.unwrap();
        seed_person(&mut *txn, "prov:person:aaaaaaaaaaaaaaaa").await;

        let err = add_claim(
            &mut *txn,
            "event-hash",
            AddClaimInput {
                target_kind: EntityKind::Person,
                target_id: Id::new("prov:person:aaaaaaaaaaaaaaaa"),
                field: "  id  ".to_owned(),
                value: json!("x"),
                source: None,
            },
            Timestamp::from_millis(0),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Rejected(msg) if msg.contains("protected")));
    }

    #[tokio::test]
    async fn edit_claim_supersedes_and_updates_the_target_value() {
        let store = InMemoryGraphStore::new();
        let mut txn = store.begin_transaction().await.unwrap();
        seed_person(&mut *txn, "prov:person:bbbbbbbbbbbbbbbb").await;

        let first = add_claim(
            &mut *txn,
            "event-hash-1",
            AddClaimInput {
                target_kind: EntityKind::Person,
                target_id: Id::new("prov:person:bbbbbbbbbbbbbbbb"),
                field: "bio".to_owned(),
                value: json!("A"),
                source: None,
            },
            Timestamp::from_millis(0),
        )
        .await
        .unwrap();

        let second = edit_claim(
            &mut *txn,
            "event-hash-2",
            EditClaimInput {
                claim_id: first.claim_id.clone(),
                value: json!("B"),
                source: None,
            },
            Timestamp::from_millis(1),
        )
        .await
        .unwrap();

        assert_eq!(second.superseded_claim_id, Some(first.claim_id.clone()));

        let old = txn.get_claim(&first.claim_id).await.unwrap().unwrap();
        assert_eq!(old.superseded_by, Some(second.claim_id));

        let node = txn
            .get_node(EntityKind::Person, &Id::new("prov:person:bbbbbbbbbbbbbbbb"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(node.attributes.get("bio"), Some(&json!("B")));
    }
}
