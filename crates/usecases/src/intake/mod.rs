// SPDX-License-Identifier: AGPL-3.0-or-later

//! Anchored-Event Intake (§4.8): deduplicates on `content_hash`, computes a
//! deterministic `event_hash` over the envelope, persists the event, and
//! dispatches `put` actions to the Bundle Normalizer/Validator + Graph
//! Projector, the Claim Engine, or the Merge Engine. `vote`/`finalize`
//! actions are accepted and stored but never projected.

use discograph_core::{entity::EntityKind, util::clock::Timestamp};
use discograph_core_json::event::{AnchoredEventWire, PutPayload};
use discograph_repo::{
    event::{EventStore, StoredEvent},
    graph::{GraphStore, GraphTransaction},
    identity_map::IdentityMapStore,
};
use serde_json::json;

use crate::{
    claim::{self, AddClaimInput, ClaimOutcome, EditClaimInput},
    merge::{self, MergeInput, MergeOutcome},
    normalize, project,
    project::ProjectionOutcome,
    validate, Error, Result,
};

#[derive(Clone, Debug, PartialEq)]
pub enum IntakeOutcome {
    /// §4.8 step 1: `content_hash` was already processed.
    Duplicate { content_hash: String },
    Projected {
        event_hash: String,
        outcome: ProjectionOutcome,
    },
    ClaimAdded {
        event_hash: String,
        outcome: ClaimOutcome,
    },
    ClaimEdited {
        event_hash: String,
        outcome: ClaimOutcome,
    },
    Merged {
        event_hash: String,
        outcome: MergeOutcome,
    },
    /// §4.8 step 2: `vote`/`finalize` actions, and `put` actions whose
    /// payload carries no dispatchable shape, are stored but not projected.
    Deferred { event_hash: String, action_name: String },
}

/// `intake(event)` (§4.8). Accepts one anchored event end to end: dedup,
/// hash, persist, dispatch. The caller supplies one open `GraphTransaction`
/// per dispatch via `graph`/`identity_map`; this function commits on
/// success and rolls back on any failure, matching the "every bundle is one
/// transaction" guarantee of §5.
pub async fn intake_event(
    events: &dyn EventStore,
    graph: &dyn GraphStore,
    identity_map: &dyn IdentityMapStore,
    wire: AnchoredEventWire,
) -> Result<IntakeOutcome> {
    if events.contains_content_hash(&wire.content_hash).await? {
        return Ok(IntakeOutcome::Duplicate {
            content_hash: wire.content_hash,
        });
    }

    let event_hash = compute_event_hash(&wire);
    let event_ts = Timestamp::from_unix_seconds_or_millis(wire.timestamp);

    events
        .put_event(StoredEvent {
            content_hash: wire.content_hash.clone(),
            event_hash: event_hash.clone(),
            payload: wire.payload.clone(),
            block_num: wire.block_num,
            block_id: wire.block_id.clone(),
            trx_id: wire.trx_id.clone(),
            action_ordinal: wire.action_ordinal,
            timestamp: event_ts,
            source: wire.source.clone(),
            contract_account: wire.contract_account.clone(),
            action_name: wire.action_name.clone(),
            blockchain_verified: true,
            processed: false,
            failure: None,
        })
        .await?;

    let outcome = dispatch(events, graph, identity_map, &wire, &event_hash, event_ts).await;

    match &outcome {
        Ok(_) => events.mark_outcome(&event_hash, None).await?,
        Err(err) => events.mark_outcome(&event_hash, Some(err.to_string())).await?,
    }
    outcome
}

async fn dispatch(
    events: &dyn EventStore,
    graph: &dyn GraphStore,
    identity_map: &dyn IdentityMapStore,
    wire: &AnchoredEventWire,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<IntakeOutcome> {
    match wire.action_name.as_str() {
        "put" => dispatch_put(graph, identity_map, wire, event_hash, event_ts).await,
        "vote" | "finalize" => {
            let _ = events;
            Ok(IntakeOutcome::Deferred {
                event_hash: event_hash.to_owned(),
                action_name: wire.action_name.clone(),
            })
        }
        other => Err(Error::Rejected(format!("unknown action_name: {other}"))),
    }
}

async fn dispatch_put(
    graph: &dyn GraphStore,
    identity_map: &dyn IdentityMapStore,
    wire: &AnchoredEventWire,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<IntakeOutcome> {
    let payload: PutPayload =
        serde_json::from_str(&wire.payload).map_err(|err| Error::Rejected(format!("invalid payload: {err}")))?;

    match payload {
        PutPayload::CreateReleaseBundle { bundle, submitter } => {
            let canonical = normalize::normalize_bundle(bundle).map_err(Error::Validation)?;
            validate::validate_bundle(&canonical).map_err(Error::Validation)?;

            // `project_bundle` owns its own transaction lifecycle (begin,
            // commit on success, rollback on failure).
            let outcome =
                project::project_bundle(graph, identity_map, event_hash, &canonical, &submitter, event_ts).await?;
            Ok(IntakeOutcome::Projected {
                event_hash: event_hash.to_owned(),
                outcome,
            })
        }
        PutPayload::AddClaim(request) => {
            let target_kind = EntityKind::parse(&request.target.kind).ok_or_else(|| {
                Error::Rejected(format!("unknown entity kind '{}'", request.target.kind))
            })?;
            let target_id = discograph_core::entity::Id::new(request.target.id);
            let source = request.source.map(|s| discograph_core::entity::Id::new(s));

            let mut txn = graph.begin_transaction().await?;
            let outcome = claim::add_claim(
                &mut *txn,
                event_hash,
                AddClaimInput {
                    target_kind,
                    target_id,
                    field: request.field,
                    value: request.value,
                    source,
                },
                event_ts,
            )
            .await;
            match outcome {
                Ok(outcome) => {
                    txn.commit().await?;
                    Ok(IntakeOutcome::ClaimAdded {
                        event_hash: event_hash.to_owned(),
                        outcome,
                    })
                }
                Err(err) => {
                    txn.rollback().await?;
                    Err(err)
                }
            }
        }
        PutPayload::EditClaim(request) => {
            let source = request.source.map(|s| discograph_core::entity::Id::new(s));
            let mut txn = graph.begin_transaction().await?;
            let outcome = claim::edit_claim(
                &mut *txn,
                event_hash,
                EditClaimInput {
                    claim_id: request.claim_id,
                    value: request.value,
                    source,
                },
                event_ts,
            )
            .await;
            match outcome {
                Ok(outcome) => {
                    txn.commit().await?;
                    Ok(IntakeOutcome::ClaimEdited {
                        event_hash: event_hash.to_owned(),
                        outcome,
                    })
                }
                Err(err) => {
                    txn.rollback().await?;
                    Err(err)
                }
            }
        }
        PutPayload::MergeEntity(request) => {
            let kind = infer_merge_kind(&request.survivor_id)?;
            let mut txn = graph.begin_transaction().await?;
            let outcome = merge::merge_entities(
                &mut *txn,
                event_hash,
                MergeInput {
                    kind,
                    survivor_id: discograph_core::entity::Id::new(request.survivor_id),
                    absorbed_ids: request
                        .absorbed_ids
                        .into_iter()
                        .map(discograph_core::entity::Id::new)
                        .collect(),
                    reason: request.reason,
                },
                event_ts,
            )
            .await;
            match outcome {
                Ok(outcome) => {
                    txn.commit().await?;
                    Ok(IntakeOutcome::Merged {
                        event_hash: event_hash.to_owned(),
                        outcome,
                    })
                }
                Err(err) => {
                    txn.rollback().await?;
                    Err(err)
                }
            }
        }
    }
}

/// §4.7's `mergeEntities` is per-kind; the wire request carries only ids, so
/// the kind is read back off the provisional-id grammar when possible and
/// otherwise rejected, since merging across an unknown kind cannot be
/// validated against the whitelist. `ParsedId::External`'s `kind` is never
/// checked against the whitelist at parse time (unlike `Canonical`), so
/// `EntityKind::parse` can fail here too and must raise the same rejection.
fn infer_merge_kind(survivor_id: &str) -> Result<EntityKind> {
    let kind = match discograph_core::identity::parse_id(survivor_id) {
        discograph_core::identity::ParsedId::Provisional { kind }
        | discograph_core::identity::ParsedId::Canonical { kind, .. }
        | discograph_core::identity::ParsedId::External { kind, .. } => kind,
        discograph_core::identity::ParsedId::Invalid => {
            return Err(Error::Rejected(format!(
                "cannot infer entity kind from survivor id: {survivor_id}"
            )))
        }
    };
    EntityKind::parse(&kind).ok_or_else(|| {
        Error::Rejected(format!(
            "unknown entity kind '{kind}' in survivor id: {survivor_id}"
        ))
    })
}

/// §4.8 step 3: a deterministic hash over every envelope field except
/// `event_hash` itself (there is no signature field on this wire shape to
/// exclude).
fn compute_event_hash(wire: &AnchoredEventWire) -> String {
    let subject = json!({
        "content_hash": wire.content_hash,
        "payload": wire.payload,
        "block_num": wire.block_num,
        "block_id": wire.block_id,
        "trx_id": wire.trx_id,
        "action_ordinal": wire.action_ordinal,
        "timestamp": wire.timestamp,
        "source": wire.source,
        "contract_account": wire.contract_account,
        "action_name": wire.action_name,
    });
    discograph_core::util::hash::sha256_hex(discograph_core::util::hash::canonical_json(&subject))
}

#[cfg(test)]
mod tests {
    use discograph_repo_memory::{InMemoryEventStore, InMemoryGraphStore, InMemoryIdentityMapStore};

    use super::*;

    fn sample_wire(content_hash: &str, payload: &str) -> AnchoredEventWire {
        AnchoredEventWire {
            content_hash: content_hash.to_owned(),
            event_hash: None,
            payload: payload.to_owned(),
            block_num: 1,
            block_id: "block-1".to_owned(),
            trx_id: "trx-1".to_owned(),
            action_ordinal: 0,
            timestamp: 1_700_000_000,
            source: "chain".to_owned(),
            contract_account: "discograph".to_owned(),
            action_name: "put".to_owned(),
        }
    }

    #[tokio::test]
    async fn replaying_a_content_hash_is_a_duplicate() {
        let events = InMemoryEventStore::new();
        let graph = InMemoryGraphStore::new();
        let identity_map = InMemoryIdentityMapStore::new();
        let payload = serde_json::json!({
            "type": "CREATE_RELEASE_BUNDLE",
            "bundle": { "release": { "name": "Abbey Road" }, "tracks": [{"title": "Come Together"}], "tracklist": [{"position": "1", "track_title": "Come Together"}] },
            "submitter": "acct",
        })
        .to_string();
        let wire = sample_wire("content-hash-1", &payload);

        let first = intake_event(&events, &graph, &identity_map, wire.clone()).await.unwrap();
        assert!(matches!(first, IntakeOutcome::Projected { .. }));

        let second = intake_event(&events, &graph, &identity_map, wire).await.unwrap();
        assert_eq!(
            second,
            IntakeOutcome::Duplicate {
                content_hash: "content-hash-1".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn vote_and_finalize_are_stored_but_not_projected() {
        let events = InMemoryEventStore::new();
        let graph = InMemoryGraphStore::new();
        let identity_map = InMemoryIdentityMapStore::new();
        let mut wire = sample_wire("content-hash-2", "{}");
        wire.action_name = "vote".to_owned();

        let outcome = intake_event(&events, &graph, &identity_map, wire).await.unwrap();
        assert!(matches!(outcome, IntakeOutcome::Deferred { action_name, .. } if action_name == "vote"));
    }

    #[tokio::test]
    async fn event_hash_is_deterministic_given_identical_envelopes() {
        let wire_a = sample_wire("content-hash-3", "{}");
        let wire_b = sample_wire("content-hash-3", "{}");
        assert_eq!(compute_event_hash(&wire_a), compute_event_hash(&wire_b));
    }
}
