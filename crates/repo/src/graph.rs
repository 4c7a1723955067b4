// SPDX-License-Identifier: AGPL-3.0-or-later

//! The property-graph store contract (§6): labeled nodes, typed
//! relationships, property maps, and multi-statement ACID transactions.
//! Every Graph Projector run (§4.5), claim mutation (§4.6), and merge
//! (§4.7) happens inside exactly one [`GraphTransaction`].

use async_trait::async_trait;
use discograph_core::{
    claim::Claim,
    entity::{EntityKind, Id, NodeHeader},
    merge::MergeRecord,
};
use serde_json::Value;

use crate::RepoResult;

/// The directed relationship kinds of §3, used as the edge tag in
/// [`EdgeUpsert`]. Variants carry no data themselves; edge properties are
/// passed separately as a JSON object so the store contract does not need
/// to know every property shape in [`discograph_core::relationship`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    MemberOf,
    PerformedOn,
    GuestOn,
    Wrote,
    Produced,
    Arranged,
    RecordingOf,
    CoverOf,
    Samples,
    InRelease,
    InMaster,
    Released,
    Origin,
    Submitted,
    ClaimsAbout,
    Supersedes,
    SourcedFrom,
    MergedInto,
}

impl EdgeKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MemberOf => "MEMBER_OF",
            Self::PerformedOn => "PERFORMED_ON",
            Self::GuestOn => "GUEST_ON",
            Self::Wrote => "WROTE",
            Self::Produced => "PRODUCED",
            Self::Arranged => "ARRANGED",
            Self::RecordingOf => "RECORDING_OF",
            Self::CoverOf => "COVER_OF",
            Self::Samples => "SAMPLES",
            Self::InRelease => "IN_RELEASE",
            Self::InMaster => "IN_MASTER",
            Self::Released => "RELEASED",
            Self::Origin => "ORIGIN",
            Self::Submitted => "SUBMITTED",
            Self::ClaimsAbout => "CLAIMS_ABOUT",
            Self::Supersedes => "SUPERSEDES",
            Self::SourcedFrom => "SOURCED_FROM",
            Self::MergedInto => "MERGED_INTO",
        }
    }
}

/// A node as read back from the store: its header plus kind-specific
/// attributes, kept as a JSON object rather than a typed enum so the store
/// contract stays decoupled from `discograph-core`'s per-kind attribute
/// structs.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredNode {
    pub header: NodeHeader,
    pub attributes: Value,
}

/// One edge upsert. Identity for the idempotent MERGE semantics required
/// by §4.5 ("duplicates are collapsed by MERGE semantics on
/// `(group, track, claim_id)`") is the triple `(from_id, kind, to_id)` plus
/// whatever subset of `properties` the caller considers part of the merge
/// key; concrete stores are free to MERGE on the full property map.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeUpsert {
    pub from_kind: EntityKind,
    pub from_id: Id,
    pub kind: EdgeKind,
    pub to_kind: EntityKind,
    pub to_id: Id,
    pub properties: Value,
}

/// One bundle ingest, claim mutation, or merge, executed atomically.
/// Dropping a transaction without calling [`commit`](Self::commit) must
/// roll it back (§5: "cancellation aborts the transaction cleanly").
#[async_trait]
pub trait GraphTransaction: Send {
    /// Creates the node if absent, otherwise leaves existing fields alone
    /// except where `attributes` supplies a value; returns `true` if the
    /// node did not already exist.
    async fn upsert_node(
        &mut self,
        header: NodeHeader,
        attributes: Value,
    ) -> RepoResult<bool>;

    async fn get_node(&mut self, kind: EntityKind, id: &Id) -> RepoResult<Option<StoredNode>>;

    /// Resolves a tombstoned id to its live survivor by following
    /// `merged_into` (§4.7 tombstone policy). Returns `id` unchanged if it
    /// is not tombstoned.
    async fn resolve_live_id(&mut self, kind: EntityKind, id: &Id) -> RepoResult<Id>;

    async fn upsert_edge(&mut self, edge: EdgeUpsert) -> RepoResult<()>;

    async fn insert_claim(&mut self, claim: Claim) -> RepoResult<()>;

    async fn get_claim(&mut self, claim_id: &str) -> RepoResult<Option<Claim>>;

    async fn supersede_claim(
        &mut self,
        old_claim_id: &str,
        new_claim_id: &str,
        superseded_at: discograph_core::util::clock::Timestamp,
    ) -> RepoResult<()>;

    /// Rewires every edge touching `absorbed` onto `survivor`, preserving
    /// edge type and properties (§4.7), and returns the number of edges
    /// moved.
    async fn rewire_edges(&mut self, absorbed: &Id, survivor: &Id) -> RepoResult<usize>;

    /// Tombstones `absorbed` and copies missing scalar attributes from it
    /// onto `survivor` (§4.7: "union alt_names; fill null fields").
    async fn merge_node_attributes(
        &mut self,
        kind: EntityKind,
        survivor: &Id,
        absorbed: &Id,
        event_hash: &str,
    ) -> RepoResult<()>;

    async fn insert_merge_record(&mut self, record: MergeRecord) -> RepoResult<()>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;

    async fn rollback(self: Box<Self>) -> RepoResult<()>;
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn begin_transaction(&self) -> RepoResult<Box<dyn GraphTransaction>>;
}
