// SPDX-License-Identifier: AGPL-3.0-or-later

//! The `IdentityMap` contract (§3, §4.1): `key = (source, kind, external_id)
//! -> canonical_id`, created on first successful resolution and never
//! rewritten.

use async_trait::async_trait;
use discograph_core::entity::{EntityKind, Id};

use crate::RepoResult;

#[async_trait]
pub trait IdentityMapStore: Send + Sync {
    async fn resolve(
        &self,
        source: &str,
        kind: EntityKind,
        external_id: &str,
    ) -> RepoResult<Option<Id>>;

    /// Inserts the mapping if absent and returns the canonical id that is
    /// now on record — either `canonical_id` if this call created the
    /// entry, or whatever a concurrent writer already established (§5:
    /// "concurrent events creating new external mappings serialize via the
    /// unique constraint").
    async fn insert_if_absent(
        &self,
        source: &str,
        kind: EntityKind,
        external_id: &str,
        canonical_id: Id,
    ) -> RepoResult<Id>;
}
