// SPDX-License-Identifier: AGPL-3.0-or-later

use async_trait::async_trait;
use dashmap::DashMap;
use discograph_core::entity::{EntityKind, Id};
use discograph_repo::{identity_map::IdentityMapStore, RepoResult};

type Key = (String, EntityKind, String);

/// `key = (source, kind, external_id) -> canonical_id`, never rewritten
/// once an entry exists (§3, §4.1).
#[derive(Debug, Default)]
pub struct InMemoryIdentityMapStore {
    entries: DashMap<Key, Id>,
}

impl InMemoryIdentityMapStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityMapStore for InMemoryIdentityMapStore {
    async fn resolve(
        &self,
        source: &str,
        kind: EntityKind,
        external_id: &str,
    ) -> RepoResult<Option<Id>> {
        let key = (source.to_owned(), kind, external_id.to_owned());
        Ok(self.entries.get(&key).map(|entry| entry.value().clone()))
    }

    async fn insert_if_absent(
        &self,
        source: &str,
        kind: EntityKind,
        external_id: &str,
        canonical_id: Id,
    ) -> RepoResult<Id> {
        let key = (source.to_owned(), kind, external_id.to_owned());
        let entry = self.entries.entry(key).or_insert(canonical_id);
        Ok(entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_rewrites_an_existing_mapping() {
        let store = InMemoryIdentityMapStore::new();
        let first = store
            .insert_if_absent("discogs", EntityKind::Person, "123", Id::new("graph:person:a"))
            .await
            .unwrap();
        let second = store
            .insert_if_absent("discogs", EntityKind::Person, "123", Id::new("graph:person:b"))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Id::new("graph:person:a"));
    }
}
