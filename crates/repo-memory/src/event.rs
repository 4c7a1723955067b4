// SPDX-License-Identifier: AGPL-3.0-or-later

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use discograph_repo::{event::EventStore, event::StoredEvent, RepoResult};

/// §4.8: "dedup state lives in a bounded hash set plus a persistent
/// 'processed' marker on the stored event." The in-memory store keeps both
/// in the same map; `seen` exists to make the dedup check lock-free and
/// O(1) without touching the (larger) event bodies.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: DashMap<String, StoredEvent>,
    seen_content_hashes: DashSet<String>,
}

impl InMemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn contains_content_hash(&self, content_hash: &str) -> RepoResult<bool> {
        Ok(self.seen_content_hashes.contains(content_hash))
    }

    async fn put_event(&self, event: StoredEvent) -> RepoResult<()> {
        self.seen_content_hashes.insert(event.content_hash.clone());
        self.events.insert(event.event_hash.clone(), event);
        Ok(())
    }

    async fn get_event(&self, event_hash: &str) -> RepoResult<Option<StoredEvent>> {
        Ok(self.events.get(event_hash).map(|entry| entry.value().clone()))
    }

    async fn mark_outcome(&self, event_hash: &str, failure: Option<String>) -> RepoResult<()> {
        let Some(mut entry) = self.events.get_mut(event_hash) else {
            return Err(discograph_repo::RepoError::NotFound);
        };
        entry.processed = failure.is_none();
        entry.failure = failure;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discograph_core::util::clock::Timestamp;

    fn sample_event(content_hash: &str) -> StoredEvent {
        StoredEvent {
            content_hash: content_hash.to_owned(),
            event_hash: format!("hash-{content_hash}"),
            payload: "{}".to_owned(),
            block_num: 1,
            block_id: "b".to_owned(),
            trx_id: "t".to_owned(),
            action_ordinal: 0,
            timestamp: Timestamp::from_millis(0),
            source: "s".to_owned(),
            contract_account: "c".to_owned(),
            action_name: "put".to_owned(),
            blockchain_verified: true,
            processed: false,
            failure: None,
        }
    }

    #[tokio::test]
    async fn dedups_on_content_hash() {
        let store = InMemoryEventStore::new();
        assert!(!store.contains_content_hash("abc").await.unwrap());
        store.put_event(sample_event("abc")).await.unwrap();
        assert!(store.contains_content_hash("abc").await.unwrap());
    }

    #[tokio::test]
    async fn mark_outcome_updates_processed_flag() {
        let store = InMemoryEventStore::new();
        let event = sample_event("abc");
        let event_hash = event.event_hash.clone();
        store.put_event(event).await.unwrap();
        store.mark_outcome(&event_hash, None).await.unwrap();
        let stored = store.get_event(&event_hash).await.unwrap().unwrap();
        assert!(stored.processed);
    }
}
