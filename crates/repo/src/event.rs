// SPDX-License-Identifier: AGPL-3.0-or-later

//! The event-store contract (§6, §4.8): a content-addressed map from event
//! hash to the persisted anchored event plus processing metadata.

use async_trait::async_trait;

use crate::RepoResult;

#[derive(Clone, Debug, PartialEq)]
pub struct StoredEvent {
    pub content_hash: String,
    pub event_hash: String,
    pub payload: String,
    pub block_num: u64,
    pub block_id: String,
    pub trx_id: String,
    pub action_ordinal: u32,
    pub timestamp: discograph_core::util::clock::Timestamp,
    pub source: String,
    pub contract_account: String,
    pub action_name: String,
    pub blockchain_verified: bool,
    pub processed: bool,
    pub failure: Option<String>,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// `true` if `content_hash` has already been persisted, used for the
    /// dedup check of §4.8 step 1.
    async fn contains_content_hash(&self, content_hash: &str) -> RepoResult<bool>;

    async fn put_event(&self, event: StoredEvent) -> RepoResult<()>;

    async fn get_event(&self, event_hash: &str) -> RepoResult<Option<StoredEvent>>;

    /// Marks the event processed (dispatched and committed) or records a
    /// permanent failure marker (§5: "the event is stored with a failure
    /// marker but not projected"). Dedup state is not updated until this
    /// call, matching the cancellation contract of §4.8.
    async fn mark_outcome(&self, event_hash: &str, failure: Option<String>) -> RepoResult<()>;
}
