// SPDX-License-Identifier: AGPL-3.0-or-later

//! The anchored-event wire shape of §4.8/§6.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchoredEventWire {
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_hash: Option<String>,
    /// A JSON document encoded as a string, per §4.8/§6.
    pub payload: String,
    pub block_num: u64,
    pub block_id: String,
    pub trx_id: String,
    pub action_ordinal: u32,
    /// Unix seconds.
    pub timestamp: i64,
    pub source: String,
    pub contract_account: String,
    pub action_name: String,
}

/// The `action_name → event type` discrimination of §4.8: `put` maps to one
/// of the three payload shapes below (chosen by the payload's own `type`
/// field); `vote`/`finalize` are accepted but de-scoped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PutPayload {
    CreateReleaseBundle {
        bundle: crate::raw::RawBundle,
        submitter: String,
    },
    AddClaim(crate::request::AddClaimRequest),
    EditClaim(crate::request::EditClaimRequest),
    MergeEntity(crate::request::MergeEntityRequest),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_envelope_field() {
        let json = serde_json::json!({
            "content_hash": "ab", "payload": "{}", "block_num": 1,
            "block_id": "b", "trx_id": "t", "action_ordinal": 0,
            "timestamp": 0, "source": "s", "contract_account": "c",
            "action_name": "put", "extra": true,
        });
        assert!(serde_json::from_value::<AnchoredEventWire>(json).is_err());
    }
}
