// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wire payloads for the Claim Engine (§4.6) and Merge Engine (§4.7).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `kind` is a raw string rather than `EntityKind` here: §4.6 requires
/// case-insensitive whitelist matching (`"Person"`/`"PERSON"` must resolve
/// the same as `"person"`), but `EntityKind`'s derived `Deserialize` is
/// case-sensitive. Callers resolve this field through
/// `EntityKind::parse`, which normalizes case and yields a rejection
/// distinguishable from a malformed-payload parse failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimTargetRef {
    pub kind: String,
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddClaimRequest {
    pub target: ClaimTargetRef,
    pub field: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub author: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditClaimRequest {
    pub claim_id: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub author: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeEntityRequest {
    pub survivor_id: String,
    pub absorbed_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_field_on_add_claim() {
        let json = serde_json::json!({
            "target": {"kind": "person", "id": "prov:person:abc"},
            "field": "bio", "value": "text", "author": "alice", "oops": 1,
        });
        assert!(serde_json::from_value::<AddClaimRequest>(json).is_err());
    }
}
