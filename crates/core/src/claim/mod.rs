// SPDX-License-Identifier: AGPL-3.0-or-later

//! The immutable claim audit trail (§3, §4.6): claim value representation,
//! the protected-field set, and claim field-name safety checks. The
//! `ADD_CLAIM`/`EDIT_CLAIM` operations themselves are storage-aware and
//! live in `discograph-usecases`.

use std::sync::LazyLock;

use regex::Regex;
use semval::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    entity::{EntityKind, Id},
    util::clock::Timestamp,
};

/// §9: claim `value` may be any JSON. Represented internally as a tagged
/// value rather than an opaque `serde_json::Value`, so that storage
/// normalization (primitives and homogeneous primitive lists pass through
/// as-is; everything else is serialized to a JSON string, per §4.6) happens
/// once at the boundary rather than being re-derived at every call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Primitive(Primitive),
    PrimitiveList(Vec<Primitive>),
    /// Any other JSON shape, serialized to a JSON string for storage.
    Blob(Value),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

impl ClaimValue {
    /// Classifies a raw JSON value into the tagged representation of §9.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Primitive(Primitive::String(s)),
            Value::Number(n) => Self::Primitive(Primitive::Number(n)),
            Value::Bool(b) => Self::Primitive(Primitive::Bool(b)),
            Value::Null => Self::Primitive(Primitive::Null),
            Value::Array(items) => {
                let mut primitives = Vec::with_capacity(items.len());
                let mut homogeneous = true;
                for item in &items {
                    match item {
                        Value::String(s) => primitives.push(Primitive::String(s.clone())),
                        Value::Number(n) => primitives.push(Primitive::Number(n.clone())),
                        Value::Bool(b) => primitives.push(Primitive::Bool(*b)),
                        Value::Null => primitives.push(Primitive::Null),
                        Value::Array(_) | Value::Object(_) => {
                            homogeneous = false;
                            break;
                        }
                    }
                }
                if homogeneous {
                    Self::PrimitiveList(primitives)
                } else {
                    Self::Blob(Value::Array(items))
                }
            }
            object @ Value::Object(_) => Self::Blob(object),
        }
    }

    /// The storage-normalized form (§4.6): primitives and homogeneous
    /// primitive lists pass through; everything else becomes a JSON string.
    #[must_use]
    pub fn to_storage_value(&self) -> StorageValue {
        match self {
            Self::Primitive(p) => StorageValue::Primitive(p.clone()),
            Self::PrimitiveList(items) => StorageValue::PrimitiveList(items.clone()),
            Self::Blob(value) => StorageValue::Json(value.to_string()),
        }
    }
}

/// The value as it is actually written to the graph store.
#[derive(Clone, Debug, PartialEq)]
pub enum StorageValue {
    Primitive(Primitive),
    PrimitiveList(Vec<Primitive>),
    Json(String),
}

/// The claim-target whitelist of §4.6, reusing [`EntityKind`] (the same
/// eight kinds are valid claim/merge targets).
pub type ClaimTargetKind = EntityKind;

/// Fields that can never be the target of a claim (§4.6), checked after
/// trimming and case-sensitively (the spec's worked example pads `id` with
/// whitespace but does not vary its case).
pub const PROTECTED_FIELDS: &[&str] = &[
    "id",
    "claim_id",
    "source_id",
    "created_at",
    "created_by",
    "creation_source",
    "event_hash",
    "updated_at",
    "updated_by",
    "last_updated",
    "last_updated_by",
    "last_seen_at",
    "status",
    "blockchain_verified",
    "_just_created",
    "_merged_into",
];

/// Per-kind id fields (`person_id`, `group_id`, ...) are protected too.
#[must_use]
pub fn is_protected_field(kind: EntityKind, field: &str) -> bool {
    let trimmed = field.trim();
    trimmed == kind.id_field() || PROTECTED_FIELDS.contains(&trimmed)
}

static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// §4.6: the field name must match `^[A-Za-z_][A-Za-z0-9_]*$` (after
/// trimming is applied by the caller for the protected-field check; this
/// check is against the raw field name).
#[must_use]
pub fn is_safe_field_name(field: &str) -> bool {
    FIELD_NAME_RE.is_match(field)
}

/// A single immutable claim (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub target_kind: EntityKind,
    pub target_id: Id,
    pub field: String,
    pub value: ClaimValue,
    pub event_hash: String,
    pub created_at: Timestamp,
    pub superseded_by: Option<String>,
    pub superseded_at: Option<Timestamp>,
    pub source: Option<Id>,
}

impl Claim {
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.superseded_by.is_none()
    }
}

#[derive(Copy, Clone, Debug)]
pub enum ClaimInvalidity {
    FieldUnsafe,
    FieldProtected,
}

impl Validate for Claim {
    type Invalidity = ClaimInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(!is_safe_field_name(&self.field), Self::Invalidity::FieldUnsafe)
            .invalidate_if(
                is_protected_field(self.target_kind, &self.field),
                Self::Invalidity::FieldProtected,
            )
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_padded_protected_field() {
        assert!(is_protected_field(EntityKind::Person, "  id  "));
    }

    #[test]
    fn rejects_kind_specific_id_field() {
        assert!(is_protected_field(EntityKind::Person, "person_id"));
        assert!(!is_protected_field(EntityKind::Group, "person_id"));
    }

    #[test]
    fn field_name_grammar() {
        assert!(is_safe_field_name("bio"));
        assert!(is_safe_field_name("_private"));
        assert!(!is_safe_field_name("1bad"));
        assert!(!is_safe_field_name("has space"));
        assert!(!is_safe_field_name("has-dash"));
    }

    #[test]
    fn primitive_list_round_trips() {
        let value = ClaimValue::from_json(serde_json::json!(["a", "b"]));
        assert_eq!(
            value,
            ClaimValue::PrimitiveList(vec![
                Primitive::String("a".to_owned()),
                Primitive::String("b".to_owned())
            ])
        );
    }

    #[test]
    fn object_becomes_blob() {
        let value = ClaimValue::from_json(serde_json::json!({"a": 1}));
        assert!(matches!(value, ClaimValue::Blob(_)));
        if let StorageValue::Json(s) = value.to_storage_value() {
            assert_eq!(s, r#"{"a":1}"#);
        } else {
            panic!("expected JSON storage value");
        }
    }
}
