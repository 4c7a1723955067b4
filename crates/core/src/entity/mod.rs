// SPDX-License-Identifier: AGPL-3.0-or-later

//! The entity kinds of §3 and the universal invariants every node obeys:
//! a kind-specific id, a universal `id` (equal to the kind-specific id at
//! creation time), a lifecycle `status`, and the provenance of its id
//! (`id_kind`).

use std::fmt;

use semval::prelude::*;
use serde::{Deserialize, Serialize};

pub mod account;
pub mod city;
pub mod group;
pub mod label;
pub mod master;
pub mod person;
pub mod release;
pub mod song;
pub mod source;
pub mod track;

/// The whitelist of entity kinds that participate in identity resolution,
/// claims, and merges (§4.1, §4.6, §4.7). `Account` and `Source` are
/// entities too (§3) but are never claim/merge targets, so they are not
/// part of this sum type — exactly the polymorphism-over-entity-kinds
/// design called for in §9: a compile-time tagged variant instead of
/// dynamic label interpolation into graph queries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Group,
    Song,
    Track,
    Release,
    Master,
    Label,
    City,
}

impl EntityKind {
    pub const ALL: [Self; 8] = [
        Self::Person,
        Self::Group,
        Self::Song,
        Self::Track,
        Self::Release,
        Self::Master,
        Self::Label,
        Self::City,
    ];

    /// Case-insensitive parse against the whitelist, used by the Claim and
    /// Merge engines (§4.6, §4.7) to reject unknown kinds.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "person" => Some(Self::Person),
            "group" => Some(Self::Group),
            "song" => Some(Self::Song),
            "track" => Some(Self::Track),
            "release" => Some(Self::Release),
            "master" => Some(Self::Master),
            "label" => Some(Self::Label),
            "city" => Some(Self::City),
            _ => None,
        }
    }

    /// The graph node label, e.g. `"Person"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Group => "Group",
            Self::Song => "Song",
            Self::Track => "Track",
            Self::Release => "Release",
            Self::Master => "Master",
            Self::Label => "Label",
            Self::City => "City",
        }
    }

    /// The kind-specific id field name, e.g. `"person_id"`.
    #[must_use]
    pub const fn id_field(self) -> &'static str {
        match self {
            Self::Person => "person_id",
            Self::Group => "group_id",
            Self::Song => "song_id",
            Self::Track => "track_id",
            Self::Release => "release_id",
            Self::Master => "master_id",
            Self::Label => "label_id",
            Self::City => "city_id",
        }
    }

    /// The lowercase name used in provisional-id and external-id grammars.
    #[must_use]
    pub const fn grammar_name(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Group => "group",
            Self::Song => "song",
            Self::Track => "track",
            Self::Release => "release",
            Self::Master => "master",
            Self::Label => "label",
            Self::City => "city",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.grammar_name())
    }
}

#[derive(Copy, Clone, Debug)]
pub enum EntityKindInvalidity {
    Unknown,
}

/// The lifecycle state of a node, per the universal invariants of §3.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    Provisional,
    Merged,
}

/// The provenance of a node's id, per §4.1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    Canonical,
    Provisional,
    External,
}

/// An id value as stored on a node or referenced by an edge.
///
/// Deliberately untyped by `EntityKind` at the value level (unlike the
/// teacher's `EntityUidTyped<T>`): identity resolution (§4.1) routinely
/// produces an id before the caller has fully committed to which kind it
/// belongs to (e.g. a `recording_of` reference may be a title, not an id),
/// so the kind is tracked alongside the id rather than baked into its type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Copy, Clone, Debug)]
pub enum IdInvalidity {
    Empty,
}

impl Validate for Id {
    type Invalidity = IdInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(self.0.trim().is_empty(), Self::Invalidity::Empty)
            .into()
    }
}

/// A resolved-but-not-yet-mapped external reference, kept on a node created
/// from an external id that did not hit the `IdentityMap` (§4.1 step 2).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    pub source: String,
    pub external_id: String,
}

/// The header every node carries, independent of its kind-specific
/// attributes: both id fields (equal at creation, per §3's universal
/// invariants), lifecycle status, id provenance, and tombstone fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHeader {
    pub kind: EntityKind,
    /// The kind-specific id, e.g. `person_id`.
    pub kind_id: Id,
    /// The universal `id`, equal to `kind_id` at creation (§3).
    pub id: Id,
    pub status: EntityStatus,
    pub id_kind: IdKind,
    pub external_ref: Option<ExternalRef>,
    /// Set only when `status == Merged` (§4.7): the survivor's id.
    pub merged_into: Option<Id>,
    /// Set only when `status == Merged`: the event that performed the merge.
    pub merge_event_hash: Option<String>,
}

impl NodeHeader {
    #[must_use]
    pub fn new(kind: EntityKind, id: Id, id_kind: IdKind) -> Self {
        Self {
            kind,
            kind_id: id.clone(),
            id,
            status: if id_kind == IdKind::Provisional {
                EntityStatus::Provisional
            } else {
                EntityStatus::Active
            },
            id_kind,
            external_ref: None,
            merged_into: None,
            merge_event_hash: None,
        }
    }

    #[must_use]
    pub fn is_tombstoned(&self) -> bool {
        self.status == EntityStatus::Merged
    }
}

#[derive(Copy, Clone, Debug)]
pub enum NodeHeaderInvalidity {
    KindId(IdInvalidity),
    Id(IdInvalidity),
    /// §3: `id` must equal `kind_id` unless the node has been merged away.
    IdKindIdMismatch,
}

impl Validate for NodeHeader {
    type Invalidity = NodeHeaderInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.kind_id, Self::Invalidity::KindId)
            .validate_with(&self.id, Self::Invalidity::Id)
            .invalidate_if(
                self.status != EntityStatus::Merged && self.kind_id != self.id,
                Self::Invalidity::IdKindIdMismatch,
            )
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(EntityKind::parse("Person"), Some(EntityKind::Person));
        assert_eq!(EntityKind::parse("PERSON"), Some(EntityKind::Person));
        assert_eq!(EntityKind::parse("bogus"), None);
    }

    #[test]
    fn fresh_header_has_matching_ids() {
        let hdr = NodeHeader::new(EntityKind::Person, Id::new("prov:person:abc"), IdKind::Provisional);
        assert_eq!(hdr.kind_id, hdr.id);
        assert!(hdr.validate().is_ok());
    }
}
