// SPDX-License-Identifier: AGPL-3.0-or-later

//! The relationship (edge) property shapes of §3. These are plain data;
//! the graph store contract in `discograph-repo` treats an edge as
//! `(from, EdgeKind, to, properties)`.

use serde::{Deserialize, Serialize};

use crate::entity::Id;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineupSource {
    TrackExplicit,
    ReleaseDefault,
    ReleaseDefaultByName,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberOf {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPerformedOn {
    pub role: Option<String>,
    pub credited_as: Option<String>,
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPerformedOn {
    pub derived: bool,
    pub via_group_id: Id,
    #[serde(default)]
    pub roles: Vec<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub lineup_source: LineupSource,
    pub claim_id: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestScope {
    Release,
    Track,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestOn {
    #[serde(default)]
    pub roles: Vec<String>,
    pub role: Option<String>,
    pub role_detail: Option<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub credited_as: Option<String>,
    pub scope: GuestScope,
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wrote {
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub role_detail: Option<String>,
    pub credited_as: Option<String>,
    /// Stored in basis points (hundredths of a percent) to keep this `Eq`.
    pub share_percentage_bp: Option<u32>,
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducedOrArranged {
    pub role: Option<String>,
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingOf {
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverOf {
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Samples {
    pub portion_used: Option<String>,
    pub cleared: Option<bool>,
    pub source: Option<String>,
    pub claim_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InRelease {
    pub position: String,
    pub disc_number: u32,
    pub track_number: Option<u32>,
    pub side: Option<String>,
    pub is_bonus: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitted {
    pub event_hash: String,
    pub timestamp: crate::util::clock::Timestamp,
}
