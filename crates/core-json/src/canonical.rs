// SPDX-License-Identifier: AGPL-3.0-or-later

//! The canonical release-bundle shape (§4.3, §6): the output of the Bundle
//! Normalizer and the input to the Bundle Validator and Graph Projector.
//! `deny_unknown_fields` at every depth, matching the spec's
//! `additionalProperties: false` contract.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalBundle {
    pub release: CanonicalRelease,
    pub groups: Vec<CanonicalGroup>,
    pub tracks: Vec<CanonicalTrack>,
    pub tracklist: Vec<CanonicalTracklistItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub songs: Vec<CanonicalSong>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<CanonicalSource>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalRelease {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<CanonicalLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guests: Vec<CanonicalCredit>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalLabel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_city: Option<CanonicalCity>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalCity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbanded_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_city: Option<CanonicalCity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<CanonicalMember>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instruments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalCredit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instruments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credited_as: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalTrack {
    pub track_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listen_links: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performed_by_groups: Vec<CanonicalPerformingGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guests: Vec<CanonicalCredit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub producers: Vec<CanonicalCredit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arrangers: Vec<CanonicalCredit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_of: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<CanonicalSample>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalPerformingGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credited_as: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<CanonicalMember>,
    #[serde(default)]
    pub members_are_complete: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// The normalized tracklist shape of §4.3: "output items contain only
/// `{position, track_title, track_id, duration?}`".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalTracklistItem {
    pub position: String,
    pub track_title: String,
    pub track_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalSong {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iswc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub writers: Vec<CanonicalWriterCredit>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalWriterCredit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credited_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_percentage: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_field_at_any_depth() {
        let json = serde_json::json!({
            "release": { "name": "X", "unexpected": true },
            "groups": [], "tracks": [], "tracklist": [],
        });
        assert!(serde_json::from_value::<CanonicalBundle>(json).is_err());
    }

    #[test]
    fn round_trips_minimal_bundle() {
        let bundle = CanonicalBundle {
            release: CanonicalRelease {
                name: "Abbey Road".to_owned(),
                ..Default::default()
            },
            tracks: vec![CanonicalTrack {
                track_id: "prov:track:abc".to_owned(),
                title: "Come Together".to_owned(),
                ..Default::default()
            }],
            tracklist: vec![CanonicalTracklistItem {
                position: "1".to_owned(),
                track_title: "Come Together".to_owned(),
                track_id: "prov:track:abc".to_owned(),
                duration: None,
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&bundle).unwrap();
        let round_tripped: CanonicalBundle = serde_json::from_value(json).unwrap();
        assert_eq!(bundle, round_tripped);
    }
}
