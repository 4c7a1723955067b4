// SPDX-License-Identifier: AGPL-3.0-or-later

//! The permissive input shape accepted at the ingest boundary (§4.3). Field
//! names accept both the canonical `snake_case` form and the legacy
//! `camelCase`/alias forms the Bundle Normalizer folds away; unknown fields
//! are ignored rather than rejected; that rejection happens later, against
//! the canonical shape (§4.4, [`crate::canonical`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawBundle {
    pub release: RawRelease,
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(default)]
    pub tracks: Vec<RawTrack>,
    #[serde(default)]
    pub tracklist: Vec<RawTracklistItem>,
    #[serde(default)]
    pub songs: Vec<RawSong>,
    #[serde(default)]
    pub sources: Vec<RawSource>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawRelease {
    #[serde(alias = "release_name")]
    pub name: Option<String>,
    #[serde(alias = "releaseDate")]
    pub release_date: Option<String>,
    pub format: Option<String>,
    pub country: Option<String>,
    pub catalog_number: Option<String>,
    #[serde(alias = "albumArt")]
    pub album_art: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    pub master: Option<String>,
    /// `bundle.release.tracks`, the second-priority source in the track
    /// catalog construction fallback of §4.3.
    #[serde(default)]
    pub tracks: Vec<RawTrack>,
    #[serde(default)]
    pub guests: Vec<RawCredit>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawLabel {
    pub name: String,
    /// Either a bare string or `{name: ...}`; folded in the normalizer.
    pub parent_label: Option<Value>,
    #[serde(alias = "city")]
    pub origin_city: Option<RawCityRef>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCityRef {
    Name(String),
    #[default]
    None,
    Detailed {
        name: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawGroup {
    pub name: String,
    pub group_id: Option<String>,
    #[serde(default)]
    pub alt_names: Vec<String>,
    pub bio: Option<String>,
    pub formed_date: Option<String>,
    pub disbanded_date: Option<String>,
    #[serde(alias = "city")]
    pub origin_city: Option<RawCityRef>,
    /// The group's release-level lineup, keyed later by id and by
    /// lowercased name (§4.5 step 1).
    #[serde(default)]
    pub members: Vec<RawMember>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawMember {
    pub name: String,
    pub person_id: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawCredit {
    pub name: String,
    pub person_id: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub role_detail: Option<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub credited_as: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawTrack {
    pub title: String,
    pub track_id: Option<String>,
    pub isrc: Option<String>,
    pub duration: Option<f64>,
    pub recording_date: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub listen_links: Vec<String>,

    /// Canonical form.
    #[serde(default)]
    pub performed_by_groups: Vec<RawPerformingGroup>,
    /// Legacy array form, rewritten to `performed_by_groups` (§4.3).
    #[serde(default)]
    pub groups: Vec<RawPerformingGroup>,
    /// Legacy bare-string form, promoted to a single unnamed performing
    /// group (§9 open question).
    pub performed_by: Option<String>,

    #[serde(default)]
    pub guests: Vec<RawCredit>,
    #[serde(default)]
    pub producers: Vec<RawCredit>,
    #[serde(default)]
    pub arrangers: Vec<RawCredit>,

    /// Either a resolvable id or a bare title (§4.5 step 4).
    pub recording_of: Option<String>,
    pub cover_of: Option<String>,
    #[serde(default)]
    pub samples: Vec<RawSample>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawPerformingGroup {
    pub name: Option<String>,
    pub group_id: Option<String>,
    pub role: Option<String>,
    pub credited_as: Option<String>,
    /// Explicit per-track member override (§4.5 step 4).
    #[serde(default)]
    pub members: Vec<RawMember>,
    #[serde(default)]
    pub members_are_complete: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawSample {
    pub track_id: Option<String>,
    pub title: Option<String>,
    pub portion_used: Option<String>,
    pub cleared: Option<bool>,
    pub source: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawTracklistItem {
    pub position: Option<String>,
    pub track_title: Option<String>,
    pub track_id: Option<String>,
    pub disc_number: Option<u32>,
    pub track_number: Option<u32>,
    pub side: Option<String>,
    #[serde(default)]
    pub is_bonus: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawSong {
    pub title: String,
    pub song_id: Option<String>,
    #[serde(default)]
    pub alt_titles: Vec<String>,
    pub iswc: Option<String>,
    pub year: Option<i32>,
    pub lyrics: Option<String>,
    #[serde(default)]
    pub writers: Vec<RawWriterCredit>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawWriterCredit {
    pub name: String,
    pub person_id: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub role_detail: Option<String>,
    pub credited_as: Option<String>,
    pub share_percentage: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawSource {
    pub url: String,
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub accessed_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_camel_case_release_fields() {
        let json = serde_json::json!({
            "release": { "release_name": "Abbey Road", "releaseDate": "1969-09-26", "albumArt": "http://x" },
        });
        let bundle: RawBundle = serde_json::from_value(json).unwrap();
        assert_eq!(bundle.release.name.as_deref(), Some("Abbey Road"));
        assert_eq!(bundle.release.release_date.as_deref(), Some("1969-09-26"));
        assert_eq!(bundle.release.album_art.as_deref(), Some("http://x"));
    }

    #[test]
    fn ignores_unknown_fields() {
        let json = serde_json::json!({
            "release": { "name": "X" },
            "mystery_field": 42,
        });
        assert!(serde_json::from_value::<RawBundle>(json).is_ok());
    }
}
