// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Bundle Validator (§4.4): a pure schema check over the canonical
//! shape. Unknown-field rejection is already enforced by
//! `#[serde(deny_unknown_fields)]` on every [`discograph_core_json::canonical`]
//! type at deserialization time; this module checks the semantic
//! constraints serde cannot express (non-empty strings, numeric ranges,
//! cross-references) and reports every violation, not just the first.

use discograph_core_json::canonical::CanonicalBundle;

use crate::ValidationError;

pub fn validate_bundle(bundle: &CanonicalBundle) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();

    if bundle.release.name.trim().is_empty() {
        errors.push("release.name", "must be non-empty");
    }
    for (index, label) in bundle.release.labels.iter().enumerate() {
        check_city(label.origin_city.as_ref(), &format!("release.labels[{index}].origin_city"), &mut errors);
    }

    if bundle.tracks.is_empty() {
        errors.push("tracks", "must be non-empty");
    }
    if bundle.tracklist.is_empty() {
        errors.push("tracklist", "must be non-empty");
    }

    for (index, track) in bundle.tracks.iter().enumerate() {
        let path = format!("tracks[{index}]");
        if track.title.trim().is_empty() {
            errors.push(format!("{path}.title"), "must be non-empty");
        }
        if let Some(duration) = track.duration {
            if duration < 0.0 {
                errors.push(format!("{path}.duration"), "must be non-negative");
            }
        }
    }

    for (index, group) in bundle.groups.iter().enumerate() {
        check_city(
            group.origin_city.as_ref(),
            &format!("groups[{index}].origin_city"),
            &mut errors,
        );
    }

    for (index, item) in bundle.tracklist.iter().enumerate() {
        let path = format!("tracklist[{index}]");
        if item.position.trim().is_empty() {
            errors.push(format!("{path}.position"), "must be non-empty");
        }
        if item.track_title.trim().is_empty() {
            errors.push(format!("{path}.track_title"), "must be non-empty");
        }
        if !bundle.tracks.iter().any(|t| t.track_id == item.track_id) {
            errors.push(
                format!("{path}.track_id"),
                "must reference a track present in the bundle's track catalog",
            );
        }
    }

    errors.into_result()
}

fn check_city(
    city: Option<&discograph_core_json::canonical::CanonicalCity>,
    path: &str,
    errors: &mut ValidationError,
) {
    let Some(city) = city else {
        return;
    };
    if let Some(lat) = city.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            errors.push(format!("{path}.latitude"), "must be within [-90, 90]");
        }
    }
    if let Some(lon) = city.longitude {
        if !(-180.0..=180.0).contains(&lon) {
            errors.push(format!("{path}.longitude"), "must be within [-180, 180]");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discograph_core_json::canonical::{CanonicalRelease, CanonicalTrack, CanonicalTracklistItem};

    #[test]
    fn requires_non_empty_tracks_and_tracklist() {
        let bundle = CanonicalBundle {
            release: CanonicalRelease {
                name: "X".to_owned(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_bundle(&bundle).unwrap_err();
        assert!(err.0.iter().any(|i| i.path == "tracks"));
        assert!(err.0.iter().any(|i| i.path == "tracklist"));
    }

    #[test]
    fn rejects_tracklist_item_referencing_unknown_track() {
        let bundle = CanonicalBundle {
            release: CanonicalRelease {
                name: "X".to_owned(),
                ..Default::default()
            },
            tracks: vec![CanonicalTrack {
                track_id: "prov:track:a".to_owned(),
                title: "A".to_owned(),
                ..Default::default()
            }],
            tracklist: vec![CanonicalTracklistItem {
                position: "1".to_owned(),
                track_title: "A".to_owned(),
                track_id: "prov:track:does-not-exist".to_owned(),
                duration: None,
            }],
            ..Default::default()
        };
        let err = validate_bundle(&bundle).unwrap_err();
        assert!(err.0.iter().any(|i| i.path == "tracklist[0].track_id"));
    }

    #[test]
    fn accepts_minimal_valid_bundle() {
        let bundle = CanonicalBundle {
            release: CanonicalRelease {
                name: "X".to_owned(),
                ..Default::default()
            },
            tracks: vec![CanonicalTrack {
                track_id: "prov:track:a".to_owned(),
                title: "A".to_owned(),
                ..Default::default()
            }],
            tracklist: vec![CanonicalTracklistItem {
                position: "1".to_owned(),
                track_title: "A".to_owned(),
                track_id: "prov:track:a".to_owned(),
                duration: None,
            }],
            ..Default::default()
        };
        assert!(validate_bundle(&bundle).is_ok());
    }
}
