// SPDX-License-Identifier: AGPL-3.0-or-later

//! Track catalog construction (§4.3): `bundle.tracks > bundle.release.tracks
//! > derive-from-tracklist`, each entry minted a stable `track_id`.

use discograph_core::identity::{self, fingerprint::Fingerprint, ParsedId};
use discograph_core_json::raw::{RawBundle, RawTrack, RawTracklistItem};

use crate::ValidationError;

pub struct CatalogEntry {
    pub track: RawTrack,
    pub track_id: String,
}

pub fn build(bundle: &RawBundle, errors: &mut ValidationError) -> Vec<CatalogEntry> {
    let source_tracks: Vec<RawTrack> = if !bundle.tracks.is_empty() {
        bundle.tracks.clone()
    } else if !bundle.release.tracks.is_empty() {
        bundle.release.tracks.clone()
    } else {
        derive_from_tracklist(&bundle.tracklist)
    };

    let mut seen = std::collections::HashSet::new();
    let mut catalog = Vec::with_capacity(source_tracks.len());
    for (index, track) in source_tracks.into_iter().enumerate() {
        let track_id = mint_track_id(&track);
        if !seen.insert(track_id.clone()) {
            tracing::debug!(
                track_id,
                index,
                "dropping duplicate track id in input bundle"
            );
            continue;
        }
        catalog.push(CatalogEntry { track, track_id });
    }
    let _ = errors; // duplicates are a diagnostic, not a validation error (§4.3)
    catalog
}

fn derive_from_tracklist(tracklist: &[RawTracklistItem]) -> Vec<RawTrack> {
    tracklist
        .iter()
        .map(|item| RawTrack {
            title: item.track_title.clone().unwrap_or_default(),
            track_id: item.track_id.clone(),
            ..Default::default()
        })
        .collect()
}

/// Mints the track's stable catalog id: an explicit canonical/external id
/// is honored as-is (§4.1 resolution policy step 1/2); otherwise ISRC wins
/// over the title+duration fingerprint (§4.3).
fn mint_track_id(track: &RawTrack) -> String {
    if let Some(existing) = &track.track_id {
        match identity::parse_id(existing) {
            ParsedId::Canonical { .. } | ParsedId::External { .. } => return existing.clone(),
            _ => {}
        }
    }
    if let Some(isrc) = &track.isrc {
        return identity::fingerprint::make_isrc_track_id(isrc);
    }
    let fingerprint = Fingerprint::track(&track.title, None, None);
    let duration = track.duration.unwrap_or(0.0);
    mint_with_duration(&fingerprint, duration)
}

/// §4.3: "SHA-256-16-hex over normalized title + duration" — duration is
/// folded in alongside the title-based fingerprint JSON rather than reusing
/// [`discograph_core::identity::fingerprint::make_provisional_id`] verbatim,
/// since that helper's `Fingerprint::track` intentionally omits duration
/// (it is used elsewhere for release/position-aware track resolution,
/// §4.1).
fn mint_with_duration(fingerprint: &Fingerprint, duration: f64) -> String {
    let value = serde_json::json!({ "fingerprint": fingerprint.as_value(), "duration": duration });
    let canonical = discograph_core::util::hash::canonical_json(&value);
    let digest = discograph_core::util::hash::sha256_hex_prefix(canonical, 16);
    format!("prov:track:{digest}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isrc_wins_over_title_fingerprint() {
        let track = RawTrack {
            title: "Come Together".to_owned(),
            isrc: Some("usrc17607839".to_owned()),
            ..Default::default()
        };
        assert_eq!(mint_track_id(&track), "prov:track:isrc:USRC17607839");
    }

    #[test]
    fn duplicate_track_ids_are_dropped_first_wins() {
        let bundle = RawBundle {
            tracks: vec![
                RawTrack {
                    title: "Same Title".to_owned(),
                    duration: Some(100.0),
                    location: Some("first".to_owned()),
                    ..Default::default()
                },
                RawTrack {
                    title: "Same Title".to_owned(),
                    duration: Some(100.0),
                    location: Some("second".to_owned()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut errors = ValidationError::default();
        let catalog = build(&bundle, &mut errors);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].track.location.as_deref(), Some("first"));
    }
}
