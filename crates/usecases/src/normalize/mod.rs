// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Bundle Normalizer (§4.3): folds a permissive [`RawBundle`] into the
//! strict [`CanonicalBundle`], or fails with one accumulated
//! [`ValidationError`] listing every offending path. Nothing downstream
//! ever sees a partially normalized bundle.

mod track_catalog;
mod tracklist;

use discograph_core::role::{normalize_roles, RoleInput};
use discograph_core_json::{canonical, raw};

use crate::{ValidationError, ValidationIssue};

/// `normalize(bundle) -> canonical | fail(ValidationError)` (§4.3).
pub fn normalize_bundle(raw: raw::RawBundle) -> Result<canonical::CanonicalBundle, ValidationError> {
    let mut errors = ValidationError::default();

    let release_name = raw.release.name.clone().unwrap_or_default();
    if release_name.trim().is_empty() {
        errors.push("release.name", "release name is required");
    }

    let groups: Vec<canonical::CanonicalGroup> = raw
        .groups
        .iter()
        .enumerate()
        .map(|(index, group)| normalize_group(group, &mut errors, &format!("groups[{index}]")))
        .collect();

    let catalog = track_catalog::build(&raw, &mut errors);

    let tracklist =
        tracklist::reconcile(&raw.tracklist, &catalog, &mut errors);

    let tracks = catalog
        .into_iter()
        .map(|entry| normalize_track(entry.track, entry.track_id, &mut errors))
        .collect();

    let songs = raw
        .songs
        .iter()
        .enumerate()
        .map(|(index, song)| normalize_song(song, &format!("songs[{index}]"), &mut errors))
        .collect();

    let sources = raw.sources.iter().map(normalize_source).collect();

    let release = normalize_release(&raw.release, release_name, &mut errors);

    errors.clone().into_result()?;

    Ok(canonical::CanonicalBundle {
        release,
        groups,
        tracks,
        tracklist,
        songs,
        sources,
    })
}

fn normalize_city(
    city: Option<&raw::RawCityRef>,
    path: &str,
    errors: &mut ValidationError,
) -> Option<canonical::CanonicalCity> {
    match city {
        None | Some(raw::RawCityRef::None) => None,
        Some(raw::RawCityRef::Name(name)) => Some(canonical::CanonicalCity {
            name: name.clone(),
            latitude: None,
            longitude: None,
        }),
        Some(raw::RawCityRef::Detailed {
            name,
            latitude,
            longitude,
        }) => {
            if let Some(lat) = latitude {
                if !(-90.0..=90.0).contains(lat) {
                    errors.push(format!("{path}.latitude"), "latitude out of range");
                }
            }
            if let Some(lon) = longitude {
                if !(-180.0..=180.0).contains(lon) {
                    errors.push(format!("{path}.longitude"), "longitude out of range");
                }
            }
            Some(canonical::CanonicalCity {
                name: name.clone(),
                latitude: *latitude,
                longitude: *longitude,
            })
        }
    }
}

fn normalize_member(member: &raw::RawMember) -> canonical::CanonicalMember {
    let roles = normalize_roles(Some(&role_input(member.role.as_deref(), &member.roles)));
    canonical::CanonicalMember {
        name: member.name.clone(),
        person_id: member.person_id.clone(),
        roles,
        instruments: member.instruments.clone(),
        from_date: member.from_date.clone(),
        to_date: member.to_date.clone(),
    }
}

fn normalize_credit(credit: &raw::RawCredit) -> canonical::CanonicalCredit {
    let roles = normalize_roles(Some(&role_input(credit.role.as_deref(), &credit.roles)));
    canonical::CanonicalCredit {
        name: credit.name.clone(),
        person_id: credit.person_id.clone(),
        roles,
        role_detail: credit.role_detail.clone(),
        instruments: credit.instruments.clone(),
        credited_as: credit.credited_as.clone(),
    }
}

/// Folds a separate `role: Option<String>` plus `roles: Vec<String>` (both
/// accepted on the wire) into the single [`RoleInput`] the Role Normalizer
/// (§4.2) expects.
fn role_input(role: Option<&str>, roles: &[String]) -> RoleInput {
    let mut combined: Vec<String> = roles.to_vec();
    if let Some(role) = role {
        combined.push(role.to_owned());
    }
    RoleInput::List(combined)
}

fn normalize_group(
    group: &raw::RawGroup,
    errors: &mut ValidationError,
    path: &str,
) -> canonical::CanonicalGroup {
    if group.name.trim().is_empty() {
        errors.push(format!("{path}.name"), "group name is required");
    }
    canonical::CanonicalGroup {
        name: group.name.clone(),
        group_id: group.group_id.clone(),
        alt_names: group.alt_names.clone(),
        bio: group.bio.clone(),
        formed_date: group.formed_date.clone(),
        disbanded_date: group.disbanded_date.clone(),
        origin_city: normalize_city(group.origin_city.as_ref(), &format!("{path}.origin_city"), errors),
        members: group.members.iter().map(normalize_member).collect(),
    }
}

/// Rewrites the 3-way performing-group fallback (`performed_by_groups` >
/// legacy `groups` > bare-string `performed_by`) into the canonical form
/// (§4.3). A bare string is promoted to a single unnamed performing group,
/// per the §9 open-question resolution recorded in `DESIGN.md`.
fn normalize_performing_groups(track: &raw::RawTrack) -> Vec<canonical::CanonicalPerformingGroup> {
    if !track.performed_by_groups.is_empty() {
        return track
            .performed_by_groups
            .iter()
            .map(normalize_performing_group)
            .collect();
    }
    if !track.groups.is_empty() {
        return track.groups.iter().map(normalize_performing_group).collect();
    }
    if let Some(name) = &track.performed_by {
        return vec![canonical::CanonicalPerformingGroup {
            name: Some(name.clone()),
            group_id: None,
            role: None,
            credited_as: None,
            members: Vec::new(),
            members_are_complete: false,
        }];
    }
    Vec::new()
}

fn normalize_performing_group(
    group: &raw::RawPerformingGroup,
) -> canonical::CanonicalPerformingGroup {
    canonical::CanonicalPerformingGroup {
        name: group.name.clone(),
        group_id: group.group_id.clone(),
        role: group.role.clone(),
        credited_as: group.credited_as.clone(),
        members: group.members.iter().map(normalize_member).collect(),
        members_are_complete: group.members_are_complete,
    }
}

fn normalize_track(
    track: raw::RawTrack,
    track_id: String,
    errors: &mut ValidationError,
) -> canonical::CanonicalTrack {
    if track.title.trim().is_empty() {
        errors.push(format!("tracks[{track_id}].title"), "track title is required");
    }
    let performed_by_groups = normalize_performing_groups(&track);
    canonical::CanonicalTrack {
        track_id,
        title: track.title,
        isrc: track.isrc,
        duration: track.duration,
        recording_date: track.recording_date,
        location: track.location,
        listen_links: track.listen_links,
        performed_by_groups,
        guests: track.guests.iter().map(normalize_credit).collect(),
        producers: track.producers.iter().map(normalize_credit).collect(),
        arrangers: track.arrangers.iter().map(normalize_credit).collect(),
        recording_of: track.recording_of,
        cover_of: track.cover_of,
        samples: track
            .samples
            .into_iter()
            .map(|sample| canonical::CanonicalSample {
                track_id: sample.track_id,
                portion_used: sample.portion_used,
                cleared: sample.cleared,
                source: sample.source,
            })
            .collect(),
    }
}

fn normalize_song(
    song: &raw::RawSong,
    path: &str,
    errors: &mut ValidationError,
) -> canonical::CanonicalSong {
    if song.title.trim().is_empty() {
        errors.push(format!("{path}.title"), "song title is required");
    }
    canonical::CanonicalSong {
        title: song.title.clone(),
        alt_titles: song.alt_titles.clone(),
        iswc: song.iswc.clone(),
        year: song.year,
        lyrics: song.lyrics.clone(),
        writers: song
            .writers
            .iter()
            .map(|writer| canonical::CanonicalWriterCredit {
                name: writer.name.clone(),
                person_id: writer.person_id.clone(),
                roles: normalize_roles(Some(&role_input(writer.role.as_deref(), &writer.roles))),
                role_detail: writer.role_detail.clone(),
                credited_as: writer.credited_as.clone(),
                share_percentage: writer.share_percentage,
            })
            .collect(),
    }
}

fn normalize_source(source: &raw::RawSource) -> canonical::CanonicalSource {
    canonical::CanonicalSource {
        url: source.url.clone(),
        source_type: source.source_type.clone(),
        accessed_at: source.accessed_at.clone(),
    }
}

/// Folds a string-or-object `parent_label` (§4.3) down to its name.
fn normalize_parent_label(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(name)) => Some(name.clone()),
        Some(serde_json::Value::Object(obj)) => obj
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

fn normalize_label(label: &raw::RawLabel, errors: &mut ValidationError, path: &str) -> canonical::CanonicalLabel {
    canonical::CanonicalLabel {
        name: label.name.clone(),
        parent_label: normalize_parent_label(label.parent_label.as_ref()),
        origin_city: normalize_city(label.origin_city.as_ref(), &format!("{path}.origin_city"), errors),
    }
}

fn normalize_release(
    release: &raw::RawRelease,
    name: String,
    errors: &mut ValidationError,
) -> canonical::CanonicalRelease {
    canonical::CanonicalRelease {
        name,
        release_date: release.release_date.clone(),
        format: release.format.clone(),
        country: release.country.clone(),
        catalog_number: release.catalog_number.clone(),
        album_art: release.album_art.clone(),
        notes: release.notes.clone(),
        labels: release
            .labels
            .iter()
            .enumerate()
            .map(|(index, label)| normalize_label(label, errors, &format!("release.labels[{index}]")))
            .collect(),
        master: release.master.clone(),
        guests: release.guests.iter().map(normalize_credit).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_legacy_string_performed_by_into_canonical_group() {
        let raw = raw::RawBundle {
            release: raw::RawRelease {
                name: Some("X".to_owned()),
                ..Default::default()
            },
            tracks: vec![raw::RawTrack {
                title: "Song A".to_owned(),
                performed_by: Some("The Band".to_owned()),
                ..Default::default()
            }],
            tracklist: vec![raw::RawTracklistItem {
                track_title: Some("Song A".to_owned()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let bundle = normalize_bundle(raw).unwrap();
        assert_eq!(bundle.tracks.len(), 1);
        assert_eq!(
            bundle.tracks[0].performed_by_groups[0].name.as_deref(),
            Some("The Band")
        );
    }

    #[test]
    fn missing_release_name_is_an_accumulated_error() {
        let raw = raw::RawBundle::default();
        let err = normalize_bundle(raw).unwrap_err();
        assert!(err.0.iter().any(|issue| issue.path == "release.name"));
    }
}
