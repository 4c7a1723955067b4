// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracklist reconciliation (§4.3): resolves each item against the track
//! catalog and derives a `position` string when the input omits one.

use discograph_core_json::{canonical::CanonicalTracklistItem, raw::RawTracklistItem};

use super::track_catalog::CatalogEntry;
use crate::ValidationError;

pub fn reconcile(
    items: &[RawTracklistItem],
    catalog: &[CatalogEntry],
    errors: &mut ValidationError,
) -> Vec<CanonicalTracklistItem> {
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let path = format!("tracklist[{index}]");
        let Some(entry) = resolve_entry(item, catalog) else {
            errors.push(
                path,
                "tracklist item does not reference a known track (by id or title)",
            );
            continue;
        };

        let position = item.position.clone().unwrap_or_else(|| derive_position(item, index));

        out.push(CanonicalTracklistItem {
            position,
            track_title: entry.track.title.clone(),
            track_id: entry.track_id.clone(),
            duration: entry.track.duration,
        });
    }
    out
}

fn resolve_entry<'a>(
    item: &RawTracklistItem,
    catalog: &'a [CatalogEntry],
) -> Option<&'a CatalogEntry> {
    if let Some(track_id) = &item.track_id {
        return catalog.iter().find(|entry| &entry.track_id == track_id);
    }
    let title = item.track_title.as_deref()?;
    catalog
        .iter()
        .find(|entry| entry.track.title.eq_ignore_ascii_case(title))
}

/// §4.3: `"<disc_side>-<track_number>"`, or `"<track_number>"`, or
/// `"<1-based-index>"`.
fn derive_position(item: &RawTracklistItem, index: usize) -> String {
    match (&item.side, item.disc_number, item.track_number) {
        (Some(side), _, Some(track_number)) => format!("{side}-{track_number}"),
        (_, _, Some(track_number)) => track_number.to_string(),
        _ => (index + 1).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discograph_core_json::raw::RawTrack;

    fn catalog_with(title: &str, track_id: &str) -> Vec<CatalogEntry> {
        vec![CatalogEntry {
            track: RawTrack {
                title: title.to_owned(),
                ..Default::default()
            },
            track_id: track_id.to_owned(),
        }]
    }

    #[test]
    fn resolves_by_case_insensitive_title_when_no_track_id() {
        let catalog = catalog_with("Come Together", "prov:track:abc");
        let items = vec![RawTracklistItem {
            track_title: Some("come TOGETHER".to_owned()),
            ..Default::default()
        }];
        let mut errors = ValidationError::default();
        let out = reconcile(&items, &catalog, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(out[0].track_id, "prov:track:abc");
        assert_eq!(out[0].position, "1");
    }

    #[test]
    fn unresolvable_item_is_an_error() {
        let catalog = catalog_with("Come Together", "prov:track:abc");
        let items = vec![RawTracklistItem {
            track_title: Some("Nonexistent".to_owned()),
            ..Default::default()
        }];
        let mut errors = ValidationError::default();
        reconcile(&items, &catalog, &mut errors);
        assert!(!errors.is_empty());
    }
}
