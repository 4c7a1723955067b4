// SPDX-License-Identifier: AGPL-3.0-or-later

//! Fingerprint construction and provisional-id minting (§4.1).

use serde_json::{json, Value};

use crate::{
    entity::EntityKind,
    util::{hash::sha256_hex_prefix, normalize_for_fingerprint},
};

/// The length, in hex characters, of a minted provisional id's suffix.
pub const PROVISIONAL_ID_HEX_LEN: usize = 16;

/// A fingerprint is the canonical-JSON-serializable set of fields that
/// identify an entity well enough to mint a stable provisional id from it,
/// per the per-kind rules of §4.1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprint(Value);

impl Fingerprint {
    #[must_use]
    pub fn person(name: &str, birth_year: Option<i32>) -> Self {
        let mut obj = serde_json::Map::new();
        obj.insert("name".into(), json!(normalize_for_fingerprint(name)));
        if let Some(year) = birth_year {
            obj.insert("birth_year".into(), json!(year));
        }
        Self(Value::Object(obj))
    }

    #[must_use]
    pub fn group(name: &str) -> Self {
        Self(json!({ "name": normalize_for_fingerprint(name) }))
    }

    #[must_use]
    pub fn song(title: &str, primary_writer: Option<&str>) -> Self {
        let mut obj = serde_json::Map::new();
        obj.insert("title".into(), json!(normalize_for_fingerprint(title)));
        if let Some(writer) = primary_writer {
            obj.insert(
                "primary_writer".into(),
                json!(normalize_for_fingerprint(writer)),
            );
        }
        Self(Value::Object(obj))
    }

    /// §4.1: "additionally, an ISRC-only fast path produces
    /// `prov:track:isrc:<isrc>` as a fingerprint-free shortcut." Callers
    /// should prefer [`crate::identity::make_isrc_track_id`] over this
    /// function when an ISRC is available.
    #[must_use]
    pub fn track(title: &str, release_id: Option<&str>, position: Option<&str>) -> Self {
        let mut obj = serde_json::Map::new();
        obj.insert("title".into(), json!(normalize_for_fingerprint(title)));
        if let Some(release_id) = release_id {
            obj.insert("release_id".into(), json!(release_id));
        }
        if let Some(position) = position {
            obj.insert("position".into(), json!(position));
        }
        Self(Value::Object(obj))
    }

    #[must_use]
    pub fn release(title: &str, date: Option<&str>, catalog_number: Option<&str>) -> Self {
        let mut obj = serde_json::Map::new();
        obj.insert("title".into(), json!(normalize_for_fingerprint(title)));
        if let Some(date) = date {
            obj.insert("date".into(), json!(date));
        }
        if let Some(catalog_number) = catalog_number {
            obj.insert("catalog_number".into(), json!(catalog_number));
        }
        Self(Value::Object(obj))
    }

    #[must_use]
    pub fn named(name: &str) -> Self {
        Self(json!({ "name": normalize_for_fingerprint(name) }))
    }

    #[must_use]
    pub fn city(name: &str, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        let mut obj = serde_json::Map::new();
        obj.insert("name".into(), json!(normalize_for_fingerprint(name)));
        if let (Some(lat), Some(lon)) = (latitude, longitude) {
            obj.insert("latitude".into(), json!(lat));
            obj.insert("longitude".into(), json!(lon));
        }
        Self(Value::Object(obj))
    }

    #[must_use]
    pub fn source(url: &str) -> Self {
        Self(json!({ "url": url }))
    }

    /// Exposes the underlying fingerprint value for callers that need to
    /// fold it into a larger canonical-JSON hash input (e.g. the track
    /// catalog's title+duration id in the Bundle Normalizer).
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// `makeProvisionalId(kind, fingerprint)` (§4.1): `prov:<kind>:` followed
/// by the first 16 hex characters of `SHA-256(canonical_json(fingerprint))`.
#[must_use]
pub fn make_provisional_id(kind: EntityKind, fingerprint: &Fingerprint) -> String {
    let canonical = crate::util::hash::canonical_json(&fingerprint.0);
    let digest = sha256_hex_prefix(canonical, PROVISIONAL_ID_HEX_LEN);
    format!("prov:{}:{digest}", kind.grammar_name())
}

/// The ISRC fast-path shortcut from §4.1: `prov:track:isrc:<isrc>`.
///
/// `isrc` is used verbatim (uppercased, per the `^prov:track:isrc:[A-Z0-9]{12}$`
/// grammar of §6) rather than hashed.
#[must_use]
pub fn make_isrc_track_id(isrc: &str) -> String {
    format!("prov:track:isrc:{}", isrc.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_id_is_deterministic_and_case_insensitive_on_input() {
        let a = make_provisional_id(EntityKind::Group, &Fingerprint::group("The Beatles"));
        let b = make_provisional_id(EntityKind::Group, &Fingerprint::group("the beatles"));
        let c = make_provisional_id(EntityKind::Group, &Fingerprint::group("  THE   Beatles  "));
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(a.starts_with("prov:group:"));
        assert_eq!(a.len(), "prov:group:".len() + 16);
    }

    #[test]
    fn isrc_fast_path_skips_hashing() {
        assert_eq!(
            make_isrc_track_id("usrc17607839"),
            "prov:track:isrc:USRC17607839"
        );
    }
}
