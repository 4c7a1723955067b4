// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Identity Service (§4.1): classifies identifier strings, mints
//! provisional ids from content fingerprints, and defines the grammar for
//! canonical/provisional/external ids (§6).

pub mod fingerprint;

use regex::Regex;
use std::sync::LazyLock;

use crate::entity::EntityKind;

/// The classification of an identifier string, per §4.1 and §6.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedId {
    /// `<namespace>:<kind>:<uuid-like>`
    Canonical { namespace: String, kind: String },
    /// `prov:<kind>:<hex16>`, or the ISRC fast path
    /// `prov:track:isrc:<isrc>`.
    Provisional { kind: String },
    /// `<source>:<kind>[:<subkind>]:<externalId>`
    External {
        source: String,
        kind: String,
        sub_kind: Option<String>,
        external_id: String,
    },
    Invalid,
}

impl ParsedId {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

static PROVISIONAL_ISRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^prov:track:isrc:[A-Z0-9]{12}$").expect("valid regex"));
static PROVISIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^prov:(person|group|song|track|release|master|label|city|source):[0-9a-f]{16}$",
    )
    .expect("valid regex")
});

const KNOWN_EXTERNAL_SOURCES: &[&str] = &["discogs", "musicbrainz", "isni", "wikidata", "spotify"];

/// Classifies an identifier string per the grammars of §4.1/§6.
///
/// This never fails: unrecognized input is classified as
/// [`ParsedId::Invalid`] rather than returning an `Err`, matching the
/// §4.1 contract `parseId(s) -> {kind, valid, ...}`.
#[must_use]
pub fn parse_id(s: &str) -> ParsedId {
    if PROVISIONAL_ISRC_RE.is_match(s) {
        return ParsedId::Provisional {
            kind: "track".to_owned(),
        };
    }
    if PROVISIONAL_RE.is_match(s) {
        let kind = s
            .strip_prefix("prov:")
            .and_then(|rest| rest.split(':').next())
            .unwrap_or_default()
            .to_owned();
        return ParsedId::Provisional { kind };
    }

    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [source, kind, sub_kind, external_id]
            if KNOWN_EXTERNAL_SOURCES.contains(source) && !external_id.is_empty() =>
        {
            ParsedId::External {
                source: (*source).to_owned(),
                kind: (*kind).to_owned(),
                sub_kind: Some((*sub_kind).to_owned()),
                external_id: (*external_id).to_owned(),
            }
        }
        [source, kind, external_id]
            if KNOWN_EXTERNAL_SOURCES.contains(source) && !external_id.is_empty() =>
        {
            ParsedId::External {
                source: (*source).to_owned(),
                kind: (*kind).to_owned(),
                sub_kind: None,
                external_id: (*external_id).to_owned(),
            }
        }
        [namespace, kind, uuid_like]
            if !namespace.is_empty() && EntityKind::parse(kind).is_some() && !uuid_like.is_empty() =>
        {
            ParsedId::Canonical {
                namespace: (*namespace).to_owned(),
                kind: (*kind).to_owned(),
            }
        }
        _ => ParsedId::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_provisional() {
        assert_eq!(
            parse_id("prov:person:0123456789abcdef"),
            ParsedId::Provisional {
                kind: "person".to_owned()
            }
        );
    }

    #[test]
    fn classifies_provisional_isrc_fast_path() {
        assert_eq!(
            parse_id("prov:track:isrc:USRC17607839"),
            ParsedId::Provisional {
                kind: "track".to_owned()
            }
        );
    }

    #[test]
    fn classifies_external() {
        assert_eq!(
            parse_id("discogs:artist:12345"),
            ParsedId::External {
                source: "discogs".to_owned(),
                kind: "artist".to_owned(),
                sub_kind: None,
                external_id: "12345".to_owned(),
            }
        );
    }

    #[test]
    fn classifies_canonical() {
        assert_eq!(
            parse_id("graph:person:9b1f7a7e-1f3e-4b7a-9a0d-1c2d3e4f5a6b"),
            ParsedId::Canonical {
                namespace: "graph".to_owned(),
                kind: "person".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_id("not an id"), ParsedId::Invalid);
        assert_eq!(parse_id(""), ParsedId::Invalid);
    }
}
