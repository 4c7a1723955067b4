// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracklist position parsing (§4.5 step 5): `position` is parsed into
//! `(disc, side, track_number)` by a small deterministic grammar, falling
//! back to index-based numbering on any parse failure.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParsedPosition {
    pub disc_number: u32,
    pub side: Option<char>,
    pub track_number: u32,
}

static VINYL_SIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z])(\d+)$").expect("valid regex"));
static NUMERIC_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)$").expect("valid regex"));
static DISC_SIDE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[- ]?([A-Z])(\d+)$").expect("valid regex"));

#[must_use]
pub fn parse_position(position: &str, index: usize) -> ParsedPosition {
    if let Some(caps) = VINYL_SIDE_RE.captures(position) {
        let side = caps[1].chars().next();
        let track_number = caps[2].parse().unwrap_or(0);
        return ParsedPosition {
            disc_number: 1,
            side,
            track_number,
        };
    }
    if let Some(caps) = NUMERIC_ONLY_RE.captures(position) {
        let track_number = caps[1].parse().unwrap_or(0);
        return ParsedPosition {
            disc_number: 1,
            side: None,
            track_number,
        };
    }
    if let Some(caps) = DISC_SIDE_NUMBER_RE.captures(position) {
        let disc_number = caps[1].parse().unwrap_or(1);
        let side = caps[2].chars().next();
        let track_number = caps[3].parse().unwrap_or(0);
        return ParsedPosition {
            disc_number,
            side,
            track_number,
        };
    }
    // Fallback: `track_no = index + 1, disc = 1`.
    ParsedPosition {
        disc_number: 1,
        side: None,
        track_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vinyl_side() {
        assert_eq!(
            parse_position("A3", 0),
            ParsedPosition {
                disc_number: 1,
                side: Some('A'),
                track_number: 3
            }
        );
    }

    #[test]
    fn parses_numeric_only() {
        assert_eq!(
            parse_position("7", 0),
            ParsedPosition {
                disc_number: 1,
                side: None,
                track_number: 7
            }
        );
    }

    #[test]
    fn parses_disc_side_number() {
        assert_eq!(
            parse_position("2-B4", 0),
            ParsedPosition {
                disc_number: 2,
                side: Some('B'),
                track_number: 4
            }
        );
        assert_eq!(
            parse_position("2B4", 0),
            ParsedPosition {
                disc_number: 2,
                side: Some('B'),
                track_number: 4
            }
        );
    }

    #[test]
    fn falls_back_to_index_on_parse_failure() {
        assert_eq!(
            parse_position("???", 4),
            ParsedPosition {
                disc_number: 1,
                side: None,
                track_number: 5
            }
        );
    }
}
