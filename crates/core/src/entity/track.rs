// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub header: NodeHeader,
    pub title: String,
    /// Duration in seconds. Missing durations default to 0 for fingerprint
    /// purposes only (§4.5) — this field itself stays `None` until a real
    /// value is known.
    pub duration: Option<u32>,
    pub isrc: Option<String>,
    pub recording_date: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub listen_links: Vec<String>,
}

impl Track {
    #[must_use]
    pub fn new(header: NodeHeader, title: impl Into<String>) -> Self {
        Self {
            header,
            title: title.into(),
            duration: None,
            isrc: None,
            recording_date: None,
            location: None,
            listen_links: Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum TrackInvalidity {
    Header(NodeHeaderInvalidity),
    TitleEmpty,
    DurationNegative,
}

impl Validate for Track {
    type Invalidity = TrackInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.title.trim().is_empty(), Self::Invalidity::TitleEmpty)
            .into()
    }
}
