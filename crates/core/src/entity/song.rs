// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub header: NodeHeader,
    pub title: String,
    #[serde(default)]
    pub alt_titles: Vec<String>,
    pub iswc: Option<String>,
    pub year: Option<i32>,
    pub lyrics: Option<String>,
}

impl Song {
    #[must_use]
    pub fn new(header: NodeHeader, title: impl Into<String>) -> Self {
        Self {
            header,
            title: title.into(),
            alt_titles: Vec::new(),
            iswc: None,
            year: None,
            lyrics: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum SongInvalidity {
    Header(NodeHeaderInvalidity),
    TitleEmpty,
}

impl Validate for Song {
    type Invalidity = SongInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.title.trim().is_empty(), Self::Invalidity::TitleEmpty)
            .into()
    }
}
