// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Id, NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub header: NodeHeader,
    pub name: String,
    pub release_date: Option<String>,
    pub format: Option<String>,
    pub country: Option<String>,
    pub catalog_number: Option<String>,
    pub album_art: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub labels: Vec<Id>,
    pub master: Option<Id>,
}

impl Release {
    #[must_use]
    pub fn new(header: NodeHeader, name: impl Into<String>) -> Self {
        Self {
            header,
            name: name.into(),
            release_date: None,
            format: None,
            country: None,
            catalog_number: None,
            album_art: None,
            notes: None,
            labels: Vec::new(),
            master: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum ReleaseInvalidity {
    Header(NodeHeaderInvalidity),
    NameEmpty,
}

impl Validate for Release {
    type Invalidity = ReleaseInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .into()
    }
}
