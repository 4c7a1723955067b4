// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use crate::util::clock::Timestamp;

use super::Id;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub source_id: Id,
    pub id: Id,
    pub url: String,
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub accessed_at: Option<Timestamp>,
}

impl Source {
    #[must_use]
    pub fn new(source_id: Id, url: impl Into<String>) -> Self {
        Self {
            id: source_id.clone(),
            source_id,
            url: url.into(),
            source_type: None,
            accessed_at: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum SourceInvalidity {
    UrlEmpty,
}

impl Validate for Source {
    type Invalidity = SourceInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(self.url.trim().is_empty(), Self::Invalidity::UrlEmpty)
            .into()
    }
}
