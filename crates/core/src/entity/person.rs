// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Id, NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub header: NodeHeader,
    pub name: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    pub birth_name: Option<String>,
    pub birth_date: Option<String>,
    pub origin_city: Option<Id>,
}

impl Person {
    #[must_use]
    pub fn new(header: NodeHeader, name: impl Into<String>) -> Self {
        Self {
            header,
            name: name.into(),
            alt_names: Vec::new(),
            birth_name: None,
            birth_date: None,
            origin_city: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum PersonInvalidity {
    Header(NodeHeaderInvalidity),
    NameEmpty,
}

impl Validate for Person {
    type Invalidity = PersonInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .into()
    }
}
