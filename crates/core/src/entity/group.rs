// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Id, NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub header: NodeHeader,
    pub name: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    pub bio: Option<String>,
    pub formed_date: Option<String>,
    pub disbanded_date: Option<String>,
    pub origin_city: Option<Id>,
}

impl Group {
    #[must_use]
    pub fn new(header: NodeHeader, name: impl Into<String>) -> Self {
        Self {
            header,
            name: name.into(),
            alt_names: Vec::new(),
            bio: None,
            formed_date: None,
            disbanded_date: None,
            origin_city: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum GroupInvalidity {
    Header(NodeHeaderInvalidity),
    NameEmpty,
}

impl Validate for Group {
    type Invalidity = GroupInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .into()
    }
}
