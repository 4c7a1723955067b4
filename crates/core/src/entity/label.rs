// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Id, NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub header: NodeHeader,
    pub name: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    pub parent_label: Option<Id>,
    pub origin_city: Option<Id>,
}

impl Label {
    #[must_use]
    pub fn new(header: NodeHeader, name: impl Into<String>) -> Self {
        Self {
            header,
            name: name.into(),
            alt_names: Vec::new(),
            parent_label: None,
            origin_city: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum LabelInvalidity {
    Header(NodeHeaderInvalidity),
    NameEmpty,
}

impl Validate for Label {
    type Invalidity = LabelInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .into()
    }
}
