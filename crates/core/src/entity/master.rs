// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Master {
    pub header: NodeHeader,
    pub name: String,
}

impl Master {
    #[must_use]
    pub fn new(header: NodeHeader, name: impl Into<String>) -> Self {
        Self {
            header,
            name: name.into(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum MasterInvalidity {
    Header(NodeHeaderInvalidity),
    NameEmpty,
}

impl Validate for Master {
    type Invalidity = MasterInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .into()
    }
}
