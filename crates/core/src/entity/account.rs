// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::Id;

/// An `Account` is not part of the §4.1/§4.6/§4.7 whitelist — it is created
/// on first submission and is never a claim or merge target (§3).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: Id,
    pub id: Id,
    pub submitter_handle: String,
}

impl Account {
    #[must_use]
    pub fn new(account_id: Id, submitter_handle: impl Into<String>) -> Self {
        Self {
            id: account_id.clone(),
            account_id,
            submitter_handle: submitter_handle.into(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum AccountInvalidity {
    HandleEmpty,
}

impl Validate for Account {
    type Invalidity = AccountInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.submitter_handle.trim().is_empty(),
                Self::Invalidity::HandleEmpty,
            )
            .into()
    }
}
