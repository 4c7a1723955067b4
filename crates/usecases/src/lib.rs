// SPDX-License-Identifier: AGPL-3.0-or-later

//! Storage-agnostic business logic (§4): the Bundle Normalizer, Bundle
//! Validator, Graph Projector, Claim Engine, Merge Engine, and
//! Anchored-Event Intake. Everything here is generic over the
//! [`discograph_repo`] contracts; no module here knows about any concrete
//! graph database.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

pub mod claim;
pub mod intake;
pub mod merge;
pub mod normalize;
pub mod project;
pub mod validate;

use std::result::Result as StdResult;

use discograph_repo::RepoError;
use thiserror::Error;

/// A single diagnostic from the Bundle Normalizer or Bundle Validator
/// (§4.3, §4.4): both accumulate every offending path into one report
/// rather than failing on the first error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The accumulated failure report of §4.3/§4.4: "errors are accumulated
/// across the whole bundle to produce a single diagnostic (never a partial
/// result)".
#[derive(Clone, Debug, Default, Error, PartialEq, Eq)]
#[error("{}", render_issues(.0))]
pub struct ValidationError(pub Vec<ValidationIssue>);

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.path, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![ValidationIssue::new(path, message)])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(path, message));
    }

    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    pub fn into_result(self) -> StdResult<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A deterministic rejection from the Claim or Merge Engine (§7):
    /// unknown kind, protected field, unsafe field name, or a
    /// merge cycle. Carried as its own variant rather than folded into
    /// [`Self::Validation`] because it is raised by single-operation
    /// engines, not the whole-bundle accumulating validators.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = StdResult<T, Error>;
