// SPDX-License-Identifier: AGPL-3.0-or-later

//! Storage-agnostic repository contracts (§6): a property-graph store, an
//! event store, and the identity map. `discograph-usecases` depends only
//! on these traits; `discograph-repo-memory` is one concrete, in-process
//! implementation, suitable for tests and small deployments.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

pub mod event;
pub mod graph;
pub mod identity_map;

use thiserror::Error;

/// Failure modes a repository implementation can report. Deterministic
/// failures the use cases raise themselves (validation, protected-field,
/// unknown kind, cycle — §7) are not `RepoError`s; they surface as
/// `discograph_usecases::Error::Validation` instead.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("aborted")]
    Aborted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub trait OptionalRepoResult<T> {
    fn optional(self) -> RepoResult<Option<T>>;
}

impl<T> OptionalRepoResult<T> for Result<T, RepoError> {
    fn optional(self) -> RepoResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(RepoError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
