// SPDX-License-Identifier: AGPL-3.0-or-later

//! `discograph`: an event-sourced ingestion and graph-projection core for
//! blockchain-anchored music-metadata release events.
//!
//! This crate is a thin, feature-gated facade over the sub-crates that do
//! the actual work — it exists so a downstream binary can depend on one
//! crate and opt into only the layers it needs, the way `aoide` composes
//! its own workspace.
//!
//! - [`discograph_core`] (always available): identity, claims, merges,
//!   roles, relationships — the storage-agnostic domain model.
//! - `discograph-core-json` (feature `json`): wire shapes for the release
//!   bundle and anchored-event boundary.
//! - `discograph-repo` (feature `repo`): the `GraphStore`/`EventStore`/
//!   `IdentityMapStore` contracts.
//! - `discograph-repo-memory` (feature `memory`): an in-process,
//!   `dashmap`-backed implementation of those contracts.
//! - `discograph-usecases` (feature `usecases`, the default): the Bundle
//!   Normalizer, Bundle Validator, Graph Projector, Claim Engine, Merge
//!   Engine, and Anchored-Event Intake.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

pub use discograph_core as core;

#[cfg(feature = "json")]
pub use discograph_core_json as core_json;

#[cfg(feature = "repo")]
pub use discograph_repo as repo;

#[cfg(feature = "memory")]
pub use discograph_repo_memory as repo_memory;

#[cfg(feature = "usecases")]
pub use discograph_usecases as usecases;

pub mod prelude {
    pub use discograph_core::prelude::*;

    #[cfg(feature = "repo")]
    pub use discograph_repo::{OptionalRepoResult, RepoError, RepoResult};

    #[cfg(feature = "usecases")]
    pub use discograph_usecases::{Error, Result, ValidationError, ValidationIssue};
}
