// SPDX-License-Identifier: AGPL-3.0-or-later

//! JSON wire shapes for the release-bundle ingest boundary (§4.3, §6):
//! a permissive "raw" shape accepted from submitters and callers, a strict
//! "canonical" shape produced by the Bundle Normalizer and consumed by the
//! Graph Projector, and the anchored-event envelope.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

pub mod canonical;
pub mod event;
pub mod raw;
pub mod request;
