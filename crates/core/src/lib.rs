// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

pub mod claim;
pub mod entity;
pub mod identity;
pub mod merge;
pub mod relationship;
pub mod role;
pub mod util;

pub mod prelude {
    pub(crate) use semval::prelude::*;

    pub use crate::{
        entity::{EntityKind, EntityKindInvalidity, EntityStatus, Id, IdKind},
        util::clock::Timestamp,
    };
}
