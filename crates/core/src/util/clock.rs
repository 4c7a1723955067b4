// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use jiff::Timestamp as JiffTimestamp;

/// A millisecond-precision instant in time.
///
/// §4.5 requires that an event timestamp arriving as Unix seconds (values
/// smaller than 10^12) is promoted to milliseconds before use, and that a
/// missing timestamp falls back to wall-clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Timestamp(i64);

/// Values below this threshold are assumed to be Unix seconds rather than
/// milliseconds, per §4.5.
const SECONDS_VS_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

impl Timestamp {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Accepts either Unix seconds or Unix milliseconds and normalizes to
    /// milliseconds, per §4.5.
    #[must_use]
    pub fn from_unix_seconds_or_millis(value: i64) -> Self {
        if value.abs() < SECONDS_VS_MILLIS_THRESHOLD {
            Self(value.saturating_mul(1000))
        } else {
            Self(value)
        }
    }

    #[must_use]
    pub fn now() -> Self {
        Self::from(JiffTimestamp::now())
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl From<JiffTimestamp> for Timestamp {
    fn from(ts: JiffTimestamp) -> Self {
        Self(ts.as_millisecond())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match JiffTimestamp::from_millisecond(self.0) {
            Ok(ts) => write!(f, "{ts}"),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_are_promoted_to_millis() {
        assert_eq!(
            Timestamp::from_unix_seconds_or_millis(1_700_000_000).as_millis(),
            1_700_000_000_000
        );
    }

    #[test]
    fn millis_pass_through_unchanged() {
        assert_eq!(
            Timestamp::from_unix_seconds_or_millis(1_700_000_000_000).as_millis(),
            1_700_000_000_000
        );
    }
}
