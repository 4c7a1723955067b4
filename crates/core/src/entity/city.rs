// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use serde::{Deserialize, Serialize};

use super::{NodeHeader, NodeHeaderInvalidity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub header: NodeHeader,
    pub name: String,
    /// Stored as millidegrees to keep `City` `Eq`-able; see
    /// [`City::latitude`]/[`City::longitude`] for the decimal view.
    pub latitude_millis: Option<i32>,
    pub longitude_millis: Option<i32>,
}

impl City {
    #[must_use]
    pub fn new(header: NodeHeader, name: impl Into<String>) -> Self {
        Self {
            header,
            name: name.into(),
            latitude_millis: None,
            longitude_millis: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude_millis = Some((latitude * 1000.0).round() as i32);
        self.longitude_millis = Some((longitude * 1000.0).round() as i32);
        self
    }

    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.latitude_millis.map(|v| f64::from(v) / 1000.0)
    }

    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.longitude_millis.map(|v| f64::from(v) / 1000.0)
    }
}

#[derive(Copy, Clone, Debug)]
pub enum CityInvalidity {
    Header(NodeHeaderInvalidity),
    NameEmpty,
    LatitudeOutOfRange,
    LongitudeOutOfRange,
}

impl Validate for City {
    type Invalidity = CityInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .validate_with(&self.header, Self::Invalidity::Header)
            .invalidate_if(self.name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .invalidate_if(
                self.latitude().is_some_and(|lat| !(-90.0..=90.0).contains(&lat)),
                Self::Invalidity::LatitudeOutOfRange,
            )
            .invalidate_if(
                self.longitude().is_some_and(|lon| !(-180.0..=180.0).contains(&lon)),
                Self::Invalidity::LongitudeOutOfRange,
            )
            .into()
    }
}
