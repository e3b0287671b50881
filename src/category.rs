//! Closed set of amenity categories and their display labels.
//!
//! The mapping is a single declarative table; both directions of the
//! translation read from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProximityError, Result};

/// Amenity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pharmacies,
    Malls,
    Hospitals,
    Metro,
    BusStops,
    Supermarkets,
    Schools,
    Parks,
    Gyms,
    Mosques,
    Restaurants,
    Cafes,
}

/// (category, internal key, display label)
const CATEGORY_TABLE: &[(Category, &str, &str)] = &[
    (Category::Pharmacies, "pharmacies", "Pharmacies"),
    (Category::Malls, "malls", "Shopping Malls"),
    (Category::Hospitals, "hospitals", "Hospitals"),
    (Category::Metro, "metro", "Metro Stations"),
    (Category::BusStops, "bus_stops", "Bus Stops"),
    (Category::Supermarkets, "supermarkets", "Supermarkets"),
    (Category::Schools, "schools", "Schools"),
    (Category::Parks, "parks", "Parks"),
    (Category::Gyms, "gyms", "Gyms"),
    (Category::Mosques, "mosques", "Mosques"),
    (Category::Restaurants, "restaurants", "Restaurants"),
    (Category::Cafes, "cafes", "Cafes"),
];

impl Category {
    /// Every category, in table order.
    pub fn all() -> impl Iterator<Item = Category> {
        CATEGORY_TABLE.iter().map(|(c, _, _)| *c)
    }

    // Table rows are in discriminant order.
    fn entry(self) -> &'static (Category, &'static str, &'static str) {
        &CATEGORY_TABLE[self as usize]
    }

    /// Internal key, as it appears in datasets (e.g. `"pharmacies"`).
    pub fn key(self) -> &'static str {
        self.entry().1
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Look up a category by internal key. Case-insensitive, surrounding
    /// whitespace ignored.
    pub fn from_key(key: &str) -> Result<Self> {
        let key = key.trim();
        CATEGORY_TABLE
            .iter()
            .find(|(_, k, _)| k.eq_ignore_ascii_case(key))
            .map(|(c, _, _)| *c)
            .ok_or_else(|| ProximityError::UnknownCategory(key.to_string()))
    }

    /// Look up a category by its exact display label.
    pub fn from_label(label: &str) -> Result<Self> {
        CATEGORY_TABLE
            .iter()
            .find(|(_, _, l)| *l == label)
            .map(|(c, _, _)| *c)
            .ok_or_else(|| ProximityError::UnknownCategory(label.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ProximityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s)
    }
}

/// Translate an internal key into its display label.
pub fn to_display(key: &str) -> Result<&'static str> {
    Category::from_key(key).map(Category::label)
}

/// Translate a display label back into its internal key.
pub fn to_key(label: &str) -> Result<&'static str> {
    Category::from_label(label).map(Category::key)
}
