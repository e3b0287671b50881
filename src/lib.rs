//! # proximap
//!
//! Geospatial proximity engine for apartment hunting.
//!
//! Given an origin, a search radius and a set of amenity categories, this
//! library computes:
//! - the amenities of each category within the radius, ranked by distance
//! - the apartments lying within the radius of at least one matched amenity,
//!   deduplicated by room id
//!
//! Apartment lookups go through an R-tree prefilter followed by an exact
//! great-circle check, so results never depend on the planar approximation.
//!
//! ## Features
//!
//! - **`parallel`** - Fan out per-amenity index lookups with rayon
//! - **`synthetic`** - Seeded synthetic city generator for benchmarks
//! - **`cli`** - Debug command line harness
//!
//! ## Quick Start
//!
//! ```rust
//! use proximap::{Amenity, AmenityCatalog, Apartment, ApartmentCatalog, Category, GeoPoint};
//! use proximap::{ProximityEngine, SearchRequest};
//!
//! let origin = GeoPoint::new(24.7136, 46.6753);
//! let catalog = AmenityCatalog::new(vec![Amenity::new(
//!     0,
//!     "Corner Pharmacy",
//!     Category::Pharmacies,
//!     GeoPoint::new(24.7150, 46.6760),
//! )]);
//! let apartments = ApartmentCatalog::new(vec![Apartment {
//!     room_id: "r-1".to_string(),
//!     name: "Studio".to_string(),
//!     price_per_month: 3200.0,
//!     rating: 4.6,
//!     location: GeoPoint::new(24.7160, 46.6770),
//!     url: "https://example.com/r-1".to_string(),
//! }]);
//!
//! let engine = ProximityEngine::new(catalog, apartments);
//! let request = SearchRequest::new(origin, 5.0, [Category::Pharmacies]);
//! let result = engine.search(&request).unwrap();
//!
//! assert_eq!(result.matches(Category::Pharmacies).len(), 1);
//! assert_eq!(result.apartments.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, ProximityError, Result};

// Closed category set and key/label translation
pub mod category;
pub use category::{to_display, to_key, Category};

// Distance functions and coordinate-space boxes
pub mod geo_utils;
pub use geo_utils::{geodesic_km, haversine_km, DistanceMetric};

// Column alias table shared by the dataset loaders
pub mod schema;
pub use schema::{ColumnAliases, LoadOptions};

// Amenity and apartment datasets
pub mod apartments;
pub mod catalog;
pub use apartments::ApartmentCatalog;
pub use catalog::{AmenityCatalog, AmenitySource, SourceFailure};

// Distance-ranked amenity filtering
pub mod proximity;
pub use proximity::{find_within_radius, nearest, AmenityMatch, Availability};

// Spatial index, aggregation and search
pub mod engine;
pub use engine::{
    nearby_apartments, search, ApartmentAnchor, ApartmentIndex, ApartmentMatch, CategoryWarning,
    Datasets, EngineStats, ProximityEngine, SearchConfig, SearchRequest, SearchResult,
};

// Synthetic dataset generator
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate.
///
/// # Example
/// ```
/// use proximap::GeoPoint;
/// let point = GeoPoint::new(24.7136, 46.6753); // Riyadh
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point. No validation; see [`GeoPoint::is_valid`].
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite and in range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lng: first.longitude,
            max_lng: first.longitude,
        };

        for p in iter {
            bounds.min_lat = bounds.min_lat.min(p.latitude);
            bounds.max_lat = bounds.max_lat.max(p.latitude);
            bounds.min_lng = bounds.min_lng.min(p.longitude);
            bounds.max_lng = bounds.max_lng.max(p.longitude);
        }

        Some(bounds)
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Whether the point lies inside the box, edges included.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}

/// A named point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    /// Row identity within its catalog
    pub id: usize,
    pub name: String,
    pub category: Category,
    pub location: GeoPoint,
}

impl Amenity {
    pub fn new(id: usize, name: impl Into<String>, category: Category, location: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            location,
        }
    }
}

/// A rental listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apartment {
    /// Unique within a dataset; used as the dedup key
    pub room_id: String,
    pub name: String,
    pub price_per_month: f64,
    pub rating: f64,
    pub location: GeoPoint,
    pub url: String,
}
