//! # Search engine
//!
//! Ties the catalogs, the spatial index and the filters together.
//!
//! ## Architecture
//!
//! - `Datasets` - immutable snapshot: amenity catalog, apartments, index
//! - `ApartmentIndex` - R-tree prefilter for radius queries
//! - `aggregator` - exact confirmation, union and dedup of apartments
//! - `ProximityEngine` - owns the current snapshot and swaps it on reload
//!
//! [`search`] is a pure function of its inputs. The engine only adds
//! ownership of a shared snapshot, so concurrent readers never observe a
//! half-built catalog/index pair.

pub mod aggregator;
pub mod spatial_index;

#[cfg(feature = "parallel")]
pub use aggregator::nearby_apartments_parallel;
pub use aggregator::{apartments_near_point, nearby_apartments, ApartmentMatch};
pub use spatial_index::{ApartmentIndex, IndexedPoint, DEFAULT_PREFILTER_MARGIN};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{ProximityError, Result};
use crate::geo_utils::DistanceMetric;
use crate::proximity::{find_within_radius, AmenityMatch};
use crate::{Amenity, AmenityCatalog, ApartmentCatalog, GeoPoint};

// ============================================================================
// Configuration
// ============================================================================

/// What apartments are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApartmentAnchor {
    /// Within the radius of any matched amenity.
    #[default]
    MatchedAmenities,
    /// Within the radius of the search origin.
    Origin,
}

/// Configuration for searches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Distance model for every exact check.
    /// Default: Haversine
    pub metric: DistanceMetric,

    /// Growth factor for the index prefilter box. Values below 1.0 are
    /// raised to 1.0. Read by [`ProximityEngine`] when it builds or rebuilds
    /// its index; the free [`search`] uses whatever margin its `Datasets`
    /// was built with.
    /// Default: 1.05
    pub prefilter_margin: f64,

    /// Anchor for apartment matching.
    /// Default: MatchedAmenities
    pub anchor: ApartmentAnchor,

    /// Upper bound on the request radius, if any.
    /// Default: None
    pub max_radius_km: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Haversine,
            prefilter_margin: DEFAULT_PREFILTER_MARGIN,
            anchor: ApartmentAnchor::MatchedAmenities,
            max_radius_km: None,
        }
    }
}

// ============================================================================
// Request / Result
// ============================================================================

/// One search: where, how far, which categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: GeoPoint,
    pub radius_km: f64,
    pub categories: BTreeSet<Category>,
}

impl SearchRequest {
    pub fn new(
        origin: GeoPoint,
        radius_km: f64,
        categories: impl IntoIterator<Item = Category>,
    ) -> Self {
        Self {
            origin,
            radius_km,
            categories: categories.into_iter().collect(),
        }
    }

    /// Build a request from category keys. An unknown key rejects the
    /// whole request.
    pub fn from_keys<S: AsRef<str>>(origin: GeoPoint, radius_km: f64, keys: &[S]) -> Result<Self> {
        let categories = keys
            .iter()
            .map(|k| {
                Category::from_key(k.as_ref()).map_err(|_| {
                    ProximityError::InvalidRequest(format!(
                        "unrecognized category {:?}",
                        k.as_ref()
                    ))
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(Self {
            origin,
            radius_km,
            categories,
        })
    }

    /// Reject the request before any computation.
    pub fn validate(&self, config: &SearchConfig) -> Result<()> {
        if !self.origin.is_valid() {
            return Err(ProximityError::InvalidRequest(format!(
                "origin out of range ({}, {})",
                self.origin.latitude, self.origin.longitude
            )));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(ProximityError::InvalidRequest(format!(
                "radius must be a positive number of kilometers, got {}",
                self.radius_km
            )));
        }
        if let Some(max) = config.max_radius_km {
            if self.radius_km > max {
                return Err(ProximityError::InvalidRequest(format!(
                    "radius {} km exceeds the maximum of {} km",
                    self.radius_km, max
                )));
            }
        }
        Ok(())
    }
}

/// A data problem that affected one requested category without failing
/// the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWarning {
    pub category: Category,
    pub message: String,
    /// Whether the category was left out of `per_category`.
    pub excluded: bool,
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matches per selected category, each sorted ascending by distance.
    pub per_category: BTreeMap<Category, Vec<AmenityMatch>>,
    /// Apartments near the matches, unique by room id, in dataset order.
    pub apartments: Vec<ApartmentMatch>,
    pub warnings: Vec<CategoryWarning>,
}

impl SearchResult {
    /// Matches for one category; empty if none or not searched.
    pub fn matches(&self, category: Category) -> &[AmenityMatch] {
        self.per_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All matched amenities across categories.
    pub fn matched_amenities(&self) -> impl Iterator<Item = &Amenity> {
        self.per_category
            .values()
            .flat_map(|matches| matches.iter().map(|m| &m.amenity))
    }

    pub fn matched_amenity_count(&self) -> usize {
        self.per_category.values().map(Vec::len).sum()
    }
}

// ============================================================================
// Datasets
// ============================================================================

/// Immutable catalog/index snapshot. Safe to share between threads.
#[derive(Debug)]
pub struct Datasets {
    catalog: AmenityCatalog,
    apartments: ApartmentCatalog,
    index: ApartmentIndex,
}

impl Datasets {
    /// Build the apartment index with the default margin.
    pub fn new(catalog: AmenityCatalog, apartments: ApartmentCatalog) -> Self {
        Self::with_margin(catalog, apartments, DEFAULT_PREFILTER_MARGIN)
    }

    pub fn with_margin(catalog: AmenityCatalog, apartments: ApartmentCatalog, margin: f64) -> Self {
        let index = ApartmentIndex::build(&apartments.points()).with_margin(margin);
        info!(
            "[Index] Built apartment index: {} points, margin {:.2}",
            index.len(),
            index.margin()
        );
        Self {
            catalog,
            apartments,
            index,
        }
    }

    pub fn catalog(&self) -> &AmenityCatalog {
        &self.catalog
    }

    pub fn apartments(&self) -> &ApartmentCatalog {
        &self.apartments
    }

    pub fn index(&self) -> &ApartmentIndex {
        &self.index
    }
}

/// Run one search over a snapshot.
///
/// The request is validated first; nothing is computed for an invalid
/// request. A category whose tagged source failed schema resolution is
/// excluded and reported; other load failures only add a warning.
///
/// `config.prefilter_margin` is not read here: the margin belongs to the
/// index inside `datasets` and is fixed when the snapshot is built (see
/// [`Datasets::with_margin`]).
pub fn search(
    datasets: &Datasets,
    request: &SearchRequest,
    config: &SearchConfig,
) -> Result<SearchResult> {
    request.validate(config)?;

    let catalog = datasets.catalog();
    let mut per_category = BTreeMap::new();
    let mut warnings = Vec::new();

    for &category in &request.categories {
        let mut excluded = false;
        for failure in catalog.failures_for(category) {
            // Only a schema failure of the category's own source excludes it;
            // an untagged source may have been one of several.
            let schema = failure.category == Some(category) && failure.error.is_schema();
            excluded |= schema;
            warnings.push(CategoryWarning {
                category,
                message: failure.error.to_string(),
                excluded: schema,
            });
        }
        if excluded {
            warn!("[Search] Category {} excluded: schema error in source", category);
            continue;
        }

        let matches = find_within_radius(
            &request.origin,
            request.radius_km,
            catalog.in_category(category),
            config.metric,
        );
        debug!(
            "[Search] {}: {} within {} km",
            category,
            matches.len(),
            request.radius_km
        );
        per_category.insert(category, matches);
    }

    let apartments = match config.anchor {
        ApartmentAnchor::MatchedAmenities => {
            let matched: Vec<&Amenity> = per_category
                .values()
                .flat_map(|matches: &Vec<AmenityMatch>| matches.iter().map(|m| &m.amenity))
                .collect();
            aggregate(&matched, datasets, request.radius_km, config.metric)
        }
        ApartmentAnchor::Origin => apartments_near_point(
            &request.origin,
            datasets.index(),
            datasets.apartments().as_slice(),
            request.radius_km,
            config.metric,
        ),
    };

    Ok(SearchResult {
        per_category,
        apartments,
        warnings,
    })
}

#[cfg(not(feature = "parallel"))]
fn aggregate(
    matched: &[&Amenity],
    datasets: &Datasets,
    radius_km: f64,
    metric: DistanceMetric,
) -> Vec<ApartmentMatch> {
    nearby_apartments(
        matched.iter().copied(),
        datasets.index(),
        datasets.apartments().as_slice(),
        radius_km,
        metric,
    )
}

#[cfg(feature = "parallel")]
fn aggregate(
    matched: &[&Amenity],
    datasets: &Datasets,
    radius_km: f64,
    metric: DistanceMetric,
) -> Vec<ApartmentMatch> {
    nearby_apartments_parallel(
        matched,
        datasets.index(),
        datasets.apartments().as_slice(),
        radius_km,
        metric,
    )
}

// ============================================================================
// Engine
// ============================================================================

/// Summary of the loaded snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub amenity_count: usize,
    pub apartment_count: usize,
    pub failed_sources: usize,
    pub amenities_per_category: BTreeMap<Category, usize>,
}

/// Owns the current dataset snapshot and the search configuration.
#[derive(Debug, Clone)]
pub struct ProximityEngine {
    data: Arc<Datasets>,
    config: SearchConfig,
}

impl ProximityEngine {
    /// Create an engine with default configuration.
    pub fn new(catalog: AmenityCatalog, apartments: ApartmentCatalog) -> Self {
        Self::with_config(catalog, apartments, SearchConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(
        catalog: AmenityCatalog,
        apartments: ApartmentCatalog,
        config: SearchConfig,
    ) -> Self {
        let data = Arc::new(Datasets::with_margin(
            catalog,
            apartments,
            config.prefilter_margin,
        ));
        Self { data, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search the current snapshot.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResult> {
        search(&self.data, request, &self.config)
    }

    /// Shorthand for [`ProximityEngine::search`] with loose arguments.
    pub fn search_at(
        &self,
        origin: GeoPoint,
        radius_km: f64,
        categories: impl IntoIterator<Item = Category>,
    ) -> Result<SearchResult> {
        self.search(&SearchRequest::new(origin, radius_km, categories))
    }

    /// Handle to the current snapshot. Stays valid and unchanged across a
    /// later [`ProximityEngine::replace_datasets`].
    pub fn snapshot(&self) -> Arc<Datasets> {
        Arc::clone(&self.data)
    }

    /// Build a fresh snapshot from new data and swap it in. Returns the
    /// previous snapshot.
    pub fn replace_datasets(
        &mut self,
        catalog: AmenityCatalog,
        apartments: ApartmentCatalog,
    ) -> Arc<Datasets> {
        let fresh = Arc::new(Datasets::with_margin(
            catalog,
            apartments,
            self.config.prefilter_margin,
        ));
        info!(
            "[Engine] Swapped datasets: {} amenities, {} apartments",
            fresh.catalog().len(),
            fresh.apartments().len()
        );
        std::mem::replace(&mut self.data, fresh)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            amenity_count: self.data.catalog().len(),
            apartment_count: self.data.apartments().len(),
            failed_sources: self.data.catalog().failures().len(),
            amenities_per_category: self.data.catalog().category_counts(),
        }
    }
}
