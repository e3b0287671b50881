//! Synthetic city generator for benchmarking and stress testing.
//!
//! Scatters amenities of every requested category and apartment listings
//! around an origin. Apartments cluster into neighbourhoods the way real
//! listings do, so radius queries see uneven densities.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use proximap::synthetic::SyntheticCity;
//!
//! let city = SyntheticCity::with_sizes(20, 500).generate();
//! assert_eq!(city.apartments.len(), 500);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::category::Category;
use crate::geo_utils::{km_to_degrees_lat, km_to_degrees_lng};
use crate::{Amenity, AmenityCatalog, Apartment, ApartmentCatalog, GeoPoint};

/// Scenario configuration for a synthetic city.
#[derive(Debug, Clone)]
pub struct SyntheticCity {
    /// City center.
    pub origin: GeoPoint,
    /// Radius of the populated area in kilometers.
    pub spread_km: f64,
    /// Categories to populate.
    pub categories: Vec<Category>,
    /// Amenities generated per category.
    pub amenities_per_category: usize,
    /// Number of apartment listings.
    pub apartment_count: usize,
    /// Number of neighbourhood clusters apartments gather around.
    pub neighbourhoods: usize,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

/// Generated catalogs.
pub struct SyntheticData {
    pub amenities: AmenityCatalog,
    pub apartments: ApartmentCatalog,
}

/// Point at `distance_km` and `bearing` (radians from north) from `origin`,
/// planar approximation.
fn offset(origin: &GeoPoint, distance_km: f64, bearing: f64) -> GeoPoint {
    let north = distance_km * bearing.cos();
    let east = distance_km * bearing.sin();
    GeoPoint::new(
        (origin.latitude + km_to_degrees_lat(north)).clamp(-90.0, 90.0),
        (origin.longitude + km_to_degrees_lng(east, origin.latitude)).clamp(-180.0, 180.0),
    )
}

/// Uniform point in a disc.
fn random_in_disc(origin: &GeoPoint, radius_km: f64, rng: &mut StdRng) -> GeoPoint {
    let r = radius_km * rng.gen_range(0.0f64..1.0).sqrt();
    let bearing = rng.gen_range(0.0..2.0 * PI);
    offset(origin, r, bearing)
}

impl SyntheticCity {
    /// Generate both catalogs.
    pub fn generate(&self) -> SyntheticData {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut amenities = Vec::with_capacity(self.categories.len() * self.amenities_per_category);
        for &category in &self.categories {
            for i in 0..self.amenities_per_category {
                let location = random_in_disc(&self.origin, self.spread_km, &mut rng);
                amenities.push(Amenity::new(
                    0,
                    format!("{} {}", category.label(), i + 1),
                    category,
                    location,
                ));
            }
        }

        let centers: Vec<GeoPoint> = (0..self.neighbourhoods.max(1))
            .map(|_| random_in_disc(&self.origin, self.spread_km * 0.8, &mut rng))
            .collect();
        let cluster_radius = (self.spread_km / 4.0).max(0.5);

        let apartments = (0..self.apartment_count)
            .map(|i| {
                let center = &centers[i % centers.len()];
                let location = random_in_disc(center, cluster_radius, &mut rng);
                Apartment {
                    room_id: format!("room-{}", i + 1),
                    name: format!("Listing {}", i + 1),
                    price_per_month: rng.gen_range(1500.0..9000.0f64).round(),
                    rating: (rng.gen_range(3.0..5.0f64) * 10.0).round() / 10.0,
                    location,
                    url: format!("https://listings.example/room-{}", i + 1),
                }
            })
            .collect();

        SyntheticData {
            amenities: AmenityCatalog::new(amenities),
            apartments: ApartmentCatalog::new(apartments),
        }
    }
}

// ============================================================================
// Preset Scenarios
// ============================================================================

impl SyntheticCity {
    /// Mid-sized city: four categories, a few thousand listings.
    pub fn standard() -> Self {
        Self {
            origin: GeoPoint::new(24.7136, 46.6753),
            spread_km: 20.0,
            categories: vec![
                Category::Pharmacies,
                Category::Malls,
                Category::Hospitals,
                Category::Metro,
            ],
            amenities_per_category: 150,
            apartment_count: 5_000,
            neighbourhoods: 12,
            seed: 42,
        }
    }

    /// Large city with every category populated.
    pub fn large() -> Self {
        Self {
            spread_km: 35.0,
            categories: Category::all().collect(),
            amenities_per_category: 400,
            apartment_count: 50_000,
            neighbourhoods: 40,
            ..Self::standard()
        }
    }

    /// Northern city, where longitude degrees are short.
    pub fn high_latitude() -> Self {
        Self {
            origin: GeoPoint::new(69.6492, 18.9553),
            ..Self::standard()
        }
    }

    /// Standard layout with custom sizes.
    pub fn with_sizes(amenities_per_category: usize, apartment_count: usize) -> Self {
        Self {
            amenities_per_category,
            apartment_count,
            ..Self::standard()
        }
    }
}
