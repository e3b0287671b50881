//! Distance-ranked amenity filtering.
//!
//! One generic filter serves every category: the caller picks the
//! candidates, the filter measures, keeps what lies inside the radius and
//! sorts. Truncation to the nearest few is left to the caller; see
//! [`nearest`].

use serde::{Deserialize, Serialize};

use crate::geo_utils::DistanceMetric;
use crate::{Amenity, GeoPoint};

/// An amenity inside the search radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityMatch {
    pub amenity: Amenity,
    /// Distance from the search origin in kilometers
    pub distance_km: f64,
}

impl AmenityMatch {
    /// Distance rounded to two decimals, for display.
    pub fn rounded_distance_km(&self) -> f64 {
        (self.distance_km * 100.0).round() / 100.0
    }
}

/// Find every candidate within `radius_km` of `origin`.
///
/// The boundary is inclusive. Results are sorted ascending by distance;
/// ties keep their input order. An empty candidate set yields an empty
/// result, and a zero radius matches only candidates exactly at the origin.
///
/// # Example
/// ```
/// use proximap::{find_within_radius, Amenity, Category, DistanceMetric, GeoPoint};
///
/// let origin = GeoPoint::new(24.7136, 46.6753);
/// let amenities = vec![
///     Amenity::new(0, "Far", Category::Malls, GeoPoint::new(24.80, 46.70)),
///     Amenity::new(1, "Near", Category::Malls, GeoPoint::new(24.72, 46.68)),
/// ];
///
/// let matches = find_within_radius(&origin, 5.0, &amenities, DistanceMetric::Haversine);
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].amenity.name, "Near");
/// ```
pub fn find_within_radius<'a, I>(
    origin: &GeoPoint,
    radius_km: f64,
    candidates: I,
    metric: DistanceMetric,
) -> Vec<AmenityMatch>
where
    I: IntoIterator<Item = &'a Amenity>,
{
    let mut matches: Vec<AmenityMatch> = candidates
        .into_iter()
        .filter_map(|amenity| {
            let distance_km = metric.distance_km(origin, &amenity.location);
            (distance_km <= radius_km).then(|| AmenityMatch {
                amenity: amenity.clone(),
                distance_km,
            })
        })
        .collect();

    // Vec::sort_by is stable
    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    matches
}

/// The first `k` entries of a sorted match list.
pub fn nearest(matches: &[AmenityMatch], k: usize) -> &[AmenityMatch] {
    &matches[..k.min(matches.len())]
}

/// Coarse availability of a category around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Nothing within the radius
    None,
    /// Exactly one; a single point of failure
    Single,
    /// More than one
    Several,
}

impl Availability {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Availability::None,
            1 => Availability::Single,
            _ => Availability::Several,
        }
    }

    pub fn of(matches: &[AmenityMatch]) -> Self {
        Self::from_count(matches.len())
    }
}
