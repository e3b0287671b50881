//! Geographic utilities: great-circle distance, degree conversions and the
//! coordinate-space boxes used to prefilter radius queries.

use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};

use crate::{Bounds, GeoPoint};

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometers per degree used for coordinate-space approximations.
///
/// Slightly below one degree of arc on the mean sphere (~111.195 km).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Shortest degree of arc on the WGS84 ellipsoid: one degree of meridian at
/// the equator. Prefilter boxes are sized with it so they cover both the
/// spherical and the ellipsoidal circle.
pub const MIN_KM_PER_DEGREE: f64 = 110.574;

/// Great-circle distance in kilometers on the mean sphere.
///
/// Uses the `atan2` form of the haversine, which stays stable for both
/// near-identical and antipodal points.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Ellipsoidal (WGS84) geodesic distance in kilometers.
pub fn geodesic_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let meters = Geodesic::distance(to_geo(a), to_geo(b));
    meters / 1000.0
}

fn to_geo(p: &GeoPoint) -> Point<f64> {
    Point::new(p.longitude, p.latitude)
}

/// Distance model used for exact radius checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Spherical great-circle distance.
    #[default]
    Haversine,
    /// WGS84 ellipsoidal geodesic.
    Geodesic,
}

impl DistanceMetric {
    /// Distance between two points in kilometers.
    #[inline]
    pub fn distance_km(self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        match self {
            DistanceMetric::Haversine => haversine_km(a, b),
            DistanceMetric::Geodesic => geodesic_km(a, b),
        }
    }
}

/// Convert a north-south distance into degrees of latitude.
pub fn km_to_degrees_lat(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

/// Convert an east-west distance at `latitude` into degrees of longitude.
///
/// Capped at 360 degrees close to the poles.
pub fn km_to_degrees_lng(km: f64, latitude: f64) -> f64 {
    let scale = latitude.to_radians().cos().abs();
    if scale < 1e-12 {
        return 360.0;
    }
    (km / (KM_PER_DEGREE * scale)).min(360.0)
}

/// Coordinate-space boxes that cover every point within `radius_km` of
/// `center`, grown by `margin`.
///
/// The angular radius `δ` uses [`MIN_KM_PER_DEGREE`], so with a margin of
/// 1.0 the box already holds every point within `radius_km` under either
/// [`DistanceMetric`]. The longitude half-width is the spherical cap bound
/// `asin(sin(δ) / cos(φ))`, so the box stays conservative at high latitude.
/// When the cap reaches a pole the full longitude span is returned; when it
/// crosses the antimeridian the box is split in two.
pub fn radius_bounds(center: &GeoPoint, radius_km: f64, margin: f64) -> Vec<Bounds> {
    let delta = radius_km.max(0.0) * margin.max(1.0) / MIN_KM_PER_DEGREE;
    let min_lat = (center.latitude - delta).max(-90.0);
    let max_lat = (center.latitude + delta).min(90.0);

    let full_span = Bounds {
        min_lat,
        max_lat,
        min_lng: -180.0,
        max_lng: 180.0,
    };

    if center.latitude.abs() + delta >= 90.0 {
        return vec![full_span];
    }

    let ratio = delta.to_radians().sin() / center.latitude.to_radians().cos();
    if ratio >= 1.0 {
        return vec![full_span];
    }
    let lng_delta = ratio.asin().to_degrees();

    let min_lng = center.longitude - lng_delta;
    let max_lng = center.longitude + lng_delta;

    if min_lng < -180.0 {
        vec![
            Bounds {
                min_lat,
                max_lat,
                min_lng: min_lng + 360.0,
                max_lng: 180.0,
            },
            Bounds {
                min_lat,
                max_lat,
                min_lng: -180.0,
                max_lng,
            },
        ]
    } else if max_lng > 180.0 {
        vec![
            Bounds {
                min_lat,
                max_lat,
                min_lng,
                max_lng: 180.0,
            },
            Bounds {
                min_lat,
                max_lat,
                min_lng: -180.0,
                max_lng: max_lng - 360.0,
            },
        ]
    } else {
        vec![Bounds {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }]
    }
}
