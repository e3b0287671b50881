//! Apartment aggregation across matched amenities.
//!
//! Every matched amenity issues one index lookup. Candidates from the
//! index are confirmed with the exact distance metric, merged, and
//! deduplicated by room id. Each surviving apartment keeps the closest
//! anchor that qualified it.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::DistanceMetric;
use crate::{Amenity, Apartment, GeoPoint};

use super::spatial_index::ApartmentIndex;

/// An apartment in the aggregated result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApartmentMatch {
    pub apartment: Apartment,
    /// Closest matched amenity within the radius. `None` when apartments
    /// were anchored on the search origin.
    pub nearest_amenity: Option<Amenity>,
    /// Distance to that anchor in kilometers
    pub distance_km: f64,
}

/// Best anchor seen so far for one apartment: (distance, amenity).
type Best<'a> = BTreeMap<usize, (f64, Option<&'a Amenity>)>;

/// Exact hits for one anchor: (apartment index, distance).
fn confirm_candidates(
    anchor: &GeoPoint,
    index: &ApartmentIndex,
    apartments: &[Apartment],
    radius_km: f64,
    metric: DistanceMetric,
) -> (usize, Vec<(usize, f64)>) {
    let candidates = index.query_radius(anchor, radius_km);
    let considered = candidates.len();
    let hits = candidates
        .into_iter()
        .filter_map(|idx| {
            let apartment = apartments.get(idx)?;
            let distance = metric.distance_km(anchor, &apartment.location);
            (distance <= radius_km).then_some((idx, distance))
        })
        .collect();
    (considered, hits)
}

fn merge_hits<'a>(best: &mut Best<'a>, anchor: Option<&'a Amenity>, hits: Vec<(usize, f64)>) {
    for (idx, distance) in hits {
        best.entry(idx)
            .and_modify(|entry| {
                // Strictly closer only; on ties the earlier anchor stays.
                if distance < entry.0 {
                    *entry = (distance, anchor);
                }
            })
            .or_insert((distance, anchor));
    }
}

fn finish(best: Best<'_>, apartments: &[Apartment]) -> Vec<ApartmentMatch> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(best.len());
    best.into_iter()
        .filter_map(|(idx, (distance_km, anchor))| {
            let apartment = apartments.get(idx)?;
            if !seen.insert(apartment.room_id.as_str()) {
                return None;
            }
            Some(ApartmentMatch {
                apartment: apartment.clone(),
                nearest_amenity: anchor.cloned(),
                distance_km,
            })
        })
        .collect()
}

/// Apartments within `radius_km` of at least one matched amenity.
///
/// `index` must have been built from `apartments` (same order). The result
/// is unique by room id and ordered by position in `apartments`. An
/// apartment is included if and only if some matched amenity lies within
/// `radius_km` of it under `metric`, boundary included.
pub fn nearby_apartments<'a, I>(
    matched: I,
    index: &ApartmentIndex,
    apartments: &[Apartment],
    radius_km: f64,
    metric: DistanceMetric,
) -> Vec<ApartmentMatch>
where
    I: IntoIterator<Item = &'a Amenity>,
{
    let mut best = Best::new();
    let mut lookups = 0;
    let mut considered = 0;

    for amenity in matched {
        let (candidates, hits) =
            confirm_candidates(&amenity.location, index, apartments, radius_km, metric);
        lookups += 1;
        considered += candidates;
        merge_hits(&mut best, Some(amenity), hits);
    }

    debug!(
        "[Aggregator] {} lookups, {} candidates, {} apartments confirmed",
        lookups,
        considered,
        best.len()
    );
    finish(best, apartments)
}

/// Parallel variant of [`nearby_apartments`]; same result.
///
/// Lookups run on the rayon pool, hits are merged in amenity order so tie
/// handling matches the sequential path.
#[cfg(feature = "parallel")]
pub fn nearby_apartments_parallel(
    matched: &[&Amenity],
    index: &ApartmentIndex,
    apartments: &[Apartment],
    radius_km: f64,
    metric: DistanceMetric,
) -> Vec<ApartmentMatch> {
    use rayon::prelude::*;

    let per_amenity: Vec<(usize, Vec<(usize, f64)>)> = matched
        .par_iter()
        .map(|amenity| confirm_candidates(&amenity.location, index, apartments, radius_km, metric))
        .collect();

    let mut best = Best::new();
    let mut considered = 0;
    for (amenity, (candidates, hits)) in matched.iter().zip(per_amenity) {
        considered += candidates;
        merge_hits(&mut best, Some(*amenity), hits);
    }

    debug!(
        "[Aggregator] {} parallel lookups, {} candidates, {} apartments confirmed",
        matched.len(),
        considered,
        best.len()
    );
    finish(best, apartments)
}

/// Apartments within `radius_km` of `origin` itself.
pub fn apartments_near_point(
    origin: &GeoPoint,
    index: &ApartmentIndex,
    apartments: &[Apartment],
    radius_km: f64,
    metric: DistanceMetric,
) -> Vec<ApartmentMatch> {
    let (candidates, hits) = confirm_candidates(origin, index, apartments, radius_km, metric);
    debug!(
        "[Aggregator] origin lookup: {} candidates, {} confirmed",
        candidates,
        hits.len()
    );

    let mut best = Best::new();
    merge_hits(&mut best, None, hits);
    finish(best, apartments)
}
