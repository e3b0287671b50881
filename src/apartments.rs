//! Apartment dataset.
//!
//! Listings are loaded once and never mutated. `room_id` is the identity
//! of a listing: when a dataset repeats one, the first row wins.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};

use crate::error::{ProximityError, Result};
use crate::schema::{line_of, Field, HeaderMap, LoadOptions};
use crate::{Apartment, GeoPoint};

const REQUIRED: &[Field] = &[
    Field::RoomId,
    Field::Name,
    Field::PricePerMonth,
    Field::Rating,
    Field::Latitude,
    Field::Longitude,
    Field::Url,
];

/// In-memory table of apartments, unique by `room_id`.
#[derive(Debug, Clone, Default)]
pub struct ApartmentCatalog {
    apartments: Vec<Apartment>,
    duplicates: usize,
}

impl ApartmentCatalog {
    /// Build from in-memory listings, dropping repeated room ids.
    pub fn new(apartments: Vec<Apartment>) -> Self {
        let mut seen = HashSet::with_capacity(apartments.len());
        let mut unique = Vec::with_capacity(apartments.len());
        let mut duplicates = 0;

        for apartment in apartments {
            if seen.contains(&apartment.room_id) {
                warn!(
                    "[Apartments] Duplicate room_id {:?} dropped",
                    apartment.room_id
                );
                duplicates += 1;
                continue;
            }
            seen.insert(apartment.room_id.clone());
            unique.push(apartment);
        }

        Self {
            apartments: unique,
            duplicates,
        }
    }

    /// Load listings from any reader.
    pub fn from_reader<R: Read>(reader: R, dataset: &str, options: &LoadOptions) -> Result<Self> {
        let mut reader = options.reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| ProximityError::data_load(dataset, e.to_string()))?
            .clone();
        let map = HeaderMap::resolve(&headers, REQUIRED, &[], &options.aliases, dataset)?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| ProximityError::data_load(dataset, e.to_string()))?;
            let line = line_of(&record, i);

            let room_id = map.text(&record, Field::RoomId, line)?;
            if room_id.is_empty() {
                return Err(map.row_error(line, "empty room_id"));
            }

            rows.push(Apartment {
                room_id,
                name: map.text(&record, Field::Name, line)?,
                price_per_month: map.number(&record, Field::PricePerMonth, line)?,
                rating: map.number(&record, Field::Rating, line)?,
                location: map.point(&record, line)?,
                url: map.text(&record, Field::Url, line)?,
            });
        }

        if rows.is_empty() {
            return Err(ProximityError::data_load(dataset, "no apartment rows"));
        }

        let catalog = Self::new(rows);
        info!(
            "[Apartments] Loaded {} apartments from {} ({} duplicates dropped)",
            catalog.len(),
            dataset,
            catalog.duplicates
        );
        Ok(catalog)
    }

    /// Load listings from a file.
    pub fn from_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let dataset = path.display().to_string();
        let file = File::open(path).map_err(|e| ProximityError::data_load(&dataset, e.to_string()))?;
        Self::from_reader(file, &dataset, options)
    }

    /// Coordinates in dataset order, for index building.
    pub fn points(&self) -> Vec<GeoPoint> {
        self.apartments.iter().map(|a| a.location).collect()
    }

    /// Find a listing by room id.
    pub fn find(&self, room_id: &str) -> Option<&Apartment> {
        self.apartments.iter().find(|a| a.room_id == room_id)
    }

    /// Rows dropped for repeating an earlier room id.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn get(&self, idx: usize) -> Option<&Apartment> {
        self.apartments.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Apartment> {
        self.apartments.iter()
    }

    pub fn as_slice(&self) -> &[Apartment] {
        &self.apartments
    }

    pub fn len(&self) -> usize {
        self.apartments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apartments.is_empty()
    }
}
