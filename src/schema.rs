//! Column schema for tabular datasets.
//!
//! Header names are matched case-insensitively against a declarative alias
//! table, once per dataset, before any row is read. Coordinate aliases are
//! configurable through [`ColumnAliases`]; the other fields use fixed
//! aliases.

use csv::StringRecord;

use crate::error::{OptionExt, ProximityError, Result};
use crate::GeoPoint;

/// Recognised header aliases for the coordinate columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAliases {
    /// Default: `latitude`, `lat`, `latt`
    pub latitude: Vec<String>,
    /// Default: `longitude`, `lng`, `lon`, `long`
    pub longitude: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self::new(&["latitude", "lat", "latt"], &["longitude", "lng", "lon", "long"])
    }
}

impl ColumnAliases {
    pub fn new(latitude: &[&str], longitude: &[&str]) -> Self {
        Self {
            latitude: latitude.iter().map(|a| normalize(a)).collect(),
            longitude: longitude.iter().map(|a| normalize(a)).collect(),
        }
    }
}

/// Options shared by the dataset loaders.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub aliases: ColumnAliases,
    /// Field delimiter. Default: `b','`
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            aliases: ColumnAliases::default(),
            delimiter: b',',
        }
    }
}

impl LoadOptions {
    pub(crate) fn reader<R: std::io::Read>(&self, reader: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            // Short rows surface as missing values on the row, not as a
            // reader error for the whole file.
            .flexible(true)
            .from_reader(reader)
    }
}

/// A logical column the loaders know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Category,
    Latitude,
    Longitude,
    RoomId,
    PricePerMonth,
    Rating,
    Url,
}

const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (Field::Name, &["name"]),
    (Field::Category, &["category"]),
    (Field::RoomId, &["room_id", "roomid"]),
    (Field::PricePerMonth, &["price_per_month", "price"]),
    (Field::Rating, &["rating"]),
    (Field::Url, &["url", "link"]),
];

impl Field {
    fn aliases<'a>(self, coords: &'a ColumnAliases) -> Vec<&'a str> {
        match self {
            Field::Latitude => coords.latitude.iter().map(String::as_str).collect(),
            Field::Longitude => coords.longitude.iter().map(String::as_str).collect(),
            other => FIELD_ALIASES
                .iter()
                .find(|(f, _)| *f == other)
                .map(|(_, aliases)| aliases.to_vec())
                .unwrap_or_default(),
        }
    }
}

fn normalize(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Field to column index mapping for one dataset.
#[derive(Debug, Clone)]
pub(crate) struct HeaderMap {
    dataset: String,
    columns: Vec<(Field, usize)>,
}

impl HeaderMap {
    /// Resolve `required` fields (schema error if absent) and `optional`
    /// fields (silently skipped if absent) against a header row.
    pub(crate) fn resolve(
        headers: &StringRecord,
        required: &[Field],
        optional: &[Field],
        aliases: &ColumnAliases,
        dataset: &str,
    ) -> Result<Self> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ProximityError::data_load(dataset, "dataset is empty"));
        }

        let normalized: Vec<String> = headers.iter().map(normalize).collect();
        let lookup = |field: Field| -> Option<usize> {
            field
                .aliases(aliases)
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
        };

        let mut columns = Vec::with_capacity(required.len() + optional.len());
        for &field in required {
            let idx = lookup(field).ok_or_schema(
                dataset,
                format!(
                    "missing {:?} column (accepted headers: {})",
                    field,
                    field.aliases(aliases).join(", ")
                ),
            )?;
            columns.push((field, idx));
        }
        for &field in optional {
            if let Some(idx) = lookup(field) {
                columns.push((field, idx));
            }
        }

        Ok(Self {
            dataset: dataset.to_string(),
            columns,
        })
    }

    pub(crate) fn has(&self, field: Field) -> bool {
        self.columns.iter().any(|(f, _)| *f == field)
    }

    /// Raw cell text, or `None` if the field is unmapped or the row is short.
    pub(crate) fn get<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        let idx = self
            .columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, idx)| *idx)?;
        record.get(idx)
    }

    pub(crate) fn text(&self, record: &StringRecord, field: Field, row: u64) -> Result<String> {
        self.get(record, field)
            .map(str::to_string)
            .ok_or_else(|| self.row_error(row, format!("missing {:?} value", field)))
    }

    pub(crate) fn number(&self, record: &StringRecord, field: Field, row: u64) -> Result<f64> {
        let raw = self
            .get(record, field)
            .ok_or_else(|| self.row_error(row, format!("missing {:?} value", field)))?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.row_error(row, format!("non-numeric {:?} value {:?}", field, raw)))
    }

    pub(crate) fn point(&self, record: &StringRecord, row: u64) -> Result<GeoPoint> {
        let point = GeoPoint::new(
            self.number(record, Field::Latitude, row)?,
            self.number(record, Field::Longitude, row)?,
        );
        if !point.is_valid() {
            return Err(self.row_error(
                row,
                format!(
                    "coordinates out of range ({}, {})",
                    point.latitude, point.longitude
                ),
            ));
        }
        Ok(point)
    }

    pub(crate) fn row_error(&self, row: u64, message: impl Into<String>) -> ProximityError {
        ProximityError::data_load(&self.dataset, format!("line {}: {}", row, message.into()))
    }
}

/// Line number of a record for error messages; header is line 1.
pub(crate) fn line_of(record: &StringRecord, fallback: usize) -> u64 {
    record
        .position()
        .map(|p| p.line())
        .unwrap_or(fallback as u64 + 2)
}
