//! Amenity catalog.
//!
//! Amenities are loaded once from one or more tabular sources and are
//! read-only afterwards. A source may be tagged with a category (one file
//! per category); a tagged source needs no `Category` column, and when it
//! has one only rows of that category are kept.
//!
//! In a mixed source a malformed row only takes down its own category: the
//! other categories in the file still load, and the failure is recorded
//! against the broken one.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{info, warn};

use crate::category::Category;
use crate::error::{ProximityError, Result};
use crate::schema::{line_of, Field, HeaderMap, LoadOptions};
use crate::{Amenity, Bounds};

/// A dataset file to load amenities from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmenitySource {
    pub path: PathBuf,
    /// Category every row of this source belongs to, if the file holds a
    /// single category.
    pub category: Option<Category>,
}

impl AmenitySource {
    /// A mixed-category source; rows carry their own `Category` column.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            category: None,
        }
    }

    /// A single-category source.
    pub fn tagged(path: impl Into<PathBuf>, category: Category) -> Self {
        Self {
            path: path.into(),
            category: Some(category),
        }
    }
}

/// A source that failed to load.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub dataset: String,
    pub category: Option<Category>,
    pub error: ProximityError,
}

/// In-memory table of amenities.
#[derive(Debug, Clone, Default)]
pub struct AmenityCatalog {
    amenities: Vec<Amenity>,
    failures: Vec<SourceFailure>,
    skipped_rows: usize,
}

struct LoadedRows {
    rows: Vec<Amenity>,
    skipped: usize,
    /// Categories dropped from a mixed source by a bad row, with the first
    /// error seen for each.
    failed: BTreeMap<Category, ProximityError>,
}

impl AmenityCatalog {
    /// Build a catalog from in-memory amenities. Ids are reassigned to row
    /// positions.
    pub fn new(amenities: Vec<Amenity>) -> Self {
        let mut catalog = Self::default();
        catalog.extend(amenities);
        catalog
    }

    /// Load a mixed-category dataset from any reader.
    pub fn from_reader<R: Read>(reader: R, dataset: &str, options: &LoadOptions) -> Result<Self> {
        let loaded = read_amenities(reader, dataset, None, options)?;
        let mut catalog = Self::default();
        catalog.absorb(dataset, loaded);
        info!(
            "[Catalog] Loaded {} amenities from {} ({} rows skipped)",
            catalog.len(),
            dataset,
            catalog.skipped_rows
        );
        Ok(catalog)
    }

    /// Load a mixed-category dataset from a file.
    pub fn from_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let dataset = path.display().to_string();
        let file = File::open(path).map_err(|e| ProximityError::data_load(&dataset, e.to_string()))?;
        Self::from_reader(file, &dataset, options)
    }

    /// Load several sources. A failing source is recorded in
    /// [`AmenityCatalog::failures`] and never prevents the others from
    /// loading.
    pub fn load_sources(sources: &[AmenitySource], options: &LoadOptions) -> Self {
        let mut catalog = Self::default();

        for source in sources {
            let dataset = source.path.display().to_string();
            let loaded = File::open(&source.path)
                .map_err(|e| ProximityError::data_load(&dataset, e.to_string()))
                .and_then(|file| read_amenities(file, &dataset, source.category, options));

            match loaded {
                Ok(loaded) => {
                    info!(
                        "[Catalog] Loaded {} amenities from {}",
                        loaded.rows.len(),
                        dataset
                    );
                    catalog.absorb(&dataset, loaded);
                }
                Err(error) => {
                    warn!("[Catalog] Skipping source {}: {}", dataset, error);
                    catalog.failures.push(SourceFailure {
                        dataset,
                        category: source.category,
                        error,
                    });
                }
            }
        }

        info!(
            "[Catalog] {} amenities from {} sources, {} failed",
            catalog.len(),
            sources.len(),
            catalog.failures.len()
        );
        catalog
    }

    fn absorb(&mut self, dataset: &str, loaded: LoadedRows) {
        self.skipped_rows += loaded.skipped;
        self.extend(loaded.rows);
        self.failures
            .extend(loaded.failed.into_iter().map(|(category, error)| SourceFailure {
                dataset: dataset.to_string(),
                category: Some(category),
                error,
            }));
    }

    fn extend(&mut self, rows: Vec<Amenity>) {
        let offset = self.amenities.len();
        self.amenities
            .extend(rows.into_iter().enumerate().map(|(i, mut a)| {
                a.id = offset + i;
                a
            }));
    }

    /// Amenities whose category is in `categories`, in catalog order.
    pub fn filter_by_category(&self, categories: &BTreeSet<Category>) -> Vec<&Amenity> {
        self.amenities
            .iter()
            .filter(|a| categories.contains(&a.category))
            .collect()
    }

    /// Amenities of a single category, in catalog order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Amenity> {
        self.amenities.iter().filter(move |a| a.category == category)
    }

    /// Number of amenities per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for a in &self.amenities {
            *counts.entry(a.category).or_insert(0) += 1;
        }
        counts
    }

    /// Sources that failed to load.
    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }

    /// Failures attributable to `category`: failed sources tagged with it,
    /// rows of it that broke a mixed source, and untagged sources that failed
    /// outright (which may have held any category).
    pub fn failures_for(&self, category: Category) -> impl Iterator<Item = &SourceFailure> {
        self.failures
            .iter()
            .filter(move |f| f.category.map_or(true, |c| c == category))
    }

    /// Rows dropped because their category was outside the known set.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn get(&self, id: usize) -> Option<&Amenity> {
        self.amenities.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Amenity> {
        self.amenities.iter()
    }

    pub fn as_slice(&self) -> &[Amenity] {
        &self.amenities
    }

    pub fn len(&self) -> usize {
        self.amenities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amenities.is_empty()
    }

    /// Bounding box of all amenities.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.amenities.iter().map(|a| &a.location))
    }
}

const MIXED_REQUIRED: &[Field] = &[Field::Name, Field::Category, Field::Latitude, Field::Longitude];
const TAGGED_REQUIRED: &[Field] = &[Field::Name, Field::Latitude, Field::Longitude];
const TAGGED_OPTIONAL: &[Field] = &[Field::Category];
const NO_FIELDS: &[Field] = &[];

fn read_amenities<R: Read>(
    reader: R,
    dataset: &str,
    tag: Option<Category>,
    options: &LoadOptions,
) -> Result<LoadedRows> {
    let mut reader = options.reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| ProximityError::data_load(dataset, e.to_string()))?
        .clone();

    let (required, optional) = match tag {
        Some(_) => (TAGGED_REQUIRED, TAGGED_OPTIONAL),
        None => (MIXED_REQUIRED, NO_FIELDS),
    };
    let map = HeaderMap::resolve(&headers, required, optional, &options.aliases, dataset)?;
    let has_category = map.has(Field::Category);

    let mut rows = Vec::new();
    let mut skipped = 0;
    let mut failed = BTreeMap::new();

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ProximityError::data_load(dataset, e.to_string()))?;
        let line = line_of(&record, i);

        let category = if has_category {
            let raw = map.text(&record, Field::Category, line)?;
            match (Category::from_key(&raw), tag) {
                (Ok(c), Some(t)) if c != t => {
                    skipped += 1;
                    continue;
                }
                (Ok(c), _) => c,
                (Err(_), _) => {
                    warn!(
                        "[Catalog] {} line {}: unknown category {:?}, row skipped",
                        dataset, line, raw
                    );
                    skipped += 1;
                    continue;
                }
            }
        } else {
            // Without a Category column the source must be tagged.
            match tag {
                Some(t) => t,
                None => return Err(map.row_error(line, "missing Category value")),
            }
        };

        if failed.contains_key(&category) {
            continue;
        }

        match read_row(&map, &record, category, line) {
            Ok(amenity) => rows.push(amenity),
            // A tagged source holds one category, so the row fails the source.
            Err(error) if tag.is_some() => return Err(error),
            Err(error) => {
                warn!(
                    "[Catalog] {}: {}; dropping category {} from this source",
                    dataset, error, category
                );
                failed.insert(category, error);
            }
        }
    }

    rows.retain(|a: &Amenity| !failed.contains_key(&a.category));

    if rows.is_empty() && failed.is_empty() {
        return Err(ProximityError::data_load(dataset, "no usable amenity rows"));
    }

    Ok(LoadedRows {
        rows,
        skipped,
        failed,
    })
}

fn read_row(
    map: &HeaderMap,
    record: &StringRecord,
    category: Category,
    line: u64,
) -> Result<Amenity> {
    let name = map.text(record, Field::Name, line)?;
    let location = map.point(record, line)?;
    Ok(Amenity::new(0, name, category, location))
}
