//! proximap CLI - debug harness for the proximity engine
//!
//! Usage:
//!   proximap-cli search --amenities <csv> --apartments <csv> --lat <lat> --lon <lon>
//!                       [--radius <km>] [--category <key>]... [--top <n>] [--json]
//!   proximap-cli stats --amenities <csv> --apartments <csv>
//!   proximap-cli categories
//!
//! Amenity sources may be tagged with a category as `pharmacies=path.csv`.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use proximap::{
    nearest, AmenityCatalog, AmenitySource, ApartmentAnchor, ApartmentCatalog, Availability,
    Category, DistanceMetric, GeoPoint, LoadOptions, ProximityEngine, SearchConfig, SearchRequest,
};

#[derive(Parser)]
#[command(name = "proximap-cli")]
#[command(about = "Debug tool for amenity and apartment proximity search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search amenities and apartments around a point
    Search {
        #[command(flatten)]
        data: DataArgs,

        /// Origin latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Origin longitude
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in kilometers
        #[arg(short, long, default_value = "5.0")]
        radius: f64,

        /// Category keys to search (repeatable); defaults to all
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Nearest amenities to print per category
        #[arg(long, default_value = "3")]
        top: usize,

        /// Distance model for exact checks
        #[arg(long, value_enum, default_value = "haversine")]
        metric: MetricArg,

        /// What apartments are measured against
        #[arg(long, value_enum, default_value = "amenities")]
        anchor: AnchorArg,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load datasets and print a summary
    Stats {
        #[command(flatten)]
        data: DataArgs,
    },

    /// List category keys and labels
    Categories,
}

#[derive(clap::Args)]
struct DataArgs {
    /// Amenity CSV, optionally tagged as `<category>=<path>` (repeatable)
    #[arg(short, long = "amenities", required = true, value_parser = parse_source)]
    amenities: Vec<AmenitySource>,

    /// Apartment CSV
    #[arg(short = 'p', long)]
    apartments: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Haversine,
    Geodesic,
}

#[derive(Clone, Copy, ValueEnum)]
enum AnchorArg {
    Amenities,
    Origin,
}

fn parse_source(raw: &str) -> Result<AmenitySource, String> {
    match raw.split_once('=') {
        Some((key, path)) => Category::from_key(key)
            .map(|c| AmenitySource::tagged(path, c))
            .map_err(|e| e.to_string()),
        None => Ok(AmenitySource::new(raw)),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            data,
            lat,
            lon,
            radius,
            categories,
            top,
            metric,
            anchor,
            json,
        } => {
            let config = SearchConfig {
                metric: match metric {
                    MetricArg::Haversine => DistanceMetric::Haversine,
                    MetricArg::Geodesic => DistanceMetric::Geodesic,
                },
                anchor: match anchor {
                    AnchorArg::Amenities => ApartmentAnchor::MatchedAmenities,
                    AnchorArg::Origin => ApartmentAnchor::Origin,
                },
                ..SearchConfig::default()
            };
            let Some(engine) = load_engine(&data, config) else {
                return ExitCode::FAILURE;
            };
            run_search(&engine, GeoPoint::new(lat, lon), radius, &categories, top, json)
        }
        Commands::Stats { data } => {
            let Some(engine) = load_engine(&data, SearchConfig::default()) else {
                return ExitCode::FAILURE;
            };
            let stats = engine.stats();
            println!("Amenities:  {}", stats.amenity_count);
            for (category, count) in &stats.amenities_per_category {
                println!("  {:<14} {}", category.key(), count);
            }
            println!("Apartments: {}", stats.apartment_count);
            println!("Failed sources: {}", stats.failed_sources);
            ExitCode::SUCCESS
        }
        Commands::Categories => {
            for category in Category::all() {
                println!("{:<14} {}", category.key(), category.label());
            }
            ExitCode::SUCCESS
        }
    }
}

fn load_engine(data: &DataArgs, config: SearchConfig) -> Option<ProximityEngine> {
    let options = LoadOptions::default();
    let catalog = AmenityCatalog::load_sources(&data.amenities, &options);
    for failure in catalog.failures() {
        eprintln!("warning: {}", failure.error);
    }

    match ApartmentCatalog::from_path(&data.apartments, &options) {
        Ok(apartments) => Some(ProximityEngine::with_config(catalog, apartments, config)),
        Err(e) => {
            eprintln!("error: {}", e);
            None
        }
    }
}

fn run_search(
    engine: &ProximityEngine,
    origin: GeoPoint,
    radius: f64,
    categories: &[String],
    top: usize,
    json: bool,
) -> ExitCode {
    let request = if categories.is_empty() {
        Ok(SearchRequest::new(origin, radius, Category::all()))
    } else {
        SearchRequest::from_keys(origin, radius, categories)
    };

    let result = match request.and_then(|r| engine.search(&r)) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "Search at ({:.6}, {:.6}) within {} km",
        origin.latitude, origin.longitude, radius
    );
    println!("{}", "=".repeat(60));

    for (category, matches) in &result.per_category {
        let availability = match Availability::of(matches) {
            Availability::None => "none",
            Availability::Single => "single",
            Availability::Several => "several",
        };
        println!(
            "\n{} ({}): {} found [{}]",
            category.label(),
            category.key(),
            matches.len(),
            availability
        );
        for m in nearest(matches, top) {
            println!("  - {} ({:.2} km)", m.amenity.name, m.rounded_distance_km());
        }
    }

    for warning in &result.warnings {
        let note = if warning.excluded { ", excluded" } else { "" };
        println!(
            "\nwarning [{}{}]: {}",
            warning.category.key(),
            note,
            warning.message
        );
    }

    println!("\nApartments: {}", result.apartments.len());
    for m in &result.apartments {
        let anchor = m
            .nearest_amenity
            .as_ref()
            .map_or("origin", |a| a.name.as_str());
        println!(
            "  - {} [{}] {:.0}/month, rating {:.1}, {:.2} km from {}",
            m.apartment.name,
            m.apartment.room_id,
            m.apartment.price_per_month,
            m.apartment.rating,
            m.distance_km,
            anchor
        );
    }

    ExitCode::SUCCESS
}
