//! Tests for the amenity catalog and apartment dataset loaders

use std::collections::BTreeSet;

use proximap::{
    Amenity, AmenityCatalog, AmenitySource, Apartment, ApartmentCatalog, Category, ColumnAliases,
    GeoPoint, LoadOptions, ProximityError,
};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn apartment(room_id: &str, lat: f64, lng: f64) -> Apartment {
    Apartment {
        room_id: room_id.to_string(),
        name: format!("Listing {}", room_id),
        price_per_month: 3000.0,
        rating: 4.5,
        location: GeoPoint::new(lat, lng),
        url: format!("https://listings.example/{}", room_id),
    }
}

#[test]
fn test_load_amenities_from_path() {
    let catalog = AmenityCatalog::from_path(fixture("amenities.csv"), &LoadOptions::default())
        .unwrap();

    // "souqs" row is outside the closed set
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.skipped_rows(), 1);

    let first = catalog.get(0).unwrap();
    assert_eq!(first.id, 0);
    assert_eq!(first.name, "Al Nahdi Pharmacy");
    assert_eq!(first.category, Category::Pharmacies);
    assert_eq!(first.location, GeoPoint::new(24.7136, 46.6753));

    let counts = catalog.category_counts();
    assert_eq!(counts[&Category::Pharmacies], 2);
    assert_eq!(counts[&Category::Malls], 2);
    assert_eq!(counts.get(&Category::Parks), None);
}

#[test]
fn test_filter_by_category() {
    let catalog = AmenityCatalog::from_path(fixture("amenities.csv"), &LoadOptions::default())
        .unwrap();
    let selected: BTreeSet<Category> = [Category::Malls, Category::Metro].into_iter().collect();

    let filtered = catalog.filter_by_category(&selected);
    let names: Vec<&str> = filtered.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Riyadh Park Mall", "Kingdom Centre", "Airport Metro Station"]
    );

    assert_eq!(catalog.in_category(Category::Hospitals).count(), 1);
    assert!(catalog.filter_by_category(&BTreeSet::new()).is_empty());
}

#[test]
fn test_aliases_and_whitespace_in_headers() {
    let data = " name , CATEGORY ,Latt,LNG\nCorner Gym,gyms,24.70,46.70\n";
    let catalog =
        AmenityCatalog::from_reader(data.as_bytes(), "inline", &LoadOptions::default()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(0).unwrap().category, Category::Gyms);
}

#[test]
fn test_custom_alias_table() {
    let options = LoadOptions {
        aliases: ColumnAliases::new(&["y_coord"], &["x_coord"]),
        ..LoadOptions::default()
    };
    let data = "Name,Category,Y_Coord,X_Coord\nPark,parks,24.7,46.7\n";
    let catalog = AmenityCatalog::from_reader(data.as_bytes(), "inline", &options).unwrap();
    assert_eq!(catalog.len(), 1);

    // The default aliases are no longer recognised
    let data = "Name,Category,Latitude,Longitude\nPark,parks,24.7,46.7\n";
    let err = AmenityCatalog::from_reader(data.as_bytes(), "inline", &options).unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn test_semicolon_delimiter() {
    let options = LoadOptions {
        delimiter: b';',
        ..LoadOptions::default()
    };
    let data = "Name;Category;Lat;Lon\nCafe One;cafes;24.7;46.7\n";
    let catalog = AmenityCatalog::from_reader(data.as_bytes(), "inline", &options).unwrap();
    assert_eq!(catalog.get(0).unwrap().category, Category::Cafes);
}

#[test]
fn test_missing_coordinates_is_schema_error() {
    let err = AmenityCatalog::from_path(fixture("hospitals_bad_schema.csv"), &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, ProximityError::Schema { .. }));
}

#[test]
fn test_missing_name_is_schema_error() {
    let data = "Category,Latitude,Longitude\nparks,24.7,46.7\n";
    let err = AmenityCatalog::from_reader(data.as_bytes(), "inline", &LoadOptions::default())
        .unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn test_non_numeric_coordinates_fail_their_category() {
    let catalog =
        AmenityCatalog::from_path(fixture("bad_coordinates.csv"), &LoadOptions::default()).unwrap();
    assert!(catalog.is_empty());

    let failures: Vec<_> = catalog.failures_for(Category::Pharmacies).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].category, Some(Category::Pharmacies));
    match &failures[0].error {
        ProximityError::DataLoad { message, .. } => assert!(message.contains("line 2")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_out_of_range_coordinates_fail_their_category() {
    let data = "Name,Category,Latitude,Longitude\nNowhere,parks,95.0,46.7\n";
    let catalog =
        AmenityCatalog::from_reader(data.as_bytes(), "inline", &LoadOptions::default()).unwrap();
    let failures: Vec<_> = catalog.failures_for(Category::Parks).collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0].error, ProximityError::DataLoad { .. }));
}

#[test]
fn test_bad_row_drops_only_its_category() {
    let data = "Name,Category,Latitude,Longitude\n\
                Good Pharmacy,pharmacies,24.71,46.67\n\
                Mall,malls,24.72,46.68\n\
                Bad Pharmacy,pharmacies,north,46.67\n\
                Late Pharmacy,pharmacies,24.73,46.69\n\
                Second Mall,malls,24.74,46.70\n";
    let catalog =
        AmenityCatalog::from_reader(data.as_bytes(), "inline", &LoadOptions::default()).unwrap();

    // Pharmacies before and after the bad row are both dropped
    assert_eq!(catalog.in_category(Category::Pharmacies).count(), 0);
    assert_eq!(catalog.in_category(Category::Malls).count(), 2);
    assert_eq!(catalog.len(), 2);

    assert_eq!(catalog.failures().len(), 1);
    assert_eq!(catalog.failures()[0].category, Some(Category::Pharmacies));
    assert_eq!(catalog.failures_for(Category::Malls).count(), 0);
}

#[test]
fn test_short_row_drops_only_its_category() {
    let data = "Name,Category,Latitude,Longitude\nStub,gyms,24.7\nMall,malls,24.72,46.68\n";
    let catalog =
        AmenityCatalog::from_reader(data.as_bytes(), "inline", &LoadOptions::default()).unwrap();
    assert_eq!(catalog.in_category(Category::Malls).count(), 1);
    assert_eq!(catalog.failures_for(Category::Gyms).count(), 1);
}

#[test]
fn test_bad_row_in_tagged_source_fails_the_source() {
    let data = "Name,Latitude,Longitude\nOk,24.7,46.7\nBroken,north,46.7\n";
    let dir = std::env::temp_dir().join(format!("proximap-tagged-bad-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("gyms.csv");
    std::fs::write(&path, data).unwrap();

    let catalog = AmenityCatalog::load_sources(
        &[AmenitySource::tagged(&path, Category::Gyms)],
        &LoadOptions::default(),
    );
    assert!(catalog.is_empty());
    assert_eq!(catalog.failures().len(), 1);
    assert_eq!(catalog.failures()[0].category, Some(Category::Gyms));
}

#[test]
fn test_empty_dataset_is_data_load_error() {
    let err =
        AmenityCatalog::from_path(fixture("empty.csv"), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ProximityError::DataLoad { .. }));

    let header_only = "Name,Category,Latitude,Longitude\n";
    let err = AmenityCatalog::from_reader(header_only.as_bytes(), "inline", &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, ProximityError::DataLoad { .. }));
}

#[test]
fn test_missing_file_is_data_load_error() {
    let err = AmenityCatalog::from_path(fixture("does_not_exist.csv"), &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, ProximityError::DataLoad { .. }));
}

#[test]
fn test_load_sources_isolates_failures() {
    let sources = vec![
        AmenitySource::new(fixture("amenities.csv")),
        AmenitySource::tagged(fixture("pharmacies_tagged.csv"), Category::Pharmacies),
        AmenitySource::tagged(fixture("hospitals_bad_schema.csv"), Category::Hospitals),
        AmenitySource::tagged(fixture("missing.csv"), Category::Parks),
    ];
    let catalog = AmenityCatalog::load_sources(&sources, &LoadOptions::default());

    assert_eq!(catalog.len(), 8);
    assert_eq!(catalog.in_category(Category::Pharmacies).count(), 4);

    // Ids stay row positions across sources
    for (i, amenity) in catalog.iter().enumerate() {
        assert_eq!(amenity.id, i);
    }

    assert_eq!(catalog.failures().len(), 2);
    let hospitals: Vec<_> = catalog.failures_for(Category::Hospitals).collect();
    assert_eq!(hospitals.len(), 1);
    assert!(hospitals[0].error.is_schema());

    let parks: Vec<_> = catalog.failures_for(Category::Parks).collect();
    assert_eq!(parks.len(), 1);
    assert!(matches!(parks[0].error, ProximityError::DataLoad { .. }));

    assert_eq!(catalog.failures_for(Category::Malls).count(), 0);
}

#[test]
fn test_tagged_source_with_category_column_keeps_only_its_category() {
    let data = "Name,Category,Latitude,Longitude\nA,pharmacies,24.7,46.7\nB,malls,24.8,46.8\n";
    let dir = std::env::temp_dir().join(format!("proximap-tagged-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("mixed.csv");
    std::fs::write(&path, data).unwrap();

    let catalog = AmenityCatalog::load_sources(
        &[AmenitySource::tagged(&path, Category::Pharmacies)],
        &LoadOptions::default(),
    );
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(0).unwrap().name, "A");
    assert_eq!(catalog.skipped_rows(), 1);
}

#[test]
fn test_catalog_new_reassigns_ids() {
    let catalog = AmenityCatalog::new(vec![
        Amenity::new(42, "A", Category::Parks, GeoPoint::new(24.7, 46.7)),
        Amenity::new(7, "B", Category::Parks, GeoPoint::new(24.8, 46.8)),
    ]);
    assert_eq!(catalog.get(0).unwrap().id, 0);
    assert_eq!(catalog.get(1).unwrap().id, 1);
    let bounds = catalog.bounds().unwrap();
    assert_eq!(bounds.min_lat, 24.7);
    assert_eq!(bounds.max_lng, 46.8);
}

#[test]
fn test_load_apartments() {
    let apartments =
        ApartmentCatalog::from_path(fixture("apartments.csv"), &LoadOptions::default()).unwrap();
    assert_eq!(apartments.len(), 4);

    let studio = apartments.find("101").unwrap();
    assert_eq!(studio.name, "Olaya Studio");
    assert_eq!(studio.price_per_month, 3500.0);
    assert_eq!(studio.rating, 4.7);
    assert_eq!(studio.url, "https://listings.example/101");
    assert_eq!(apartments.points().len(), 4);
}

#[test]
fn test_apartments_missing_url_is_schema_error() {
    let data = "room_id,name,price_per_month,rating,latitude,longitude\n1,A,1000,4,24.7,46.7\n";
    let err = ApartmentCatalog::from_reader(data.as_bytes(), "inline", &LoadOptions::default())
        .unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn test_apartments_non_numeric_price() {
    let data = "room_id,name,price_per_month,rating,lat,lng,url\n1,A,cheap,4,24.7,46.7,u\n";
    let err = ApartmentCatalog::from_reader(data.as_bytes(), "inline", &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, ProximityError::DataLoad { .. }));
}

#[test]
fn test_duplicate_room_ids_keep_first() {
    let apartments = ApartmentCatalog::new(vec![
        apartment("a", 24.70, 46.70),
        apartment("b", 24.71, 46.71),
        apartment("a", 24.90, 46.90),
    ]);
    assert_eq!(apartments.len(), 2);
    assert_eq!(apartments.duplicates(), 1);
    assert_eq!(apartments.find("a").unwrap().location, GeoPoint::new(24.70, 46.70));
}
