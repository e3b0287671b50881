//! Tests for the category translator

use proximap::{to_display, to_key, Category, ProximityError};

#[test]
fn test_table_round_trip_for_every_category() {
    for category in Category::all() {
        assert_eq!(Category::from_key(category.key()).unwrap(), category);
        assert_eq!(Category::from_label(category.label()).unwrap(), category);
    }
    assert_eq!(Category::all().count(), 12);
}

#[test]
fn test_to_display_and_back() {
    assert_eq!(to_display("pharmacies").unwrap(), "Pharmacies");
    assert_eq!(to_display("metro").unwrap(), "Metro Stations");
    assert_eq!(to_key("Shopping Malls").unwrap(), "malls");
}

#[test]
fn test_key_lookup_is_case_insensitive() {
    assert_eq!(Category::from_key(" Pharmacies ").unwrap(), Category::Pharmacies);
    assert_eq!("BUS_STOPS".parse::<Category>().unwrap(), Category::BusStops);
}

#[test]
fn test_unknown_key_and_label() {
    assert!(matches!(
        to_display("souqs"),
        Err(ProximityError::UnknownCategory(ref k)) if k == "souqs"
    ));
    assert!(matches!(
        to_key("pharmacies"),
        Err(ProximityError::UnknownCategory(_))
    ));
}

#[test]
fn test_display_uses_key() {
    assert_eq!(Category::Hospitals.to_string(), "hospitals");
}
