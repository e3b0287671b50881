//! Tests for error module

use proximap::error::{OptionExt, ProximityError};

#[test]
fn test_error_display() {
    let err = ProximityError::DataLoad {
        dataset: "amenities.csv".to_string(),
        message: "line 3: non-numeric Latitude value".to_string(),
    };
    assert!(err.to_string().contains("amenities.csv"));
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn test_option_ext() {
    let none: Option<usize> = None;
    let result = none.ok_or_schema("test.csv", "missing Latitude column");
    assert!(matches!(result, Err(ProximityError::Schema { .. })));
    assert!(result.unwrap_err().is_schema());
}

#[test]
fn test_option_ext_some_passes_through() {
    assert_eq!(Some(3).ok_or_schema("test.csv", "unused").unwrap(), 3);
}
