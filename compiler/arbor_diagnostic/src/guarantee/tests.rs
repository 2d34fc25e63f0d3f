use super::*;

#[test]
fn from_error_count_nonzero() {
    assert!(ErrorGuaranteed::from_error_count(1).is_some());
    assert!(ErrorGuaranteed::from_error_count(7).is_some());
}

#[test]
fn from_error_count_zero() {
    assert!(ErrorGuaranteed::from_error_count(0).is_none());
}

#[test]
fn error_guaranteed_displays() {
    assert_eq!(ErrorGuaranteed::new().to_string(), "error(s) emitted");
}

#[test]
fn error_guaranteed_is_copy() {
    let a = ErrorGuaranteed::new();
    let b = a;
    assert_eq!(a, b);
}
