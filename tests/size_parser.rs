use splitzip::{parse_size, parse_split_size};

#[test]
fn canonical_units_parse_to_the_same_integer_as_bare_bytes() {
    assert_eq!(parse_size("100MB").unwrap(), parse_size("100000000").unwrap());
    assert_eq!(parse_size("1GiB").unwrap(), 1u64 << 30);
}

#[test]
fn split_size_below_64kib_is_rejected() {
    assert!(parse_split_size("32768").is_err());
    assert!(parse_split_size("64KiB").is_ok());
}

#[test]
fn garbage_input_is_rejected_not_panicking() {
    assert!(parse_size("").is_err());
    assert!(parse_size("MB100").is_err());
    assert!(parse_size("100 MB extra").is_err());
}
