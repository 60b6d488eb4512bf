//! A small anonymised booking export, used when no data file is available and in tests.

/// The sample export. It includes some rows that are rejected on load.
pub const TEXT: &str = include_str!("../data/sample_bookings.csv");
