//! Boundary units are milliseconds, internal units are seconds.

const MILLIS_PER_SECOND: f64 = 1000.0;

/// Convert a boundary millisecond value to internal seconds.
pub fn millis_to_seconds(millis: f64) -> f64 {
    millis / MILLIS_PER_SECOND
}

/// Convert internal seconds to a boundary millisecond value.
pub fn seconds_to_millis(seconds: f64) -> f64 {
    seconds * MILLIS_PER_SECOND
}
