//! Shared primitive types used across the entire pipeline.

/// A stable, unique identifier for a customer row.
pub type CustomerId = String;

/// The canonical run identifier. One per pipeline invocation.
pub type RunId = String;

/// Caller-supplied session identifier, passed through untouched.
pub type SessionId = String;

/// Round to two decimal places, as every reported ratio and confidence is.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
