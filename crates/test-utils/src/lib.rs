//! Shared test utilities for the avalanche dashboard workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A temporary data-root builder laid out like the published data tree
//! - Canned forecast, observation and station fixtures
//! - Tolerance-based assertions for rounded chart values
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, DataRootBuilder};
//! ```

pub mod data_root;
pub mod fixtures;

pub use data_root::DataRootBuilder;

/// Tolerance used by [`assert_close!`] and [`assert_series_close`] when none
/// is given. Tight enough to tell apart values rounded to four decimals.
pub const VALUE_TOLERANCE: f64 = 1e-9;

/// Assert two chart values agree within a tolerance.
///
/// ```ignore
/// use test_utils::assert_close;
///
/// assert_close!(round4(-20.123456), -20.1235);
/// assert_close!(reading, 210.0, 0.5);
/// ```
#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr) => {
        $crate::assert_close!($actual, $expected, $crate::VALUE_TOLERANCE)
    };
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let actual: f64 = $actual;
        let expected: f64 = $expected;
        let tolerance: f64 = $tolerance;
        assert!(
            (actual - expected).abs() <= tolerance,
            "value {} differs from expected {} by more than {}",
            actual,
            expected,
            tolerance
        );
    }};
}

/// Assert a series of optional values matches `expected` point by point.
/// Gaps must line up exactly; present values compare within
/// [`VALUE_TOLERANCE`].
#[track_caller]
pub fn assert_series_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "series length {} != expected {}: {:?}",
        actual.len(),
        expected.len(),
        actual
    );
    for (i, (got, want)) in actual.iter().zip(expected).enumerate() {
        match (got, want) {
            (Some(got), Some(want)) => assert!(
                (got - want).abs() <= VALUE_TOLERANCE,
                "point {}: {} differs from expected {}",
                i,
                got,
                want
            ),
            (None, None) => {}
            _ => panic!("point {}: {:?} but expected {:?}", i, got, want),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_close_with_default_and_explicit_tolerance() {
        assert_close!(0.1 + 0.2, 0.3);
        assert_close!(209.8, 210.0, 0.5);
    }

    #[test]
    #[should_panic(expected = "differs from expected")]
    fn test_assert_close_catches_unrounded_value() {
        assert_close!(-20.123456, -20.1235);
    }

    #[test]
    #[should_panic(expected = "point 1")]
    fn test_series_gap_must_line_up() {
        assert_series_close(&[Some(1.0), Some(2.0)], &[Some(1.0), None]);
    }
}
