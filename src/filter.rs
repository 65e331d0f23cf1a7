//! Moving-median smoothing over a sample window.
//!
//! The median is resistant to the single-sample spikes a flaky sensor line
//! produces, which is why the station smooths with it rather than a mean.
//! Computation is non-destructive: the caller's window is sorted into a
//! scratch copy.
//!
//! Even-length windows have no middle element; the filter returns the
//! *floor* of the exact average of the two central values, so
//! `median(&[-10, -5, -1, 0, 5, 10])` is `-1`, not `0`.

use thiserror::Error;

/// Errors produced by [`median`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The window holds no samples.
    #[error("median of an empty window is undefined")]
    EmptyWindow,
}

/// Median of a sample window.
///
/// Odd-length windows yield the middle element of the sorted copy;
/// even-length windows yield the floored average of the two central
/// elements, summed in 64-bit so the i32 extremes cannot overflow.
///
/// The result is independent of the input ordering.
///
/// # Example
///
/// ```rust
/// use rs_railops::filter::median;
///
/// assert_eq!(median(&[9, 5, 1, 7, 3]).unwrap(), 5);
/// assert_eq!(median(&[10, 20, 30, 40]).unwrap(), 25);
/// assert!(median(&[]).is_err());
/// ```
pub fn median(values: &[i32]) -> Result<i32, FilterError> {
    if values.is_empty() {
        return Err(FilterError::EmptyWindow);
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        let sum = i64::from(sorted[mid - 1]) + i64::from(sorted[mid]);
        // div_euclid floors for a positive divisor.
        Ok(sum.div_euclid(2) as i32)
    }
}

// ============================================================================
// Tests
// ============================================================================
