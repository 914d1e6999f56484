//! Lower-median estimator
//!
//! Single-sample ultrasonic glitches (cross-talk, multi-path echoes) are
//! rejected with a median rather than a mean. The lower median - index
//! `(n - 1) >> 1` of the sorted values - needs no interpolation, so the
//! result is always a value that was actually observed.

/// Lower median of the given values
///
/// Sorts the slice in place. Returns `None` for an empty slice.
pub fn lower_median(values: &mut [u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    Some(values[(values.len() - 1) >> 1])
}
