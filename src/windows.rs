//! Trailing moving averages and running sums over ordered sequences.
//!
//! The moving average treats non-positive entries as "no observation" and
//! drops them per window. Because the set of valid entries differs between
//! windows, each index is averaged on its own rather than with a rolling sum.

/// Mean of the valid (positive) values in the window ending at `index`.
///
/// The window covers up to `window_size` entries and is clamped at the start
/// of the sequence. Returns `None` when the window holds no valid value, when
/// `window_size` is zero, or when `index` is out of bounds.
pub fn moving_average(values: &[f64], index: usize, window_size: usize) -> Option<f64> {
    if window_size == 0 || index >= values.len() {
        return None;
    }
    let start = (index + 1).saturating_sub(window_size);

    let (sum, count) = values[start..=index]
        .iter()
        .filter(|v| **v > 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Moving average at every index of the sequence.
pub fn moving_averages(values: &[f64], window_size: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| moving_average(values, i, window_size))
        .collect()
}

/// Left-to-right running total.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, v| {
            *total += v;
            Some(*total)
        })
        .collect()
}
