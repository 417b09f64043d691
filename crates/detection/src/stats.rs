//! Small descriptive statistics used by the detection methods.

#![allow(clippy::cast_precision_loss, reason = "sample sizes are far below 2^52")]

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation.
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Standard deviation divided by mean. `None` when the mean is not positive.
pub(crate) fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m <= f64::EPSILON {
        return None;
    }
    Some(std_dev(values)? / m)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Successive differences of millisecond timestamps.
pub(crate) fn intervals_ms(timestamps_ms: &[i64]) -> Vec<f64> {
    timestamps_ms.windows(2).map(|w| (w[1] - w[0]) as f64).collect()
}
