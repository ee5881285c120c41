//! Pearson correlation of period-keyed series

use std::collections::BTreeMap;

/// Pearson correlation coefficient over the periods both series share
///
/// Only keys present in both maps are used. Returns 0 when fewer than two
/// periods overlap or when either side has zero variance; the result is
/// clamped to [-1, 1].
pub fn pearson_correlation(x: &BTreeMap<String, f64>, y: &BTreeMap<String, f64>) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .filter_map(|(period, xv)| y.get(period).map(|yv| (*xv, *yv)))
        .unzip();

    pearson(&xs, &ys)
}

/// Pearson correlation of two aligned slices
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys.iter()) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let nf = n as f64;
    let numerator = nf * sum_xy - sum_x * sum_y;
    let variance_x = nf * sum_x2 - sum_x * sum_x;
    let variance_y = nf * sum_y2 - sum_y * sum_y;

    if variance_x <= 0.0 || variance_y <= 0.0 {
        return 0.0;
    }

    let r = numerator / (variance_x * variance_y).sqrt();
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
