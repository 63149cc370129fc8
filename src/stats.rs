//! Statistical helpers for the chart views.

use std::collections::BTreeMap;

use chrono::NaiveDate;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// ---------------------------------------------------------------------------
// Quartiles and box statistics
// ---------------------------------------------------------------------------

/// Calculate quartiles using linear interpolation.
pub fn quartiles(values: &[f64]) -> (f64, f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n == 0 {
        return (0.0, 0.0, 0.0);
    }

    let q1 = interpolate(&sorted, (n - 1) as f64 * 0.25);
    let q2 = interpolate(&sorted, (n - 1) as f64 * 0.5);
    let q3 = interpolate(&sorted, (n - 1) as f64 * 0.75);
    (q1, q2, q3)
}

fn interpolate(sorted: &[f64], idx: f64) -> f64 {
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;

    if lower == upper || upper >= sorted.len() {
        sorted[lower]
    } else {
        let fraction = idx - lower as f64;
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

/// Five-number summary with IQR whiskers (1.5×IQR fences) and outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub whisker_min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_max: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }

    let (q1, median, q3) = quartiles(values);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let outliers: Vec<f64> = values
        .iter()
        .filter(|&&v| v < lower_fence || v > upper_fence)
        .copied()
        .collect();

    // Whiskers end at the most extreme non-outlier values.
    let whisker_min = values
        .iter()
        .filter(|&&v| v >= lower_fence)
        .copied()
        .fold(f64::INFINITY, f64::min);
    let whisker_max = values
        .iter()
        .filter(|&&v| v <= upper_fence)
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    Some(BoxStats {
        whisker_min,
        q1,
        median,
        q3,
        whisker_max,
        outliers,
    })
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation coefficient. Rows where either value is
/// NaN (a null cell) are dropped pairwise. Returns 0 for degenerate input
/// (mismatched lengths, empty, or zero variance).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return 0.0;
    }

    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.is_empty() {
        return 0.0;
    }

    let mean_x = mean(&pairs.iter().map(|p| p.0).collect::<Vec<_>>());
    let mean_y = mean(&pairs.iter().map(|p| p.1).collect::<Vec<_>>());

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for &(xi, yi) in &pairs {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        0.0
    } else {
        cov / (var_x.sqrt() * var_y.sqrt())
    }
}

/// Full pairwise correlation matrix; diagonal is exactly 1.
pub fn correlation_matrix(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            matrix[i][j] = if i == j {
                1.0
            } else {
                pearson(&columns[i], &columns[j])
            };
        }
    }
    matrix
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Sturges' rule for the bin count.
pub fn sturges_bins(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        (1.0 + (n as f64).log2()).ceil() as usize
    }
}

/// Equal-width bins over the value extent. The last bin is closed on both
/// ends so the maximum lands in it.
pub fn histogram(values: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || num_bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / num_bins as f64;

    if width == 0.0 {
        // Degenerate: all values identical.
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    (0..num_bins)
        .map(|i| {
            let start = min + i as f64 * width;
            let end = start + width;
            let count = values
                .iter()
                .filter(|&&v| {
                    if i == num_bins - 1 {
                        v >= start && v <= end
                    } else {
                        v >= start && v < end
                    }
                })
                .count();
            HistogramBin { start, end, count }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Date aggregation for the line chart
// ---------------------------------------------------------------------------

/// Mean of the values per distinct date, sorted ascending by date.
pub fn mean_by_date(pairs: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut grouped: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for &(date, value) in pairs {
        grouped.entry(date).or_default().push(value);
    }
    grouped
        .into_iter()
        .map(|(date, values)| (date, mean(&values)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartiles_linear_interpolation() {
        let (q1, q2, q3) = quartiles(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(q1, 1.75);
        assert_eq!(q2, 2.5);
        assert_eq!(q3, 3.25);
    }

    #[test]
    fn test_box_stats_flags_outliers() {
        let mut values = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        values.push(100.0);
        let stats = box_stats(&values).unwrap();
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.whisker_max, 16.0);
        assert_eq!(stats.whisker_min, 10.0);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);

        let inv: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson(&x, &inv) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_correlation_matrix_diagonal() {
        let cols = vec![vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0]];
        let m = correlation_matrix(&cols);
        assert_eq!(m[0][0], 1.0);
        assert_eq!(m[1][1], 1.0);
        assert!((m[0][1] - m[1][0]).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        // Maximum value lands in the closed last bin.
        assert_eq!(bins.last().unwrap().count, 10);
    }

    #[test]
    fn test_histogram_identical_values() {
        let bins = histogram(&[5.0; 8], 4);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 8);
    }

    #[test]
    fn test_mean_by_date_sorts_and_averages() {
        let d = |day| NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
        let pairs = vec![(d(2), 10.0), (d(1), 4.0), (d(2), 20.0)];
        let series = mean_by_date(&pairs);
        assert_eq!(series, vec![(d(1), 4.0), (d(2), 15.0)]);
    }
}
