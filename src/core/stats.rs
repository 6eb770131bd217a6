//! Descriptive statistics over sales amounts.
//!
//! Quantiles use linear interpolation between closest ranks, the same
//! convention dataframe libraries use for `describe()`.

use crate::domain::sales::{CategoryStat, HistogramBin, NumericSummary, Skew};
use std::collections::HashMap;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// `q` in [0, 1] over already sorted values.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn describe(values: &[f64]) -> Option<NumericSummary> {
    let sorted = sorted_copy(values);
    Some(NumericSummary {
        count: sorted.len(),
        mean: mean(&sorted)?,
        std: sample_std(&sorted),
        min: *sorted.first()?,
        q1: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q3: quantile_sorted(&sorted, 0.75)?,
        max: *sorted.last()?,
    })
}

/// Mean more than 10% away from the median counts as skewed.
pub fn skew_of(summary: &NumericSummary) -> Skew {
    if summary.mean > summary.median * 1.1 {
        Skew::Right
    } else if summary.mean < summary.median * 0.9 {
        Skew::Left
    } else {
        Skew::Symmetric
    }
}

/// Standard deviation above half the mean.
pub fn is_high_variability(summary: &NumericSummary) -> bool {
    summary.std.is_some_and(|std| std > summary.mean * 0.5)
}

/// Values outside `[q1 - 1.5·IQR, q3 + 1.5·IQR]`.
pub fn iqr_outlier_count(values: &[f64], summary: &NumericSummary) -> usize {
    let iqr = summary.q3 - summary.q1;
    let lower = summary.q1 - 1.5 * iqr;
    let upper = summary.q3 + 1.5 * iqr;
    values.iter().filter(|v| **v < lower || **v > upper).count()
}

/// Equal-width bins between min and max; the last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted_copy(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &sorted {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Count, share and revenue per category, most frequent first, ties by name.
pub fn category_stats<'a, I>(items: I) -> Vec<CategoryStat>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut groups: HashMap<&'a str, (usize, f64)> = HashMap::new();
    let mut total = 0usize;
    for (name, amount) in items {
        let entry = groups.entry(name).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += amount;
        total += 1;
    }

    let mut stats: Vec<CategoryStat> = groups
        .into_iter()
        .map(|(name, (count, revenue))| CategoryStat {
            name: name.to_string(),
            count,
            share_percent: count as f64 / total as f64 * 100.0,
            revenue,
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    stats
}
