//! Headline score and rolling series for one source.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{FeedRow, FeedTable, NewsSource};

/// One point of the rolling objectivity series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    /// Percent; `None` until the window holds `min_periods` values.
    pub rolling_objectivity_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectivityReport {
    pub source: NewsSource,
    pub limit: usize,
    pub fetched_at: DateTime<Utc>,
    pub post_count: usize,
    /// Mean `average_objectivity` in percent; `None` for an empty table.
    pub mean_objectivity_pct: Option<f64>,
    pub rolling_window: usize,
    pub rolling_min_periods: usize,
    pub series: Vec<SeriesPoint>,
    pub rows: Vec<FeedRow>,
}

impl ObjectivityReport {
    /// Rows are kept in delivery order; the series is sorted by timestamp.
    #[must_use]
    pub fn build(source: NewsSource, table: &FeedTable, window: usize, min_periods: usize) -> Self {
        let mut chronological: Vec<&FeedRow> = table.rows().iter().collect();
        chronological.sort_by_key(|row| row.timestamp);

        let values: Vec<f64> = chronological
            .iter()
            .map(|row| row.scores.average_objectivity())
            .collect();
        let series = chronological
            .iter()
            .zip(rolling_mean(&values, window, min_periods))
            .map(|(row, mean)| SeriesPoint {
                timestamp: row.timestamp,
                rolling_objectivity_pct: mean.map(to_percent),
            })
            .collect();

        Self {
            source,
            limit: table.limit(),
            fetched_at: table.fetched_at(),
            post_count: table.len(),
            mean_objectivity_pct: mean_objectivity(table.rows()).map(to_percent),
            rolling_window: window,
            rolling_min_periods: min_periods,
            series,
            rows: table.rows().to_vec(),
        }
    }
}

/// Trailing mean over the last `min(window, i + 1)` values.
///
/// Positions with fewer than `min_periods` values in the window are `None`.
/// A zero `window` is treated as 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            sum += value;
            if index >= window {
                sum -= values[index - window];
            }
            let count = (index + 1).min(window);
            (count >= min_periods).then(|| sum / count as f64)
        })
        .collect()
}

/// Arithmetic mean of `average_objectivity`, in `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_objectivity(rows: &[FeedRow]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let total: f64 = rows.iter().map(|row| row.scores.average_objectivity()).sum();
    Some(total / rows.len() as f64)
}

fn to_percent(value: f64) -> f64 {
    value * 100.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::ScoreTriple;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    fn row(minute: u32, average: f64) -> FeedRow {
        FeedRow {
            timestamp: at(minute),
            text: format!("post {minute}"),
            scores: ScoreTriple::new(average, average),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn headline_mean_is_arithmetic_mean() {
        let rows = vec![row(0, 0.2), row(1, 0.4), row(2, 0.6)];
        assert_close(mean_objectivity(&rows).expect("mean exists"), 0.4);
    }

    #[test]
    fn headline_mean_of_nothing_is_none() {
        assert_eq!(mean_objectivity(&[]), None);
    }

    #[rstest]
    #[case(3, 1)]
    #[case(100, 5)]
    #[case(4, 4)]
    fn rolling_mean_waits_for_min_periods(#[case] window: usize, #[case] min_periods: usize) {
        let values = vec![0.5; 10];
        let rolled = rolling_mean(&values, window, min_periods);

        assert!(rolled[..min_periods - 1].iter().all(Option::is_none));
        assert!(rolled[min_periods - 1..].iter().all(Option::is_some));
    }

    #[test]
    fn rolling_mean_uses_a_trailing_window() {
        let rolled = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, 1);
        let expected = [1.0, 1.5, 2.0, 3.0, 4.0];
        for (actual, expected) in rolled.into_iter().zip(expected) {
            assert_close(actual.expect("value present"), expected);
        }
    }

    #[test]
    fn report_sorts_series_but_keeps_row_order() {
        let table = FeedTable::new(
            "AP",
            3,
            at(30),
            vec![row(2, 0.6), row(0, 0.2), row(1, 0.4)],
        );

        let report = ObjectivityReport::build(NewsSource::new("The Associated Press", "AP"), &table, 2, 1);

        let series_times: Vec<_> = report.series.iter().map(|point| point.timestamp).collect();
        assert_eq!(series_times, vec![at(0), at(1), at(2)]);
        let row_times: Vec<_> = report.rows.iter().map(|row| row.timestamp).collect();
        assert_eq!(row_times, vec![at(2), at(0), at(1)]);

        assert_close(report.mean_objectivity_pct.expect("mean exists"), 40.0);
        assert_close(report.series[0].rolling_objectivity_pct.expect("point"), 20.0);
        assert_close(report.series[2].rolling_objectivity_pct.expect("point"), 50.0);
        assert_eq!(report.post_count, 3);
    }

    #[test]
    fn empty_table_builds_an_empty_report() {
        let table = FeedTable::new("AP", 10, at(0), Vec::new());
        let report = ObjectivityReport::build(NewsSource::new("AP", "AP"), &table, 100, 5);

        assert!(report.series.is_empty());
        assert_eq!(report.mean_objectivity_pct, None);
    }
}
