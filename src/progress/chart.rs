use crate::models::progress::ChartSeries;
use crate::models::snapshot::WINDOW_DAYS;
use chrono::{Datelike, Duration, NaiveDate};

/// Seven-point series ending at `today`, oldest first.
pub fn chart_series(days: &[u32; WINDOW_DAYS], today: NaiveDate) -> ChartSeries {
    let mut labels = [0u32; WINDOW_DAYS];
    for (i, label) in labels.iter_mut().enumerate() {
        let offset = (WINDOW_DAYS - 1 - i) as i64;
        *label = (today - Duration::days(offset)).day();
    }

    ChartSeries {
        labels,
        values: *days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_trailing_days_of_month() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let series = chart_series(&[1, 2, 3, 4, 5, 6, 7], today);

        assert_eq!(series.labels, [9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(series.values, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn labels_wrap_across_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let series = chart_series(&[0; WINDOW_DAYS], today);

        assert_eq!(series.labels, [25, 26, 27, 28, 29, 1, 2]);
    }
}
