//! Calendar-week aggregation of daily download series.
//!
//! Weeks run Monday to Sunday and are labeled by their closing Sunday. Only
//! weeks with all seven days present are reported: a partial leading or
//! trailing week is dropped, and a week with a gap in the upstream data is
//! dropped rather than interpolated.

use chrono::{Datelike, Days, NaiveDate, Utc};

use crate::record::WeeklyTrend;
use crate::upstream::DailyDownloads;

const DAYS_PER_WEEK: u64 = 7;

/// Longest window [`TrendWindow::ending_before`] will build, about ten years.
pub const MAX_TREND_WEEKS: u32 = 520;

/// Inclusive date range requested from the download-series source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindow {
    /// Always a Monday.
    pub start: NaiveDate,
    /// Always a Sunday.
    pub end: NaiveDate,
}

impl TrendWindow {
    /// The `weeks` completed calendar weeks ending on the last Sunday strictly
    /// before `today`. On a Sunday the current week is still running, so the
    /// window ends on the previous Sunday.
    ///
    /// `weeks` is clamped to `1..=MAX_TREND_WEEKS`. Near the start of the
    /// calendar the window stops at the earliest representable date.
    #[must_use]
    pub fn ending_before(today: NaiveDate, weeks: u32) -> Self {
        let back_to_sunday = u64::from(today.weekday().num_days_from_monday()) + 1;
        let end = days_before(today, back_to_sunday);
        let span = DAYS_PER_WEEK * u64::from(weeks.clamp(1, MAX_TREND_WEEKS)) - 1;
        Self {
            start: days_before(end, span),
            end,
        }
    }

    /// Window relative to the current UTC date.
    #[must_use]
    pub fn current(weeks: u32) -> Self {
        Self::ending_before(Utc::now().date_naive(), weeks)
    }

    /// `start:end` as used in the download-range URL path.
    #[must_use]
    pub fn range_segment(&self) -> String {
        format!("{}:{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

fn days_before(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// Monday opening the calendar week containing `day`.
fn week_start(day: NaiveDate) -> NaiveDate {
    day - Days::new(u64::from(day.weekday().num_days_from_monday()))
}

struct Bucket {
    start: NaiveDate,
    days: u64,
    downloads: u64,
}

impl Bucket {
    fn close(self) -> Option<WeeklyTrend> {
        (self.days == DAYS_PER_WEEK).then(|| WeeklyTrend {
            week_ending: self.start + Days::new(DAYS_PER_WEEK - 1),
            downloads: self.downloads,
        })
    }
}

/// Bucket a chronologically ordered daily series into completed weeks.
///
/// A new bucket opens whenever a day falls in a different calendar week than
/// the running one, which for contiguous data is exactly "on each Monday".
#[must_use]
pub fn aggregate_weekly(series: &[DailyDownloads]) -> Vec<WeeklyTrend> {
    let mut weeks = Vec::with_capacity(series.len() / 7 + 1);
    let mut current: Option<Bucket> = None;

    for entry in series {
        let start = week_start(entry.day);
        match current.as_mut() {
            Some(bucket) if bucket.start == start => {
                bucket.days += 1;
                bucket.downloads += entry.downloads;
            }
            _ => {
                if let Some(done) = current.take().and_then(Bucket::close) {
                    weeks.push(done);
                }
                current = Some(Bucket {
                    start,
                    days: 1,
                    downloads: entry.downloads,
                });
            }
        }
    }

    if let Some(done) = current.and_then(Bucket::close) {
        weeks.push(done);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weeks(window: TrendWindow) -> u64 {
        u64::try_from((window.end - window.start).num_days() + 1).unwrap() / DAYS_PER_WEEK
    }

    /// `len` consecutive days from `first`, day `i` downloading `i + 1`.
    fn series(first: NaiveDate, len: u64) -> Vec<DailyDownloads> {
        (0..len)
            .map(|i| DailyDownloads {
                day: first + Days::new(i),
                downloads: i + 1,
            })
            .collect()
    }

    fn monday() -> NaiveDate {
        date(2026, 10, 5)
    }

    #[test]
    fn two_full_weeks_yield_two_buckets_oldest_first() {
        let weeks = aggregate_weekly(&series(monday(), 14));
        assert_eq!(
            weeks,
            vec![
                WeeklyTrend {
                    week_ending: date(2026, 10, 11),
                    downloads: (1..=7).sum(),
                },
                WeeklyTrend {
                    week_ending: date(2026, 10, 18),
                    downloads: (8..=14).sum(),
                },
            ]
        );
    }

    #[test]
    fn trailing_partial_week_is_dropped() {
        let weeks = aggregate_weekly(&series(monday(), 10));
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week_ending, date(2026, 10, 11));
    }

    #[test]
    fn leading_partial_week_is_dropped() {
        // Starts on the Sunday before `monday()`.
        let weeks = aggregate_weekly(&series(date(2026, 10, 4), 8));
        assert_eq!(
            weeks,
            vec![WeeklyTrend {
                week_ending: date(2026, 10, 11),
                downloads: (2..=8).sum(),
            }]
        );
    }

    #[test]
    fn week_with_missing_day_is_not_reported() {
        let mut days = series(monday(), 14);
        days.remove(9);
        let weeks = aggregate_weekly(&days);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week_ending, date(2026, 10, 11));
    }

    #[test]
    fn empty_series_yields_nothing() {
        assert!(aggregate_weekly(&[]).is_empty());
    }

    #[rstest]
    #[case(7)]
    #[case(14)]
    #[case(56)]
    fn aligned_series_preserves_total(#[case] len: u64) {
        let days = series(monday(), len);
        let total: u64 = days.iter().map(|d| d.downloads).sum();
        let weeks = aggregate_weekly(&days);
        assert_eq!(weeks.len() as u64, len / 7);
        assert_eq!(weeks.iter().map(|w| w.downloads).sum::<u64>(), total);
    }

    #[test]
    fn totals_exclude_only_the_discarded_tail() {
        let days = series(monday(), 17);
        let kept: u64 = days[..14].iter().map(|d| d.downloads).sum();
        let weeks = aggregate_weekly(&days);
        assert_eq!(weeks.iter().map(|w| w.downloads).sum::<u64>(), kept);
    }

    #[rstest]
    // Monday: the previous day closed a week.
    #[case(date(2026, 10, 12), date(2026, 10, 11))]
    // Wednesday.
    #[case(date(2026, 10, 14), date(2026, 10, 11))]
    // Sunday: today's week is still open.
    #[case(date(2026, 10, 18), date(2026, 10, 11))]
    fn window_ends_on_last_completed_sunday(#[case] today: NaiveDate, #[case] end: NaiveDate) {
        let window = TrendWindow::ending_before(today, 8);
        assert_eq!(window.end, end);
        assert_eq!(window.start, date(2026, 8, 17));
        assert_eq!(window.start.weekday(), chrono::Weekday::Mon);
        assert_eq!(weeks(window), 8);
    }

    #[test]
    fn window_series_aggregates_to_requested_weeks() {
        let window = TrendWindow::ending_before(date(2026, 10, 17), 8);
        let days = series(window.start, (window.end - window.start).num_days() as u64 + 1);
        let weeks = aggregate_weekly(&days);
        assert_eq!(weeks.len(), 8);
        assert_eq!(weeks.last().map(|w| w.week_ending), Some(window.end));
    }

    #[rstest]
    #[case::zero(0, 1)]
    #[case::at_limit(MAX_TREND_WEEKS, MAX_TREND_WEEKS)]
    #[case::huge(20_000_000, MAX_TREND_WEEKS)]
    #[case::max(u32::MAX, MAX_TREND_WEEKS)]
    fn window_length_is_clamped(#[case] requested: u32, #[case] expected: u32) {
        let window = TrendWindow::ending_before(date(2026, 10, 17), requested);
        assert_eq!(window.end, date(2026, 10, 11));
        assert_eq!(weeks(window), u64::from(expected));
        assert_eq!(window.start.weekday(), chrono::Weekday::Mon);
    }

    #[test]
    fn window_near_calendar_start_saturates() {
        let window = TrendWindow::ending_before(NaiveDate::MIN, 8);
        assert_eq!(window.start, NaiveDate::MIN);
        assert!(window.start <= window.end);
    }

    #[test]
    fn range_segment_format() {
        let window = TrendWindow::ending_before(date(2026, 10, 17), 1);
        assert_eq!(window.range_segment(), "2026-10-05:2026-10-11");
    }
}
