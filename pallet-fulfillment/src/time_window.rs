use chrono::{DateTime, Duration, NaiveDate, Offset, Utc};
use pallet_core::{ReportingZone, TimeRange};

/// Anchor instants derived from a single reference "now".
///
/// All ranges are half-open. "Today" starts at wall-clock midnight in the
/// reporting zone, not at UTC midnight.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    now: DateTime<Utc>,
    zone: ReportingZone,
}

impl TimeWindow {
    pub fn new(now: DateTime<Utc>, zone: ReportingZone) -> Self {
        Self { now, zone }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, ReportingZone::Fixed(Utc.fix()))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn today_start(&self) -> DateTime<Utc> {
        self.zone.midnight(self.local_date(self.now))
    }

    /// `[today_start, now)`
    pub fn today(&self) -> TimeRange {
        TimeRange::new(self.today_start(), self.now)
    }

    pub fn days_ago(&self, days: i64) -> DateTime<Utc> {
        self.now - Duration::days(days)
    }

    /// `[now - days, now)`
    pub fn trailing_days(&self, days: i64) -> TimeRange {
        TimeRange::new(self.days_ago(days), self.now)
    }

    /// The equal-length range ending where `range` starts.
    pub fn previous_period(range: &TimeRange) -> TimeRange {
        TimeRange::new(range.start - range.duration(), range.start)
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.zone.local_date(instant)
    }

    /// The local calendar day `date` as a UTC range. 23 or 25 hours long across a DST change.
    pub fn day_range(&self, date: NaiveDate) -> TimeRange {
        let next = date.succ_opt().unwrap_or(date);
        TimeRange::new(self.zone.midnight(date), self.zone.midnight(next))
    }

    /// The last `days` local calendar dates, oldest first, ending today.
    pub fn trailing_dates(&self, days: i64) -> Vec<NaiveDate> {
        let today = self.local_date(self.now);
        (0..days.max(0))
            .rev()
            .map(|back| today - Duration::days(back))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_today_start_utc() {
        let window = TimeWindow::utc(at("2024-03-10T15:42:00Z"));
        assert_eq!(window.today_start(), at("2024-03-10T00:00:00Z"));
    }

    #[test]
    fn test_today_start_uses_wall_clock() {
        // 02:30 UTC is still the previous evening in New York (UTC-5)
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let window = TimeWindow::new(at("2024-03-10T02:30:00Z"), ReportingZone::Fixed(offset));
        assert_eq!(window.today_start(), at("2024-03-09T05:00:00Z"));
        assert!(window.today().contains(at("2024-03-10T02:00:00Z")));
        assert!(!window.today().contains(at("2024-03-09T04:59:59Z")));
    }

    #[test]
    fn test_previous_period_is_adjacent() {
        let window = TimeWindow::utc(at("2024-03-15T12:00:00Z"));
        let this_week = window.trailing_days(7);
        let last_week = TimeWindow::previous_period(&this_week);
        assert_eq!(last_week.start, at("2024-03-01T12:00:00Z"));
        assert_eq!(last_week.end, this_week.start);
    }

    #[test]
    fn test_trailing_dates_ascending() {
        let window = TimeWindow::utc(at("2024-03-02T08:00:00Z"));
        let dates = window.trailing_dates(3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            ]
        );
        assert!(window.trailing_dates(0).is_empty());
    }

    #[test]
    fn test_day_range_in_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = TimeWindow::new(at("2024-03-10T12:00:00Z"), ReportingZone::Fixed(offset));
        let range = window.day_range(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(range.start, at("2024-03-09T22:00:00Z"));
        assert_eq!(range.end, at("2024-03-10T22:00:00Z"));
    }

    #[test]
    fn test_today_starts_at_local_midnight_on_dst_day() {
        let zone = ReportingZone::Named(chrono_tz::America::New_York);
        let window = TimeWindow::new(at("2024-03-10T15:00:00Z"), zone);
        // Clocks jumped at 07:00Z, but the day began under EST.
        assert_eq!(window.today_start(), at("2024-03-10T05:00:00Z"));
        assert!(!window.today().contains(at("2024-03-10T04:30:00Z")));
        assert!(window.today().contains(at("2024-03-10T05:00:00Z")));
    }

    #[test]
    fn test_day_range_spans_short_and_long_days() {
        let zone = ReportingZone::Named(chrono_tz::America::New_York);
        let window = TimeWindow::new(at("2024-11-04T12:00:00Z"), zone);
        let spring = window.day_range(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(spring.duration(), Duration::hours(23));
        let fall = window.day_range(NaiveDate::from_ymd_opt(2024, 11, 3).unwrap());
        assert_eq!(fall.start, at("2024-11-03T04:00:00Z"));
        assert_eq!(fall.end, at("2024-11-04T05:00:00Z"));
    }
}
