use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// Targets each SLA metric is classified against. Configuration, not learned.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct SlaTargets {
    #[serde(default = "default_fulfillment_hours")]
    pub fulfillment_hours: f64,
    #[serde(default = "default_shipping_hours")]
    pub shipping_hours: f64,
    #[serde(default = "default_on_time_rate")]
    pub on_time_rate: f64,
}

impl Default for SlaTargets {
    fn default() -> Self {
        Self {
            fulfillment_hours: default_fulfillment_hours(),
            shipping_hours: default_shipping_hours(),
            on_time_rate: default_on_time_rate(),
        }
    }
}

fn default_fulfillment_hours() -> f64 { 24.0 }
fn default_shipping_hours() -> f64 { 48.0 }
fn default_on_time_rate() -> f64 { 95.0 }

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalyticsSettings {
    #[serde(default)]
    pub sla: SlaTargets,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    #[serde(default = "default_sales_lookback_days")]
    pub sales_lookback_days: i64,
    #[serde(default = "default_sla_lookback_days")]
    pub sla_lookback_days: i64,
    #[serde(default = "default_carrier_lookback_days")]
    pub carrier_lookback_days: i64,
    #[serde(default = "default_carrier_on_time_days")]
    pub carrier_on_time_days: f64,
    #[serde(default = "default_timeline_log_limit")]
    pub timeline_log_limit: i64,
    /// Fixed UTC offset for reporting days. Takes precedence over `timezone`.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// IANA zone for reporting days, e.g. `America/New_York`. Unset means the host's local zone.
    #[serde(default)]
    pub timezone: Option<Tz>,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            sla: SlaTargets::default(),
            low_stock_threshold: default_low_stock_threshold(),
            sales_lookback_days: default_sales_lookback_days(),
            sla_lookback_days: default_sla_lookback_days(),
            carrier_lookback_days: default_carrier_lookback_days(),
            carrier_on_time_days: default_carrier_on_time_days(),
            timeline_log_limit: default_timeline_log_limit(),
            utc_offset_minutes: None,
            timezone: None,
        }
    }
}

impl AnalyticsSettings {
    /// Zone whose wall-clock midnights delimit reporting days.
    pub fn reporting_zone(&self) -> ReportingZone {
        if let Some(offset) = self.utc_offset_minutes.and_then(|minutes| FixedOffset::east_opt(minutes * 60)) {
            return ReportingZone::Fixed(offset);
        }
        match self.timezone {
            Some(tz) => ReportingZone::Named(tz),
            None => ReportingZone::Local,
        }
    }
}

/// Where "midnight" is. The UTC offset is resolved per date, so days that
/// straddle a DST change still start at wall-clock midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportingZone {
    Fixed(FixedOffset),
    Named(Tz),
    Local,
}

impl ReportingZone {
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            ReportingZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
            ReportingZone::Named(tz) => instant.with_timezone(tz).date_naive(),
            ReportingZone::Local => instant.with_timezone(&Local).date_naive(),
        }
    }

    /// The instant `date` begins in this zone.
    pub fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        match self {
            ReportingZone::Fixed(offset) => start_of_day(offset, date),
            ReportingZone::Named(tz) => start_of_day(tz, date),
            ReportingZone::Local => start_of_day(&Local, date),
        }
    }
}

fn start_of_day<Z: TimeZone>(zone: &Z, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // A DST jump can skip midnight; the day then starts at the first valid hour.
    (0..=3)
        .find_map(|hours| zone.from_local_datetime(&(midnight + Duration::hours(hours))).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

fn default_low_stock_threshold() -> i32 { 10 }
fn default_sales_lookback_days() -> i64 { 30 }
fn default_sla_lookback_days() -> i64 { 30 }
fn default_carrier_lookback_days() -> i64 { 90 }
fn default_carrier_on_time_days() -> f64 { 5.0 }
fn default_timeline_log_limit() -> i64 { 50 }
