use chrono::NaiveDate;
use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort};
use pallet_core::{ClientId, CoreResult, Order};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::time_window::TimeWindow;

pub const DEFAULT_DAYS: i64 = 7;
pub const MAX_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyShipments {
    pub date: NaiveDate,
    pub shipments: i64,
    pub items: i64,
}

pub fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS)
}

/// Buckets shipped orders into the given local dates. Dates with no
/// shipments are still reported; orders outside the dates are ignored.
pub fn bucket(window: &TimeWindow, dates: &[NaiveDate], orders: &[Order]) -> Vec<DailyShipments> {
    let mut days: BTreeMap<NaiveDate, DailyShipments> = dates
        .iter()
        .map(|date| (*date, DailyShipments { date: *date, shipments: 0, items: 0 }))
        .collect();

    for order in orders {
        let Some(shipped) = order.shipped_at else { continue };
        if let Some(day) = days.get_mut(&window.local_date(shipped)) {
            day.shipments += 1;
            day.items += order.item_count();
        }
    }

    days.into_values().collect()
}

pub async fn summary(
    store: &dyn FulfillmentStore,
    client_id: &ClientId,
    window: &TimeWindow,
    days: i64,
) -> CoreResult<Vec<DailyShipments>> {
    let dates = window.trailing_dates(days);
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Ok(Vec::new());
    };
    let range = pallet_core::TimeRange::new(window.day_range(*first).start, window.day_range(*last).end);

    let orders = store
        .find_orders(client_id, &OrderFilter::new().shipped_within(range), OrderSort::ShippedAtDesc, None)
        .await?;

    Ok(bucket(window, &dates, &orders))
}
