use chrono::{DateTime, Utc};
use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort};
use pallet_core::{ClientId, CoreResult, Order};
use pallet_shared::CarrierDirectory;
use serde::Serialize;
use std::collections::HashMap;

use crate::rates;
use crate::time_window::TimeWindow;

const UNKNOWN_CARRIER: &str = "Unknown";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarrierPerformance {
    pub carrier: String,
    pub total_shipments: i64,
    pub delivered_shipments: i64,
    pub avg_transit_days: f64,
    /// Share of delivered shipments in transit at most the on-time limit, whole percent
    pub on_time_rate: i64,
    pub last_used: Option<DateTime<Utc>>,
    pub tracking_supported: bool,
}

#[derive(Default)]
struct CarrierGroup {
    shipments: i64,
    transit_days: Vec<f64>,
    last_used: Option<DateTime<Utc>>,
}

/// Groups shipments by raw carrier name and scores each carrier.
///
/// Rows come back busiest carrier first; ties keep first-seen order.
pub fn summarize(orders: &[Order], on_time_days: f64) -> Vec<CarrierPerformance> {
    let mut names: Vec<String> = Vec::new();
    let mut groups: HashMap<String, CarrierGroup> = HashMap::new();

    for order in orders {
        let name = match order.carrier.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => UNKNOWN_CARRIER.to_string(),
        };
        let group = groups.entry(name.clone()).or_insert_with(|| {
            names.push(name);
            CarrierGroup::default()
        });

        group.shipments += 1;
        if let Some(days) = order.transit_days() {
            group.transit_days.push(days);
        }
        if order.shipped_at > group.last_used {
            group.last_used = order.shipped_at;
        }
    }

    let mut rows: Vec<CarrierPerformance> = names
        .into_iter()
        .filter_map(|name| groups.remove(&name).map(|group| (name, group)))
        .map(|(name, group)| {
            let delivered = group.transit_days.len() as i64;
            let on_time = group.transit_days.iter().filter(|d| **d <= on_time_days).count() as i64;
            CarrierPerformance {
                tracking_supported: CarrierDirectory::is_known(&name),
                carrier: name,
                total_shipments: group.shipments,
                delivered_shipments: delivered,
                avg_transit_days: rates::average_days(&group.transit_days),
                on_time_rate: rates::on_time_rate(delivered, on_time),
                last_used: group.last_used,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total_shipments.cmp(&a.total_shipments));
    rows
}

pub async fn analyze(
    store: &dyn FulfillmentStore,
    client_id: &ClientId,
    window: &TimeWindow,
    lookback_days: i64,
    on_time_days: f64,
) -> CoreResult<Vec<CarrierPerformance>> {
    let filter = OrderFilter::new()
        .shipped_within(window.trailing_days(lookback_days))
        .has_carrier(true);
    let orders = store
        .find_orders(client_id, &filter, OrderSort::ShippedAtDesc, None)
        .await?;

    let rows = summarize(&orders, on_time_days);
    tracing::debug!(client_id = %client_id, shipments = orders.len(), carriers = rows.len(), "Computed carrier performance");
    Ok(rows)
}
