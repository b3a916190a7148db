use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort};
use pallet_core::{ClientId, CoreResult, FulfillmentState, SlaTargets};
use serde::Serialize;

use crate::rates;
use crate::time_window::TimeWindow;

const IN_FLIGHT_STATES: [FulfillmentState; 5] = [
    FulfillmentState::ReadyForPicking,
    FulfillmentState::Picking,
    FulfillmentState::Picked,
    FulfillmentState::Packing,
    FulfillmentState::Packed,
];

/// Headline numbers for the fulfillment dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentStats {
    pub pending_fulfillment: i64,
    pub in_progress: i64,
    pub on_hold: i64,
    pub shipped_today: i64,
    pub shipped_this_week: i64,
    pub shipped_last_week: i64,
    /// Week-over-week change in shipments, whole percent
    pub shipped_trend: i64,
    pub delivered: i64,
    pub avg_fulfillment_time_hours: f64,
    pub on_time_rate: i64,
}

/// Builds the stats snapshot. Every read is issued concurrently; any store
/// failure fails the whole snapshot.
pub async fn collect(
    store: &dyn FulfillmentStore,
    client_id: &ClientId,
    window: &TimeWindow,
    sla: &SlaTargets,
) -> CoreResult<FulfillmentStats> {
    let this_week = window.trailing_days(7);
    let last_week = TimeWindow::previous_period(&this_week);
    let last_30_days = window.trailing_days(30);

    let pending = OrderFilter::new()
        .states([FulfillmentState::Pending, FulfillmentState::AwaitingStock])
        .on_hold(false);
    let in_progress = OrderFilter::new().states(IN_FLIGHT_STATES);
    let on_hold = OrderFilter::new().on_hold(true);
    let shipped_today = OrderFilter::new().shipped_within(window.today());
    let shipped_this_week = OrderFilter::new().shipped_within(this_week);
    let shipped_last_week = OrderFilter::new().shipped_within(last_week);
    let delivered = OrderFilter::new().state(FulfillmentState::Delivered);
    let recently_shipped = OrderFilter::new().shipped_within(last_30_days);
    let recently_placed = OrderFilter::new().ordered_within(last_30_days).has_shipped_at(true);

    let (
        pending,
        in_progress,
        on_hold,
        shipped_today,
        shipped_this_week,
        shipped_last_week,
        delivered,
        recently_shipped,
        recently_placed,
    ) = tokio::try_join!(
        store.count_orders(client_id, &pending),
        store.count_orders(client_id, &in_progress),
        store.count_orders(client_id, &on_hold),
        store.count_orders(client_id, &shipped_today),
        store.count_orders(client_id, &shipped_this_week),
        store.count_orders(client_id, &shipped_last_week),
        store.count_orders(client_id, &delivered),
        store.find_orders(client_id, &recently_shipped, OrderSort::ShippedAtDesc, None),
        store.find_orders(client_id, &recently_placed, OrderSort::OrderDateDesc, None),
    )?;

    let fulfillment_hours: Vec<f64> = recently_shipped
        .iter()
        .filter_map(|order| order.fulfillment_hours())
        .collect();

    // On time = shipped within the SLA shipping-time target of being placed.
    let placed_hours: Vec<f64> = recently_placed
        .iter()
        .filter_map(|order| order.fulfillment_hours())
        .collect();
    let on_time = placed_hours
        .iter()
        .filter(|hours| **hours <= sla.shipping_hours)
        .count();

    let stats = FulfillmentStats {
        pending_fulfillment: pending,
        in_progress,
        on_hold,
        shipped_today,
        shipped_this_week,
        shipped_last_week,
        shipped_trend: rates::trend_percent(shipped_this_week, shipped_last_week),
        delivered,
        avg_fulfillment_time_hours: rates::average_hours(&fulfillment_hours),
        on_time_rate: rates::on_time_rate(placed_hours.len() as i64, on_time as i64),
    };

    tracing::debug!(client_id = %client_id, ?stats, "Computed fulfillment stats");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{client, now, order, shipped_order};
    use chrono::Duration;
    use pallet_store::MemoryStore;

    #[tokio::test]
    async fn test_empty_tenant_defaults() {
        let store = MemoryStore::new();
        let stats = collect(&store, &client(), &TimeWindow::utc(now()), &SlaTargets::default())
            .await
            .unwrap();

        assert_eq!(stats.on_time_rate, 100);
        assert_eq!(stats.avg_fulfillment_time_hours, 0.0);
        assert_eq!(stats.shipped_trend, 0);
        assert_eq!(stats.pending_fulfillment, 0);
    }

    #[tokio::test]
    async fn test_week_over_week_trend() {
        let store = MemoryStore::new();
        for n in 0..12 {
            let shipped = now() - Duration::days(1) - Duration::minutes(n);
            store.insert_order(shipped_order(shipped - Duration::hours(10), shipped)).await;
        }
        for n in 0..10 {
            let shipped = now() - Duration::days(9) - Duration::minutes(n);
            store.insert_order(shipped_order(shipped - Duration::hours(10), shipped)).await;
        }

        let stats = collect(&store, &client(), &TimeWindow::utc(now()), &SlaTargets::default())
            .await
            .unwrap();

        assert_eq!(stats.shipped_this_week, 12);
        assert_eq!(stats.shipped_last_week, 10);
        assert_eq!(stats.shipped_trend, 20);
        assert_eq!(stats.avg_fulfillment_time_hours, 10.0);
    }

    #[tokio::test]
    async fn test_pipeline_counts_and_holds() {
        let store = MemoryStore::new();
        store.insert_order(order(FulfillmentState::Pending)).await;
        store.insert_order(order(FulfillmentState::AwaitingStock)).await;
        let mut held = order(FulfillmentState::Pending);
        held.is_on_hold = true;
        store.insert_order(held).await;
        store.insert_order(order(FulfillmentState::Picking)).await;
        store.insert_order(order(FulfillmentState::Packed)).await;
        store.insert_order(order(FulfillmentState::Delivered)).await;
        let mut cancelled = order(FulfillmentState::Pending);
        cancelled.is_cancelled = true;
        store.insert_order(cancelled).await;

        let stats = collect(&store, &client(), &TimeWindow::utc(now()), &SlaTargets::default())
            .await
            .unwrap();

        assert_eq!(stats.pending_fulfillment, 2);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.on_hold, 1);
        assert_eq!(stats.delivered, 1);
    }

    #[tokio::test]
    async fn test_on_time_uses_shipping_target() {
        let store = MemoryStore::new();
        let placed = now() - Duration::days(5);
        store.insert_order(shipped_order(placed, placed + Duration::hours(20))).await;
        store.insert_order(shipped_order(placed, placed + Duration::hours(47))).await;
        store.insert_order(shipped_order(placed, placed + Duration::hours(60))).await;
        store.insert_order(shipped_order(placed, placed + Duration::hours(72))).await;

        let stats = collect(&store, &client(), &TimeWindow::utc(now()), &SlaTargets::default())
            .await
            .unwrap();

        assert_eq!(stats.on_time_rate, 50);
    }

    #[tokio::test]
    async fn test_shipped_today_respects_midnight() {
        let store = MemoryStore::new();
        let today_start = TimeWindow::utc(now()).today_start();
        store.insert_order(shipped_order(today_start - Duration::hours(5), today_start + Duration::hours(1))).await;
        store.insert_order(shipped_order(today_start - Duration::hours(5), today_start - Duration::minutes(1))).await;

        let stats = collect(&store, &client(), &TimeWindow::utc(now()), &SlaTargets::default())
            .await
            .unwrap();

        assert_eq!(stats.shipped_today, 1);
        assert_eq!(stats.shipped_this_week, 2);
    }
}
