use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort};
use pallet_core::{ClientId, CoreResult, Order, SlaTargets};
use serde::Serialize;

use crate::rates;
use crate::time_window::TimeWindow;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlaStatus {
    OnTrack,
    AtRisk,
    Breached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// Tolerance before a "lower is better" metric is breached, as a multiple of target.
const AT_RISK_MULTIPLIER: f64 = 1.5;
/// Tolerance before a "higher is better" metric is breached, in percentage points.
const AT_RISK_POINTS: f64 = 5.0;

pub fn classify(value: f64, target: f64, direction: Direction) -> SlaStatus {
    match direction {
        Direction::LowerIsBetter if value <= target => SlaStatus::OnTrack,
        Direction::LowerIsBetter if value <= target * AT_RISK_MULTIPLIER => SlaStatus::AtRisk,
        Direction::HigherIsBetter if value >= target => SlaStatus::OnTrack,
        Direction::HigherIsBetter if value >= target - AT_RISK_POINTS => SlaStatus::AtRisk,
        _ => SlaStatus::Breached,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlaMetric {
    pub metric: &'static str,
    pub label: &'static str,
    pub current: f64,
    pub target: Option<f64>,
    pub unit: &'static str,
    pub status: SlaStatus,
}

impl SlaMetric {
    fn informational(metric: &'static str, label: &'static str, count: i64) -> Self {
        Self {
            metric,
            label,
            current: count as f64,
            target: None,
            unit: "orders",
            status: SlaStatus::OnTrack,
        }
    }
}

/// Scores shipped orders against the SLA targets.
///
/// `processed` is every non-cancelled order placed in the window; `shipped`
/// holds those that also have a ship time.
pub fn evaluate(processed: i64, shipped: &[Order], targets: &SlaTargets) -> Vec<SlaMetric> {
    let hours: Vec<f64> = shipped.iter().filter_map(|order| order.fulfillment_hours()).collect();

    // The on-time cutoff is the shipping-time target, the promise made to the
    // end customer, not the tighter internal fulfillment target.
    let on_time = hours.iter().filter(|h| **h <= targets.shipping_hours).count() as i64;

    let avg_fulfillment = rates::average_hours(&hours);
    let on_time_rate = rates::on_time_rate(hours.len() as i64, on_time) as f64;

    vec![
        SlaMetric {
            metric: "avg_fulfillment_time",
            label: "Average Fulfillment Time",
            current: avg_fulfillment,
            target: Some(targets.fulfillment_hours),
            unit: "hours",
            status: classify(avg_fulfillment, targets.fulfillment_hours, Direction::LowerIsBetter),
        },
        SlaMetric {
            metric: "on_time_shipping_rate",
            label: "On-Time Shipping Rate",
            current: on_time_rate,
            target: Some(targets.on_time_rate),
            unit: "%",
            status: classify(on_time_rate, targets.on_time_rate, Direction::HigherIsBetter),
        },
        SlaMetric::informational("orders_processed", "Total Orders Processed", processed),
        SlaMetric::informational("orders_shipped", "Total Orders Shipped", hours.len() as i64),
    ]
}

pub async fn status(
    store: &dyn FulfillmentStore,
    client_id: &ClientId,
    window: &TimeWindow,
    lookback_days: i64,
    targets: &SlaTargets,
) -> CoreResult<Vec<SlaMetric>> {
    let placed = OrderFilter::new().ordered_within(window.trailing_days(lookback_days));
    let shipped = placed.clone().has_shipped_at(true);

    let (processed, shipped) = tokio::try_join!(
        store.count_orders(client_id, &placed),
        store.find_orders(client_id, &shipped, OrderSort::OrderDateDesc, None),
    )?;

    Ok(evaluate(processed, &shipped, targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{client, now, order, shipped_order};
    use chrono::Duration;
    use pallet_core::FulfillmentState;
    use pallet_store::MemoryStore;

    #[test]
    fn test_lower_is_better_bands() {
        assert_eq!(classify(20.0, 24.0, Direction::LowerIsBetter), SlaStatus::OnTrack);
        assert_eq!(classify(24.0, 24.0, Direction::LowerIsBetter), SlaStatus::OnTrack);
        assert_eq!(classify(30.0, 24.0, Direction::LowerIsBetter), SlaStatus::AtRisk);
        assert_eq!(classify(36.0, 24.0, Direction::LowerIsBetter), SlaStatus::AtRisk);
        assert_eq!(classify(40.0, 24.0, Direction::LowerIsBetter), SlaStatus::Breached);
    }

    #[test]
    fn test_higher_is_better_bands() {
        assert_eq!(classify(97.0, 95.0, Direction::HigherIsBetter), SlaStatus::OnTrack);
        assert_eq!(classify(90.0, 95.0, Direction::HigherIsBetter), SlaStatus::AtRisk);
        assert_eq!(classify(89.0, 95.0, Direction::HigherIsBetter), SlaStatus::Breached);
    }

    #[test]
    fn test_empty_window_is_on_track() {
        let rows = evaluate(0, &[], &SlaTargets::default());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].current, 0.0);
        assert_eq!(rows[0].status, SlaStatus::OnTrack);
        assert_eq!(rows[1].current, 100.0);
        assert_eq!(rows[1].status, SlaStatus::OnTrack);
        assert!(rows[2..].iter().all(|r| r.target.is_none() && r.status == SlaStatus::OnTrack));
    }

    #[test]
    fn test_row_serialization() {
        let rows = evaluate(0, &[], &SlaTargets::default());
        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["metric"], "on_time_shipping_rate");
        assert_eq!(json["status"], "ON_TRACK");
        assert_eq!(json["target"], 95.0);
        assert!(serde_json::to_value(&rows[2]).unwrap()["target"].is_null());
    }

    #[test]
    fn test_on_time_cutoff_is_shipping_target() {
        let placed = now() - Duration::days(3);
        // 30h misses the 24h fulfillment target but is inside the 48h shipping target
        let shipped = vec![
            shipped_order(placed, placed + Duration::hours(30)),
            shipped_order(placed, placed + Duration::hours(30)),
        ];
        let rows = evaluate(2, &shipped, &SlaTargets::default());
        assert_eq!(rows[0].current, 30.0);
        assert_eq!(rows[0].status, SlaStatus::AtRisk);
        assert_eq!(rows[1].current, 100.0);
        assert_eq!(rows[1].status, SlaStatus::OnTrack);
    }

    #[tokio::test]
    async fn test_status_counts_processed_and_shipped() {
        let store = MemoryStore::new();
        let placed = now() - Duration::days(2);
        store.insert_order(shipped_order(placed, placed + Duration::hours(40))).await;
        store.insert_order(shipped_order(placed, placed + Duration::hours(40))).await;
        let mut waiting = order(FulfillmentState::Picking);
        waiting.order_date = Some(placed);
        store.insert_order(waiting).await;
        let mut stale = shipped_order(now() - Duration::days(45), now() - Duration::days(44));
        stale.carrier = Some("UPS".to_string());
        store.insert_order(stale).await;

        let rows = status(&store, &client(), &TimeWindow::utc(now()), 30, &SlaTargets::default())
            .await
            .unwrap();

        assert_eq!(rows[0].current, 40.0);
        assert_eq!(rows[0].status, SlaStatus::Breached);
        assert_eq!(rows[2].current, 3.0);
        assert_eq!(rows[3].current, 2.0);
    }
}
