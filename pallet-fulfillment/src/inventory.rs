use futures_util::future::try_join_all;
use pallet_core::repository::FulfillmentStore;
use pallet_core::{ClientId, CoreResult, Product};
use serde::Serialize;
use uuid::Uuid;

use crate::rates;
use crate::time_window::TimeWindow;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Oversold,
    OutOfStock,
    LowStock,
}

impl AlertType {
    pub fn for_available(available: i32) -> Self {
        if available < 0 {
            AlertType::Oversold
        } else if available == 0 {
            AlertType::OutOfStock
        } else {
            AlertType::LowStock
        }
    }

    /// Lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            AlertType::Oversold => 0,
            AlertType::OutOfStock => 1,
            AlertType::LowStock => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAlert {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub available: i32,
    pub reserved: i32,
    pub alert_type: AlertType,
    pub units_sold: i64,
    pub daily_sales_rate: f64,
    pub days_until_stockout: Option<i64>,
}

/// Whole days of stock left at the current sales velocity.
///
/// `None` when there is nothing left to sell or nothing is selling.
pub fn days_until_stockout(available: i32, daily_sales_rate: f64) -> Option<i64> {
    if available > 0 && daily_sales_rate > 0.0 && daily_sales_rate.is_finite() {
        Some((f64::from(available) / daily_sales_rate).floor() as i64)
    } else {
        None
    }
}

pub fn build_alert(product: &Product, units_sold: i64, lookback_days: i64) -> InventoryAlert {
    let units = units_sold.max(0) as f64;
    let daily_sales_rate = if lookback_days > 0 {
        units / lookback_days as f64
    } else {
        0.0
    };

    InventoryAlert {
        product_id: product.id,
        sku: product.sku.clone(),
        name: product.name.clone(),
        available: product.available,
        reserved: product.reserved,
        alert_type: AlertType::for_available(product.available),
        units_sold,
        daily_sales_rate: rates::ratio(units, lookback_days.max(0) as f64, 100.0),
        days_until_stockout: days_until_stockout(product.available, daily_sales_rate),
    }
}

/// Orders alerts by severity, keeping store order within a tier.
pub fn prioritize(alerts: &mut [InventoryAlert]) {
    alerts.sort_by_key(|alert| alert.alert_type.priority());
}

pub async fn scan(
    store: &dyn FulfillmentStore,
    client_id: &ClientId,
    window: &TimeWindow,
    threshold: i32,
    lookback_days: i64,
) -> CoreResult<Vec<InventoryAlert>> {
    let products = store.low_stock_products(client_id, threshold).await?;
    let sales_window = window.trailing_days(lookback_days);

    let sold = try_join_all(
        products
            .iter()
            .map(|product| store.units_sold(client_id, product.id, &sales_window)),
    )
    .await?;

    let mut alerts: Vec<InventoryAlert> = products
        .iter()
        .zip(sold)
        .map(|(product, units)| build_alert(product, units, lookback_days))
        .collect();
    prioritize(&mut alerts);

    tracing::debug!(client_id = %client_id, alerts = alerts.len(), "Computed inventory alerts");
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{client, now, order, product};
    use chrono::Duration;
    use pallet_core::{FulfillmentState, LineItem};
    use pallet_store::MemoryStore;

    #[test]
    fn test_projection_example() {
        let alert = build_alert(&product("TEE-M", 5), 60, 30);
        assert_eq!(alert.daily_sales_rate, 2.0);
        assert_eq!(alert.days_until_stockout, Some(2));
        assert_eq!(alert.alert_type, AlertType::LowStock);
    }

    #[test]
    fn test_no_projection_without_stock_or_velocity() {
        assert_eq!(days_until_stockout(0, 3.0), None);
        assert_eq!(days_until_stockout(-4, 3.0), None);
        assert_eq!(days_until_stockout(8, 0.0), None);
        assert_eq!(days_until_stockout(1, 0.1), Some(10));
    }

    #[test]
    fn test_classification() {
        assert_eq!(AlertType::for_available(-1), AlertType::Oversold);
        assert_eq!(AlertType::for_available(0), AlertType::OutOfStock);
        assert_eq!(AlertType::for_available(10), AlertType::LowStock);
    }

    #[test]
    fn test_prioritize_is_stable_within_tier() {
        let mut alerts = vec![
            build_alert(&product("A", 3), 0, 30),
            build_alert(&product("B", 0), 0, 30),
            build_alert(&product("C", 7), 0, 30),
            build_alert(&product("D", -2), 0, 30),
        ];
        prioritize(&mut alerts);
        let skus: Vec<&str> = alerts.iter().map(|a| a.sku.as_str()).collect();
        assert_eq!(skus, vec!["D", "B", "A", "C"]);
    }

    #[tokio::test]
    async fn test_scan_uses_trailing_sales() {
        let store = MemoryStore::new();
        let tee = product("TEE-M", 5);
        let mug = product("MUG", -3);
        let plenty = product("SOCK", 50);
        let tee_id = tee.id;
        for p in [tee, mug, plenty] {
            store.insert_product(p).await;
        }

        let mut recent = order(FulfillmentState::Delivered);
        recent.order_date = Some(now() - Duration::days(3));
        recent.items = vec![LineItem { product_id: Some(tee_id), sku: Some("TEE-M".into()), quantity: 60 }];
        store.insert_order(recent).await;

        let alerts = scan(&store, &client(), &TimeWindow::utc(now()), 10, 30).await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].sku, "MUG");
        assert_eq!(alerts[0].alert_type, AlertType::Oversold);
        assert_eq!(alerts[0].days_until_stockout, None);
        assert_eq!(alerts[1].sku, "TEE-M");
        assert_eq!(alerts[1].units_sold, 60);
        assert_eq!(alerts[1].days_until_stockout, Some(2));
    }
}
