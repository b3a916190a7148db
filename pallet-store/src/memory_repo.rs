//! In-memory store used by tests and local demos.
//!
//! Filtering goes through `OrderFilter::matches`, so this adapter is the
//! executable reference for what the SQL adapter must return.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort, Page, TimeRange};
use pallet_core::{ClientId, Order, OrderSyncLog, Product, StoreResult};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    orders: Vec<Order>,
    products: Vec<Product>,
    sync_logs: Vec<OrderSyncLog>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_order(&self, order: Order) {
        self.tables.write().await.orders.push(order);
    }

    pub async fn insert_product(&self, product: Product) {
        self.tables.write().await.products.push(product);
    }

    pub async fn insert_sync_log(&self, log: OrderSyncLog) {
        self.tables.write().await.sync_logs.push(log);
    }
}

/// Descending by an optional key, `None` last.
fn desc_nulls_last(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl FulfillmentStore for MemoryStore {
    async fn count_orders(&self, client_id: &ClientId, filter: &OrderFilter) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .orders
            .iter()
            .filter(|o| &o.client_id == client_id && filter.matches(o))
            .count();
        Ok(count as i64)
    }

    async fn find_orders(
        &self,
        client_id: &ClientId,
        filter: &OrderFilter,
        sort: OrderSort,
        page: Option<Page>,
    ) -> StoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|o| &o.client_id == client_id && filter.matches(o))
            .cloned()
            .collect();

        orders.sort_by(|a, b| match sort {
            OrderSort::OrderDateDesc => desc_nulls_last(a.order_date, b.order_date),
            OrderSort::ShippedAtDesc => desc_nulls_last(a.shipped_at, b.shipped_at),
            OrderSort::HoldPlacedAtDesc => desc_nulls_last(a.hold_placed_at, b.hold_placed_at),
        });

        if let Some(page) = page {
            let offset = page.offset.max(0) as usize;
            let limit = page.limit.max(0) as usize;
            orders = orders.into_iter().skip(offset).take(limit).collect();
        }
        Ok(orders)
    }

    async fn find_order(&self, client_id: &ClientId, order_id: Uuid) -> StoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .find(|o| o.id == order_id && &o.client_id == client_id)
            .cloned())
    }

    async fn recent_sync_logs(&self, order_id: Uuid, limit: i64) -> StoreResult<Vec<OrderSyncLog>> {
        let tables = self.tables.read().await;
        let mut logs: Vec<OrderSyncLog> = tables
            .sync_logs
            .iter()
            .filter(|log| log.order_id == order_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn low_stock_products(&self, client_id: &ClientId, threshold: i32) -> StoreResult<Vec<Product>> {
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| &p.client_id == client_id && p.is_active)
            .filter(|p| p.available <= threshold || p.available < 0)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.available);
        Ok(products)
    }

    async fn units_sold(&self, client_id: &ClientId, product_id: Uuid, range: &TimeRange) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let total = tables
            .orders
            .iter()
            .filter(|o| &o.client_id == client_id && !o.is_cancelled)
            .filter(|o| o.order_date.map(|at| range.contains(at)).unwrap_or(false))
            .flat_map(|o| o.items.iter())
            .filter(|item| item.product_id == Some(product_id))
            .map(|item| i64::from(item.quantity))
            .sum();
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pallet_core::{FulfillmentState, LineItem};

    fn acme() -> ClientId {
        ClientId::new("acme").unwrap()
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let store = MemoryStore::new();
        store.insert_order(Order::new(acme(), "1", FulfillmentState::Pending)).await;
        store
            .insert_order(Order::new(ClientId::new("globex").unwrap(), "2", FulfillmentState::Pending))
            .await;

        assert_eq!(store.count_orders(&acme(), &OrderFilter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shipped_sort_and_paging() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for (n, hours) in [(1, 5), (2, 1), (3, 3)] {
            let mut order = Order::new(acme(), n.to_string(), FulfillmentState::Shipped);
            order.shipped_at = Some(now - Duration::hours(hours));
            store.insert_order(order).await;
        }
        store.insert_order(Order::new(acme(), "4", FulfillmentState::Shipped)).await;

        let page = Page { offset: 0, limit: 3 };
        let orders = store
            .find_orders(&acme(), &OrderFilter::new(), OrderSort::ShippedAtDesc, Some(page))
            .await
            .unwrap();
        let numbers: Vec<&str> = orders.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "3", "1"]);
    }

    #[tokio::test]
    async fn test_units_sold_skips_cancelled_and_old_orders() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let product_id = Uuid::new_v4();
        let line = |quantity| LineItem { product_id: Some(product_id), sku: None, quantity };

        let mut recent = Order::new(acme(), "1", FulfillmentState::Shipped);
        recent.order_date = Some(now - Duration::days(2));
        recent.items = vec![line(4), line(1)];

        let mut cancelled = recent.clone();
        cancelled.is_cancelled = true;

        let mut old = recent.clone();
        old.order_date = Some(now - Duration::days(45));

        for order in [recent, cancelled, old] {
            store.insert_order(order).await;
        }

        let range = TimeRange::new(now - Duration::days(30), now);
        assert_eq!(store.units_sold(&acme(), product_id, &range).await.unwrap(), 5);
    }
}
