use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort, Page, TimeRange};
use pallet_core::{ClientId, FulfillmentState, HoldReason, LineItem, Order, OrderSyncLog, Product, StoreError, StoreResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

/// Read-only adapter over the warehouse's Postgres schema (see `schema.sql`).
pub struct PgFulfillmentStore {
    pool: PgPool,
}

impl PgFulfillmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ORDER_COLUMNS: &str = "id, client_id, order_number, order_date, fulfillment_state, \
    is_on_hold, hold_reason, hold_placed_at, hold_released_at, is_cancelled, carrier, \
    carrier_service, tracking_number, tracking_url, customer_name, customer_email, \
    ship_to_city, ship_to_country, shipped_at, delivered_at";

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    client_id: String,
    order_number: String,
    order_date: Option<DateTime<Utc>>,
    fulfillment_state: String,
    is_on_hold: bool,
    hold_reason: Option<String>,
    hold_placed_at: Option<DateTime<Utc>>,
    hold_released_at: Option<DateTime<Utc>>,
    is_cancelled: bool,
    carrier: Option<String>,
    carrier_service: Option<String>,
    tracking_number: Option<String>,
    tracking_url: Option<String>,
    customer_name: Option<String>,
    customer_email: Option<String>,
    ship_to_city: Option<String>,
    ship_to_country: Option<String>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct LineItemRow {
    order_id: Uuid,
    product_id: Option<Uuid>,
    sku: Option<String>,
    quantity: i32,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    client_id: String,
    sku: String,
    name: String,
    available: i32,
    reserved: i32,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct SyncLogRow {
    id: Uuid,
    order_id: Uuid,
    action: String,
    origin: Option<String>,
    changed_fields: Option<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> StoreResult<Order> {
        let fulfillment_state = self
            .fulfillment_state
            .parse::<FulfillmentState>()
            .map_err(|reason| StoreError::Decode { entity: "order", reason })?;
        let client_id = ClientId::new(&self.client_id).map_err(|e| StoreError::Decode {
            entity: "order",
            reason: e.to_string(),
        })?;

        Ok(Order {
            id: self.id,
            client_id,
            order_number: self.order_number,
            order_date: self.order_date,
            fulfillment_state,
            is_on_hold: self.is_on_hold,
            hold_reason: self.hold_reason.as_deref().map(HoldReason::parse),
            hold_placed_at: self.hold_placed_at,
            hold_released_at: self.hold_released_at,
            is_cancelled: self.is_cancelled,
            carrier: self.carrier,
            carrier_service: self.carrier_service,
            tracking_number: self.tracking_number,
            tracking_url: self.tracking_url,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            ship_to_city: self.ship_to_city,
            ship_to_country: self.ship_to_country,
            shipped_at: self.shipped_at,
            delivered_at: self.delivered_at,
            items,
        })
    }
}

/// Appends the WHERE clause equivalent of `OrderFilter::matches`.
fn push_order_filter(qb: &mut QueryBuilder<'_, Postgres>, client_id: &ClientId, filter: &OrderFilter) {
    qb.push(" WHERE client_id = ").push_bind(client_id.as_str().to_owned());

    if !filter.include_cancelled {
        qb.push(" AND is_cancelled = false");
    }
    if let Some(states) = &filter.states {
        let states: Vec<String> = states.iter().map(|s| s.as_str().to_owned()).collect();
        qb.push(" AND fulfillment_state = ANY(").push_bind(states).push(")");
    }
    if let Some(on_hold) = filter.on_hold {
        qb.push(" AND is_on_hold = ").push_bind(on_hold);
    }
    if let Some(range) = &filter.shipped_within {
        qb.push(" AND shipped_at >= ").push_bind(range.start);
        qb.push(" AND shipped_at < ").push_bind(range.end);
    }
    if let Some(range) = &filter.ordered_within {
        qb.push(" AND order_date >= ").push_bind(range.start);
        qb.push(" AND order_date < ").push_bind(range.end);
    }
    push_presence(qb, "shipped_at", filter.has_shipped_at);
    push_presence(qb, "carrier", filter.has_carrier);
}

fn push_presence(qb: &mut QueryBuilder<'_, Postgres>, column: &str, present: Option<bool>) {
    match present {
        Some(true) => {
            qb.push(format!(" AND {} IS NOT NULL", column));
        }
        Some(false) => {
            qb.push(format!(" AND {} IS NULL", column));
        }
        None => {}
    }
}

fn push_order_sort(qb: &mut QueryBuilder<'_, Postgres>, sort: OrderSort) {
    let clause = match sort {
        OrderSort::OrderDateDesc => " ORDER BY order_date DESC NULLS LAST, id",
        OrderSort::ShippedAtDesc => " ORDER BY shipped_at DESC NULLS LAST, id",
        OrderSort::HoldPlacedAtDesc => " ORDER BY hold_placed_at DESC NULLS LAST, id",
    };
    qb.push(clause);
}

impl PgFulfillmentStore {
    async fn load_items(&self, order_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<LineItem>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<LineItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, sku, quantity FROM order_items WHERE order_id = ANY($1)",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("load_items", e))?;

        let mut grouped: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(LineItem {
                product_id: row.product_id,
                sku: row.sku,
                quantity: row.quantity,
            });
        }
        Ok(grouped)
    }

    async fn hydrate(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut items = self.load_items(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }
}

#[async_trait]
impl FulfillmentStore for PgFulfillmentStore {
    async fn count_orders(&self, client_id: &ClientId, filter: &OrderFilter) -> StoreResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_order_filter(&mut qb, client_id, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::backend("count_orders", e))
    }

    async fn find_orders(
        &self,
        client_id: &ClientId,
        filter: &OrderFilter,
        sort: OrderSort,
        page: Option<Page>,
    ) -> StoreResult<Vec<Order>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM orders", ORDER_COLUMNS));
        push_order_filter(&mut qb, client_id, filter);
        push_order_sort(&mut qb, sort);
        if let Some(page) = page {
            qb.push(" LIMIT ").push_bind(page.limit);
            qb.push(" OFFSET ").push_bind(page.offset);
        }

        let rows: Vec<OrderRow> = qb
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::backend("find_orders", e))?;

        self.hydrate(rows).await
    }

    async fn find_order(&self, client_id: &ClientId, order_id: Uuid) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND client_id = $2",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(client_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("find_order", e))?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn recent_sync_logs(&self, order_id: Uuid, limit: i64) -> StoreResult<Vec<OrderSyncLog>> {
        let rows: Vec<SyncLogRow> = sqlx::query_as(
            "SELECT id, order_id, action, origin, changed_fields, created_at FROM order_sync_logs \
             WHERE order_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(order_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("recent_sync_logs", e))?;

        Ok(rows
            .into_iter()
            .map(|row| OrderSyncLog {
                id: row.id,
                order_id: row.order_id,
                action: row.action,
                origin: row.origin.unwrap_or_else(|| "SYSTEM".to_string()),
                changed_fields: row.changed_fields.unwrap_or_default(),
                created_at: row.created_at,
            })
            .collect())
    }

    async fn low_stock_products(&self, client_id: &ClientId, threshold: i32) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, client_id, sku, name, available, reserved, is_active FROM products \
             WHERE client_id = $1 AND is_active = true AND (available <= $2 OR available < 0) \
             ORDER BY available ASC, id",
        )
        .bind(client_id.as_str())
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("low_stock_products", e))?;

        rows.into_iter()
            .map(|row| {
                let client_id = ClientId::new(&row.client_id).map_err(|e| StoreError::Decode {
                    entity: "product",
                    reason: e.to_string(),
                })?;
                Ok(Product {
                    id: row.id,
                    client_id,
                    sku: row.sku,
                    name: row.name,
                    available: row.available,
                    reserved: row.reserved,
                    is_active: row.is_active,
                })
            })
            .collect()
    }

    async fn units_sold(&self, client_id: &ClientId, product_id: Uuid, range: &TimeRange) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT FROM order_items oi \
             JOIN orders o ON o.id = oi.order_id \
             WHERE o.client_id = $1 AND oi.product_id = $2 AND o.is_cancelled = false \
             AND o.order_date >= $3 AND o.order_date < $4",
        )
        .bind(client_id.as_str())
        .bind(product_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::backend("units_sold", e))
    }
}
