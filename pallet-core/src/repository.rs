use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{FulfillmentState, Order, OrderSyncLog, Product};
use crate::tenant::ClientId;
use crate::StoreResult;

/// Half-open instant range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Predicate over orders, applied by every store adapter.
///
/// `matches` is the reference semantics; SQL adapters must agree with it.
/// Cancelled orders are excluded unless `include_cancelled` is set.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub states: Option<Vec<FulfillmentState>>,
    pub on_hold: Option<bool>,
    pub include_cancelled: bool,
    pub shipped_within: Option<TimeRange>,
    pub ordered_within: Option<TimeRange>,
    pub has_shipped_at: Option<bool>,
    pub has_carrier: Option<bool>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(mut self, states: impl IntoIterator<Item = FulfillmentState>) -> Self {
        self.states = Some(states.into_iter().collect());
        self
    }

    pub fn state(self, state: FulfillmentState) -> Self {
        self.states([state])
    }

    pub fn on_hold(mut self, on_hold: bool) -> Self {
        self.on_hold = Some(on_hold);
        self
    }

    pub fn shipped_within(mut self, range: TimeRange) -> Self {
        self.shipped_within = Some(range);
        self
    }

    pub fn ordered_within(mut self, range: TimeRange) -> Self {
        self.ordered_within = Some(range);
        self
    }

    pub fn has_shipped_at(mut self, present: bool) -> Self {
        self.has_shipped_at = Some(present);
        self
    }

    pub fn has_carrier(mut self, present: bool) -> Self {
        self.has_carrier = Some(present);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        if order.is_cancelled && !self.include_cancelled {
            return false;
        }
        if let Some(states) = &self.states {
            if !states.contains(&order.fulfillment_state) {
                return false;
            }
        }
        if let Some(on_hold) = self.on_hold {
            if order.is_on_hold != on_hold {
                return false;
            }
        }
        if let Some(range) = &self.shipped_within {
            match order.shipped_at {
                Some(at) if range.contains(at) => {}
                _ => return false,
            }
        }
        if let Some(range) = &self.ordered_within {
            match order.order_date {
                Some(at) if range.contains(at) => {}
                _ => return false,
            }
        }
        if let Some(present) = self.has_shipped_at {
            if order.shipped_at.is_some() != present {
                return false;
            }
        }
        if let Some(present) = self.has_carrier {
            if order.carrier.is_some() != present {
                return false;
            }
        }
        true
    }
}

/// Result ordering for order listings. Null sort keys go last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    OrderDateDesc,
    ShippedAtDesc,
    HoldPlacedAtDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

/// Read access to the upstream order/product/sync-log store.
///
/// The tenant id is always the first argument. `recent_sync_logs` is the one
/// exception and must only be called for an order already returned by
/// `find_order` for the same tenant.
#[async_trait]
pub trait FulfillmentStore: Send + Sync {
    async fn count_orders(&self, client_id: &ClientId, filter: &OrderFilter) -> StoreResult<i64>;

    async fn find_orders(
        &self,
        client_id: &ClientId,
        filter: &OrderFilter,
        sort: OrderSort,
        page: Option<Page>,
    ) -> StoreResult<Vec<Order>>;

    async fn find_order(&self, client_id: &ClientId, order_id: Uuid) -> StoreResult<Option<Order>>;

    /// Newest first, at most `limit` rows.
    async fn recent_sync_logs(&self, order_id: Uuid, limit: i64) -> StoreResult<Vec<OrderSyncLog>>;

    /// Active products with `available <= threshold`, most depleted first.
    async fn low_stock_products(&self, client_id: &ClientId, threshold: i32) -> StoreResult<Vec<Product>>;

    /// Units of a product on non-cancelled orders placed within `range`.
    async fn units_sold(&self, client_id: &ClientId, product_id: Uuid, range: &TimeRange) -> StoreResult<i64>;
}
