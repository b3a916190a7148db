use chrono::{DateTime, Utc};
use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort};
use pallet_core::{ClientId, CoreResult, FulfillmentState, HoldReason, Order};
use pallet_shared::Masked;
use serde::Serialize;
use uuid::Uuid;

use crate::rates;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub state: FulfillmentState,
    pub hold_reason: Option<HoldReason>,
    pub hold_placed_at: Option<DateTime<Utc>>,
    pub hours_on_hold: Option<f64>,
    /// The tenant can clear this hold without warehouse involvement.
    pub can_client_resolve: bool,
    pub customer_name: Option<Masked<String>>,
    pub customer_email: Option<Masked<String>>,
    pub item_count: i64,
    pub order_date: Option<DateTime<Utc>>,
}

impl HeldOrder {
    pub fn from_order(order: Order, now: DateTime<Utc>) -> Self {
        let hours_on_hold = order
            .hold_placed_at
            .map(|placed| rates::ratio((now - placed).num_seconds().max(0) as f64, 3600.0, 10.0));
        let item_count = order.item_count();
        Self {
            order_id: order.id,
            order_number: order.order_number,
            state: order.fulfillment_state,
            can_client_resolve: order.hold_reason.map(|r| r.client_resolvable()).unwrap_or(false),
            hold_reason: order.hold_reason,
            hold_placed_at: order.hold_placed_at,
            hours_on_hold,
            customer_name: order.customer_name.map(Masked::new),
            customer_email: order.customer_email.map(Masked::new),
            item_count,
            order_date: order.order_date,
        }
    }
}

/// Held, non-cancelled orders, newest hold first.
pub async fn list(store: &dyn FulfillmentStore, client_id: &ClientId, now: DateTime<Utc>) -> CoreResult<Vec<HeldOrder>> {
    let orders = store
        .find_orders(client_id, &OrderFilter::new().on_hold(true), OrderSort::HoldPlacedAtDesc, None)
        .await?;
    Ok(orders.into_iter().map(|order| HeldOrder::from_order(order, now)).collect())
}
