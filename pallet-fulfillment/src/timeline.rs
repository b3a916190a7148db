use chrono::{DateTime, Utc};
use pallet_core::repository::FulfillmentStore;
use pallet_core::{ClientId, CoreError, CoreResult, FulfillmentState, Order, OrderSyncLog};
use serde::Serialize;
use uuid::Uuid;

/// Origin label for the order-created event; orders enter through the storefront sync.
const STOREFRONT_ORIGIN: &str = "SHOPIFY";
const WAREHOUSE_ORIGIN: &str = "WAREHOUSE";
const CARRIER_ORIGIN: &str = "CARRIER";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub origin: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changed_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderTimeline {
    pub order_id: Uuid,
    pub order_number: String,
    pub current_state: FulfillmentState,
    pub events: Vec<TimelineEvent>,
}

fn describe(action: &str) -> String {
    let text = match action {
        "create" => "Order imported",
        "update" => "Order details updated",
        "hold" => "Order placed on hold",
        "release_hold" => "Hold released",
        "fulfill" => "Fulfillment created",
        "update_tracking" => "Tracking information updated",
        "cancel" => "Order cancelled",
        other => return other.to_string(),
    };
    text.to_string()
}

fn log_event(log: OrderSyncLog) -> TimelineEvent {
    TimelineEvent {
        event_type: log.action.to_uppercase(),
        timestamp: log.created_at,
        description: describe(&log.action),
        origin: log.origin,
        changed_fields: log.changed_fields,
    }
}

fn milestone(event_type: &str, timestamp: DateTime<Utc>, description: String, origin: &str) -> TimelineEvent {
    TimelineEvent {
        event_type: event_type.to_string(),
        timestamp,
        description,
        origin: origin.to_string(),
        changed_fields: Vec::new(),
    }
}

/// Merges lifecycle milestones and sync-log rows, most recent first.
///
/// Events sharing a timestamp keep the order they were produced in:
/// creation, then log rows, then shipped, then delivered.
pub fn assemble(order: &Order, logs: Vec<OrderSyncLog>) -> Vec<TimelineEvent> {
    let mut events = Vec::with_capacity(logs.len() + 3);

    if let Some(placed) = order.order_date {
        events.push(milestone(
            "ORDER_CREATED",
            placed,
            format!("Order {} created", order.order_number),
            STOREFRONT_ORIGIN,
        ));
    }

    events.extend(logs.into_iter().map(log_event));

    if let Some(shipped) = order.shipped_at {
        let description = match order.carrier.as_deref() {
            Some(carrier) => format!("Shipped via {}", carrier),
            None => "Shipped".to_string(),
        };
        events.push(milestone("SHIPPED", shipped, description, WAREHOUSE_ORIGIN));
    }

    if let Some(delivered) = order.delivered_at {
        events.push(milestone("DELIVERED", delivered, "Delivered to customer".to_string(), CARRIER_ORIGIN));
    }

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

pub async fn build(
    store: &dyn FulfillmentStore,
    client_id: &ClientId,
    order_id: Uuid,
    log_limit: i64,
) -> CoreResult<OrderTimeline> {
    let order = store
        .find_order(client_id, order_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Order {} not found", order_id)))?;

    let logs = store.recent_sync_logs(order.id, log_limit).await?;
    let events = assemble(&order, logs);

    Ok(OrderTimeline {
        order_id: order.id,
        order_number: order.order_number,
        current_state: order.fulfillment_state,
        events,
    })
}
