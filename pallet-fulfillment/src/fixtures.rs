//! Builders shared by the unit tests in this crate.

use chrono::{DateTime, Utc};
use pallet_core::{ClientId, FulfillmentState, Order, Product};
use uuid::Uuid;

pub fn client() -> ClientId {
    ClientId::new("acme").unwrap()
}

pub fn other_client() -> ClientId {
    ClientId::new("globex").unwrap()
}

/// Saturday noon UTC; far enough from midnight that day windows are unambiguous.
pub fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z").unwrap().with_timezone(&Utc)
}

pub fn order(state: FulfillmentState) -> Order {
    Order::new(client(), format!("#{}", &Uuid::new_v4().simple().to_string()[..6]), state)
}

pub fn shipped_order(placed: DateTime<Utc>, shipped: DateTime<Utc>) -> Order {
    let mut order = order(FulfillmentState::Shipped);
    order.order_date = Some(placed);
    order.shipped_at = Some(shipped);
    order
}

pub fn delivered_order(carrier: &str, shipped: DateTime<Utc>, delivered: DateTime<Utc>) -> Order {
    let mut order = order(FulfillmentState::Delivered);
    order.carrier = Some(carrier.to_string());
    order.order_date = Some(shipped - chrono::Duration::hours(12));
    order.shipped_at = Some(shipped);
    order.delivered_at = Some(delivered);
    order
}

pub fn product(sku: &str, available: i32) -> Product {
    Product {
        id: Uuid::new_v4(),
        client_id: client(),
        sku: sku.to_string(),
        name: format!("Product {}", sku),
        available,
        reserved: 0,
        is_active: true,
    }
}
