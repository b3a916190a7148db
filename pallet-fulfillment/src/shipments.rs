use chrono::{DateTime, Utc};
use pallet_core::repository::{FulfillmentStore, OrderFilter, OrderSort, Page};
use pallet_core::{ClientId, CoreError, CoreResult, FulfillmentState, Order};
use pallet_shared::{CarrierDirectory, Masked};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentStatus {
    InTransit,
    Delivered,
}

impl ShipmentStatus {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw {
            "in_transit" => Ok(ShipmentStatus::InTransit),
            "delivered" => Ok(ShipmentStatus::Delivered),
            other => Err(CoreError::ValidationError(format!(
                "status must be one of in_transit, delivered (got '{}')",
                other
            ))),
        }
    }

    fn state(&self) -> FulfillmentState {
        match self {
            ShipmentStatus::InTransit => FulfillmentState::Shipped,
            ShipmentStatus::Delivered => FulfillmentState::Delivered,
        }
    }
}

/// Raw query string for the shipments listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// A validated shipments request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipmentRequest {
    pub page: i64,
    pub limit: i64,
    pub status: Option<ShipmentStatus>,
}

impl ShipmentQuery {
    pub fn validate(&self) -> CoreResult<ShipmentRequest> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(CoreError::ValidationError("page must be at least 1".to_string()));
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(ShipmentStatus::parse(raw)?),
        };
        Ok(ShipmentRequest { page, limit, status })
    }
}

impl ShipmentRequest {
    fn filter(&self) -> OrderFilter {
        let filter = OrderFilter::new().has_shipped_at(true);
        match self.status {
            Some(status) => filter.state(status.state()),
            None => filter.states([FulfillmentState::Shipped, FulfillmentState::Delivered]),
        }
    }

    fn page(&self) -> Page {
        Page {
            offset: (self.page - 1).saturating_mul(self.limit),
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSummary {
    pub order_id: Uuid,
    pub order_number: String,
    pub state: FulfillmentState,
    pub customer_name: Option<Masked<String>>,
    pub ship_to_city: Option<String>,
    pub ship_to_country: Option<String>,
    pub carrier: Option<String>,
    pub carrier_service: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub item_count: i64,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Stored URL first, then one derived from the carrier's template.
fn resolve_tracking_url(order: &Order) -> Option<String> {
    if let Some(url) = order.tracking_url.as_deref().filter(|u| !u.trim().is_empty()) {
        return Some(url.to_string());
    }
    match (order.carrier.as_deref(), order.tracking_number.as_deref()) {
        (Some(carrier), Some(number)) => CarrierDirectory::tracking_url(carrier, number),
        _ => None,
    }
}

impl From<Order> for ShipmentSummary {
    fn from(order: Order) -> Self {
        let tracking_url = resolve_tracking_url(&order);
        let item_count = order.item_count();
        Self {
            order_id: order.id,
            order_number: order.order_number,
            state: order.fulfillment_state,
            customer_name: order.customer_name.map(Masked::new),
            ship_to_city: order.ship_to_city,
            ship_to_country: order.ship_to_country,
            carrier: order.carrier,
            carrier_service: order.carrier_service,
            tracking_number: order.tracking_number,
            tracking_url,
            item_count,
            shipped_at: order.shipped_at,
            delivered_at: order.delivered_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPage {
    pub shipments: Vec<ShipmentSummary>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

pub async fn list(
    store: &dyn FulfillmentStore,
    client_id: &ClientId,
    request: ShipmentRequest,
) -> CoreResult<ShipmentPage> {
    let filter = request.filter();
    let (total, orders) = tokio::try_join!(
        store.count_orders(client_id, &filter),
        store.find_orders(client_id, &filter, OrderSort::ShippedAtDesc, Some(request.page())),
    )?;

    Ok(ShipmentPage {
        shipments: orders.into_iter().map(ShipmentSummary::from).collect(),
        page: request.page,
        limit: request.limit,
        total,
        total_pages: (total + request.limit - 1) / request.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{client, now, order};
    use chrono::Duration;
    use pallet_store::MemoryStore;

    fn query(page: Option<i64>, limit: Option<i64>, status: Option<&str>) -> ShipmentQuery {
        ShipmentQuery {
            page,
            limit,
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_and_clamping() {
        let request = ShipmentQuery::default().validate().unwrap();
        assert_eq!(request, ShipmentRequest { page: 1, limit: 20, status: None });

        assert_eq!(query(None, Some(500), None).validate().unwrap().limit, 100);
        assert_eq!(query(None, Some(0), None).validate().unwrap().limit, 1);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(matches!(
            query(Some(0), None, None).validate(),
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            query(None, None, Some("lost")).validate(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_tracking_url_prefers_stored_value() {
        let mut o = order(FulfillmentState::Shipped);
        o.carrier = Some("UPS".into());
        o.tracking_number = Some("1Z999".into());
        assert!(resolve_tracking_url(&o).unwrap().contains("1Z999"));

        o.tracking_url = Some("https://track.example/abc".into());
        assert_eq!(resolve_tracking_url(&o).as_deref(), Some("https://track.example/abc"));

        o.tracking_url = None;
        o.carrier = Some("Pigeon Post".into());
        assert_eq!(resolve_tracking_url(&o), None);
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let store = MemoryStore::new();
        for hours in 1..=5 {
            let mut o = order(FulfillmentState::Shipped);
            o.order_number = format!("#{}", hours);
            o.shipped_at = Some(now() - Duration::hours(hours));
            store.insert_order(o).await;
        }
        let mut delivered = order(FulfillmentState::Delivered);
        delivered.order_number = "#D".into();
        delivered.shipped_at = Some(now() - Duration::days(3));
        store.insert_order(delivered).await;
        store.insert_order(order(FulfillmentState::Packed)).await;

        let request = query(Some(2), Some(2), None).validate().unwrap();
        let page = list(&store, &client(), request).await.unwrap();
        assert_eq!(page.total, 6);
        assert_eq!(page.total_pages, 3);
        let numbers: Vec<&str> = page.shipments.iter().map(|s| s.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["#3", "#4"]);

        let request = query(None, None, Some("delivered")).validate().unwrap();
        let page = list(&store, &client(), request).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.shipments[0].order_number, "#D");
    }

    #[tokio::test]
    async fn test_empty_listing_has_no_pages() {
        let store = MemoryStore::new();
        let request = ShipmentQuery::default().validate().unwrap();
        let page = list(&store, &client(), request).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.shipments.is_empty());
    }
}
