use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::tenant::ClientId;

/// Position of an order in the pick/pack/ship pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentState {
    Pending,
    AwaitingStock,
    ReadyForPicking,
    Picking,
    Picked,
    Packing,
    Packed,
    Shipped,
    Delivered,
}

impl FulfillmentState {
    pub const ALL: [FulfillmentState; 9] = [
        FulfillmentState::Pending,
        FulfillmentState::AwaitingStock,
        FulfillmentState::ReadyForPicking,
        FulfillmentState::Picking,
        FulfillmentState::Picked,
        FulfillmentState::Packing,
        FulfillmentState::Packed,
        FulfillmentState::Shipped,
        FulfillmentState::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentState::Pending => "PENDING",
            FulfillmentState::AwaitingStock => "AWAITING_STOCK",
            FulfillmentState::ReadyForPicking => "READY_FOR_PICKING",
            FulfillmentState::Picking => "PICKING",
            FulfillmentState::Picked => "PICKED",
            FulfillmentState::Packing => "PACKING",
            FulfillmentState::Packed => "PACKED",
            FulfillmentState::Shipped => "SHIPPED",
            FulfillmentState::Delivered => "DELIVERED",
        }
    }

    /// Pipeline stage an order in this state is reported under.
    ///
    /// Held orders are reported under `PipelineStage::OnHold` regardless of
    /// state; that override lives with the hold flag, not here.
    pub fn stage(&self) -> PipelineStage {
        match self {
            FulfillmentState::Pending => PipelineStage::Pending,
            FulfillmentState::AwaitingStock => PipelineStage::AwaitingStock,
            FulfillmentState::ReadyForPicking => PipelineStage::Ready,
            FulfillmentState::Picking | FulfillmentState::Picked => PipelineStage::Picking,
            FulfillmentState::Packing | FulfillmentState::Packed => PipelineStage::Packing,
            FulfillmentState::Shipped => PipelineStage::Shipped,
            FulfillmentState::Delivered => PipelineStage::Delivered,
        }
    }
}

impl fmt::Display for FulfillmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FulfillmentState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown fulfillment state: {}", s))
    }
}

/// Presentation stages of the fulfillment pipeline, in physical order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Pending,
    AwaitingStock,
    Ready,
    Picking,
    Packing,
    Shipped,
    Delivered,
    OnHold,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 8] = [
        PipelineStage::Pending,
        PipelineStage::AwaitingStock,
        PipelineStage::Ready,
        PipelineStage::Picking,
        PipelineStage::Packing,
        PipelineStage::Shipped,
        PipelineStage::Delivered,
        PipelineStage::OnHold,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Pending => "Pending",
            PipelineStage::AwaitingStock => "Awaiting Stock",
            PipelineStage::Ready => "Ready",
            PipelineStage::Picking => "Picking",
            PipelineStage::Packing => "Packing",
            PipelineStage::Shipped => "Shipped",
            PipelineStage::Delivered => "Delivered",
            PipelineStage::OnHold => "On Hold",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PipelineStage::Pending => "#94a3b8",
            PipelineStage::AwaitingStock => "#f59e0b",
            PipelineStage::Ready => "#3b82f6",
            PipelineStage::Picking => "#6366f1",
            PipelineStage::Packing => "#8b5cf6",
            PipelineStage::Shipped => "#06b6d4",
            PipelineStage::Delivered => "#22c55e",
            PipelineStage::OnHold => "#ef4444",
        }
    }

    /// States whose orders are reported under this stage. Empty for `OnHold`.
    pub fn states(&self) -> Vec<FulfillmentState> {
        FulfillmentState::ALL
            .iter()
            .copied()
            .filter(|state| state.stage() == *self)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldReason {
    IncorrectAddress,
    AwaitingPayment,
    FraudReview,
    InventoryIssue,
    CustomerRequest,
    Other,
}

impl HoldReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldReason::IncorrectAddress => "INCORRECT_ADDRESS",
            HoldReason::AwaitingPayment => "AWAITING_PAYMENT",
            HoldReason::FraudReview => "FRAUD_REVIEW",
            HoldReason::InventoryIssue => "INVENTORY_ISSUE",
            HoldReason::CustomerRequest => "CUSTOMER_REQUEST",
            HoldReason::Other => "OTHER",
        }
    }

    /// Reasons the tenant can clear themselves (fix the address, settle payment).
    pub fn client_resolvable(&self) -> bool {
        matches!(self, HoldReason::IncorrectAddress | HoldReason::AwaitingPayment)
    }

    /// Lenient decoding: anything unrecognised is `Other`.
    pub fn parse(s: &str) -> Self {
        match s {
            "INCORRECT_ADDRESS" => HoldReason::IncorrectAddress,
            "AWAITING_PAYMENT" => HoldReason::AwaitingPayment,
            "FRAUD_REVIEW" => HoldReason::FraudReview,
            "INVENTORY_ISSUE" => HoldReason::InventoryIssue,
            "CUSTOMER_REQUEST" => HoldReason::CustomerRequest,
            _ => HoldReason::Other,
        }
    }
}

/// An order as read from the upstream store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub client_id: ClientId,
    pub order_number: String,
    pub order_date: Option<DateTime<Utc>>,
    pub fulfillment_state: FulfillmentState,
    pub is_on_hold: bool,
    pub hold_reason: Option<HoldReason>,
    pub hold_placed_at: Option<DateTime<Utc>>,
    pub hold_released_at: Option<DateTime<Utc>>,
    pub is_cancelled: bool,
    pub carrier: Option<String>,
    pub carrier_service: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub ship_to_city: Option<String>,
    pub ship_to_country: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
}

impl Order {
    /// Convenience constructor used by adapters and tests; every optional field starts empty.
    pub fn new(client_id: ClientId, order_number: impl Into<String>, state: FulfillmentState) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            order_number: order_number.into(),
            order_date: None,
            fulfillment_state: state,
            is_on_hold: false,
            hold_reason: None,
            hold_placed_at: None,
            hold_released_at: None,
            is_cancelled: false,
            carrier: None,
            carrier_service: None,
            tracking_number: None,
            tracking_url: None,
            customer_name: None,
            customer_email: None,
            ship_to_city: None,
            ship_to_country: None,
            shipped_at: None,
            delivered_at: None,
            items: Vec::new(),
        }
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    /// Hours from order placement to ship, when both are known.
    pub fn fulfillment_hours(&self) -> Option<f64> {
        match (self.order_date, self.shipped_at) {
            (Some(placed), Some(shipped)) => {
                Some((shipped - placed).num_seconds() as f64 / 3600.0)
            }
            _ => None,
        }
    }

    /// Days from ship to delivery, when both are known.
    pub fn transit_days(&self) -> Option<f64> {
        match (self.shipped_at, self.delivered_at) {
            (Some(shipped), Some(delivered)) => {
                Some((delivered - shipped).num_seconds() as f64 / 86_400.0)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: Option<Uuid>,
    pub sku: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub client_id: ClientId,
    pub sku: String,
    pub name: String,
    /// Negative when oversold.
    pub available: i32,
    pub reserved: i32,
    pub is_active: bool,
}

/// Append-only audit row written by the channel sync workers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSyncLog {
    pub id: Uuid,
    pub order_id: Uuid,
    pub action: String,
    pub origin: String,
    pub changed_fields: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip_through_str() {
        for state in FulfillmentState::ALL {
            assert_eq!(state.as_str().parse::<FulfillmentState>().unwrap(), state);
        }
        assert!("LOST".parse::<FulfillmentState>().is_err());
    }

    #[test]
    fn test_every_state_maps_to_a_state_stage() {
        for state in FulfillmentState::ALL {
            assert_ne!(state.stage(), PipelineStage::OnHold);
        }
        assert_eq!(PipelineStage::Picking.states(), vec![FulfillmentState::Picking, FulfillmentState::Picked]);
        assert!(PipelineStage::OnHold.states().is_empty());
    }

    #[test]
    fn test_stage_order_is_physical() {
        let mut sorted = PipelineStage::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, PipelineStage::ALL.to_vec());
        assert_eq!(PipelineStage::ALL.last(), Some(&PipelineStage::OnHold));
    }

    #[test]
    fn test_hold_reason_parsing() {
        assert!(HoldReason::parse("INCORRECT_ADDRESS").client_resolvable());
        assert!(HoldReason::parse("AWAITING_PAYMENT").client_resolvable());
        assert!(!HoldReason::parse("FRAUD_REVIEW").client_resolvable());
        assert_eq!(HoldReason::parse("something-new"), HoldReason::Other);
    }

    #[test]
    fn test_fulfillment_hours() {
        let mut order = Order::new(ClientId::new("c1").unwrap(), "1001", FulfillmentState::Shipped);
        assert_eq!(order.fulfillment_hours(), None);
        let placed = Utc::now();
        order.order_date = Some(placed);
        order.shipped_at = Some(placed + chrono::Duration::minutes(90));
        assert_eq!(order.fulfillment_hours(), Some(1.5));
    }
}
