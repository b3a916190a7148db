pub mod carriers;
pub mod daily;
pub mod holds;
pub mod inventory;
pub mod metrics;
pub mod pipeline;
pub mod rates;
pub mod service;
pub mod shipments;
pub mod sla;
pub mod time_window;
pub mod timeline;

#[cfg(test)]
mod fixtures;

pub use carriers::CarrierPerformance;
pub use daily::DailyShipments;
pub use holds::HeldOrder;
pub use inventory::{AlertType, InventoryAlert};
pub use metrics::FulfillmentStats;
pub use pipeline::StageCount;
pub use service::FulfillmentAnalytics;
pub use shipments::{ShipmentPage, ShipmentQuery, ShipmentRequest, ShipmentStatus, ShipmentSummary};
pub use sla::{SlaMetric, SlaStatus};
pub use time_window::TimeWindow;
pub use timeline::{OrderTimeline, TimelineEvent};
