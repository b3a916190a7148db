use pallet_core::Clock;
use pallet_fulfillment::FulfillmentAnalytics;
use std::sync::Arc;

use crate::telemetry::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<FulfillmentAnalytics>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<HttpMetrics>,
}

impl AppState {
    pub fn new(analytics: FulfillmentAnalytics, clock: Arc<dyn Clock>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            analytics: Arc::new(analytics),
            clock,
            metrics: Arc::new(HttpMetrics::new()?),
        })
    }
}
