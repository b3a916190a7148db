use chrono::{DateTime, Utc};
use pallet_core::{AnalyticsSettings, ClientId, CoreResult, FulfillmentStore};
use std::sync::Arc;
use uuid::Uuid;

use crate::carriers::{self, CarrierPerformance};
use crate::daily::{self, DailyShipments};
use crate::holds::{self, HeldOrder};
use crate::inventory::{self, InventoryAlert};
use crate::metrics::{self, FulfillmentStats};
use crate::pipeline::{self, StageCount};
use crate::shipments::{self, ShipmentPage, ShipmentRequest};
use crate::sla::{self, SlaMetric};
use crate::time_window::TimeWindow;
use crate::timeline::{self, OrderTimeline};

/// Read-only fulfillment analytics for one store.
///
/// Stateless apart from the store handle and settings; every call takes the
/// tenant and the reference instant explicitly.
pub struct FulfillmentAnalytics {
    store: Arc<dyn FulfillmentStore>,
    settings: AnalyticsSettings,
}

impl FulfillmentAnalytics {
    pub fn new(store: Arc<dyn FulfillmentStore>, settings: AnalyticsSettings) -> Self {
        Self { store, settings }
    }

    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow::new(now, self.settings.reporting_zone())
    }

    pub async fn stats(&self, client_id: &ClientId, now: DateTime<Utc>) -> CoreResult<FulfillmentStats> {
        metrics::collect(self.store.as_ref(), client_id, &self.window(now), &self.settings.sla).await
    }

    pub async fn shipments(&self, client_id: &ClientId, request: ShipmentRequest) -> CoreResult<ShipmentPage> {
        shipments::list(self.store.as_ref(), client_id, request).await
    }

    pub async fn on_hold(&self, client_id: &ClientId, now: DateTime<Utc>) -> CoreResult<Vec<HeldOrder>> {
        holds::list(self.store.as_ref(), client_id, now).await
    }

    pub async fn timeline(&self, client_id: &ClientId, order_id: Uuid) -> CoreResult<OrderTimeline> {
        timeline::build(self.store.as_ref(), client_id, order_id, self.settings.timeline_log_limit).await
    }

    pub async fn carrier_performance(
        &self,
        client_id: &ClientId,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<CarrierPerformance>> {
        carriers::analyze(
            self.store.as_ref(),
            client_id,
            &self.window(now),
            self.settings.carrier_lookback_days,
            self.settings.carrier_on_time_days,
        )
        .await
    }

    pub async fn inventory_alerts(&self, client_id: &ClientId, now: DateTime<Utc>) -> CoreResult<Vec<InventoryAlert>> {
        inventory::scan(
            self.store.as_ref(),
            client_id,
            &self.window(now),
            self.settings.low_stock_threshold,
            self.settings.sales_lookback_days,
        )
        .await
    }

    pub async fn sla_status(&self, client_id: &ClientId, now: DateTime<Utc>) -> CoreResult<Vec<SlaMetric>> {
        sla::status(
            self.store.as_ref(),
            client_id,
            &self.window(now),
            self.settings.sla_lookback_days,
            &self.settings.sla,
        )
        .await
    }

    pub async fn pipeline(&self, client_id: &ClientId) -> CoreResult<Vec<StageCount>> {
        pipeline::breakdown(self.store.as_ref(), client_id).await
    }

    pub async fn daily_summary(
        &self,
        client_id: &ClientId,
        now: DateTime<Utc>,
        days: Option<i64>,
    ) -> CoreResult<Vec<DailyShipments>> {
        daily::summary(self.store.as_ref(), client_id, &self.window(now), daily::clamp_days(days)).await
    }
}
