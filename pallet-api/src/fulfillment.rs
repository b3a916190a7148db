use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use pallet_fulfillment::{
    CarrierPerformance, DailyShipments, FulfillmentStats, HeldOrder, InventoryAlert, OrderTimeline, ShipmentPage,
    ShipmentQuery, SlaMetric, StageCount,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::tenant::Tenant;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/fulfillment/stats", get(stats))
        .route("/v1/fulfillment/shipments", get(shipments))
        .route("/v1/fulfillment/on-hold", get(on_hold))
        .route("/v1/fulfillment/orders/{order_id}/timeline", get(timeline))
        .route("/v1/fulfillment/carrier-performance", get(carrier_performance))
        .route("/v1/fulfillment/inventory-alerts", get(inventory_alerts))
        .route("/v1/fulfillment/sla-status", get(sla_status))
        .route("/v1/fulfillment/pipeline", get(pipeline))
        .route("/v1/fulfillment/daily-summary", get(daily_summary))
}

#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    pub days: Option<i64>,
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn stats(State(state): State<AppState>, tenant: Tenant) -> Result<Json<FulfillmentStats>, AppError> {
    let stats = state.analytics.stats(&tenant.0, state.clock.now()).await?;
    Ok(Json(stats))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn shipments(
    State(state): State<AppState>,
    tenant: Tenant,
    query: Result<Query<ShipmentQuery>, QueryRejection>,
) -> Result<Json<ShipmentPage>, AppError> {
    let Query(query) = query?;
    let request = query.validate()?;
    let page = state.analytics.shipments(&tenant.0, request).await?;
    Ok(Json(page))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn on_hold(State(state): State<AppState>, tenant: Tenant) -> Result<Json<Vec<HeldOrder>>, AppError> {
    let orders = state.analytics.on_hold(&tenant.0, state.clock.now()).await?;
    Ok(Json(orders))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn timeline(
    State(state): State<AppState>,
    tenant: Tenant,
    order_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderTimeline>, AppError> {
    let Path(order_id) = order_id?;
    let timeline = state.analytics.timeline(&tenant.0, order_id).await?;
    Ok(Json(timeline))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn carrier_performance(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<Vec<CarrierPerformance>>, AppError> {
    let rows = state.analytics.carrier_performance(&tenant.0, state.clock.now()).await?;
    Ok(Json(rows))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn inventory_alerts(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<Vec<InventoryAlert>>, AppError> {
    let alerts = state.analytics.inventory_alerts(&tenant.0, state.clock.now()).await?;
    Ok(Json(alerts))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn sla_status(State(state): State<AppState>, tenant: Tenant) -> Result<Json<Vec<SlaMetric>>, AppError> {
    let rows = state.analytics.sla_status(&tenant.0, state.clock.now()).await?;
    Ok(Json(rows))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn pipeline(State(state): State<AppState>, tenant: Tenant) -> Result<Json<Vec<StageCount>>, AppError> {
    let stages = state.analytics.pipeline(&tenant.0).await?;
    Ok(Json(stages))
}

#[tracing::instrument(skip_all, fields(client_id = %tenant.0))]
async fn daily_summary(
    State(state): State<AppState>,
    tenant: Tenant,
    query: Result<Query<DailySummaryQuery>, QueryRejection>,
) -> Result<Json<Vec<DailyShipments>>, AppError> {
    let Query(query) = query?;
    let days = state
        .analytics
        .daily_summary(&tenant.0, state.clock.now(), query.days)
        .await?;
    Ok(Json(days))
}
