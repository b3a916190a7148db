use futures_util::future::try_join_all;
use pallet_core::repository::{FulfillmentStore, OrderFilter};
use pallet_core::{ClientId, CoreResult, PipelineStage};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: PipelineStage,
    pub label: &'static str,
    pub color: &'static str,
    pub count: i64,
}

/// Filter selecting exactly the orders reported under `stage`.
///
/// State stages only count orders that are not on hold, so the eight stages
/// partition the tenant's non-cancelled orders.
pub fn stage_filter(stage: PipelineStage) -> OrderFilter {
    match stage {
        PipelineStage::OnHold => OrderFilter::new().on_hold(true),
        state_stage => OrderFilter::new().states(state_stage.states()).on_hold(false),
    }
}

/// Stage counts in physical pipeline order. A held order counts only under On Hold.
pub async fn breakdown(store: &dyn FulfillmentStore, client_id: &ClientId) -> CoreResult<Vec<StageCount>> {
    let filters: Vec<(PipelineStage, OrderFilter)> = PipelineStage::ALL
        .iter()
        .map(|stage| (*stage, stage_filter(*stage)))
        .collect();

    let counts = try_join_all(
        filters
            .iter()
            .map(|(_, filter)| store.count_orders(client_id, filter)),
    )
    .await?;

    Ok(filters
        .iter()
        .zip(counts)
        .map(|((stage, _), count)| StageCount {
            stage: *stage,
            label: stage.label(),
            color: stage.color(),
            count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{client, order};
    use pallet_core::FulfillmentState;
    use pallet_store::MemoryStore;

    #[tokio::test]
    async fn test_stage_order_is_fixed() {
        let store = MemoryStore::new();
        let stages = breakdown(&store, &client()).await.unwrap();
        let labels: Vec<&str> = stages.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec!["Pending", "Awaiting Stock", "Ready", "Picking", "Packing", "Shipped", "Delivered", "On Hold"]
        );
        assert!(stages.iter().all(|s| s.count == 0));
    }

    #[tokio::test]
    async fn test_stages_partition_orders() {
        let store = MemoryStore::new();
        for state in FulfillmentState::ALL {
            store.insert_order(order(state)).await;
        }
        let mut held = order(FulfillmentState::Picking);
        held.is_on_hold = true;
        store.insert_order(held).await;
        let mut cancelled = order(FulfillmentState::Packing);
        cancelled.is_cancelled = true;
        store.insert_order(cancelled).await;

        let stages = breakdown(&store, &client()).await.unwrap();
        let count = |stage: PipelineStage| stages.iter().find(|s| s.stage == stage).unwrap().count;

        assert_eq!(count(PipelineStage::Picking), 2);
        assert_eq!(count(PipelineStage::Packing), 2);
        assert_eq!(count(PipelineStage::OnHold), 1);

        let state_total: i64 = stages
            .iter()
            .filter(|s| s.stage != PipelineStage::OnHold)
            .map(|s| s.count)
            .sum();
        let not_held = store
            .count_orders(&client(), &OrderFilter::new().on_hold(false))
            .await
            .unwrap();
        assert_eq!(state_total, not_held);
        assert_eq!(state_total, 9);
    }
}
