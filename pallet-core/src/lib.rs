pub mod clock;
pub mod models;
pub mod repository;
pub mod settings;
pub mod tenant;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{FulfillmentState, HoldReason, LineItem, Order, OrderSyncLog, PipelineStage, Product};
pub use repository::{FulfillmentStore, OrderFilter, OrderSort, Page, TimeRange};
pub use settings::{AnalyticsSettings, ReportingZone, SlaTargets};
pub use tenant::ClientId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store query failed: {0}")]
    Store(#[from] StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure reading from the upstream order/product store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error during {operation}: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("could not decode {entity}: {reason}")]
    Decode { entity: &'static str, reason: String },
}

impl StoreError {
    pub fn backend<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend {
            operation,
            source: Box::new(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
