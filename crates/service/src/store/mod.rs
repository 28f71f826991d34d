use async_trait::async_trait;
use models::validation::Schema;
use serde::Serialize;

use crate::errors::ServiceError;

pub mod seaorm;
pub mod mock;

pub use seaorm::{SeaOrmProductStore, SeaOrmUserStore};

/// Normalized creation record accepted by a store.
pub type CreateOf<S> = <<S as RecordStore>::Schema as Schema>::Create;
/// Normalized partial record accepted by a store.
pub type PatchOf<S> = <<S as RecordStore>::Schema as Schema>::Patch;

/// Persistence abstraction for one resource table.
///
/// Implementations are shared across concurrent requests and rely on the
/// database for isolation; every call is atomic for a single record.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Schema whose normalized output this store persists.
    type Schema: Schema;
    type Record: Serialize + Send + Sync + 'static;

    /// All records in the resource's default order. Empty table is `Ok(vec![])`.
    async fn list_all(&self) -> Result<Vec<Self::Record>, ServiceError>;
    async fn create(&self, input: CreateOf<Self>) -> Result<Self::Record, ServiceError>;
    /// Apply only the supplied fields. `NotFound` when no row has `id`.
    async fn update_by_id(&self, id: i32, patch: PatchOf<Self>) -> Result<Self::Record, ServiceError>;
    /// `NotFound` when no row has `id`.
    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError>;
}

/// Predicates understood by [`InventoryAggregates::count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFilter {
    StockBelow(i32),
}

/// Read-only aggregates over the product table.
#[async_trait]
pub trait InventoryAggregates: Send + Sync {
    async fn count(&self, filter: Option<ProductFilter>) -> Result<u64, ServiceError>;
    /// `(price, stock)` projection of every product.
    async fn price_and_stock(&self) -> Result<Vec<(f64, i32)>, ServiceError>;
}
