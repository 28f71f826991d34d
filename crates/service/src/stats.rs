use models::product::LOW_STOCK_THRESHOLD;
use serde::Serialize;
use tracing::instrument;

use crate::errors::ServiceError;
use crate::store::{InventoryAggregates, ProductFilter};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: u64,
    pub low_stock: u64,
    /// Sum of `price * stock` over every product.
    pub total_value: f64,
}

/// Recomputed from the store on every call.
#[instrument(skip_all)]
pub async fn inventory_stats<A>(store: &A) -> Result<InventoryStats, ServiceError>
where
    A: InventoryAggregates + ?Sized,
{
    let total_products = store.count(None).await?;
    let low_stock = store.count(Some(ProductFilter::StockBelow(LOW_STOCK_THRESHOLD))).await?;
    let total_value = store
        .price_and_stock()
        .await?
        .into_iter()
        .map(|(price, stock)| price * f64::from(stock))
        .sum();
    Ok(InventoryStats { total_products, low_stock, total_value })
}
