//! HTTP handlers. The four resource handlers are generic over the store so
//! users and products share one implementation; only `stats` is
//! product-specific.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Health;
use serde_json::Value;
use service::resource::{DeleteReply, ResourceService};
use service::stats::inventory_stats;
use service::store::{InventoryAggregates, RecordStore};
use tracing::info;

use crate::envelope::Envelope;
use crate::errors::ApiError;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn list<S: RecordStore>(State(svc): State<ResourceService<S>>) -> Result<Response, ApiError> {
    let records = svc.list().await?;
    info!(resource = svc.label(), count = records.len(), "listed records");
    Ok(Envelope::success(records).with_status(StatusCode::OK))
}

pub async fn create<S: RecordStore>(
    State(svc): State<ResourceService<S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(candidate) = body?;
    let created = svc.create(&candidate).await?;
    Ok(Envelope::success(created).with_status(StatusCode::CREATED))
}

pub async fn update<S: RecordStore>(
    State(svc): State<ResourceService<S>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(candidate) = body?;
    let updated = svc.update(&id, &candidate).await?;
    Ok(Envelope::success(updated).with_status(StatusCode::OK))
}

pub async fn delete<S: RecordStore>(
    State(svc): State<ResourceService<S>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    svc.delete(&id).await?;
    let reply = match svc.delete_reply() {
        DeleteReply::NoContent => StatusCode::NO_CONTENT.into_response(),
        DeleteReply::Confirmation => Envelope::success_message(format!("{} deleted successfully", svc.label()))
            .with_status(StatusCode::OK),
    };
    Ok(reply)
}

pub async fn stats<A>(State(store): State<Arc<A>>) -> Result<Response, ApiError>
where
    A: InventoryAggregates + 'static,
{
    let stats = inventory_stats(store.as_ref()).await?;
    Ok(Envelope::success(stats).with_status(StatusCode::OK))
}
