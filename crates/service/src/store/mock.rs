//! Substitute stores for exercising error paths without a database.

use std::marker::PhantomData;

use async_trait::async_trait;
use models::validation::Schema;
use serde_json::Value;

use super::{CreateOf, InventoryAggregates, PatchOf, ProductFilter, RecordStore};
use crate::errors::ServiceError;

/// Store whose every call fails as if the database were unreachable.
pub struct FailingStore<S> {
    message: String,
    _schema: PhantomData<fn() -> S>,
}

impl<S> FailingStore<S> {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), _schema: PhantomData }
    }

    fn fail<T>(&self) -> Result<T, ServiceError> {
        Err(ServiceError::Db(self.message.clone()))
    }
}

#[async_trait]
impl<S> RecordStore for FailingStore<S>
where
    S: Schema + 'static,
{
    type Schema = S;
    type Record = Value;

    async fn list_all(&self) -> Result<Vec<Value>, ServiceError> {
        self.fail()
    }

    async fn create(&self, _input: CreateOf<Self>) -> Result<Value, ServiceError> {
        self.fail()
    }

    async fn update_by_id(&self, _id: i32, _patch: PatchOf<Self>) -> Result<Value, ServiceError> {
        self.fail()
    }

    async fn delete_by_id(&self, _id: i32) -> Result<(), ServiceError> {
        self.fail()
    }
}

#[async_trait]
impl<S: 'static> InventoryAggregates for FailingStore<S> {
    async fn count(&self, _filter: Option<ProductFilter>) -> Result<u64, ServiceError> {
        self.fail()
    }

    async fn price_and_stock(&self) -> Result<Vec<(f64, i32)>, ServiceError> {
        self.fail()
    }
}
