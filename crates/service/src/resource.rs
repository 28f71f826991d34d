use std::sync::Arc;

use models::validation::{parse_id, Schema};
use serde_json::Value;
use tracing::instrument;

use crate::errors::ServiceError;
use crate::store::RecordStore;

/// What a successful delete answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReply {
    /// 204 with no body.
    NoContent,
    /// 200 with a confirmation message.
    Confirmation,
}

/// The validate → persist pipeline for one resource type.
///
/// Any store/schema pair reuses the same four operations; the resource only
/// contributes its label and how deletes are answered.
pub struct ResourceService<S: RecordStore> {
    store: Arc<S>,
    label: &'static str,
    delete_reply: DeleteReply,
}

impl<S: RecordStore> Clone for ResourceService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), label: self.label, delete_reply: self.delete_reply }
    }
}

impl<S: RecordStore> ResourceService<S> {
    pub fn new(store: Arc<S>, label: &'static str, delete_reply: DeleteReply) -> Self {
        Self { store, label, delete_reply }
    }

    pub fn label(&self) -> &'static str { self.label }

    pub fn delete_reply(&self) -> DeleteReply { self.delete_reply }

    pub fn store(&self) -> &Arc<S> { &self.store }

    #[instrument(skip_all, fields(resource = self.label))]
    pub async fn list(&self) -> Result<Vec<S::Record>, ServiceError> {
        self.store.list_all().await
    }

    /// Validate the full record, then insert it.
    #[instrument(skip_all, fields(resource = self.label))]
    pub async fn create(&self, candidate: &Value) -> Result<S::Record, ServiceError> {
        let input = <S::Schema as Schema>::validate_create(candidate)?;
        self.store.create(input).await
    }

    /// Validate the id and the supplied subset of fields, then apply them.
    #[instrument(skip(self, candidate), fields(resource = self.label))]
    pub async fn update(&self, raw_id: &str, candidate: &Value) -> Result<S::Record, ServiceError> {
        let id = parse_id(raw_id)?;
        let patch = <S::Schema as Schema>::validate_patch(candidate)?;
        self.store.update_by_id(id, patch).await
    }

    #[instrument(skip(self), fields(resource = self.label))]
    pub async fn delete(&self, raw_id: &str) -> Result<(), ServiceError> {
        let id = parse_id(raw_id)?;
        self.store.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::mock::FailingStore;
    use crate::store::SeaOrmProductStore;
    use crate::test_support::get_db;
    use models::product::ProductSchema;

    async fn products() -> anyhow::Result<ResourceService<SeaOrmProductStore>> {
        let store = SeaOrmProductStore { db: get_db().await? };
        Ok(ResourceService::new(Arc::new(store), "Product", DeleteReply::Confirmation))
    }

    #[tokio::test]
    async fn create_then_list_includes_record() -> anyhow::Result<()> {
        let svc = products().await?;
        let created = svc
            .create(&json!({"name": "Widget", "category": "Tools", "price": 10, "stock": 1}))
            .await?;
        let listed = svc.list().await?;
        assert!(listed.iter().any(|p| p.id == created.id && p.name == "Widget"));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_body_never_reaches_store() -> anyhow::Result<()> {
        // a failing store would turn any store call into Db
        let svc = ResourceService::new(
            Arc::new(FailingStore::<ProductSchema>::new("unreachable")),
            "Product",
            DeleteReply::Confirmation,
        );
        let err = svc.create(&json!({"name": "ab", "category": "Tools", "price": 10, "stock": 1})).await;
        assert!(matches!(err, Err(ServiceError::Validation(ref e)) if e.contains_field("name")));

        let err = svc.update("abc", &json!({"stock": 1})).await;
        assert!(matches!(err, Err(ServiceError::Validation(ref e)) if e.contains_field("id")));

        let err = svc.delete("12x").await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));

        assert!(matches!(svc.list().await, Err(ServiceError::Db(_))));
        Ok(())
    }

    #[tokio::test]
    async fn repeated_delete_is_not_found() -> anyhow::Result<()> {
        let svc = products().await?;
        let created = svc
            .create(&json!({"name": "Widget", "category": "Tools", "price": 10, "stock": 1}))
            .await?;
        let id = created.id.to_string();
        svc.delete(&id).await?;
        assert!(matches!(svc.delete(&id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_with_invalid_field_is_rejected_before_lookup() -> anyhow::Result<()> {
        let svc = products().await?;
        let err = svc.update("999999", &json!({"price": -1})).await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));
        let err = svc.update("999999", &json!({"price": 1})).await;
        assert!(matches!(err, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
