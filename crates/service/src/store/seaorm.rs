use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::{debug, info};

use models::product::{self, ProductSchema};
use models::user::{self, UserSchema};

use super::{CreateOf, InventoryAggregates, PatchOf, ProductFilter, RecordStore};
use crate::errors::ServiceError;

fn db_err(e: DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

/// A row can vanish between the lookup and the UPDATE; report that as
/// not-found rather than a store failure.
fn update_err(entity: &str, e: DbErr) -> ServiceError {
    match e {
        DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => ServiceError::not_found(entity),
        other => db_err(other),
    }
}

pub struct SeaOrmUserStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl RecordStore for SeaOrmUserStore {
    type Schema = UserSchema;
    type Record = user::Model;

    async fn list_all(&self) -> Result<Vec<user::Model>, ServiceError> {
        user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn create(&self, input: CreateOf<Self>) -> Result<user::Model, ServiceError> {
        let created = input.into_active_model().insert(&self.db).await.map_err(db_err)?;
        info!(id = created.id, "created user");
        Ok(created)
    }

    async fn update_by_id(&self, id: i32, patch: PatchOf<Self>) -> Result<user::Model, ServiceError> {
        let found = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ServiceError::not_found("User"))?;
        if patch.is_empty() {
            debug!(id, "empty user patch; returning current row");
            return Ok(found);
        }
        let mut am: user::ActiveModel = found.into();
        patch.apply(&mut am);
        let updated = am.update(&self.db).await.map_err(|e| update_err("User", e))?;
        info!(id, "updated user");
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("User"));
        }
        info!(id, "deleted user");
        Ok(())
    }
}

pub struct SeaOrmProductStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl RecordStore for SeaOrmProductStore {
    type Schema = ProductSchema;
    type Record = product::Model;

    /// Newest first; id breaks ties between rows created in the same instant.
    async fn list_all(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn create(&self, input: CreateOf<Self>) -> Result<product::Model, ServiceError> {
        let created = input.into_active_model().insert(&self.db).await.map_err(db_err)?;
        info!(id = created.id, name = %created.name, "created product");
        Ok(created)
    }

    async fn update_by_id(&self, id: i32, patch: PatchOf<Self>) -> Result<product::Model, ServiceError> {
        let found = product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ServiceError::not_found("Product"))?;
        if patch.is_empty() {
            debug!(id, "empty product patch; returning current row");
            return Ok(found);
        }
        let mut am: product::ActiveModel = found.into();
        patch.apply(&mut am);
        let updated = am.update(&self.db).await.map_err(|e| update_err("Product", e))?;
        info!(id, "updated product");
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        let res = product::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("Product"));
        }
        info!(id, "deleted product");
        Ok(())
    }
}

#[async_trait]
impl InventoryAggregates for SeaOrmProductStore {
    async fn count(&self, filter: Option<ProductFilter>) -> Result<u64, ServiceError> {
        let mut query = product::Entity::find();
        if let Some(ProductFilter::StockBelow(threshold)) = filter {
            query = query.filter(product::Column::Stock.lt(threshold));
        }
        query.count(&self.db).await.map_err(db_err)
    }

    async fn price_and_stock(&self) -> Result<Vec<(f64, i32)>, ServiceError> {
        product::Entity::find()
            .select_only()
            .column(product::Column::Price)
            .column(product::Column::Stock)
            .into_tuple::<(f64, i32)>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::get_db;
    use models::validation::Schema;

    fn new_product(name: &str, price: f64, stock: i32) -> product::NewProduct {
        product::NewProduct { name: name.into(), category: "Tools".into(), price, stock, description: None }
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() -> anyhow::Result<()> {
        let db = get_db().await?;
        let users = SeaOrmUserStore { db: db.clone() };
        let products = SeaOrmProductStore { db };
        assert!(users.list_all().await?.is_empty());
        assert!(products.list_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn products_list_newest_first() -> anyhow::Result<()> {
        let store = SeaOrmProductStore { db: get_db().await? };
        let a = store.create(new_product("Alpha", 1.0, 1)).await?;
        let b = store.create(new_product("Bravo", 1.0, 1)).await?;
        let c = store.create(new_product("Charlie", 1.0, 1)).await?;
        let ids: Vec<i32> = store.list_all().await?.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        Ok(())
    }

    #[tokio::test]
    async fn partial_update_keeps_other_columns() -> anyhow::Result<()> {
        let store = SeaOrmProductStore { db: get_db().await? };
        let created = store.create(new_product("Widget", 10.0, 1)).await?;
        let patch = ProductSchema::validate_patch(&json!({"stock": 5}))?;
        let updated = store.update_by_id(created.id, patch).await?;
        assert_eq!(updated.stock, 5);
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.category, "Tools");
        assert_eq!(updated.price, 10.0);
        assert_eq!(updated.created_at, created.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn empty_patch_returns_current_row() -> anyhow::Result<()> {
        let store = SeaOrmUserStore { db: get_db().await? };
        let created = store
            .create(user::NewUser { email: "amy@example.com".into(), name: Some("Amy".into()) })
            .await?;
        let same = store.update_by_id(created.id, user::UserPatch::default()).await?;
        assert_eq!(same, created);
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows_are_not_found() -> anyhow::Result<()> {
        let store = SeaOrmProductStore { db: get_db().await? };
        let patch = product::ProductPatch { stock: Some(1), ..Default::default() };
        assert!(matches!(store.update_by_id(999_999, patch).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(store.delete_by_id(999_999).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_permanent() -> anyhow::Result<()> {
        let store = SeaOrmUserStore { db: get_db().await? };
        let created = store.create(user::NewUser { email: "gone@example.com".into(), name: None }).await?;
        store.delete_by_id(created.id).await?;
        assert!(store.list_all().await?.is_empty());
        assert!(matches!(store.delete_by_id(created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_a_store_error() -> anyhow::Result<()> {
        let store = SeaOrmUserStore { db: get_db().await? };
        let new = user::NewUser { email: "dup@example.com".into(), name: None };
        store.create(new.clone()).await?;
        assert!(matches!(store.create(new).await, Err(ServiceError::Db(_))));
        Ok(())
    }

    #[tokio::test]
    async fn aggregates_count_and_project() -> anyhow::Result<()> {
        let store = SeaOrmProductStore { db: get_db().await? };
        store.create(new_product("Low", 2.0, 3)).await?;
        store.create(new_product("Edge", 4.0, 10)).await?;
        store.create(new_product("High", 1.5, 20)).await?;
        assert_eq!(store.count(None).await?, 3);
        assert_eq!(store.count(Some(ProductFilter::StockBelow(10))).await?, 1);
        let mut pairs = store.price_and_stock().await?;
        pairs.sort_by_key(|(_, stock)| *stock);
        assert_eq!(pairs, vec![(2.0, 3), (4.0, 10), (1.5, 20)]);
        Ok(())
    }
}
