use std::sync::Arc;

use models::db::DbHandle;
use service::resource::{DeleteReply, ResourceService};
use service::store::{SeaOrmProductStore, SeaOrmUserStore};

/// Everything the router needs, built once at startup and handed in.
#[derive(Clone)]
pub struct AppState {
    pub db: DbHandle,
    pub users: ResourceService<SeaOrmUserStore>,
    pub products: ResourceService<SeaOrmProductStore>,
}

impl AppState {
    pub fn new(db: DbHandle) -> Self {
        let users = ResourceService::new(
            Arc::new(SeaOrmUserStore { db: db.conn().clone() }),
            "User",
            DeleteReply::NoContent,
        );
        let products = ResourceService::new(
            Arc::new(SeaOrmProductStore { db: db.conn().clone() }),
            "Product",
            DeleteReply::Confirmation,
        );
        Self { db, users, products }
    }
}
