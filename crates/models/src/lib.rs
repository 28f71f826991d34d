//! Persistence model: SeaORM entities for the `user` and `product` tables,
//! the request schemas that guard them, and the shared database handle.

pub mod errors;
pub mod db;
pub mod validation;
pub mod user;
pub mod product;
