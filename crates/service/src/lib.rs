//! Service layer: the validate → persist pipeline shared by every resource.
//! - `store` is the narrow persistence interface, with SeaORM adapters.
//! - `resource` runs one operation for any store/schema pair.
//! - `stats` computes the product inventory aggregate.

pub mod errors;
pub mod store;
pub mod resource;
pub mod stats;
#[cfg(test)]
pub mod test_support;
