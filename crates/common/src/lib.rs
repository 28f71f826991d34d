//! Helpers shared by the server crate and binary: logging setup, startup
//! environment checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;

