pub mod envelope;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::{prepare_database, run, run_with, serve};
