pub mod airlines;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod ingest;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod output;
pub mod publish;
pub mod services;

#[cfg(test)]
mod testing;
