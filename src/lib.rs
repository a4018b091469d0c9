//! Normalizes bank CSV extracts into one transaction schema and loads them
//! idempotently into Postgres; snapshots the database to object storage.

pub mod backup;
pub mod config;
pub mod error;
pub mod layout;
pub mod loader;
pub mod migration;
pub mod models;
pub mod normalize;
pub mod store;
