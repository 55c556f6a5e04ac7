//! Catalog webservice client
//!
//! HTTP implementation of the `CatalogService` port against a
//! GENESIS-style JSON webservice.

mod client;

pub use client::{GenesisClient, GenesisClientConfig};
