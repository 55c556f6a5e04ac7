//! # Quader Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Sync decision policy (when to update, when to export)
//! - Fact identity computation
//! - Fact normalization and unpacking
//! - Metadata value coercion
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `quader-domain`
//! - No filesystem, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod export;
pub mod facts;
pub mod identity;
pub mod policy;
pub mod ports;
pub mod values;

// Re-export specific items to avoid ambiguity
pub use export::ExportPipeline;
pub use facts::{normalize_fact, unpack_fact};
pub use identity::compute_fact_id;
pub use policy::{export_due, matches_prefix, update_due};
pub use ports::{CatalogService, FactExtractor};
pub use values::coerce_value;
