//! Tabular fact extraction
//!
//! Concrete `FactExtractor` for the flat semicolon-delimited payloads the
//! export webservice ships. The engine itself never looks inside a
//! payload; everything format-specific lives here.

mod tabular;

pub use tabular::TabularExtractor;
