//! The path extractor (C1): parses a field-pattern expression and pulls
//! matching values out of an arbitrary JSON payload.

mod pattern;
mod traverse;

pub use pattern::{parse_fields, PatternNode};
pub use traverse::extract;
