//! Field extraction from recognized text.

mod parser;
pub mod rules;

pub use parser::{normalize_line, FieldParser, LineItems};
pub use rules::{FieldRule, RuleMatch, ValueKind};
