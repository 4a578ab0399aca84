//! Name Checks
//!
//! Every name that lands in generated source (class names, field names and
//! namespace segments) must be a plain Python identifier that isn't a keyword.
//! Checks run before rendering so a bad name never yields partial output.

use crate::error::{Result, SourceGenError};
use crate::schema::SchemaDescriptor;

/// Hard keywords; soft keywords (`match`, `case`, `type`) stay usable as names
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Class attribute the class renderer writes for namespaced records
pub const NAMESPACE_ATTRIBUTE: &str = "_namespace";

/// True for names usable as a Python identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let well_formed = matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');

    well_formed && !PYTHON_KEYWORDS.contains(&name)
}

/// Check the record name and every field name of `schema`
pub fn validate_schema_names(schema: &SchemaDescriptor) -> Result<()> {
    if !is_identifier(&schema.name) {
        return Err(invalid(schema, &schema.name, "not a Python identifier"));
    }

    for field in schema.fields() {
        if field.name == NAMESPACE_ATTRIBUTE {
            return Err(invalid(schema, &field.name, "reserved for the record namespace"));
        }
        if !is_identifier(&field.name) {
            return Err(invalid(schema, &field.name, "not a Python identifier"));
        }
    }

    Ok(())
}

fn invalid(schema: &SchemaDescriptor, name: &str, reason: &str) -> SourceGenError {
    SourceGenError::InvalidName {
        schema: schema.name.clone(),
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
