//! Code Generation
//!
//! Turns resolved schemas back into pyschema source.
//!
//! Architecture:
//! - graph::resolve: closure + dependency-first order (config-free)
//! - field / class: pure renderers driven by a RenderProfile
//! - this module: assembles class blocks into a single source unit
//! - package: partitions the same ordered closure into namespace units
//!
//! Generation is all-or-nothing: any error aborts before text is returned.

pub mod class;
pub mod config;
pub mod field;
pub mod names;
pub mod package;

pub use class::render_class;
pub use config::{
    PackageLayout, RenderProfile, DEFAULT_CLASS_SEPARATOR, DEFAULT_FLOAT_SIZE, DEFAULT_INDENT,
    DEFAULT_INTEGER_SIZE, HEADER, PROVENANCE_COMMENT, RECORD_BASE,
};
pub use field::render_field;
pub use names::{is_identifier, validate_schema_names};
pub use package::{
    plan_package, write_package, write_package_with, DirectorySink, FileSink, GeneratedUnit,
    MemorySink, PackagePlan,
};

use tracing::debug;

use crate::error::Result;
use crate::graph::resolve;
use crate::schema::{SchemaDescriptor, SchemaId, SchemaSet};

// =============================================================================
// Generated Output
// =============================================================================

/// Output from single-unit generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    /// Generated source
    pub code: String,
    /// Emitted schemas, in emission order
    pub schemas: Vec<SchemaId>,
}

// =============================================================================
// Public API
// =============================================================================

/// The fixed preamble of a standalone unit
pub fn header() -> &'static str {
    HEADER
}

/// Class definitions for `roots` and everything they nest, without header
pub fn render_classes<R: AsRef<str>>(set: &SchemaSet, roots: &[R], indent: &str) -> Result<String> {
    let profile = RenderProfile::with_indent(indent);
    Ok(generate(set, roots, &profile, false)?.code)
}

/// Header followed by the class definitions for `roots`
pub fn render_source<R: AsRef<str>>(set: &SchemaSet, roots: &[R]) -> Result<String> {
    Ok(generate(set, roots, &RenderProfile::default(), true)?.code)
}

/// Resolve and render `roots` as one unit
pub fn generate<R: AsRef<str>>(
    set: &SchemaSet,
    roots: &[R],
    profile: &RenderProfile,
    include_header: bool,
) -> Result<GeneratedOutput> {
    let ordered = resolve(set, roots)?;
    let code = assemble(&ordered, profile, include_header)?;

    debug!(classes = ordered.len(), bytes = code.len(), "rendered source unit");

    Ok(GeneratedOutput {
        code,
        schemas: ordered.iter().map(|s| s.name.clone()).collect(),
    })
}

/// Join already ordered schemas into one unit
pub fn assemble(ordered: &[&SchemaDescriptor], profile: &RenderProfile, include_header: bool) -> Result<String> {
    let blocks = ordered
        .iter()
        .map(|schema| render_class(schema, profile))
        .collect::<Result<Vec<_>>>()?;

    let mut output = String::new();
    if include_header {
        output.push_str(HEADER);
        output.push('\n');
    }
    output.push_str(&blocks.join(&profile.class_separator));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceGenError;
    use crate::schema::FieldType;

    #[test]
    fn test_header_then_blank_line() {
        let set = SchemaSet::from_schemas([SchemaDescriptor::new("Solo")]).unwrap();
        let src = render_source(&set, &["Solo"]).unwrap();
        assert!(src.starts_with("import pyschema\nfrom pyschema.types import *\n\nclass Solo("));
    }

    #[test]
    fn test_empty_roots_render_nothing() {
        let set = SchemaSet::new();
        let roots: [&str; 0] = [];
        assert_eq!(render_classes(&set, &roots, DEFAULT_INDENT).unwrap(), "");
        assert_eq!(render_source(&set, &roots).unwrap(), format!("{HEADER}\n"));
    }

    #[test]
    fn test_generate_reports_order() {
        let set = SchemaSet::from_schemas([
            SchemaDescriptor::new("Parent").field("child", FieldType::sub_record("Child")),
            SchemaDescriptor::new("Child"),
        ])
        .unwrap();

        let out = generate(&set, &["Parent"], &RenderProfile::default(), false).unwrap();
        assert_eq!(out.schemas, vec!["Child", "Parent"]);
    }

    #[test]
    fn test_unsupported_field_aborts_unit() {
        let set = SchemaSet::from_schemas([
            SchemaDescriptor::new("Good").field("a", FieldType::text()),
            SchemaDescriptor::new("Bad").field("b", FieldType::opaque("Spline")),
        ])
        .unwrap();

        assert!(matches!(
            render_classes(&set, &["Good", "Bad"], DEFAULT_INDENT),
            Err(SourceGenError::UnsupportedFieldKind { .. })
        ));
    }

    #[test]
    fn test_invalid_names_abort_unit() {
        let set = SchemaSet::from_schemas([
            SchemaDescriptor::new("Fine").field("a", FieldType::text()),
            SchemaDescriptor::new("my record")
                .field("class", FieldType::text())
                .field("_namespace", FieldType::text()),
        ])
        .unwrap();

        match render_source(&set, &["Fine", "my record"]) {
            Err(SourceGenError::InvalidName { schema, name, .. }) => {
                assert_eq!(schema, "my record");
                assert_eq!(name, "my record");
            }
            other => panic!("Expected InvalidName, got {:?}", other),
        }
    }
}
