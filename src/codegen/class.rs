//! Class Emission

use crate::error::Result;
use crate::schema::SchemaDescriptor;

use super::field::{py_str, render_field};
use super::names::{validate_schema_names, NAMESPACE_ATTRIBUTE};
use super::{RenderProfile, PROVENANCE_COMMENT, RECORD_BASE};

/// Render one schema as a class block ending in a newline.
///
/// Every field is rendered before anything is returned, so an unsupported
/// field or name fails the whole class.
pub fn render_class(schema: &SchemaDescriptor, profile: &RenderProfile) -> Result<String> {
    validate_schema_names(schema)?;

    let indent = &profile.indent;
    let mut output = String::new();

    output.push_str(&format!("class {}({}):\n", schema.name, RECORD_BASE));

    for line in PROVENANCE_COMMENT {
        output.push_str(&format!("{indent}{line}\n"));
    }

    if let Some(ns) = schema.namespace() {
        output.push_str(&format!("{indent}{NAMESPACE_ATTRIBUTE} = {}\n", py_str(ns)));
    }

    for field in schema.fields() {
        let line = render_field(field, &schema.name, profile)?;
        output.push_str(&format!("{indent}{line}\n"));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_foo_record() {
        let schema = SchemaDescriptor::new("FooRecord")
            .with_namespace("my.foo.bar")
            .field("field_1", FieldType::text())
            .constant("a", 5)
            .field("bar", FieldType::integer());

        let expected = "class FooRecord(pyschema.Record):\n    \
            # WARNING: This class was generated by pyschema.to_python_source\n    \
            # there is a risk that any modification made to this class will be overwritten\n    \
            _namespace = 'my.foo.bar'\n    \
            field_1 = Text(nullable=True, default=None)\n    \
            bar = Integer(size=8, nullable=True, default=None)\n";

        assert_eq!(render_class(&schema, &RenderProfile::default()).unwrap(), expected);
    }

    #[test]
    fn test_custom_indent_and_no_fields() {
        let schema = SchemaDescriptor::new("Empty");
        let out = render_class(&schema, &RenderProfile::with_indent("\t")).unwrap();
        assert_eq!(
            out,
            "class Empty(pyschema.Record):\n\
             \t# WARNING: This class was generated by pyschema.to_python_source\n\
             \t# there is a risk that any modification made to this class will be overwritten\n"
        );
    }

    #[test]
    fn test_unsupported_field_fails_class() {
        let schema = SchemaDescriptor::new("Shape")
            .field("name", FieldType::text())
            .field("outline", FieldType::opaque("Polygon"));
        assert!(render_class(&schema, &RenderProfile::default()).is_err());
    }

    #[test]
    fn test_invalid_names_fail_class() {
        let schema = SchemaDescriptor::new("Foo")
            .field("ok", FieldType::text())
            .field("_namespace", FieldType::text());
        assert!(matches!(
            render_class(&schema, &RenderProfile::default()),
            Err(crate::error::SourceGenError::InvalidName { .. })
        ));
    }
}
