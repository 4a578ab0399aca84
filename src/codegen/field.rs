//! Field Emission
//!
//! Renders one field as `<name> = <Kind>(<args>)`. Kind-specific arguments come
//! first, then `nullable` and `default`, which are always spelled out so the
//! generated class doesn't depend on library defaults.

use crate::error::{Result, SourceGenError};
use crate::schema::{DefaultValue, FieldDescriptor, FieldKind, FieldType};

use super::RenderProfile;

/// Render a field line (without indent) for a field of `enclosing`
pub fn render_field(field: &FieldDescriptor, enclosing: &str, profile: &RenderProfile) -> Result<String> {
    let ty = render_type(&field.field_type, enclosing, &field.name, profile)?;
    Ok(format!("{} = {}", field.name, ty))
}

/// Render a field type constructor call, e.g. `Integer(size=8, nullable=True, default=None)`
pub fn render_type(ty: &FieldType, enclosing: &str, field_name: &str, profile: &RenderProfile) -> Result<String> {
    let mut args = Vec::new();

    match &ty.kind {
        FieldKind::Text
        | FieldKind::Bytes
        | FieldKind::Boolean
        | FieldKind::Date
        | FieldKind::DateTime => {}
        FieldKind::Integer { size } => {
            args.push(format!("size={}", size.unwrap_or(profile.integer_size)));
        }
        FieldKind::Float { size } => {
            args.push(format!("size={}", size.unwrap_or(profile.float_size)));
        }
        FieldKind::Enum { values } => {
            let values: Vec<String> = values.iter().map(|v| py_str(v)).collect();
            args.push(format!("[{}]", values.join(", ")));
        }
        FieldKind::SubRecord { schema } => {
            args.push(format!("schema={}", schema.resolve(enclosing)));
        }
        FieldKind::List { item } => {
            args.push(render_type(item, enclosing, field_name, profile)?);
        }
        FieldKind::Map { value } => {
            args.push(render_type(value, enclosing, field_name, profile)?);
        }
        FieldKind::Opaque { type_name } => {
            return Err(SourceGenError::UnsupportedFieldKind {
                schema: enclosing.to_string(),
                field: field_name.to_string(),
                kind: type_name.clone(),
            });
        }
    }

    args.push(format!("nullable={}", py_bool(ty.nullable)));
    args.push(format!("default={}", py_literal(&ty.default)));

    Ok(format!("{}({})", ty.kind.type_name(), args.join(", ")))
}

// =============================================================================
// Literals
// =============================================================================

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Literal spelling of a default value
pub fn py_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::None => "None".to_string(),
        DefaultValue::Bool(b) => py_bool(*b).to_string(),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => py_float(*f),
        DefaultValue::Str(s) => py_str(s),
        DefaultValue::List(items) => {
            let items: Vec<String> = items.iter().map(py_literal).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn py_float(value: f64) -> String {
    if value.is_nan() {
        "float('nan')".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        }
    } else {
        // Debug keeps the fractional part on whole numbers (1.0, not 1)
        format!("{value:?}")
    }
}

/// Quoted string literal, preferring single quotes the way `repr` does
pub fn py_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
