//! Schema Definition Loader
//!
//! Reads record definitions from JSON or TOML files into a [`SchemaSet`].
//!
//! A document is either a single record, a list of records, or an object with a
//! `schemas` list:
//!
//! ```json
//! {
//!   "schemas": [
//!     {
//!       "name": "FooRecord",
//!       "namespace": "my.foo.bar",
//!       "fields": [
//!         { "name": "field_1", "type": "Text" },
//!         { "name": "a", "value": 5 },
//!         { "name": "bar", "type": "Integer", "size": 8, "nullable": false }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Entries with a `type` are fields; entries with only a `value` are constants.
//! `"schema": "SELF"` on a SubRecord refers to the enclosing record.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, SourceGenError};
use crate::schema::{
    DefaultValue, FieldDescriptor, FieldKind, FieldType, Member, SchemaDescriptor, SchemaRef,
    SchemaSet,
};

/// Load a file, or every `.json` / `.toml` file below a directory
pub fn load_path(path: &Path) -> Result<SchemaSet> {
    if path.is_dir() {
        load_directory(path)
    } else {
        let mut set = SchemaSet::new();
        for schema in load_file(path)? {
            set.insert(schema)?;
        }
        Ok(set)
    }
}

/// Load every definition file below `dir`, in path order
pub fn load_directory(dir: &Path) -> Result<SchemaSet> {
    let mut set = SchemaSet::new();
    let mut files = 0usize;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| SourceGenError::InvalidDefinition {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() || !is_definition_file(entry.path()) {
            continue;
        }
        for schema in load_file(entry.path())? {
            set.insert(schema)?;
        }
        files += 1;
    }

    debug!(dir = %dir.display(), files, schemas = set.len(), "loaded schema definitions");
    Ok(set)
}

fn is_definition_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("toml")
    )
}

/// Parse the records of one file
pub fn load_file(path: &Path) -> Result<Vec<SchemaDescriptor>> {
    let text = fs::read_to_string(path)?;
    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text)?,
        _ => serde_json::from_str(&text)?,
    };
    parse_document(&value, path)
}

/// Parse an already decoded document; `path` is only used for error messages
pub fn parse_document(doc: &Value, path: &Path) -> Result<Vec<SchemaDescriptor>> {
    let records = match doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("schemas") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => return Err(invalid(path, "`schemas` must be a list")),
            None => std::slice::from_ref(doc),
        },
        _ => return Err(invalid(path, "expected a record or a list of records")),
    };

    records.iter().map(|r| parse_schema(r, path)).collect()
}

fn parse_schema(json: &Value, path: &Path) -> Result<SchemaDescriptor> {
    let name = required_str(json, "name", path, "record")?;

    let namespace = match json.get("namespace") {
        None | Some(Value::Null) => None,
        Some(Value::String(ns)) => Some(ns.clone()),
        Some(_) => return Err(invalid(path, format!("{name}: `namespace` must be a string"))),
    };

    let members = match json.get("fields") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| parse_member(entry, name, path))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(invalid(path, format!("{name}: `fields` must be a list"))),
    };

    Ok(SchemaDescriptor {
        name: name.to_string(),
        namespace,
        members,
    })
}

fn parse_member(entry: &Value, schema: &str, path: &Path) -> Result<Member> {
    let name = required_str(entry, "name", path, schema)?;

    if entry.get("type").is_some() {
        let field_type = parse_type(entry, &format!("{schema}.{name}"), path)?;
        Ok(Member::Field(FieldDescriptor::new(name, field_type)))
    } else if let Some(value) = entry.get("value") {
        Ok(Member::Constant {
            name: name.to_string(),
            value: value.clone(),
        })
    } else {
        Err(invalid(path, format!("{schema}.{name}: member needs a `type` or a `value`")))
    }
}

/// Parse a field type; `context` names the field for error messages
fn parse_type(json: &Value, context: &str, path: &Path) -> Result<FieldType> {
    let type_name = required_str(json, "type", path, context)?;

    let kind = match type_name {
        "Text" => FieldKind::Text,
        "Bytes" => FieldKind::Bytes,
        "Boolean" => FieldKind::Boolean,
        "Date" => FieldKind::Date,
        "DateTime" => FieldKind::DateTime,
        "Integer" => FieldKind::Integer {
            size: parse_size(json, context, path)?,
        },
        "Float" => FieldKind::Float {
            size: parse_size(json, context, path)?,
        },
        "Enum" => {
            let values = json
                .get("values")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid(path, format!("{context}: Enum needs a `values` list")))?;
            let values = values
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid(path, format!("{context}: Enum values must be strings")))
                })
                .collect::<Result<Vec<_>>>()?;
            FieldKind::Enum { values }
        }
        "SubRecord" => FieldKind::SubRecord {
            schema: SchemaRef::from(required_str(json, "schema", path, context)?),
        },
        "List" => FieldKind::List {
            item: Box::new(parse_nested(json, "item", context, path)?),
        },
        "Map" => FieldKind::Map {
            value: Box::new(parse_nested(json, "value", context, path)?),
        },
        other => FieldKind::Opaque {
            type_name: other.to_string(),
        },
    };

    let nullable = match json.get("nullable") {
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(invalid(path, format!("{context}: `nullable` must be a boolean"))),
    };

    let default = match json.get("default") {
        None => DefaultValue::None,
        Some(v) => parse_default(v).ok_or_else(|| {
            invalid(path, format!("{context}: unsupported default value {v}"))
        })?,
    };

    Ok(FieldType {
        kind,
        nullable,
        default,
    })
}

fn parse_nested(json: &Value, key: &str, context: &str, path: &Path) -> Result<FieldType> {
    match json.get(key) {
        Some(inner @ Value::Object(_)) => parse_type(inner, context, path),
        _ => Err(invalid(path, format!("{context}: `{key}` must be a field type object"))),
    }
}

fn parse_size(json: &Value, context: &str, path: &Path) -> Result<Option<u8>> {
    match json.get("size") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .filter(|&n| n > 0)
            .map(Some)
            .ok_or_else(|| invalid(path, format!("{context}: `size` must be a positive byte count"))),
    }
}

fn parse_default(value: &Value) -> Option<DefaultValue> {
    match value {
        Value::Null => Some(DefaultValue::None),
        Value::Bool(b) => Some(DefaultValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(DefaultValue::Int)
            .or_else(|| n.as_f64().map(DefaultValue::Float)),
        Value::String(s) => Some(DefaultValue::Str(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(parse_default)
            .collect::<Option<Vec<_>>>()
            .map(DefaultValue::List),
        Value::Object(_) => None,
    }
}

fn required_str<'v>(json: &'v Value, key: &str, path: &Path, context: &str) -> Result<&'v str> {
    json.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(path, format!("{context}: missing string `{key}`")))
}

fn invalid(path: &Path, reason: impl Into<String>) -> SourceGenError {
    SourceGenError::InvalidDefinition {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}
