//! Record schema model
//!
//! Read-only view over record schemas as the generator consumes them. Schemas
//! reference each other by name through [`SchemaRef`], and a [`SchemaSet`]
//! resolves those names.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SourceGenError};

/// Canonical schema identifier (the record's class name)
pub type SchemaId = String;

/// Target of a nested-record field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaRef {
    /// Another schema in the same set, by name
    Named(SchemaId),
    /// The enclosing schema
    SelfRef,
}

impl SchemaRef {
    /// Sentinel spelling used by definition files for [`SchemaRef::SelfRef`]
    pub const SELF: &'static str = "SELF";

    pub fn named(name: impl Into<String>) -> Self {
        SchemaRef::Named(name.into())
    }

    /// Resolve to a concrete schema name given the enclosing schema
    pub fn resolve<'a>(&'a self, enclosing: &'a str) -> &'a str {
        match self {
            SchemaRef::Named(name) => name,
            SchemaRef::SelfRef => enclosing,
        }
    }
}

impl From<&str> for SchemaRef {
    fn from(s: &str) -> Self {
        if s == Self::SELF {
            SchemaRef::SelfRef
        } else {
            SchemaRef::Named(s.to_string())
        }
    }
}

/// Default value attached to a field
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DefaultValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<DefaultValue>),
}

impl From<bool> for DefaultValue {
    fn from(v: bool) -> Self {
        DefaultValue::Bool(v)
    }
}

impl From<i64> for DefaultValue {
    fn from(v: i64) -> Self {
        DefaultValue::Int(v)
    }
}

impl From<f64> for DefaultValue {
    fn from(v: f64) -> Self {
        DefaultValue::Float(v)
    }
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        DefaultValue::Str(v.to_string())
    }
}

/// Kind of a field, with kind-specific parameters
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Bytes,
    Boolean,
    /// Size in bytes; `None` renders the profile default
    Integer { size: Option<u8> },
    Float { size: Option<u8> },
    Date,
    DateTime,
    /// Allowed values in declared order
    Enum { values: Vec<String> },
    SubRecord { schema: SchemaRef },
    List { item: Box<FieldType> },
    Map { value: Box<FieldType> },
    /// A field type of the wider library that has no source rendering
    Opaque { type_name: String },
}

impl FieldKind {
    /// Constructor name in generated source
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::Bytes => "Bytes",
            FieldKind::Boolean => "Boolean",
            FieldKind::Integer { .. } => "Integer",
            FieldKind::Float { .. } => "Float",
            FieldKind::Date => "Date",
            FieldKind::DateTime => "DateTime",
            FieldKind::Enum { .. } => "Enum",
            FieldKind::SubRecord { .. } => "SubRecord",
            FieldKind::List { .. } => "List",
            FieldKind::Map { .. } => "Map",
            FieldKind::Opaque { type_name } => type_name,
        }
    }

    /// Nested-record references reachable through this kind, outermost first
    pub fn schema_refs(&self) -> Vec<&SchemaRef> {
        match self {
            FieldKind::SubRecord { schema } => vec![schema],
            FieldKind::List { item } => item.kind.schema_refs(),
            FieldKind::Map { value } => value.kind.schema_refs(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A field's type together with nullability and default
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub kind: FieldKind,
    pub nullable: bool,
    pub default: DefaultValue,
}

impl FieldType {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            nullable: true,
            default: DefaultValue::None,
        }
    }

    pub fn text() -> Self {
        Self::new(FieldKind::Text)
    }

    pub fn bytes() -> Self {
        Self::new(FieldKind::Bytes)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer { size: None })
    }

    pub fn integer_sized(size: u8) -> Self {
        Self::new(FieldKind::Integer { size: Some(size) })
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float { size: None })
    }

    pub fn date() -> Self {
        Self::new(FieldKind::Date)
    }

    pub fn date_time() -> Self {
        Self::new(FieldKind::DateTime)
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FieldKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn sub_record(schema: impl Into<String>) -> Self {
        Self::new(FieldKind::SubRecord {
            schema: SchemaRef::Named(schema.into()),
        })
    }

    /// Nested record of the enclosing schema's own type
    pub fn self_ref() -> Self {
        Self::new(FieldKind::SubRecord {
            schema: SchemaRef::SelfRef,
        })
    }

    pub fn list(item: FieldType) -> Self {
        Self::new(FieldKind::List { item: Box::new(item) })
    }

    pub fn map(value: FieldType) -> Self {
        Self::new(FieldKind::Map { value: Box::new(value) })
    }

    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Opaque {
            type_name: type_name.into(),
        })
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = default.into();
        self
    }
}

/// A named field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn kind(&self) -> &FieldKind {
        &self.field_type.kind
    }
}

/// One declared member of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDescriptor),
    /// Incidental attribute that is not a field (never emitted)
    Constant { name: String, value: serde_json::Value },
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field(field) => &field.name,
            Member::Constant { name, .. } => name,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDescriptor> {
        match self {
            Member::Field(field) => Some(field),
            Member::Constant { .. } => None,
        }
    }
}

/// A record schema definition
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    /// Record name, also its identity within a [`SchemaSet`]
    pub name: SchemaId,
    /// Dot-separated namespace; empty means the default namespace
    pub namespace: Option<String>,
    /// Members in declaration order
    pub members: Vec<Member>,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            members: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.members
            .push(Member::Field(FieldDescriptor::new(name, field_type)));
        self
    }

    pub fn constant(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.members.push(Member::Constant {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Namespace, with empty strings folded into `None`
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    /// Field members only, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.members.iter().filter_map(Member::as_field)
    }

    /// Names of schemas this one depends on, in field order (may repeat)
    pub fn dependencies(&self) -> Vec<&str> {
        self.fields()
            .flat_map(|f| f.kind().schema_refs())
            .map(|r| r.resolve(&self.name))
            .collect()
    }
}

/// Catalog of schemas keyed by name, preserving insertion order
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: Vec<SchemaDescriptor>,
    by_name: HashMap<SchemaId, usize>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, rejecting duplicate names
    pub fn from_schemas(schemas: impl IntoIterator<Item = SchemaDescriptor>) -> Result<Self> {
        let mut set = Self::new();
        for schema in schemas {
            set.insert(schema)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, schema: SchemaDescriptor) -> Result<()> {
        if self.by_name.contains_key(&schema.name) {
            return Err(SourceGenError::DuplicateSchema(schema.name));
        }
        self.by_name.insert(schema.name.clone(), self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDescriptor> {
        self.by_name.get(name).map(|&idx| &self.schemas[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All schemas in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SchemaDescriptor> {
        self.schemas.iter()
    }

    /// All names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.name.as_str())
    }

    /// Fuzzy search over schema names, best match first
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default().ignore_case();
        let mut results: Vec<(i64, &str)> = self
            .names()
            .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name)))
            .collect();

        results.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        results.into_iter().take(limit).map(|(_, name)| name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_skip_constants() {
        let schema = SchemaDescriptor::new("FooRecord")
            .field("field_1", FieldType::text())
            .constant("a", 5)
            .field("bar", FieldType::integer());

        let names: Vec<_> = schema.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["field_1", "bar"]);
        assert_eq!(schema.members.len(), 3);
    }

    #[test]
    fn test_empty_namespace_is_default() {
        let schema = SchemaDescriptor::new("A").with_namespace("");
        assert_eq!(schema.namespace(), None);
    }

    #[test]
    fn test_dependencies_through_containers() {
        let schema = SchemaDescriptor::new("Tree")
            .field("parent", FieldType::self_ref())
            .field("leaves", FieldType::list(FieldType::sub_record("Leaf")))
            .field("index", FieldType::map(FieldType::sub_record("Entry")));

        assert_eq!(schema.dependencies(), vec!["Tree", "Leaf", "Entry"]);
    }

    #[test]
    fn test_self_sentinel_from_str() {
        assert_eq!(SchemaRef::from("SELF"), SchemaRef::SelfRef);
        assert_eq!(SchemaRef::from("Child"), SchemaRef::named("Child"));
    }

    #[test]
    fn test_search_names() {
        let set = SchemaSet::from_schemas([
            SchemaDescriptor::new("ParentWithNameSpace"),
            SchemaDescriptor::new("Child"),
        ])
        .unwrap();

        assert_eq!(set.search("parentns", 5), vec!["ParentWithNameSpace"]);
        assert!(set.search("zzz", 5).is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = SchemaSet::from_schemas([SchemaDescriptor::new("A"), SchemaDescriptor::new("A")]);
        assert!(matches!(result, Err(SourceGenError::DuplicateSchema(name)) if name == "A"));
    }
}
