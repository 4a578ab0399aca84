//! Schema Source Generator
//!
//! Rebuilds loadable pyschema source from in-memory record schema definitions.
//!
//! ## Features
//!
//! - **Implicit Inclusion**: Nested records are pulled in automatically
//! - **Dependency Ordering**: Every class is defined before it is referenced
//! - **Cycle Rejection**: Self and mutual references fail generation
//! - **Deterministic Output**: Same schemas, same bytes
//! - **Package Layout**: One module per namespace, no class emitted twice
//!
//! ## Example
//!
//! ```
//! use schema_sourcegen::{render_classes, FieldType, SchemaDescriptor, SchemaSet};
//!
//! let set = SchemaSet::from_schemas([
//!     SchemaDescriptor::new("Parent").field("child", FieldType::sub_record("Child")),
//!     SchemaDescriptor::new("Child").field("a", FieldType::integer()),
//! ])?;
//!
//! let src = render_classes(&set, &["Parent"], "    ")?;
//! assert!(src.find("class Child(").unwrap() < src.find("class Parent(").unwrap());
//! # Ok::<(), schema_sourcegen::SourceGenError>(())
//! ```
//!
//! ## Package layout
//!
//! ```text
//! out/
//! ├── __init__.py                 header + default namespace
//! ├── pyschema_test_parent.py
//! └── test/
//!     ├── __init__.py
//!     └── pyschema_test_child.py
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod schema;

pub use codegen::{
    header, plan_package, render_classes, render_source, write_package, DirectorySink, FileSink,
    MemorySink, PackageLayout, PackagePlan, RenderProfile,
};
pub use config::SourcegenConfig;
pub use error::{Result, SourceGenError};
pub use graph::{resolve, DependencyGraph};
pub use schema::{
    DefaultValue, FieldDescriptor, FieldKind, FieldType, Member, SchemaDescriptor, SchemaId,
    SchemaRef, SchemaSet,
};
