//! Codegen Configuration
//!
//! Two pieces:
//! - RenderProfile: how a single class block is formatted
//! - PackageLayout: how namespace groups map onto package units
//!
//! Resolution and ordering are config-free. Only rendering uses configuration.

use serde::{Deserialize, Serialize};

/// Indent used for class bodies
pub const DEFAULT_INDENT: &str = "    ";

/// Integer width in bytes when a field doesn't declare one
pub const DEFAULT_INTEGER_SIZE: u8 = 8;

/// Float width in bytes when a field doesn't declare one
pub const DEFAULT_FLOAT_SIZE: u8 = 8;

/// Text between consecutive class blocks (each block already ends in a newline)
pub const DEFAULT_CLASS_SEPARATOR: &str = "\n\n";

/// Preamble that makes a generated unit loadable on its own
pub const HEADER: &str = "import pyschema\nfrom pyschema.types import *\n";

/// Base class of every generated record
pub const RECORD_BASE: &str = "pyschema.Record";

/// Provenance comment placed at the top of every class body
pub const PROVENANCE_COMMENT: [&str; 2] = [
    "# WARNING: This class was generated by pyschema.to_python_source",
    "# there is a risk that any modification made to this class will be overwritten",
];

// =============================================================================
// Render Profile
// =============================================================================

/// Formatting of class blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderProfile {
    /// Indent string for class bodies
    pub indent: String,

    /// Substituted for Integer fields without a size
    pub integer_size: u8,

    /// Substituted for Float fields without a size
    pub float_size: u8,

    /// Separator between class blocks
    pub class_separator: String,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            integer_size: DEFAULT_INTEGER_SIZE,
            float_size: DEFAULT_FLOAT_SIZE,
            class_separator: DEFAULT_CLASS_SEPARATOR.to_string(),
        }
    }
}

impl RenderProfile {
    /// Default profile with a different indent
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Package Layout
// =============================================================================

/// Mapping of namespace groups onto package units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageLayout {
    /// Prefix namespaced units with the header as well.
    ///
    /// Off by default: only the top-level unit carries the header.
    pub header_in_namespaced_units: bool,

    /// File extension of module units
    pub module_extension: String,

    /// Module name of package units (the top-level unit and every directory)
    pub init_module: String,
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self {
            header_in_namespaced_units: false,
            module_extension: "py".to_string(),
            init_module: "__init__".to_string(),
        }
    }
}

impl PackageLayout {
    /// File name of a package unit, e.g. `__init__.py`
    pub fn init_file(&self) -> String {
        self.module_file(&self.init_module)
    }

    /// File name of a module unit, e.g. `bar.py`
    pub fn module_file(&self, module: &str) -> String {
        format!("{}.{}", module, self.module_extension)
    }
}
