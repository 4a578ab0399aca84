//! Package Emission
//!
//! Partitions the resolved closure into one unit per namespace:
//!
//! ```text
//! <root>/
//! ├── __init__.py          header + schemas without a namespace
//! ├── my/
//! │   ├── __init__.py      structural, empty
//! │   └── foo/
//! │       ├── __init__.py  structural, empty
//! │       └── bar.py       schemas in "my.foo.bar"
//! ```
//!
//! A schema always lands in the unit of its own namespace, never in the unit of
//! whichever schema pulled it in. The plan is pure; writing goes through a
//! [`FileSink`].

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, SourceGenError};
use crate::graph::resolve;
use crate::schema::{SchemaDescriptor, SchemaId, SchemaSet};

use super::names::is_identifier;
use super::{assemble, PackageLayout, RenderProfile, HEADER};

// =============================================================================
// File Sinks
// =============================================================================

/// Destination for generated units
pub trait FileSink {
    /// Write `content` at `path`, relative to the sink's root
    fn write_unit(&mut self, path: &Path, content: &str) -> io::Result<()>;
}

/// Writes units below a directory, creating parent directories as needed
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSink for DirectorySink {
    fn write_unit(&mut self, path: &Path, content: &str) -> io::Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, content)
    }
}

/// Keeps units in memory, ordered by path
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub units: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.units.get(path.as_ref()).map(String::as_str)
    }
}

impl FileSink for MemorySink {
    fn write_unit(&mut self, path: &Path, content: &str) -> io::Result<()> {
        self.units.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

// =============================================================================
// Package Plan
// =============================================================================

/// One output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Path relative to the package root
    pub path: PathBuf,
    /// Namespace whose schemas this unit holds; `None` for the top-level unit
    /// and for structural units
    pub namespace: Option<String>,
    /// Schemas defined in this unit, in emission order
    pub schemas: Vec<SchemaId>,
    pub content: String,
}

/// All units of a package, ordered by path
#[derive(Debug, Clone, Default)]
pub struct PackagePlan {
    pub units: Vec<GeneratedUnit>,
}

impl PackagePlan {
    pub fn unit(&self, path: impl AsRef<Path>) -> Option<&GeneratedUnit> {
        let path = path.as_ref();
        self.units.iter().find(|u| u.path == path)
    }

    /// The unit that defines `schema`
    pub fn unit_for(&self, schema: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|u| u.schemas.iter().any(|s| s == schema))
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.units.iter().map(|u| u.path.as_path()).collect()
    }

    /// Write every unit through `sink`, stopping at the first failure.
    ///
    /// Failures come back as [`SourceGenError::Sink`] carrying the unit path;
    /// the sink's own `io::Error` is available through `source()`.
    pub fn write_to<S: FileSink + ?Sized>(&self, sink: &mut S) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            sink.write_unit(&unit.path, &unit.content)
                .map_err(|source| SourceGenError::Sink {
                    path: unit.path.clone(),
                    source,
                })?;
            written.push(unit.path.clone());
        }
        info!(units = written.len(), "wrote package");
        Ok(written)
    }
}

/// Resolve `roots` and lay the closure out as package units
pub fn plan_package<R: AsRef<str>>(
    set: &SchemaSet,
    roots: &[R],
    profile: &RenderProfile,
    layout: &PackageLayout,
) -> Result<PackagePlan> {
    let ordered = resolve(set, roots)?;
    let groups = group_by_namespace(&ordered, layout)?;

    let namespaces: Vec<&str> = groups.iter().filter_map(|(ns, _)| *ns).collect();
    let mut units: BTreeMap<PathBuf, GeneratedUnit> = BTreeMap::new();

    // Top-level unit always exists and always carries the header
    let default_members = groups
        .iter()
        .find(|(ns, _)| ns.is_none())
        .map(|(_, members)| members.as_slice())
        .unwrap_or_default();
    let mut top = HEADER.to_string();
    if !default_members.is_empty() {
        top.push('\n');
        top.push_str(&assemble(default_members, profile, false)?);
    }
    insert_unit(
        &mut units,
        GeneratedUnit {
            path: PathBuf::from(layout.init_file()),
            namespace: None,
            schemas: names(default_members),
            content: top,
        },
    )?;

    for (ns, members) in &groups {
        let Some(ns) = ns else { continue };
        let is_package = namespaces
            .iter()
            .any(|other| other.len() > ns.len() && other.starts_with(ns) && other[ns.len()..].starts_with('.'));
        let path = namespace_path(ns, is_package, layout);

        debug!(namespace = %ns, path = %path.display(), schemas = members.len(), "namespace unit");

        let content = assemble(members, profile, layout.header_in_namespaced_units)?;
        insert_unit(
            &mut units,
            GeneratedUnit {
                path,
                namespace: Some(ns.to_string()),
                schemas: names(members),
                content,
            },
        )?;
    }

    // Every directory on the way to a namespace unit becomes a package
    for ns in &namespaces {
        let segments: Vec<&str> = ns.split('.').collect();
        for depth in 1..segments.len() {
            let mut path: PathBuf = segments[..depth].iter().collect();
            path.push(layout.init_file());
            units.entry(path.clone()).or_insert_with(|| GeneratedUnit {
                path,
                namespace: None,
                schemas: Vec::new(),
                content: String::new(),
            });
        }
    }

    Ok(PackagePlan {
        units: units.into_values().collect(),
    })
}

/// Write the package for `roots` through `sink` using default formatting
pub fn write_package<R, S>(set: &SchemaSet, roots: &[R], sink: &mut S) -> Result<Vec<PathBuf>>
where
    R: AsRef<str>,
    S: FileSink + ?Sized,
{
    write_package_with(set, roots, sink, &RenderProfile::default(), &PackageLayout::default())
}

/// Write the package for `roots` through `sink`
pub fn write_package_with<R, S>(
    set: &SchemaSet,
    roots: &[R],
    sink: &mut S,
    profile: &RenderProfile,
    layout: &PackageLayout,
) -> Result<Vec<PathBuf>>
where
    R: AsRef<str>,
    S: FileSink + ?Sized,
{
    plan_package(set, roots, profile, layout)?.write_to(sink)
}

// =============================================================================
// Helpers
// =============================================================================

type Group<'s> = (Option<&'s str>, Vec<&'s SchemaDescriptor>);

/// Split ordered schemas by their own namespace, keeping order in each group.
/// Groups are listed in order of first appearance.
fn group_by_namespace<'s>(ordered: &[&'s SchemaDescriptor], layout: &PackageLayout) -> Result<Vec<Group<'s>>> {
    let mut groups: Vec<Group<'s>> = Vec::new();
    let mut index: HashMap<Option<&'s str>, usize> = HashMap::new();

    for &schema in ordered {
        let ns = schema.namespace();
        if let Some(ns) = ns {
            validate_namespace(&schema.name, ns, layout)?;
        }
        let slot = *index.entry(ns).or_insert_with(|| {
            groups.push((ns, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(schema);
    }

    Ok(groups)
}

/// Segments must be identifiers and must not spell the package module name,
/// which would land the unit on a package file
fn validate_namespace(schema: &str, ns: &str, layout: &PackageLayout) -> Result<()> {
    let valid = ns
        .split('.')
        .all(|segment| is_identifier(segment) && segment != layout.init_module);

    if valid {
        Ok(())
    } else {
        Err(SourceGenError::InvalidNamespace {
            schema: schema.to_string(),
            namespace: ns.to_string(),
        })
    }
}

/// `a.b.c` -> `a/b/c.py`, or `a/b/c/__init__.py` when `a.b.c` has sub-namespaces
fn namespace_path(ns: &str, is_package: bool, layout: &PackageLayout) -> PathBuf {
    let segments: Vec<&str> = ns.split('.').collect();
    let (last, parents) = match segments.split_last() {
        Some((last, parents)) => (*last, parents),
        None => (ns, &[][..]),
    };

    let mut path: PathBuf = parents.iter().collect();
    if is_package {
        path.push(last);
        path.push(layout.init_file());
    } else {
        path.push(layout.module_file(last));
    }
    path
}

/// Add a unit at a path no other unit holds yet
fn insert_unit(units: &mut BTreeMap<PathBuf, GeneratedUnit>, unit: GeneratedUnit) -> Result<()> {
    match units.entry(unit.path.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(unit);
            Ok(())
        }
        Entry::Occupied(taken) => Err(SourceGenError::UnitConflict {
            namespace: unit.namespace.unwrap_or_default(),
            path: taken.key().clone(),
        }),
    }
}

fn names(schemas: &[&SchemaDescriptor]) -> Vec<SchemaId> {
    schemas.iter().map(|s| s.name.clone()).collect()
}
