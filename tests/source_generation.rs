//! Compatibility Tests for Generated Source
//!
//! Exact-text expectations match what the pyschema library itself emits, so
//! regenerated modules stay drop-in replacements.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tempfile::tempdir;

use schema_sourcegen::{
    header, loader, render_classes, render_source, write_package, DirectorySink, FieldType,
    MemorySink, SchemaDescriptor, SchemaSet, SourceGenError,
};

const FOO_RECORD: &str = "class FooRecord(pyschema.Record):
    # WARNING: This class was generated by pyschema.to_python_source
    # there is a risk that any modification made to this class will be overwritten
    _namespace = 'my.foo.bar'
    field_1 = Text(nullable=True, default=None)
    bar = Integer(size=8, nullable=True, default=None)
";

const PARENT_AND_CHILD: &str = "class Child(pyschema.Record):
    # WARNING: This class was generated by pyschema.to_python_source
    # there is a risk that any modification made to this class will be overwritten
    a = Integer(size=8, nullable=True, default=None)


class Parent(pyschema.Record):
    # WARNING: This class was generated by pyschema.to_python_source
    # there is a risk that any modification made to this class will be overwritten
    child = SubRecord(schema=Child, nullable=True, default=None)
";

// =============================================================================
// Fixtures
// =============================================================================

fn foo_record() -> SchemaDescriptor {
    SchemaDescriptor::new("FooRecord")
        .with_namespace("my.foo.bar")
        .field("field_1", FieldType::text())
        .constant("a", 5)
        .field("bar", FieldType::integer())
}

fn records() -> SchemaSet {
    SchemaSet::from_schemas([
        foo_record(),
        SchemaDescriptor::new("EnumRecord").field("e", FieldType::enumeration(["HELLO", "GOODBYE"])),
        SchemaDescriptor::new("Child").field("a", FieldType::integer()),
        SchemaDescriptor::new("Parent").field("child", FieldType::sub_record("Child")),
        SchemaDescriptor::new("B").field("text", FieldType::text()),
        SchemaDescriptor::new("A")
            .field("b", FieldType::sub_record("B"))
            .field("bs", FieldType::list(FieldType::sub_record("B"))),
        SchemaDescriptor::new("SelfReferencingRecord").field("other_record", FieldType::self_ref()),
    ])
    .unwrap()
}

fn namespaced() -> SchemaSet {
    SchemaSet::from_schemas([
        SchemaDescriptor::new("ChildWithOwnNameSpace")
            .with_namespace("test.pyschema_test_child")
            .field("a", FieldType::integer()),
        SchemaDescriptor::new("ChildWithSameNamespace").with_namespace("pyschema_test_parent"),
        SchemaDescriptor::new("ParentWithNameSpace")
            .with_namespace("pyschema_test_parent")
            .field("child", FieldType::sub_record("ChildWithOwnNameSpace"))
            .field("other", FieldType::sub_record("ChildWithSameNamespace")),
    ])
    .unwrap()
}

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn declared_classes(src: &str) -> HashSet<String> {
    let re = Regex::new(r"class (\w+)\(").unwrap();
    re.captures_iter(src).map(|c| c[1].to_string()).collect()
}

/// The generated module can be executed top to bottom: the header comes first,
/// every referenced class is declared before the line that uses it, and every
/// requested schema ends up declared.
fn assert_loadable(src: &str, expected: &[&str]) {
    assert!(src.starts_with(header()), "missing header:\n{src}");

    let class_re = Regex::new(r"^class (\w+)\(pyschema\.Record\):$").unwrap();
    let ref_re = Regex::new(r"schema=(\w+)").unwrap();
    let mut declared = HashSet::new();

    for line in src.lines() {
        if let Some(c) = class_re.captures(line) {
            assert!(declared.insert(c[1].to_string()), "{} declared twice", &c[1]);
            continue;
        }
        for r in ref_re.captures_iter(line) {
            assert!(declared.contains(&r[1]), "{} used before declaration in:\n{src}", &r[1]);
        }
    }

    for name in expected {
        assert!(declared.contains(*name), "{name} not declared in:\n{src}");
    }
}

// =============================================================================
// Single Unit
// =============================================================================

#[test]
fn test_foo_record_source() {
    let src = render_classes(&records(), &["FooRecord"], "    ").unwrap();
    assert_eq!(src, FOO_RECORD);
}

#[test]
fn test_implicit_inclusion() {
    let src = render_classes(&records(), &["Parent"], "    ").unwrap();
    assert_eq!(src, PARENT_AND_CHILD);
}

#[test]
fn test_render_source_is_header_plus_classes() {
    let src = render_source(&records(), &["Parent"]).unwrap();
    assert_eq!(src, format!("{}\n{}", header(), PARENT_AND_CHILD));
}

#[test]
fn test_parsable_foo_record() {
    let src = render_source(&records(), &["FooRecord"]).unwrap();
    assert_loadable(&src, &["FooRecord"]);
}

#[test]
fn test_parsable_enum_record() {
    let src = render_source(&records(), &["EnumRecord"]).unwrap();
    assert_loadable(&src, &["EnumRecord"]);
    assert!(src.contains("    e = Enum(['HELLO', 'GOODBYE'], nullable=True, default=None)\n"));
}

#[test]
fn test_parsable_dependent_records_in_either_order() {
    let set = records();
    let ab = render_source(&set, &["A", "B"]).unwrap();
    let ba = render_source(&set, &["B", "A"]).unwrap();

    assert_loadable(&ab, &["A", "B"]);
    assert_loadable(&ba, &["A", "B"]);
    assert_eq!(ab, ba);
}

#[test]
fn test_deterministic() {
    let set = records();
    let roots = ["Parent", "FooRecord", "EnumRecord", "A"];
    let first = render_classes(&set, &roots, "    ").unwrap();
    let second = render_classes(&set, &roots, "    ").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_constant_members_are_not_fields() {
    let src = render_classes(&records(), &["FooRecord"], "    ").unwrap();
    let field_lines: Vec<_> = src.lines().filter(|l| l.contains("(nullable=") || l.contains(", nullable=")).collect();
    assert_eq!(field_lines.len(), 2);
    assert!(!src.contains(" a = "));
}

#[test]
fn test_self_reference_rejected_everywhere() {
    let set = records();
    let roots = ["SelfReferencingRecord"];

    assert!(matches!(
        render_classes(&set, &roots, "    "),
        Err(SourceGenError::CircularDependency { .. })
    ));
    assert!(matches!(
        render_source(&set, &roots),
        Err(SourceGenError::CircularDependency { .. })
    ));

    let mut sink = MemorySink::new();
    assert!(matches!(
        write_package(&set, &roots, &mut sink),
        Err(SourceGenError::CircularDependency { .. })
    ));
    assert!(sink.units.is_empty());
}

// =============================================================================
// Package Generation
// =============================================================================

#[test]
fn test_package_generation_no_namespace() {
    let dir = tempdir().unwrap();
    write_package(&records(), &["Parent"], &mut DirectorySink::new(dir.path())).unwrap();

    let src = fs::read_to_string(dir.path().join("__init__.py")).unwrap();
    assert_eq!(src, format!("{}\n{}", header(), PARENT_AND_CHILD));
}

#[test]
fn test_package_generation_namespace() {
    let dir = tempdir().unwrap();
    let written = write_package(&records(), &["FooRecord"], &mut DirectorySink::new(dir.path())).unwrap();

    assert_eq!(written.len(), 4);
    let src = fs::read_to_string(dir.path().join("my/foo/bar.py")).unwrap();
    assert_eq!(src, FOO_RECORD);

    assert_eq!(fs::read_to_string(dir.path().join("__init__.py")).unwrap(), header());
    assert_eq!(fs::read_to_string(dir.path().join("my/__init__.py")).unwrap(), "");
    assert_eq!(fs::read_to_string(dir.path().join("my/foo/__init__.py")).unwrap(), "");
}

#[test]
fn test_multiple_namespaces() {
    let dir = tempdir().unwrap();
    write_package(&namespaced(), &["ParentWithNameSpace"], &mut DirectorySink::new(dir.path())).unwrap();

    let parent = fs::read_to_string(dir.path().join("pyschema_test_parent.py")).unwrap();
    assert_eq!(
        declared_classes(&parent),
        HashSet::from(["ParentWithNameSpace".to_string(), "ChildWithSameNamespace".to_string()])
    );
    assert!(parent.find("class ChildWithSameNamespace(").unwrap() < parent.find("class ParentWithNameSpace(").unwrap());

    let child = fs::read_to_string(dir.path().join("test/pyschema_test_child.py")).unwrap();
    assert_eq!(declared_classes(&child), HashSet::from(["ChildWithOwnNameSpace".to_string()]));
}

#[test]
fn test_no_class_emitted_twice_across_units() {
    let mut sink = MemorySink::new();
    write_package(&namespaced(), &["ParentWithNameSpace", "ChildWithOwnNameSpace"], &mut sink).unwrap();

    let mut seen = HashSet::new();
    for content in sink.units.values() {
        for name in declared_classes(content) {
            assert!(seen.insert(name.clone()), "{name} emitted in more than one unit");
        }
    }
    assert_eq!(seen.len(), 3);
}

// =============================================================================
// Definition Files
// =============================================================================

#[test]
fn test_json_fixture_matches_builder_output() {
    let set = loader::load_path(&fixtures_path().join("records.json")).unwrap();

    assert_eq!(render_classes(&set, &["FooRecord"], "    ").unwrap(), FOO_RECORD);
    assert_eq!(render_classes(&set, &["Parent"], "    ").unwrap(), PARENT_AND_CHILD);

    let enum_src = render_source(&set, &["EnumRecord"]).unwrap();
    assert_loadable(&enum_src, &["EnumRecord"]);
    assert!(enum_src.contains("    e = Enum(['HELLO', 'GOODBYE'], nullable=True, default=None)\n"));
}

#[test]
fn test_loaded_definitions_with_bad_names_rejected() {
    let doc = serde_json::json!({
        "name": "my record",
        "fields": [
            { "name": "class", "type": "Text" },
            { "name": "_namespace", "type": "Text" }
        ]
    });
    let set = SchemaSet::from_schemas(loader::parse_document(&doc, Path::new("bad.json")).unwrap()).unwrap();

    assert!(matches!(
        render_source(&set, &["my record"]),
        Err(SourceGenError::InvalidName { .. })
    ));
    let mut sink = MemorySink::new();
    assert!(write_package(&set, &["my record"], &mut sink).is_err());
    assert!(sink.units.is_empty());
}

#[test]
fn test_toml_fixture_package() {
    let set = loader::load_path(&fixtures_path().join("namespaces.toml")).unwrap();
    let mut sink = MemorySink::new();
    write_package(&set, &["ParentWithNameSpace"], &mut sink).unwrap();

    let child = sink.get("test/pyschema_test_child.py").unwrap();
    assert!(child.starts_with("class ChildWithOwnNameSpace(pyschema.Record):\n"));
    assert!(sink.get("test/__init__.py").is_some());
}

#[test]
fn test_self_reference_fixture_rejected() {
    let set = loader::load_path(&fixtures_path().join("self_reference.json")).unwrap();
    match render_source(&set, &["SelfReferencingRecord"]) {
        Err(SourceGenError::CircularDependency { schema, .. }) => assert_eq!(schema, "SelfReferencingRecord"),
        other => panic!("Expected CircularDependency, got {:?}", other),
    }
}
