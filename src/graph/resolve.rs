//! Dependency Resolution
//!
//! Computes the closure of requested schemas over nested-record edges and an
//! emission order where every dependency precedes its dependents.
//!
//! Traversal is depth-first from each root in root order, driven by an explicit
//! stack so cyclic or deeply nested input can't exhaust the call stack. A schema
//! reached again while it is still on the stack is a cycle; self references are
//! the one-edge case of the same rule.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, SourceGenError};
use crate::schema::{SchemaDescriptor, SchemaSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the traversal stack
    Visiting,
    /// Emitted
    Done,
}

struct Frame<'s> {
    schema: &'s SchemaDescriptor,
    deps: Vec<&'s str>,
    next: usize,
}

impl<'s> Frame<'s> {
    fn new(schema: &'s SchemaDescriptor) -> Self {
        Self {
            schema,
            deps: schema.dependencies(),
            next: 0,
        }
    }
}

/// Resolve `roots` into a dependency-first sequence of schemas.
///
/// Each reachable schema appears exactly once, at the position dictated by
/// the first traversal that reached it. Unrelated schemas keep discovery order.
pub fn resolve<'s, R: AsRef<str>>(set: &'s SchemaSet, roots: &[R]) -> Result<Vec<&'s SchemaDescriptor>> {
    let mut marks: HashMap<&'s str, Mark> = HashMap::new();
    let mut order = Vec::new();

    for root in roots {
        let schema = lookup(set, root.as_ref(), None)?;
        visit(set, schema, &mut marks, &mut order)?;
    }

    debug!(roots = roots.len(), resolved = order.len(), "resolved schema closure");
    Ok(order)
}

fn visit<'s>(
    set: &'s SchemaSet,
    root: &'s SchemaDescriptor,
    marks: &mut HashMap<&'s str, Mark>,
    order: &mut Vec<&'s SchemaDescriptor>,
) -> Result<()> {
    if marks.contains_key(root.name.as_str()) {
        return Ok(());
    }

    marks.insert(&root.name, Mark::Visiting);
    let mut stack = vec![Frame::new(root)];

    while let Some(frame) = stack.last_mut() {
        if frame.next < frame.deps.len() {
            let dep = frame.deps[frame.next];
            let referrer = frame.schema;
            frame.next += 1;

            match marks.get(dep) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => return Err(cycle_error(&stack, dep)),
                None => {
                    let schema = lookup(set, dep, Some(referrer.name.as_str()))?;
                    marks.insert(&schema.name, Mark::Visiting);
                    stack.push(Frame::new(schema));
                }
            }
        } else if let Some(done) = stack.pop() {
            marks.insert(&done.schema.name, Mark::Done);
            order.push(done.schema);
        }
    }

    Ok(())
}

fn lookup<'s>(set: &'s SchemaSet, name: &str, referenced_by: Option<&str>) -> Result<&'s SchemaDescriptor> {
    set.get(name).ok_or_else(|| SourceGenError::UnknownSchema {
        name: name.to_string(),
        referenced_by: referenced_by.map(str::to_string),
    })
}

/// Cycle path from the first stack entry for `dep` back to `dep`
fn cycle_error(stack: &[Frame<'_>], dep: &str) -> SourceGenError {
    let start = stack
        .iter()
        .position(|f| f.schema.name == dep)
        .unwrap_or(0);

    let mut cycle: Vec<String> = stack[start..]
        .iter()
        .map(|f| f.schema.name.clone())
        .collect();
    cycle.push(dep.to_string());

    SourceGenError::CircularDependency {
        schema: dep.to_string(),
        cycle,
    }
}
