//! Schema Dependency Graph
//!
//! petgraph view of nested-record references between schemas. Emission order
//! comes from [`resolve`]; this graph answers the questions around it (who
//! depends on whom, which groups of schemas form cycles) and exports DOT.

pub mod resolve;

pub use resolve::resolve;

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::schema::{SchemaId, SchemaSet};

/// A reference that names a schema missing from the set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    pub from: SchemaId,
    pub field: String,
    pub target: SchemaId,
}

/// The schema dependency graph
pub struct DependencyGraph {
    /// Edge weight is the field that carries the reference
    graph: DiGraph<SchemaId, String>,

    /// Node index lookup: name -> NodeIndex
    node_indices: HashMap<SchemaId, NodeIndex>,

    /// Namespace per schema, for labelling
    namespaces: HashMap<SchemaId, String>,

    dangling: Vec<DanglingRef>,
}

impl DependencyGraph {
    /// Build the graph over every schema in the set
    pub fn from_set(set: &SchemaSet) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut namespaces = HashMap::new();

        for schema in set.iter() {
            let idx = graph.add_node(schema.name.clone());
            node_indices.insert(schema.name.clone(), idx);
            if let Some(ns) = schema.namespace() {
                namespaces.insert(schema.name.clone(), ns.to_string());
            }
        }

        let mut dangling = Vec::new();
        for schema in set.iter() {
            let from = node_indices[&schema.name];
            for field in schema.fields() {
                for target in field.kind().schema_refs() {
                    let target = target.resolve(&schema.name);
                    match node_indices.get(target) {
                        Some(&to) => {
                            graph.add_edge(from, to, field.name.clone());
                        }
                        None => dangling.push(DanglingRef {
                            from: schema.name.clone(),
                            field: field.name.clone(),
                            target: target.to_string(),
                        }),
                    }
                }
            }
        }

        Self {
            graph,
            node_indices,
            namespaces,
            dangling,
        }
    }

    pub fn schema_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// References to schemas that are not in the set
    pub fn dangling_refs(&self) -> &[DanglingRef] {
        &self.dangling
    }

    /// Immediate dependencies, in field order, without repeats
    pub fn refs_out(&self, id: &str) -> Vec<&SchemaId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Immediate dependents, without repeats
    pub fn refs_in(&self, id: &str) -> Vec<&SchemaId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&SchemaId> {
        let Some(&node_idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        // petgraph walks a node's edges newest first
        let mut edges: Vec<_> = self.graph.edges_directed(node_idx, direction).collect();
        edges.sort_by_key(|e| e.id());

        let mut seen = HashSet::new();
        edges
            .into_iter()
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .filter(|idx| seen.insert(*idx))
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Groups of schemas that reference each other, including self references.
    ///
    /// Members are listed in set order, groups by their first member.
    pub fn cycles(&self) -> Vec<Vec<SchemaId>> {
        let mut groups: Vec<Vec<NodeIndex>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&n| self.graph.contains_edge(n, n))
            })
            .collect();

        for group in &mut groups {
            group.sort();
        }
        groups.sort();

        groups
            .into_iter()
            .map(|group| group.into_iter().map(|n| self.graph[n].clone()).collect())
            .collect()
    }

    /// Render the graph in GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph SchemaGraph {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n");
        output.push('\n');

        for idx in self.graph.node_indices() {
            let name = &self.graph[idx];
            let label = match self.namespaces.get(name) {
                Some(ns) => format!("{name}\\n{ns}"),
                None => name.clone(),
            };
            output.push_str(&format!("  \"{name}\" [label=\"{label}\"];\n"));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                self.graph[edge.source()],
                self.graph[edge.target()],
                edge.weight()
            ));
        }

        output.push_str("}\n");
        output
    }
}
