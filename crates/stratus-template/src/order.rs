//! Deployment-order resolution using `petgraph`.
//!
//! Builds a directed graph from explicit `DependsOn` declarations and
//! implicit intrinsic references, and resolves a topological ordering for
//! provisioning.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use stratus_common::error::{Result, StratusError};

use crate::resource::ResourceGraph;
use crate::value::Value;

/// Returns the logical names of `graph` in creation order.
///
/// Dependencies appear before the resources that depend on them. Edges
/// come from explicit `DependsOn` declarations and from `Ref`,
/// `Fn::GetAtt`, and `Fn::Sub`-variable references between resources in
/// the same graph. References to names outside the graph are ignored;
/// they may be satisfied by a fragment merged later.
///
/// # Errors
///
/// Returns an error if the references form a cycle.
pub fn deploy_order(graph: &ResourceGraph) -> Result<Vec<String>> {
    let mut digraph = petgraph::Graph::<String, ()>::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

    for name in graph.logical_names() {
        let _ = indices.insert(name, digraph.add_node(name.to_owned()));
    }

    for (name, resource) in graph.iter() {
        let Some(&dependent) = indices.get(name.as_str()) else {
            continue;
        };
        let mut targets: Vec<&str> = Vec::new();
        if let Some(depends_on) = &resource.depends_on {
            targets.extend(depends_on.names());
        }
        for value in resource.properties.values() {
            collect_references(value, &mut targets);
        }
        for target in targets {
            if let Some(&dependency) = indices.get(target) {
                let _ = digraph.add_edge(dependency, dependent, ());
            }
        }
    }

    match petgraph::algo::toposort(&digraph, None) {
        Ok(order) => Ok(order
            .iter()
            .filter_map(|&idx| digraph.node_weight(idx).cloned())
            .collect()),
        Err(_cycle) => Err(StratusError::CyclicDependency {
            message: "resource references form a cycle".into(),
        }),
    }
}

/// Collects the logical names a value refers to, recursing through
/// collections and substitution variables.
fn collect_references<'a>(value: &'a Value, into: &mut Vec<&'a str>) {
    match value {
        Value::Ref(logical_name) => into.push(logical_name),
        Value::GetAtt { logical_name, .. } => into.push(logical_name),
        Value::Sub { variables, .. } => {
            if let Some(variables) = variables {
                for nested in variables.values() {
                    collect_references(nested, into);
                }
            }
        }
        Value::List(items) => {
            for item in items {
                collect_references(item, into);
            }
        }
        Value::Map(entries) => {
            for nested in entries.values() {
                collect_references(nested, into);
            }
        }
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => {}
    }
}
