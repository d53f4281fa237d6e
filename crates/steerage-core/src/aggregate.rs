use crate::category::{CategoryPolicy, categorize, fixed_categories};
use crate::record::Record;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which side of the two-attribute selection a node belongs to.
///
/// Node identity is `(id, role)`, not the bare label: the same category label
/// selected on both sides yields two distinct nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Source,
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub role: NodeRole,
}

/// A weighted connector: how many records map to this (source, target)
/// category pair. `value >= 1`; pairs with zero occurrences are never created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    pub value: u64,
}

/// Aggregated bipartite flow graph. Nodes carry all source-side categories in
/// first-seen order, then all target-side categories; links are kept in
/// discovery order. Both orderings are part of the contract (deterministic
/// layout depends on them).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<FlowNode>,
    node_index: FxHashMap<(String, NodeRole), usize>,
    links: Vec<FlowLink>,
    link_index: FxHashMap<(String, String), usize>,
}

impl GraphBuilder {
    fn add_node(&mut self, id: &str, role: NodeRole) {
        let key = (id.to_string(), role);
        if self.node_index.contains_key(&key) {
            return;
        }
        self.node_index.insert(key, self.nodes.len());
        self.nodes.push(FlowNode {
            id: id.to_string(),
            role,
        });
    }

    fn count_pair(&mut self, source: String, target: String) {
        let key = (source.clone(), target.clone());
        if let Some(&idx) = self.link_index.get(&key) {
            self.links[idx].value += 1;
            return;
        }
        self.link_index.insert(key, self.links.len());
        self.links.push(FlowLink {
            source,
            target,
            value: 1,
        });
    }

    fn finish(self) -> FlowGraph {
        FlowGraph {
            nodes: self.nodes,
            links: self.links,
        }
    }
}

/// Buckets every record into a (source category, target category) pair and
/// counts pair occurrences.
///
/// Categories are discovered from the records in first-seen order, except for
/// attributes with a fixed label set (the age buckets), which are enumerated
/// up front; a fixed label with no matching records still becomes a node, with
/// no incident links. Selecting the same attribute for both sides is not
/// special-cased and produces reflexive pairs; keeping the two selectors
/// distinct is the caller's concern.
///
/// An empty record list yields an empty graph.
pub fn aggregate(
    records: &[Record],
    source_attribute: &str,
    target_attribute: &str,
    policy: &CategoryPolicy,
) -> FlowGraph {
    if records.is_empty() {
        return FlowGraph::default();
    }

    let mut builder = GraphBuilder::default();
    register_side(&mut builder, records, source_attribute, NodeRole::Source, policy);
    register_side(&mut builder, records, target_attribute, NodeRole::Target, policy);

    for record in records {
        let Some(source) = categorize(record, source_attribute, policy) else {
            continue;
        };
        let Some(target) = categorize(record, target_attribute, policy) else {
            continue;
        };
        builder.count_pair(source, target);
    }

    let graph = builder.finish();
    debug!(
        records = records.len(),
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        source = source_attribute,
        target = target_attribute,
        "aggregated flow graph"
    );
    graph
}

fn register_side(
    builder: &mut GraphBuilder,
    records: &[Record],
    attribute: &str,
    role: NodeRole,
    policy: &CategoryPolicy,
) {
    if let Some(labels) = fixed_categories(attribute, policy) {
        for label in labels {
            builder.add_node(&label, role);
        }
        return;
    }
    for record in records {
        if let Some(label) = categorize(record, attribute, policy) {
            builder.add_node(&label, role);
        }
    }
}
