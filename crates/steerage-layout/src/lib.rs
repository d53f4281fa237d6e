#![forbid(unsafe_code)]

//! Flow-diagram layout engine (headless).
//!
//! Takes an aggregated [`FlowGraph`](steerage_core::FlowGraph) and produces
//! positioned nodes and link bands for a fixed viewport: depth assignment,
//! value-proportional vertical partition per column, and proportional band
//! routing along each node's vertical extent. Rendering is an external
//! concern; the output is plain geometry.

pub mod model;

pub use model::{Bounds, FlowLayout, FlowLinkLayout, FlowNodeLayout, LinkPoint};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use steerage_core::{FlowGraph, NodeRole};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid flow graph: {message}")]
    InvalidGraph { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Viewport geometry for one layout computation, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub node_width: f64,
    /// Vertical gap between consecutive nodes in a column.
    pub node_padding: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            margin_x: 30.0,
            margin_y: 30.0,
            node_width: 20.0,
            node_padding: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    source_links: Vec<usize>,
    target_links: Vec<usize>,
    value: f64,
    depth: usize,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

#[derive(Debug, Clone)]
struct Link {
    source: usize,
    target: usize,
    value: f64,
    width: f64,
    source_y: f64,
    target_y: f64,
}

/// Lays out an aggregated flow graph.
///
/// Deterministic: node order within a column and link order within a node
/// follow the graph's insertion order, so identical input yields identical
/// output. An empty graph (or one with no links) short-circuits to an empty
/// layout.
///
/// Errors if a link references a category with no node on the matching side.
pub fn layout_flow(graph: &FlowGraph, options: &LayoutOptions) -> Result<FlowLayout> {
    if graph.nodes.is_empty() || graph.links.is_empty() {
        return Ok(empty_layout(options));
    }

    let mut node_by_key: FxHashMap<(&str, NodeRole), usize> = FxHashMap::default();
    for (i, node) in graph.nodes.iter().enumerate() {
        node_by_key.insert((node.id.as_str(), node.role), i);
    }

    let mut nodes: Vec<Node> = vec![Node::default(); graph.nodes.len()];
    let mut links: Vec<Link> = Vec::with_capacity(graph.links.len());
    for (i, link) in graph.links.iter().enumerate() {
        let source = *node_by_key
            .get(&(link.source.as_str(), NodeRole::Source))
            .ok_or_else(|| Error::InvalidGraph {
                message: format!("link references unknown source category {:?}", link.source),
            })?;
        let target = *node_by_key
            .get(&(link.target.as_str(), NodeRole::Target))
            .ok_or_else(|| Error::InvalidGraph {
                message: format!("link references unknown target category {:?}", link.target),
            })?;

        links.push(Link {
            source,
            target,
            value: link.value as f64,
            width: 0.0,
            source_y: 0.0,
            target_y: 0.0,
        });
        nodes[source].source_links.push(i);
        nodes[target].target_links.push(i);
    }

    assign_depths(&mut nodes, &links);
    assign_values(&mut nodes, &links);
    position_nodes(&mut nodes, options);
    route_links(&nodes, &mut links);

    debug!(
        nodes = nodes.len(),
        links = links.len(),
        width = options.width,
        height = options.height,
        "laid out flow graph"
    );

    let layout_nodes: Vec<FlowNodeLayout> = graph
        .nodes
        .iter()
        .zip(&nodes)
        .enumerate()
        .map(|(index, (meta, n))| FlowNodeLayout {
            id: meta.id.clone(),
            role: meta.role,
            index,
            depth: n.depth,
            value: n.value,
            x0: n.x0,
            x1: n.x1,
            y0: n.y0,
            y1: n.y1,
        })
        .collect();

    let layout_links: Vec<FlowLinkLayout> = graph
        .links
        .iter()
        .zip(&links)
        .enumerate()
        .map(|(index, (meta, l))| FlowLinkLayout {
            index,
            source: meta.source.clone(),
            target: meta.target.clone(),
            value: l.value,
            width: l.width,
            points: [
                LinkPoint {
                    x: nodes[l.source].x1,
                    y: l.source_y,
                },
                LinkPoint {
                    x: nodes[l.target].x0,
                    y: l.target_y,
                },
            ],
        })
        .collect();

    Ok(FlowLayout {
        bounds: Some(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: options.width,
            max_y: options.height,
        }),
        width: options.width,
        height: options.height,
        node_width: options.node_width,
        node_padding: options.node_padding,
        nodes: layout_nodes,
        links: layout_links,
    })
}

fn empty_layout(options: &LayoutOptions) -> FlowLayout {
    FlowLayout {
        bounds: None,
        width: options.width,
        height: options.height,
        node_width: options.node_width,
        node_padding: options.node_padding,
        nodes: Vec::new(),
        links: Vec::new(),
    }
}

/// Single forward pass over the links: a target sits one rank past its source.
///
/// This is enough for the two-level graphs the aggregator produces (every
/// source-role node feeds only target-role nodes). A general DAG would need a
/// fixed-point relaxation or a topological sort instead.
fn assign_depths(nodes: &mut [Node], links: &[Link]) {
    for link in links {
        if nodes[link.target].depth <= nodes[link.source].depth {
            nodes[link.target].depth = nodes[link.source].depth + 1;
        }
    }
}

fn assign_values(nodes: &mut [Node], links: &[Link]) {
    for node in nodes.iter_mut() {
        let outgoing: f64 = node.source_links.iter().map(|&li| links[li].value).sum();
        let incoming: f64 = node.target_links.iter().map(|&li| links[li].value).sum();
        node.value = outgoing + incoming;
    }
}

/// Partitions each column's vertical band `[margin_y, height - margin_y]`
/// among its nodes proportionally to value, in insertion order, with a
/// constant gap between consecutive nodes. Horizontal position comes straight
/// from the depth.
fn position_nodes(nodes: &mut [Node], options: &LayoutOptions) {
    let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
    for (i, node) in nodes.iter().enumerate() {
        columns[node.depth].push(i);
    }

    let kx = if max_depth == 0 {
        0.0
    } else {
        (options.width - 2.0 * options.margin_x - options.node_width) / max_depth as f64
    };

    for column in &columns {
        if column.is_empty() {
            continue;
        }
        let total: f64 = column.iter().map(|&ni| nodes[ni].value).sum();
        // A laid-out column always contains at least one linked node.
        debug_assert!(total > 0.0, "column aggregate value must be positive");

        let gaps = (column.len() - 1) as f64 * options.node_padding;
        let k = (options.height - 2.0 * options.margin_y - gaps) / total;

        let mut y = options.margin_y;
        for &ni in column {
            let node = &mut nodes[ni];
            node.x0 = options.margin_x + node.depth as f64 * kx;
            node.x1 = node.x0 + options.node_width;
            node.y0 = y;
            node.y1 = y + node.value * k;
            y = node.y1 + options.node_padding;
        }
    }
}

/// Routes each link band, partitioning every node's vertical extent among its
/// incident links proportionally to link value, in link discovery order.
///
/// Band thickness is `value * min(ksy, kty)` so a link never exceeds what
/// either endpoint can allocate when a node's per-side proportionality
/// constants differ. Running offsets are kept in explicit per-node tables.
fn route_links(nodes: &[Node], links: &mut [Link]) {
    let mut source_total = vec![0.0; nodes.len()];
    let mut target_total = vec![0.0; nodes.len()];
    for link in links.iter() {
        source_total[link.source] += link.value;
        target_total[link.target] += link.value;
    }

    let mut source_offset = vec![0.0; nodes.len()];
    let mut target_offset = vec![0.0; nodes.len()];
    for link in links.iter_mut() {
        let (s, t) = (link.source, link.target);
        // A link's endpoints carry at least this link's value.
        debug_assert!(source_total[s] > 0.0 && target_total[t] > 0.0);

        let ksy = (nodes[s].y1 - nodes[s].y0) / source_total[s];
        let kty = (nodes[t].y1 - nodes[t].y0) / target_total[t];
        let band = link.value * ksy.min(kty);

        link.width = band;
        link.source_y = nodes[s].y0 + source_offset[s] + band / 2.0;
        link.target_y = nodes[t].y0 + target_offset[t] + band / 2.0;
        source_offset[s] += band;
        target_offset[t] += band;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steerage_core::{FlowLink, FlowNode};

    fn graph(nodes: &[(&str, NodeRole)], links: &[(&str, &str, u64)]) -> FlowGraph {
        FlowGraph {
            nodes: nodes
                .iter()
                .map(|&(id, role)| FlowNode {
                    id: id.to_string(),
                    role,
                })
                .collect(),
            links: links
                .iter()
                .map(|&(source, target, value)| FlowLink {
                    source: source.to_string(),
                    target: target.to_string(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_graph_short_circuits() {
        let layout = layout_flow(&FlowGraph::default(), &LayoutOptions::default()).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.links.is_empty());
        assert!(layout.bounds.is_none());
    }

    #[test]
    fn target_depth_exceeds_source_depth() {
        let g = graph(
            &[
                ("1st", NodeRole::Source),
                ("yes", NodeRole::Target),
                ("no", NodeRole::Target),
            ],
            &[("1st", "yes", 3), ("1st", "no", 2)],
        );
        let layout = layout_flow(&g, &LayoutOptions::default()).unwrap();
        for link in &layout.links {
            let source = layout.nodes.iter().find(|n| n.id == link.source).unwrap();
            let target = layout
                .nodes
                .iter()
                .find(|n| n.id == link.target && n.role == NodeRole::Target)
                .unwrap();
            assert!(target.depth > source.depth);
        }
    }

    #[test]
    fn link_to_unknown_category_is_an_error() {
        let g = graph(&[("1st", NodeRole::Source)], &[("1st", "yes", 1)]);
        let err = layout_flow(&g, &LayoutOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidGraph { .. }));
    }

    #[test]
    fn same_label_on_both_sides_lands_in_two_columns() {
        let g = graph(
            &[
                ("1st", NodeRole::Source),
                ("1st", NodeRole::Target),
            ],
            &[("1st", "1st", 4)],
        );
        let layout = layout_flow(&g, &LayoutOptions::default()).unwrap();
        assert_eq!(layout.nodes[0].depth, 0);
        assert_eq!(layout.nodes[1].depth, 1);
        assert!(layout.nodes[1].x0 > layout.nodes[0].x1);
    }

    #[test]
    fn node_edges_carry_link_endpoints() {
        let g = graph(
            &[("a", NodeRole::Source), ("b", NodeRole::Target)],
            &[("a", "b", 1)],
        );
        let layout = layout_flow(&g, &LayoutOptions::default()).unwrap();
        let link = &layout.links[0];
        assert_eq!(link.points[0].x, layout.nodes[0].x1);
        assert_eq!(link.points[1].x, layout.nodes[1].x0);
    }
}
