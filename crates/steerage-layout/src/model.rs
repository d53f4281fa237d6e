use serde::{Deserialize, Serialize};
use steerage_core::NodeRole;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// One endpoint of a link band. The external renderer draws a smoothed
/// connector between the two points with stroke thickness `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeLayout {
    pub id: String,
    pub role: NodeRole,
    pub index: usize,
    /// Column rank: 0 on the source side, 1 + max feeding depth on the target side.
    pub depth: usize,
    /// Sum of the values of all incident links.
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLinkLayout {
    pub index: usize,
    pub source: String,
    pub target: String,
    pub value: f64,
    /// Band thickness in layout units.
    pub width: f64,
    /// Exit point on the source node's right edge, entry point on the target
    /// node's left edge.
    pub points: [LinkPoint; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLayout {
    pub bounds: Option<Bounds>,
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
    pub nodes: Vec<FlowNodeLayout>,
    pub links: Vec<FlowLinkLayout>,
}
