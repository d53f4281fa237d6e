#![forbid(unsafe_code)]

//! `steerage` is a headless flow-diagram pipeline for tabular categorical
//! records: bucket each record into a (source, target) category pair for two
//! selected attributes, aggregate pair counts into a weighted bipartite graph,
//! and lay the graph out as positioned nodes and proportional link bands.
//!
//! Rendering, scroll wiring and styling are external concerns; the
//! [`layout::FlowLayout`] output is the contract a renderer consumes.

pub use steerage_core::*;

pub mod layout {
    pub use steerage_layout::{
        Bounds, Error, FlowLayout, FlowLinkLayout, FlowNodeLayout, LayoutOptions, LinkPoint,
        Result, layout_flow,
    };
}

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything one recomputation needs besides the records and the two
/// selected attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub layout: layout::LayoutOptions,
    pub categories: CategoryPolicy,
}

/// Runs the whole pipeline: categorize, aggregate, lay out.
///
/// Pure and deterministic; nodes and links are rebuilt from scratch on every
/// call, so identical input yields identical output. Empty records yield an
/// empty layout.
pub fn flow_layout(
    records: &[Record],
    source_attribute: &str,
    target_attribute: &str,
    config: &FlowConfig,
) -> layout::Result<layout::FlowLayout> {
    debug!(
        records = records.len(),
        source = source_attribute,
        target = target_attribute,
        "recomputing flow layout"
    );
    let graph = aggregate(
        records,
        source_attribute,
        target_attribute,
        &config.categories,
    );
    layout::layout_flow(&graph, &config.layout)
}
