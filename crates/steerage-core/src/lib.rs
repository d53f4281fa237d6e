#![forbid(unsafe_code)]

//! Categorical record aggregation for flow diagrams (headless).
//!
//! Design goals:
//! - deterministic, testable outputs (insertion-ordered nodes and links)
//! - pure recompute-from-scratch pipeline: same input, same output
//! - no rendering concerns; the positioned output is consumed by an external renderer

pub mod aggregate;
pub mod category;
pub mod error;
pub mod record;
pub mod survival;
pub mod table;

pub use aggregate::{FlowGraph, FlowLink, FlowNode, NodeRole, aggregate};
pub use category::{CategoryPolicy, UnknownAgePolicy, categorize, fixed_categories};
pub use error::{Error, Result};
pub use record::Record;
pub use survival::{SurvivalFilter, survival_probability};
pub use table::parse_table;

/// Demographic attributes the selector surface offers for the passenger table.
///
/// Aggregation itself accepts any attribute name; this list is the constrained
/// enum the CLI validates selectors against.
pub const DEMOGRAPHIC_ATTRIBUTES: [&str; 6] =
    ["gender", "class", "age", "embarked", "sibsp", "survived"];
