//! Core translation between declarative firewalld configs and `firewall-cmd`
//!
//! Forward direction, in pipeline order:
//!
//! - [`document`]: Text to generic tree, with syntax-error line numbers
//! - [`validate`]: Structural checks and warnings over the raw tree
//! - [`firewall`]: Typed model and normalization of accepted shapes
//! - [`template`]: Variables, loops and rule-group expansion
//! - [`generate`]: Ordered command lines for apply or remove
//!
//! Reverse direction and utilities:
//!
//! - [`reverse`]: Command text back into a config fragment
//! - [`merge`]: Deep merge with per-entity deduplication
//! - [`rich_rule`]: Rich-rule rendering and parsing
//! - [`tokenize`]: Quote-aware shell word splitting and quoting
//! - [`schema`]: Closed key catalogs, enums and flag mapping
//! - [`pipeline`]: The forward stages chained together
//! - [`error`]: Error and diagnostic types

pub mod document;
pub mod error;
pub mod firewall;
pub mod generate;
pub mod merge;
pub mod pipeline;
pub mod reverse;
pub mod rich_rule;
pub mod schema;
pub mod template;
pub mod tokenize;
pub mod validate;

pub use error::{Diagnostic, Error, Result};

#[cfg(test)]
pub mod test_helpers;
