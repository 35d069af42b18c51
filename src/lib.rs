//! DFWC - Declarative Firewalld Compiler
//!
//! Translates a declarative YAML/JSON description of firewalld zones and
//! direct rules into an ordered `firewall-cmd` script, and parses such
//! scripts back into a config fragment.
//!
//! # Architecture
//!
//! - [`core`] - Validation, template expansion, command generation, reverse parsing, merging
//! - [`validators`] - Lexical checks for ports, interfaces, addresses, log prefixes
//! - [`config`] - CLI defaults persistence
//! - [`utils`] - Utility functions (XDG directories, atomic writes, etc.)
//!
//! # Pipeline
//!
//! ```text
//! text ─load─▶ tree ─validate─▶ Config ─expand─▶ literal Config ─generate─▶ lines
//!                                                      ▲
//! lines ──────────────────reverse_parse───────────────┘ (fragment, then merge)
//! ```
//!
//! Nothing here executes commands or talks to a running firewalld.
//!
//! # Example
//!
//! ```
//! use dfwc::core::generate::{Direction, GenerateOptions};
//! use dfwc::core::pipeline::compile;
//!
//! let result = compile("zones:\n  public:\n    services: [ssh]\n");
//! let lines = result.commands(Direction::Apply, &GenerateOptions::default());
//! assert_eq!(lines[1], "firewall-cmd --permanent --zone=public --add-service=ssh");
//! ```

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod core;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use core::error::{Diagnostic, Error, Result};
pub use core::firewall::{Config, Zone};
