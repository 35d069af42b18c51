//! Forward pipeline: text → tree → validation → typed config → expansion
//!
//! Stages run strictly in order and stop at the first fatal finding, so the
//! template engine never sees a document with validation errors.

use crate::core::document;
use crate::core::error::Diagnostic;
use crate::core::firewall::Config;
use crate::core::generate::{self, Direction, GenerateOptions};
use crate::core::template::{self, Expansion};
use crate::core::validate;
use tracing::debug;

/// Everything the forward stages produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    /// Fatal findings; `expansion` is `None` whenever this is non-empty
    pub errors: Vec<Diagnostic>,
    /// Validator warnings followed by template warnings
    pub warnings: Vec<Diagnostic>,
    pub expansion: Option<Expansion>,
}

impl Compilation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The expanded literal config, if the document was valid
    pub fn config(&self) -> Option<&Config> {
        self.expansion.as_ref().map(|e| &e.config)
    }

    /// Command lines for the expanded config; empty when compilation failed
    pub fn commands(&self, direction: Direction, options: &GenerateOptions) -> Vec<String> {
        generate::generate(self.config(), direction, options)
    }
}

/// Runs load, validate, normalize and expand over document text.
pub fn compile(text: &str) -> Compilation {
    let mut result = Compilation::default();

    let doc = match document::load(text) {
        Ok(doc) => doc,
        Err(e) => {
            result.errors.push(e.into());
            return result;
        }
    };

    let validation = validate::validate(&doc);
    result.warnings = validation.warnings;
    if !validation.errors.is_empty() {
        result.errors = validation.errors;
        return result;
    }

    let config = match Config::from_document(&doc) {
        Ok(config) => config,
        Err(e) => {
            result.errors.push(e.into());
            return result;
        }
    };

    let expansion = template::expand(&config);
    result.warnings.extend(expansion.warnings.iter().cloned());
    debug!(
        zones = expansion.config.zones.len(),
        warnings = result.warnings.len(),
        "compiled document"
    );
    result.expansion = Some(expansion);
    result
}
