//! Numeric configuration and simplification options
//!
//! Settings can come from a TOML file:
//!
//! ```toml
//! number = "fraction"
//!
//! [simplify]
//! exact_fractions = true
//! fractions_limit = 10000
//! max_depth = 512
//!
//! [simplify.context.multiply]
//! commutative = false
//! ```

use crate::error::{Error, Result};
use crate::simplify::FoldContext;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on expression nesting during a fold
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Preferred representation for numeric literals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NumberType {
    /// Double-precision floats, upgraded to exact fractions when lossless
    #[default]
    Number,
    /// Exact fractions
    Fraction,
    /// Arbitrary-precision decimals
    #[value(name = "bignumber")]
    BigNumber,
}

/// Process-wide default numeric configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathConfig {
    pub number: NumberType,
}

/// Options for one top-level constant fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyOptions {
    /// Store floats as exact fractions when that is lossless
    pub exact_fractions: bool,
    /// Numerator/denominator magnitude at which a fraction is abandoned
    pub fractions_limit: Option<u64>,
    /// Operator property overrides (associativity, commutativity)
    pub context: Option<FoldContext>,
    /// Maximum node nesting depth
    pub max_depth: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            exact_fractions: true,
            fractions_limit: None,
            context: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SimplifyOptions {
    pub fn exact_fractions(mut self, exact: bool) -> Self {
        self.exact_fractions = exact;
        self
    }

    pub fn fractions_limit(mut self, limit: u64) -> Self {
        self.fractions_limit = Some(limit);
        self
    }

    pub fn context(mut self, context: FoldContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub number: NumberType,
    pub simplify: SimplifyOptions,
}

impl FileConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io_error(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn math_config(&self) -> MathConfig {
        MathConfig {
            number: self.number,
        }
    }
}
