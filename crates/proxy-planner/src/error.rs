//! Error types for proxy-planner

use thiserror::Error;
use topology_config::ConfigError;

/// Result type alias for planning operations
pub type Result<T> = std::result::Result<T, PlanError>;

/// Planning error types
#[derive(Error, Debug)]
pub enum PlanError {
    /// Snapshot or registry configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A token could not be compiled as a regular expression
    #[error("Invalid pattern for service type '{token}': {source}")]
    InvalidPattern {
        /// Token used as the pattern
        token: String,
        /// Compilation failure
        #[source]
        source: regex::Error,
    },
}
