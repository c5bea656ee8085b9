//! Error types for Glint.
//!
//! Errors here describe API misuse only: a stale node id, an undeclared
//! property name, a malformed configuration file. Coordination anomalies
//! (an intent on a disabled node, a required group left empty) are never
//! errors; they surface as no-ops, validity values or `error` events.

use crate::node::NodeId;

/// The main error type for Glint operations.
#[derive(Debug, thiserror::Error)]
pub enum GlintError {
    /// Node-related error.
    #[error("Node error: {0}")]
    Node(#[from] NodeError),
    /// Property-related error.
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur during node tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// The node id is invalid or has been destroyed.
    #[error("Invalid or destroyed node id {0:?}")]
    InvalidNodeId(NodeId),
    /// Attempted to make a node its own parent or ancestor.
    #[error("Cannot set a node as its own parent or ancestor")]
    CircularParentage,
}

/// Errors raised by the declared property channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The property is not part of the node's declared set.
    #[error("Property '{name}' is not declared on <{tag}>")]
    NotDeclared {
        /// The element tag of the node.
        tag: &'static str,
        /// The undeclared property name.
        name: String,
    },
    /// A string was assigned to a boolean property or the other way round.
    #[error("Property '{name}' expects a {expected} value")]
    KindMismatch {
        /// The property name.
        name: String,
        /// The expected value kind.
        expected: &'static str,
    },
}

/// Errors raised while loading a [`DocumentConfig`](crate::DocumentConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field parsed but holds an unusable value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// A specialized Result type for Glint operations.
pub type Result<T> = std::result::Result<T, GlintError>;

/// Result type for node tree operations.
pub type NodeResult<T> = std::result::Result<T, NodeError>;
