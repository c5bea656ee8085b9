//! Error types for the widget layer.

use glint_core::{NodeError, NodeId, PropertyError};

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when wiring widgets together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Node tree error.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// Declared property error.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// The widget was created in a different document.
    #[error("Node {node:?} belongs to another document")]
    ForeignDocument { node: NodeId },

    /// The node is already a member of this group.
    #[error("Node {node:?} is already a member")]
    DuplicateMember { node: NodeId },

    /// More than one value given to a single-selection tree.
    #[error("Selection mode '{mode}' accepts at most one value, got {count}")]
    TooManyValues { mode: &'static str, count: usize },
}
