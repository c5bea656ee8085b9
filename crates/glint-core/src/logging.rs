//! Logging and debugging facilities for Glint.
//!
//! Glint instruments itself with the `tracing` crate. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("glint_core::event=trace,glint=debug")
//!     .init();
//! ```
//!
//! [`NodeTreeDebug`] renders a [`NodeTree`] for inspection.

use std::fmt::Write as FmtWrite;

use crate::error::NodeResult;
use crate::node::{NodeId, NodeTree};

/// Target names for log filtering.
pub mod targets {
    /// Node tree and lifecycle.
    pub const NODE: &str = "glint_core::node";
    /// Declared property channel.
    pub const PROPERTY: &str = "glint_core::property";
    /// Signal emission.
    pub const SIGNAL: &str = "glint_core::signal";
    /// Event dispatch.
    pub const EVENT: &str = "glint_core::event";
    /// Document-level interactions and the outside-dismiss observer.
    pub const DOCUMENT: &str = "glint_core::document";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Debug utility for visualizing node trees.
#[derive(Debug, Clone, Default)]
pub struct NodeTreeDebug {
    style: TreeStyle,
    show_ids: bool,
}

impl NodeTreeDebug {
    /// Create a visualizer with Unicode branches and ids hidden.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the branch style.
    pub fn with_style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }

    /// Show raw node ids after each tag.
    pub fn with_ids(mut self, show: bool) -> Self {
        self.show_ids = show;
        self
    }

    /// Format the subtree rooted at `root`, one node per line with its lifecycle.
    pub fn format_subtree(&self, tree: &NodeTree, root: NodeId) -> NodeResult<String> {
        let mut output = String::new();
        self.format_node(tree, root, "", true, true, &mut output)?;
        Ok(output)
    }

    fn format_node(
        &self,
        tree: &NodeTree,
        id: NodeId,
        prefix: &str,
        is_last: bool,
        is_root: bool,
        output: &mut String,
    ) -> NodeResult<()> {
        let (branch, pipe, blank) = match self.style {
            TreeStyle::Ascii => (if is_last { "`-- " } else { "|-- " }, "|   ", "    "),
            TreeStyle::Unicode => (if is_last { "└── " } else { "├── " }, "│   ", "    "),
        };

        let connector = if is_root { "" } else { branch };
        let _ = write!(output, "{prefix}{connector}<{}>", tree.tag(id)?);
        if self.show_ids {
            let _ = write!(output, " #{}", id.as_raw());
        }
        let _ = writeln!(output, " [{}]", tree.lifecycle(id)?);

        let child_prefix = if is_root {
            String::new()
        } else {
            format!("{prefix}{}", if is_last { blank } else { pipe })
        };
        let children = tree.children(id)?;
        for (i, &child) in children.iter().enumerate() {
            self.format_node(tree, child, &child_prefix, i + 1 == children.len(), false, output)?;
        }
        Ok(())
    }
}
