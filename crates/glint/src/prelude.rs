//! Prelude module for Glint.
//!
//! ```
//! use glint::prelude::*;
//! ```
//!
//! This provides access to:
//! - The document and its events (`Document`, `Topic`, `EventDetail`, `Key`)
//! - Signals (`Signal`, `ConnectionId`)
//! - Widget foundation (`Widget`, `Render`, `Selectable`, `FormAssociated`)
//! - The composite widgets (`RadioGroup`, `Tree`, `Dropdown`, `Tab`, ...)

// ============================================================================
// Document and Events
// ============================================================================

pub use glint_core::{
    Document, DocumentConfig, Event, EventDetail, Interaction, Key, NodeId, Placement, Size,
    Topic,
};

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use glint_core::{ConnectionId, Signal};

// ============================================================================
// Widget Foundation
// ============================================================================

pub use crate::form::{FormAssociated, ValidityReport};
pub use crate::radio::Selectable;
pub use crate::render::{Render, Surface};
pub use crate::widget::Widget;

// ============================================================================
// Widgets
// ============================================================================

pub use crate::dropdown::Dropdown;
pub use crate::radio::{Radio, RadioButton, RadioGroup};
pub use crate::tab::{Tab, TabPanel};
pub use crate::tree::{SelectionMode, Tree, TreeItem};
