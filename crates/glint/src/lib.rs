//! Glint - coordinated, self-rendering widgets.
//!
//! This is the widget crate. It re-exports everything from `glint-core` and
//! adds the composite widgets whose state spans several nodes:
//!
//! - [`radio`]: radio groups with form validity
//! - [`tree`]: trees with single, multiple and leaf-only selection
//! - [`dropdown`]: disclosure controllers with outside-click dismissal
//! - [`tab`]: tabs and tab panels
//!
//! # Example
//!
//! ```
//! use glint::prelude::*;
//!
//! let doc = Document::new();
//! let group = RadioGroup::new(&doc).with_name("plan");
//! group.attach(None).unwrap();
//! group.set_required(true);
//! assert!(!group.report_validity().valid);
//!
//! let basic = Radio::new(&doc).with_value("basic");
//! group.add_member(&basic).unwrap();
//! doc.click(basic.id());
//! assert!(group.check_validity());
//! ```

pub use glint_core::*;

pub mod dropdown;
mod error;
pub mod form;
pub mod prelude;
pub mod radio;
pub mod render;
pub mod tab;
pub mod tree;
pub mod widget;

pub use dropdown::Dropdown;
pub use error::{Error, Result};
pub use form::{FormAssociated, FormData, ValidityReport};
pub use radio::{Radio, RadioButton, RadioGroup};
pub use tab::{Tab, TabPanel};
pub use tree::{SelectionMode, Tree, TreeItem};
pub use widget::{Widget, WidgetBase};
