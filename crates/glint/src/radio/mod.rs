//! The radio family.
//!
//! [`Radio`] and [`RadioButton`] are [`Selectable`] members; [`RadioGroup`]
//! owns the selection. A click on a member raises an `intent` event that
//! bubbles to the group, which checks the member, takes its value and
//! raises a `change` event carrying `{ value }`.
//!
//! # Example
//!
//! ```
//! use glint::prelude::*;
//!
//! let doc = Document::new();
//! let group = RadioGroup::new(&doc).with_name("size");
//! group.attach(None).unwrap();
//!
//! let small = Radio::new(&doc).with_value("s");
//! let large = Radio::new(&doc).with_value("l");
//! group.add_member(&small).unwrap();
//! group.add_member(&large).unwrap();
//!
//! doc.click(large.id());
//! assert_eq!(group.value(), "l");
//! assert!(large.is_checked() && !small.is_checked());
//! ```

mod control;
mod group;
mod radio_button;
mod selectable;

pub use control::Radio;
pub use group::RadioGroup;
pub use radio_button::RadioButton;
pub use selectable::{Selectable, SelectableBase};
