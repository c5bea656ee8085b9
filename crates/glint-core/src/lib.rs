//! Core systems for Glint.
//!
//! This crate provides the foundation the Glint widgets are built on:
//!
//! - **Node Tree**: Parent-child structure with attach/detach lifecycle
//! - **Property System**: Reactive values and declared, string-keyed property stores
//! - **Signal/Slot System**: Type-safe synchronous notification
//! - **Event Bus**: Typed events that bubble from a node through its ancestors
//! - **Document**: The shared handle tying these together, plus the
//!   outside-interaction observer used by disclosure controllers
//!
//! # Signal/Slot Example
//!
//! ```
//! use glint_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//! value_changed.emit(&42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Event Example
//!
//! ```
//! use glint_core::{Document, EventDetail, Topic};
//!
//! let doc = Document::new();
//! let page = doc.create_node("x-page");
//! doc.attach(page, None).unwrap();
//! let item = doc.create_child(page, "x-item").unwrap();
//!
//! doc.subscribe(page, Topic::Change, |event| {
//!     println!("{} raised {}", event.source().as_raw(), event.topic());
//! });
//! let outcome = doc.emit(item, Topic::Change, EventDetail::None);
//! assert_eq!(outcome.delivered, 1);
//! ```

pub mod config;
pub mod document;
mod error;
pub mod event;
pub mod logging;
pub mod node;
pub mod property;
pub mod signal;

pub use config::{DocumentConfig, Placement, Size, UnknownToken, DEFAULT_REQUIRED_MESSAGE};
pub use document::{Dismissable, Document};
pub use error::{ConfigError, GlintError, NodeError, NodeResult, PropertyError, Result};
pub use event::{Dispatch, Event, EventBus, EventDetail, Interaction, Key, Subscription, Topic};
pub use logging::{NodeTreeDebug, TreeStyle};
pub use node::{Lifecycle, NodeId, NodeTree};
pub use property::{Property, PropertyDecl, PropertyKind, PropertyStore, PropertyValue};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
