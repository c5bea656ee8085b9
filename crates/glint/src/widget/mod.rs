//! Widget infrastructure.
//!
//! Every widget owns a [`WidgetBase`] and implements [`Widget`]. Widgets are
//! cheap `Clone` handles over shared state, so a coordinator can hold its
//! members and event handlers can hold weak references back to the widget
//! that installed them.
//!
//! Properties flow through one channel: [`Widget::set_property`] stores the
//! value and, on an effective change, calls [`Widget::property_changed`],
//! which re-renders by default. Coordinators override the hook to
//! re-establish their invariants first.

mod base;

pub use base::WidgetBase;

use glint_core::{Document, Lifecycle, NodeId, NodeResult, PropertyError, PropertyValue};

use crate::render::{Render, Surface};

/// Log targets for the widget crate.
pub mod targets {
    /// Radio groups and their members.
    pub const RADIO: &str = "glint::radio";
    /// Trees and tree items.
    pub const TREE: &str = "glint::tree";
    /// Dropdown disclosure controllers.
    pub const DROPDOWN: &str = "glint::dropdown";
    /// Tabs and tab panels.
    pub const TAB: &str = "glint::tab";
    /// Form association.
    pub const FORM: &str = "glint::form";
}

/// The base trait for all widgets.
pub trait Widget: Render + Send + Sync {
    /// Get a reference to the widget's base.
    fn widget_base(&self) -> &WidgetBase;

    /// The widget's node.
    fn id(&self) -> NodeId {
        self.widget_base().id()
    }

    /// The document the widget lives in.
    fn document(&self) -> &Document {
        self.widget_base().document()
    }

    /// Re-render and cache the new surface.
    fn update(&self) {
        let surface = self.render();
        self.widget_base().store_surface(surface);
    }

    /// Called after a property effectively changed.
    fn property_changed(&self, _name: &str) {
        self.update();
    }

    /// Set a declared property. Unchanged values do not re-render.
    fn set_property(&self, name: &str, value: impl Into<PropertyValue>) -> Result<bool, PropertyError>
    where
        Self: Sized,
    {
        let changed = self.widget_base().set(name, value)?;
        if changed {
            self.property_changed(name);
        }
        Ok(changed)
    }

    /// Remove a declared property.
    fn remove_property(&self, name: &str) -> Result<bool, PropertyError>
    where
        Self: Sized,
    {
        let changed = self.widget_base().remove(name)?;
        if changed {
            self.property_changed(name);
        }
        Ok(changed)
    }

    /// The current surface, rendering first if the widget never rendered.
    fn surface(&self) -> Surface {
        match self.widget_base().surface() {
            Some(surface) => surface,
            None => {
                self.update();
                self.widget_base().surface().unwrap_or_else(|| self.render())
            }
        }
    }

    /// How many times the widget has rendered.
    fn render_count(&self) -> usize {
        self.widget_base().render_count()
    }

    /// Attach the widget to the document, optionally under `parent`.
    fn attach(&self, parent: Option<NodeId>) -> NodeResult<()> {
        self.document().attach(self.id(), parent).map(|_| ())
    }

    /// Detach the widget (and its subtree) from the document.
    fn detach(&self) -> NodeResult<()> {
        self.document().detach(self.id()).map(|_| ())
    }

    /// The widget's lifecycle state.
    fn lifecycle(&self) -> Lifecycle {
        self.document().lifecycle(self.id()).unwrap_or_default()
    }
}

/// Write a declared property from inside a widget, logging instead of failing.
///
/// Used for property names the widget itself declares, where an error
/// would mean the declared set and the code disagree.
pub(crate) fn assign<W: Widget + ?Sized>(widget: &W, name: &str, value: impl Into<PropertyValue>) -> bool {
    match widget.widget_base().set(name, value) {
        Ok(changed) => {
            if changed {
                widget.property_changed(name);
            }
            changed
        }
        Err(err) => {
            tracing::warn!(target: "glint::widget", tag = widget.widget_base().tag(), %err, "property write rejected");
            false
        }
    }
}

/// Register an internal part node (a trigger, a close button) under `host`.
///
/// `host` was just created by the caller, so the parent link cannot fail in
/// practice; if it does the part is left as a detached root.
pub(crate) fn part_node(document: &Document, host: NodeId, tag: &'static str) -> NodeId {
    document.create_child(host, tag).unwrap_or_else(|err| {
        tracing::warn!(target: "glint::widget", ?host, %err, "part node left unparented");
        document.create_node(tag)
    })
}
