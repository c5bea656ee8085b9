//! The shared half of radios and radio buttons.

use std::sync::Arc;

use glint_core::{Document, EventDetail, Interaction, Property, PropertyDecl, Size, Topic};

use crate::widget::{Widget, WidgetBase, assign, targets};

/// Declared properties shared by every selectable member.
pub(crate) const MEMBER_PROPS: &[PropertyDecl] = &[
    PropertyDecl::string("value"),
    PropertyDecl::string("label"),
    PropertyDecl::flag("checked"),
    PropertyDecl::flag("disabled"),
    PropertyDecl::string("size"),
];

/// State common to every group member: the widget base, the size inherited
/// from the group and the roving focus flag.
///
/// Creating one installs the member's click handler. A click on an enabled
/// member raises an `intent` event that bubbles to the coordinating group;
/// the member never checks itself.
pub struct SelectableBase {
    base: WidgetBase,
    inherited_size: Property<Option<Size>>,
    focused: Property<bool>,
}

impl SelectableBase {
    pub(crate) fn new(document: &Document, tag: &'static str, declared: &'static [PropertyDecl]) -> Arc<Self> {
        let inner = Arc::new(Self {
            base: WidgetBase::new(document, tag, declared),
            inherited_size: Property::new(None),
            focused: Property::new(false),
        });

        let id = inner.base.id();
        let weak = Arc::downgrade(&inner);
        document.subscribe(id, Topic::Interaction, move |event| {
            if event.interaction() != Some(Interaction::Click) {
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.base.flag("disabled") {
                tracing::debug!(target: targets::RADIO, ?id, "click on disabled member ignored");
                return;
            }
            inner.base.document().emit(id, Topic::Intent, EventDetail::None);
        });

        inner
    }

    /// The widget base.
    pub fn widget_base(&self) -> &WidgetBase {
        &self.base
    }
}

/// A node taking part in a group's selection invariant.
///
/// Members expose their checked state but cannot be checked from outside
/// the crate; selection goes through the group.
///
/// ```compile_fail
/// use glint::prelude::*;
///
/// let doc = Document::new();
/// let radio = Radio::new(&doc).with_value("a");
/// radio.set_checked(true);
/// ```
pub trait Selectable: Widget {
    /// The shared member state.
    fn selectable_base(&self) -> &SelectableBase;

    /// The member's value.
    fn value(&self) -> String {
        self.widget_base().string_or_empty("value")
    }

    /// Whether the member is checked.
    fn is_checked(&self) -> bool {
        self.widget_base().flag("checked")
    }

    /// Whether the member carries its own disabled flag.
    fn is_disabled(&self) -> bool {
        self.widget_base().flag("disabled")
    }

    /// The size the member declares itself, if any.
    fn size_override(&self) -> Option<Size> {
        self.widget_base()
            .string("size")
            .and_then(|raw| raw.trim().parse().ok())
    }

    /// The size pushed down by the group, if any.
    fn inherited_size(&self) -> Option<Size> {
        self.selectable_base().inherited_size.get()
    }

    /// Record the group's size. Re-renders when it changed.
    fn set_inherited_size(&self, size: Size) -> bool {
        let changed = self.selectable_base().inherited_size.set(Some(size));
        if changed {
            self.update();
        }
        changed
    }

    /// The size the member renders at: its own, else the group's, else the
    /// document default.
    fn effective_size(&self) -> Size {
        self.size_override()
            .or_else(|| self.inherited_size())
            .unwrap_or(self.document().config().default_size)
    }

    /// Whether the member holds the group's roving focus.
    fn is_focused(&self) -> bool {
        self.selectable_base().focused.get()
    }

    /// Give or take the roving focus. Re-renders when it changed.
    fn set_focused(&self, focused: bool) -> bool {
        let changed = self.selectable_base().focused.set(focused);
        if changed {
            self.update();
        }
        changed
    }
}

/// Write access to a member's checked flag, reserved for the group.
pub(crate) trait CheckState: Selectable {
    /// Check or uncheck the member. Returns whether the state changed.
    fn set_checked(&self, checked: bool) -> bool {
        assign(self, "checked", checked)
    }
}

impl<T: Selectable + ?Sized> CheckState for T {}
