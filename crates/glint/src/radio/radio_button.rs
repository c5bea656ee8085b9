//! Radio buttons: radios drawn as push buttons.

use std::sync::Arc;

use glint_core::{Document, PropertyDecl, Size};

use super::selectable::{Selectable, SelectableBase};
use crate::render::{Element, Markup, Render, Surface};
use crate::widget::{Widget, WidgetBase, assign};

const BUTTON_PROPS: &[PropertyDecl] = &[
    PropertyDecl::string("value"),
    PropertyDecl::string("label"),
    PropertyDecl::flag("checked"),
    PropertyDecl::flag("disabled"),
    PropertyDecl::string("size"),
    PropertyDecl::flag("pill"),
];

const STYLES: &str = ":host{display:inline-block}\
.button{display:inline-flex;align-items:stretch;justify-content:center}\
.button--checked{background:var(--glint-color-primary)}\
.button--pill{border-radius:var(--glint-border-radius-pill)}";

/// A radio presented as a button, typically laid out in a button group.
///
/// Selection semantics are identical to [`Radio`](super::Radio); only the
/// surface differs.
#[derive(Clone)]
pub struct RadioButton {
    inner: Arc<SelectableBase>,
}

impl RadioButton {
    /// Create an unchecked radio button with an empty value.
    pub fn new(document: &Document) -> Self {
        Self {
            inner: SelectableBase::new(document, "x-radio-button", BUTTON_PROPS),
        }
    }

    /// Set the value using builder pattern.
    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    /// Set the label using builder pattern.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        assign(&self, "label", label.into());
        self
    }

    /// Draw with fully rounded ends using builder pattern.
    pub fn with_pill(self, pill: bool) -> Self {
        assign(&self, "pill", pill);
        self
    }

    /// Set the value.
    pub fn set_value(&self, value: impl Into<String>) -> bool {
        assign(self, "value", value.into())
    }

    /// Set the disabled flag.
    pub fn set_disabled(&self, disabled: bool) -> bool {
        assign(self, "disabled", disabled)
    }

    /// Declare (or with `None`, clear) the member's own size.
    pub fn set_size(&self, size: Option<Size>) -> bool {
        match size {
            Some(size) => assign(self, "size", size.as_str()),
            None => self.remove_property("size").unwrap_or(false),
        }
    }
}

impl Render for RadioButton {
    fn render(&self) -> Surface {
        let checked = self.is_checked();
        let disabled = self.is_disabled();
        let size = self.effective_size();

        let button = Element::new("button")
            .part("button")
            .classes(&[
                ("button", true),
                ("button--default", !checked),
                ("button--primary", checked),
                ("button--checked", checked),
                ("button--disabled", disabled),
                ("button--focused", self.is_focused()),
                ("button--pill", self.widget_base().flag("pill")),
                ("button--small", size == Size::Small),
                ("button--medium", size == Size::Medium),
                ("button--large", size == Size::Large),
            ])
            .attr("type", "button")
            .attr("aria-checked", checked.to_string())
            .attr("tabindex", if self.is_focused() && !disabled { "0" } else { "-1" })
            .flag("disabled", disabled)
            .child(Markup::named_slot("prefix"))
            .child(
                Element::new("span")
                    .part("label")
                    .attr("class", "button__label")
                    .child(Markup::text(self.widget_base().string_or_empty("label")))
                    .child(Markup::slot()),
            )
            .child(Markup::named_slot("suffix"));

        let base = Element::new("div")
            .part("base")
            .attr("role", "presentation")
            .attr("data-value", self.value())
            .child(button);

        Surface::new(base).with_style(STYLES)
    }
}

impl Widget for RadioButton {
    fn widget_base(&self) -> &WidgetBase {
        self.inner.widget_base()
    }
}

impl Selectable for RadioButton {
    fn selectable_base(&self) -> &SelectableBase {
        &self.inner
    }
}

impl std::fmt::Debug for RadioButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioButton")
            .field("id", &self.id())
            .field("value", &self.value())
            .field("checked", &self.is_checked())
            .finish()
    }
}

static_assertions::assert_impl_all!(RadioButton: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::selectable::CheckState;

    #[test]
    fn test_checked_button_is_primary() {
        let doc = Document::new();
        let button = RadioButton::new(&doc).with_value("s").with_pill(true);
        button.set_checked(true);
        let surface = button.surface();
        let inner = surface.part("button").unwrap();
        assert!(inner.has_class("button--primary"));
        assert!(inner.has_class("button--pill"));
        assert!(!inner.has_attribute("disabled"));
    }

    #[test]
    fn test_disabled_button_renders_disabled() {
        let doc = Document::new();
        let button = RadioButton::new(&doc);
        button.set_disabled(true);
        let surface = button.surface();
        assert!(surface.part("button").unwrap().has_attribute("disabled"));
    }
}
