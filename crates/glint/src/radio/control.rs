//! The classic round radio.

use std::sync::Arc;

use glint_core::{Document, Size};

use super::selectable::{MEMBER_PROPS, Selectable, SelectableBase};
use crate::render::{Element, Markup, Render, Surface};
use crate::widget::{Widget, WidgetBase, assign};

const STYLES: &str = ":host{display:block}\
.radio{display:inline-flex;align-items:top}\
.radio--disabled{opacity:.5;cursor:not-allowed}\
.radio__control{flex:0 0 auto;border-radius:50%}";

/// A round radio control.
///
/// A `Radio` only asks to be selected; its [`RadioGroup`](super::RadioGroup)
/// decides.
#[derive(Clone)]
pub struct Radio {
    inner: Arc<SelectableBase>,
}

impl Radio {
    /// Create an unchecked radio with an empty value.
    pub fn new(document: &Document) -> Self {
        Self {
            inner: SelectableBase::new(document, "x-radio", MEMBER_PROPS),
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

    /// Set the disabled flag using builder pattern.
    pub fn with_disabled(self, disabled: bool) -> Self {
        self.set_disabled(disabled);
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

impl Render for Radio {
    fn render(&self) -> Surface {
        let checked = self.is_checked();
        let disabled = self.is_disabled();
        let size = self.effective_size();

        let mut control = Element::new("span")
            .part(if checked { "control control--checked" } else { "control control--unchecked" })
            .attr("class", "radio__control");
        if checked {
            control = control.child(Element::new("span").part("checked-icon").attr("class", "radio__checked-icon"));
        }

        let label = Element::new("span")
            .part("label")
            .attr("class", "radio__label")
            .child(Markup::text(self.widget_base().string_or_empty("label")))
            .child(Markup::slot());

        let base = Element::new("span")
            .part("base")
            .classes(&[
                ("radio", true),
                ("radio--checked", checked),
                ("radio--disabled", disabled),
                ("radio--focused", self.is_focused()),
                ("radio--small", size == Size::Small),
                ("radio--medium", size == Size::Medium),
                ("radio--large", size == Size::Large),
            ])
            .attr("role", "radio")
            .attr("aria-checked", checked.to_string())
            .attr("tabindex", if self.is_focused() && !disabled { "0" } else { "-1" })
            .attr("data-value", self.value())
            .child(control)
            .child(label);

        Surface::new(base).with_style(STYLES)
    }
}

impl Widget for Radio {
    fn widget_base(&self) -> &WidgetBase {
        self.inner.widget_base()
    }
}

impl Selectable for Radio {
    fn selectable_base(&self) -> &SelectableBase {
        &self.inner
    }
}

impl std::fmt::Debug for Radio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Radio")
            .field("id", &self.id())
            .field("value", &self.value())
            .field("checked", &self.is_checked())
            .finish()
    }
}

static_assertions::assert_impl_all!(Radio: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::selectable::CheckState;

    #[test]
    fn test_render_reflects_state() {
        let doc = Document::new();
        let radio = Radio::new(&doc).with_value("a").with_label("Apple");
        let base = radio.surface().markup;
        let base = base.find_part("base").unwrap();
        assert!(base.has_class("radio"));
        assert!(!base.has_class("radio--checked"));
        assert!(base.has_class("radio--medium"));
        assert_eq!(base.attribute("data-value"), Some("a"));
        assert_eq!(base.text_content(), "Apple");

        radio.set_checked(true);
        let surface = radio.surface();
        assert!(surface.part("checked-icon").is_some());
        assert_eq!(surface.part("base").unwrap().attribute("aria-checked"), Some("true"));
    }

    #[test]
    fn test_unchanged_property_does_not_rerender() {
        let doc = Document::new();
        let radio = Radio::new(&doc);
        assert!(radio.set_value("x"));
        let renders = radio.render_count();
        assert!(!radio.set_value("x"));
        assert_eq!(radio.render_count(), renders);
    }

    #[test]
    fn test_own_size_beats_inherited() {
        let doc = Document::new();
        let radio = Radio::new(&doc);
        assert_eq!(radio.effective_size(), Size::Medium);
        radio.set_inherited_size(Size::Large);
        assert_eq!(radio.effective_size(), Size::Large);
        radio.set_size(Some(Size::Small));
        assert_eq!(radio.effective_size(), Size::Small);
        radio.set_size(None);
        assert_eq!(radio.effective_size(), Size::Large);
    }

    #[test]
    fn test_malformed_size_falls_back() {
        let doc = Document::new();
        let radio = Radio::new(&doc);
        radio.set_property("size", "enormous").unwrap();
        assert_eq!(radio.size_override(), None);
        assert_eq!(radio.effective_size(), Size::Medium);
    }
}
