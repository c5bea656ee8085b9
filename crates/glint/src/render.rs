//! Render surfaces.
//!
//! Every widget turns its current properties into a [`Surface`]: an isolated
//! [`Markup`] tree plus the scoped style text that goes with it. Rendering is
//! pure; the only side effect of a re-render is the new surface replacing
//! the cached one on the widget base.
//!
//! # Example
//!
//! ```
//! use glint::render::{Element, Markup};
//!
//! let markup: Markup = Element::new("button")
//!     .part("base")
//!     .flag("disabled", true)
//!     .child(Markup::text("Save & close"))
//!     .into();
//! assert_eq!(
//!     markup.to_html(),
//!     r#"<button part="base" disabled>Save &amp; close</button>"#
//! );
//! ```

use std::fmt::Write as FmtWrite;

use glint_core::PropertyStore;

/// A node of rendered markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// An element with attributes and children.
    Element(Element),
    /// Text content, escaped on output.
    Text(String),
    /// A projection point for light-tree content; `None` is the default slot.
    Slot(Option<String>),
}

impl Markup {
    /// Text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The default slot.
    pub fn slot() -> Self {
        Self::Slot(None)
    }

    /// A named slot.
    pub fn named_slot(name: impl Into<String>) -> Self {
        Self::Slot(Some(name.into()))
    }

    /// The element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Find the first element (depth-first) whose `part` attribute contains `name`.
    pub fn find_part(&self, name: &str) -> Option<&Element> {
        let element = self.as_element()?;
        if element
            .attribute("part")
            .is_some_and(|parts| parts.split_whitespace().any(|p| p == name))
        {
            return Some(element);
        }
        element.children.iter().find_map(|child| child.find_part(name))
    }

    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => escape_into(text, false, out),
            Self::Slot(None) => out.push_str("<slot></slot>"),
            Self::Slot(Some(name)) => {
                out.push_str("<slot name=\"");
                escape_into(name, true, out);
                out.push_str("\"></slot>");
            }
            Self::Element(element) => {
                let _ = write!(out, "<{}", element.tag);
                for (name, value) in &element.attributes {
                    match value {
                        None => {
                            let _ = write!(out, " {name}");
                        }
                        Some(value) => {
                            let _ = write!(out, " {name}=\"");
                            escape_into(value, true, out);
                            out.push('"');
                        }
                    }
                }
                out.push('>');
                for child in &element.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

/// A markup element.
///
/// Attributes keep insertion order; setting an attribute twice replaces the
/// earlier value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attributes: Vec<(&'static str, Option<String>)>,
    children: Vec<Markup>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The element tag.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Set an attribute.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.put(name, Some(value.into()));
        self
    }

    /// Set an attribute when `value` is present.
    pub fn attr_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Add a boolean attribute when `on` is true.
    pub fn flag(mut self, name: &'static str, on: bool) -> Self {
        if on {
            self.put(name, None);
        }
        self
    }

    /// Set the `part` attribute.
    pub fn part(self, name: impl Into<String>) -> Self {
        self.attr("part", name)
    }

    /// Set the `class` attribute from `(class, enabled)` pairs.
    pub fn classes(self, classes: &[(&str, bool)]) -> Self {
        self.attr("class", class_map(classes))
    }

    /// Append a child.
    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children.
    pub fn children(mut self, children: impl IntoIterator<Item = Markup>) -> Self {
        self.children.extend(children);
        self
    }

    /// Value of an attribute; boolean attributes read as `""`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| *n == name)
    }

    /// Whether the `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Child nodes.
    pub fn child_nodes(&self) -> &[Markup] {
        &self.children
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    fn put(&mut self, name: &'static str, value: Option<String>) {
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }
}

fn collect_text(children: &[Markup], text: &mut String) {
    for child in children {
        match child {
            Markup::Text(t) => text.push_str(t),
            Markup::Element(e) => collect_text(&e.children, text),
            Markup::Slot(_) => {}
        }
    }
}

/// Join the enabled class names with spaces.
pub fn class_map(classes: &[(&str, bool)]) -> String {
    classes
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Isolated markup plus its scoped style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    /// The rendered markup.
    pub markup: Markup,
    /// Style text scoped to this surface.
    pub style: String,
}

impl Surface {
    /// A surface with no style.
    pub fn new(markup: impl Into<Markup>) -> Self {
        Self {
            markup: markup.into(),
            style: String::new(),
        }
    }

    /// Set the style text using builder pattern.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Shorthand for `self.markup.find_part(name)`.
    pub fn part(&self, name: &str) -> Option<&Element> {
        self.markup.find_part(name)
    }

    /// Serialize the surface, style first.
    pub fn to_html(&self) -> String {
        if self.style.is_empty() {
            self.markup.to_html()
        } else {
            let mut out = String::from("<style>");
            out.push_str(&self.style);
            out.push_str("</style>");
            out.push_str(&self.markup.to_html());
            out
        }
    }
}

/// Something that renders itself from its own current state.
pub trait Render {
    /// Produce the surface for the current state.
    fn render(&self) -> Surface;
}

/// A stateless collaborator rendered purely from properties.
///
/// Leaf widgets have no signals and no stored state; `render` may be called
/// any number of times with no side effects.
pub trait LeafWidget: Send + Sync {
    /// The tag the leaf is registered under.
    fn tag(&self) -> &'static str;

    /// Render markup for the given properties.
    fn render(&self, props: &PropertyStore) -> Markup;
}
