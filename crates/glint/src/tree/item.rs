//! Tree items.

use std::sync::{Arc, Weak};

use glint_core::{Document, EventDetail, Interaction, NodeId, Property, PropertyDecl, Topic};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::render::{Element, Markup, Render, Surface};
use crate::widget::{Widget, WidgetBase, assign, targets};

const ITEM_PROPS: &[PropertyDecl] = &[
    PropertyDecl::string("value"),
    PropertyDecl::string("label"),
    PropertyDecl::flag("selected"),
    PropertyDecl::flag("disabled"),
    PropertyDecl::flag("expanded"),
    PropertyDecl::flag("lazy"),
];

struct ItemInner {
    base: WidgetBase,
    children: RwLock<Vec<TreeItem>>,
    parent: RwLock<Weak<ItemInner>>,
    focused: Property<bool>,
}

/// One entry of a [`Tree`](super::Tree).
///
/// An item is a leaf when it has no child items and is not marked `lazy`.
/// Clicking an enabled item raises an `intent` event for the tree; the item
/// never selects itself.
#[derive(Clone)]
pub struct TreeItem {
    inner: Arc<ItemInner>,
}

impl TreeItem {
    /// Create an unselected, collapsed item.
    pub fn new(document: &Document) -> Self {
        let item = Self {
            inner: Arc::new(ItemInner {
                base: WidgetBase::new(document, "x-tree-item", ITEM_PROPS),
                children: RwLock::new(Vec::new()),
                parent: RwLock::new(Weak::new()),
                focused: Property::new(false),
            }),
        };

        let id = item.id();
        let weak = Arc::downgrade(&item.inner);
        document.subscribe(id, Topic::Interaction, move |event| {
            // Clicks on nested items bubble through this scope too.
            if event.source() != id || event.interaction() != Some(Interaction::Click) {
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.base.flag("disabled") {
                tracing::debug!(target: targets::TREE, ?id, "click on disabled item ignored");
                return;
            }
            inner.base.document().emit(id, Topic::Intent, EventDetail::None);
        });

        item
    }

    /// Set the value using builder pattern.
    pub fn with_value(self, value: impl Into<String>) -> Self {
        assign(&self, "value", value.into());
        self
    }

    /// Set the label using builder pattern.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        assign(&self, "label", label.into());
        self
    }

    /// Mark the item as having children that are loaded on demand.
    pub fn with_lazy(self, lazy: bool) -> Self {
        self.set_lazy(lazy);
        self
    }

    /// Set the disabled flag using builder pattern.
    pub fn with_disabled(self, disabled: bool) -> Self {
        self.set_disabled(disabled);
        self
    }

    /// Append a child item using builder pattern.
    pub fn with_child(self, child: &TreeItem) -> Result<Self> {
        self.append(child)?;
        Ok(self)
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Append a child item. Its node becomes a child of this item's node.
    pub fn append(&self, child: &TreeItem) -> Result<()> {
        if !child.document().ptr_eq(self.document()) {
            return Err(Error::ForeignDocument { node: child.id() });
        }
        if self.inner.children.read().iter().any(|c| c.id() == child.id()) {
            return Err(Error::DuplicateMember { node: child.id() });
        }
        self.document().set_parent(child.id(), Some(self.id()))?;
        *child.inner.parent.write() = Arc::downgrade(&self.inner);
        self.inner.children.write().push(child.clone());
        self.update();
        Ok(())
    }

    /// The direct child items.
    pub fn children(&self) -> Vec<TreeItem> {
        self.inner.children.read().clone()
    }

    /// The parent item, if this item was appended to one.
    pub fn parent_item(&self) -> Option<TreeItem> {
        self.inner.parent.read().upgrade().map(|inner| TreeItem { inner })
    }

    /// Whether the item can hold no children.
    pub fn is_leaf(&self) -> bool {
        !self.is_lazy() && self.inner.children.read().is_empty()
    }

    /// This item followed by its descendants, depth first.
    pub fn descendants(&self) -> Vec<TreeItem> {
        let mut out = Vec::new();
        self.collect(&mut out, false);
        out
    }

    /// Like [`descendants`](Self::descendants) but without entering collapsed items.
    pub fn visible_descendants(&self) -> Vec<TreeItem> {
        let mut out = Vec::new();
        self.collect(&mut out, true);
        out
    }

    fn collect(&self, out: &mut Vec<TreeItem>, visible_only: bool) {
        out.push(self.clone());
        if visible_only && !self.is_expanded() {
            return;
        }
        for child in self.children() {
            child.collect(out, visible_only);
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The item's value.
    pub fn value(&self) -> String {
        self.inner.base.string_or_empty("value")
    }

    /// The item's label.
    pub fn label(&self) -> String {
        self.inner.base.string_or_empty("label")
    }

    /// Whether the item is selected.
    pub fn is_selected(&self) -> bool {
        self.inner.base.flag("selected")
    }

    /// Select or deselect the item without notifying the tree.
    pub fn set_selected(&self, selected: bool) -> bool {
        assign(self, "selected", selected)
    }

    /// Whether the item is disabled.
    pub fn is_disabled(&self) -> bool {
        self.inner.base.flag("disabled")
    }

    /// Disable or enable the item.
    pub fn set_disabled(&self, disabled: bool) -> bool {
        assign(self, "disabled", disabled)
    }

    /// Whether the item is expanded.
    pub fn is_expanded(&self) -> bool {
        self.inner.base.flag("expanded")
    }

    /// Expand or collapse the item without raising events.
    pub fn set_expanded(&self, expanded: bool) -> bool {
        assign(self, "expanded", expanded)
    }

    /// Whether children are loaded on demand.
    pub fn is_lazy(&self) -> bool {
        self.inner.base.flag("lazy")
    }

    /// Set the lazy flag. Clear it once the children have been appended.
    pub fn set_lazy(&self, lazy: bool) -> bool {
        assign(self, "lazy", lazy)
    }

    /// Whether the item holds the tree's roving focus.
    pub fn is_focused(&self) -> bool {
        self.inner.focused.get()
    }

    pub(crate) fn set_focused(&self, focused: bool) {
        if self.inner.focused.set(focused) {
            self.update();
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// The item's markup with its children rendered in place, recursively.
    ///
    /// Children of a collapsed item are omitted.
    pub fn render_subtree(&self) -> Markup {
        let nested = if self.is_expanded() {
            self.children().iter().map(TreeItem::render_subtree).collect()
        } else {
            Vec::new()
        };
        self.markup(nested)
    }

    fn markup(&self, children: Vec<Markup>) -> Markup {
        let selected = self.is_selected();
        let disabled = self.is_disabled();
        let expanded = self.is_expanded();
        let leaf = self.is_leaf();

        let mut row = Element::new("div")
            .part("item")
            .classes(&[
                ("tree-item__item", true),
                ("tree-item__item--selected", selected),
                ("tree-item__item--disabled", disabled),
                ("tree-item__item--expanded", expanded),
                ("tree-item__item--focused", self.is_focused()),
            ]);
        if !leaf {
            row = row.child(
                Element::new("span")
                    .part("expand-button")
                    .attr("class", "tree-item__expand-button")
                    .attr("aria-hidden", "true")
                    .child(Markup::named_slot(if expanded { "collapse-icon" } else { "expand-icon" })),
            );
        }
        row = row.child(
            Element::new("span")
                .part("label")
                .attr("class", "tree-item__label")
                .child(Markup::text(self.label()))
                .child(Markup::slot()),
        );

        let group = Element::new("div")
            .part("children")
            .attr("class", "tree-item__children")
            .attr("role", "group")
            .flag("hidden", !expanded)
            .children(children);

        Element::new("div")
            .part("base")
            .attr("class", "tree-item")
            .attr("role", "treeitem")
            .attr("aria-selected", selected.to_string())
            .attr_opt("aria-expanded", (!leaf).then(|| expanded.to_string()))
            .attr("tabindex", if self.is_focused() && !disabled { "0" } else { "-1" })
            .attr("data-value", self.value())
            .child(row)
            .child(group)
            .into()
    }
}

impl Render for TreeItem {
    fn render(&self) -> Surface {
        Surface::new(self.markup(vec![Markup::named_slot("children")]))
    }
}

impl Widget for TreeItem {
    fn widget_base(&self) -> &WidgetBase {
        &self.inner.base
    }
}

impl PartialEq for TreeItem {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for TreeItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeItem")
            .field("id", &self.id())
            .field("value", &self.value())
            .field("selected", &self.is_selected())
            .field("children", &self.inner.children.read().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(TreeItem: Send, Sync);

/// Find the item with node `id` among `roots` and their descendants.
pub(crate) fn find(roots: &[TreeItem], id: NodeId) -> Option<TreeItem> {
    roots
        .iter()
        .flat_map(TreeItem::descendants)
        .find(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(doc: &Document, value: &str) -> TreeItem {
        TreeItem::new(doc).with_value(value).with_label(value.to_uppercase())
    }

    #[test]
    fn test_leaf_and_lazy() {
        let doc = Document::new();
        let parent = item(&doc, "p");
        assert!(parent.is_leaf());
        parent.set_lazy(true);
        assert!(!parent.is_leaf());
        parent.set_lazy(false);
        parent.append(&item(&doc, "c")).unwrap();
        assert!(!parent.is_leaf());
    }

    #[test]
    fn test_descendants_order() {
        let doc = Document::new();
        let a = item(&doc, "a");
        let b = item(&doc, "b");
        let c = item(&doc, "c");
        let d = item(&doc, "d");
        b.append(&c).unwrap();
        a.append(&b).unwrap();
        a.append(&d).unwrap();

        let values: Vec<String> = a.descendants().iter().map(TreeItem::value).collect();
        assert_eq!(values, ["a", "b", "c", "d"]);
        assert_eq!(c.parent_item(), Some(b.clone()));

        let visible: Vec<String> = a.visible_descendants().iter().map(TreeItem::value).collect();
        assert_eq!(visible, ["a"]);
        a.set_expanded(true);
        let visible: Vec<String> = a.visible_descendants().iter().map(TreeItem::value).collect();
        assert_eq!(visible, ["a", "b", "d"]);
    }

    #[test]
    fn test_render_subtree_nests_expanded_children() {
        let doc = Document::new();
        let parent = item(&doc, "p");
        parent.append(&item(&doc, "c")).unwrap();

        let collapsed = parent.render_subtree();
        assert!(!collapsed.to_html().contains("data-value=\"c\""));
        assert!(collapsed.find_part("expand-button").is_some());

        parent.set_expanded(true);
        let expanded = parent.render_subtree();
        assert!(expanded.to_html().contains("data-value=\"c\""));
        assert_eq!(
            expanded.find_part("base").unwrap().attribute("aria-expanded"),
            Some("true")
        );
    }

    #[test]
    fn test_append_rejects_duplicates() {
        let doc = Document::new();
        let parent = item(&doc, "p");
        let child = item(&doc, "c");
        parent.append(&child).unwrap();
        assert_eq!(parent.append(&child), Err(Error::DuplicateMember { node: child.id() }));
    }
}
