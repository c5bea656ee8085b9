//! Tree selection coordinator.
//!
//! A [`Tree`] owns the selection over its [`TreeItem`]s in one of three
//! [`SelectionMode`]s:
//!
//! - `single`: an accepted intent makes its item the only selected one.
//! - `multiple`: an accepted intent toggles its item in place.
//! - `leaf`: like `single`, but intents on items that are not leaves are
//!   ignored outright. They do not expand or collapse the item either;
//!   expansion has its own operations and keys.
//!
//! Every selection change raises a bubbling `select` event carrying the
//! selected values in document order.
//!
//! # Example
//!
//! ```
//! use glint::prelude::*;
//! use glint::tree::{SelectionMode, Tree, TreeItem};
//!
//! let doc = Document::new();
//! let tree = Tree::new(&doc).with_selection_mode(SelectionMode::Multiple);
//! tree.attach(None).unwrap();
//!
//! let x = TreeItem::new(&doc).with_value("x");
//! let y = TreeItem::new(&doc).with_value("y");
//! tree.add_item(&x).unwrap();
//! tree.add_item(&y).unwrap();
//!
//! doc.click(x.id());
//! doc.click(y.id());
//! assert_eq!(tree.selected_values(), ["x", "y"]);
//! ```

mod item;

pub use item::TreeItem;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use glint_core::{
    Document, EventDetail, Interaction, Key, NodeId, Property, PropertyDecl, Signal, Topic,
    UnknownToken,
};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::render::{Element, Markup, Render, Surface};
use crate::widget::{Widget, WidgetBase, assign, targets};

const TREE_PROPS: &[PropertyDecl] = &[PropertyDecl::string("selection"), PropertyDecl::flag("disabled")];

const STYLES: &str = ":host{display:block;outline:0}\
.tree{display:flex;flex-direction:column}";

/// How a tree treats selection intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
    /// At most one selected item.
    #[default]
    Single,
    /// Any number of selected items; intents toggle.
    Multiple,
    /// At most one selected item, and only leaves can be selected.
    Leaf,
}

impl SelectionMode {
    /// The token as written in the `selection` property.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::Leaf => "leaf",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = UnknownToken;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            "leaf" => Ok(Self::Leaf),
            other => Err(UnknownToken(other.to_owned())),
        }
    }
}

struct TreeInner {
    base: WidgetBase,
    items: RwLock<Vec<TreeItem>>,
    focused: Property<Option<NodeId>>,
    selection_changed: Signal<Vec<String>>,
}

/// A hierarchical list with single, multiple or leaf-only selection.
///
/// # Signals
///
/// - `selection_changed(Vec<String>)`: emitted together with the bubbling
///   `select` event.
#[derive(Clone)]
pub struct Tree {
    inner: Arc<TreeInner>,
}

impl Tree {
    /// Create an empty tree in single-selection mode.
    pub fn new(document: &Document) -> Self {
        let tree = Self {
            inner: Arc::new(TreeInner {
                base: WidgetBase::new(document, "x-tree", TREE_PROPS),
                items: RwLock::new(Vec::new()),
                focused: Property::new(None),
                selection_changed: Signal::new(),
            }),
        };

        let id = tree.id();
        let weak = Arc::downgrade(&tree.inner);
        document.subscribe(id, Topic::Intent, move |event| {
            if let Some(tree) = Tree::upgrade(&weak) {
                tree.handle_intent(event.source());
            }
        });

        let weak = Arc::downgrade(&tree.inner);
        document.subscribe(id, Topic::Interaction, move |event| {
            let Some(Interaction::Key(key)) = event.interaction() else {
                return;
            };
            if let Some(tree) = Tree::upgrade(&weak)
                && tree.handle_key(event.source(), key)
            {
                event.stop_propagation();
            }
        });

        tree
    }

    fn upgrade(weak: &Weak<TreeInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Set the selection mode using builder pattern.
    pub fn with_selection_mode(self, mode: SelectionMode) -> Self {
        self.set_selection_mode(mode);
        self
    }

    /// Signal emitted when the selection changes.
    pub fn selection_changed(&self) -> &Signal<Vec<String>> {
        &self.inner.selection_changed
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Add a top-level item.
    pub fn add_item(&self, item: &TreeItem) -> Result<()> {
        if !item.document().ptr_eq(self.document()) {
            return Err(Error::ForeignDocument { node: item.id() });
        }
        if self.inner.items.read().iter().any(|i| i.id() == item.id()) {
            return Err(Error::DuplicateMember { node: item.id() });
        }
        self.document().set_parent(item.id(), Some(self.id()))?;
        self.inner.items.write().push(item.clone());
        self.update();
        Ok(())
    }

    /// The top-level items.
    pub fn items(&self) -> Vec<TreeItem> {
        self.inner.items.read().clone()
    }

    /// Every item, depth first.
    pub fn all_items(&self) -> Vec<TreeItem> {
        self.items().iter().flat_map(TreeItem::descendants).collect()
    }

    /// Items not hidden inside a collapsed ancestor, depth first.
    pub fn visible_items(&self) -> Vec<TreeItem> {
        self.items().iter().flat_map(TreeItem::visible_descendants).collect()
    }

    /// The item with node `id`, anywhere in the tree.
    pub fn item(&self, id: NodeId) -> Option<TreeItem> {
        item::find(&self.items(), id)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The selection mode; unknown tokens read as `single`.
    pub fn selection_mode(&self) -> SelectionMode {
        self.inner.base.parsed("selection", SelectionMode::default())
    }

    /// Change the selection mode.
    pub fn set_selection_mode(&self, mode: SelectionMode) -> bool {
        assign(self, "selection", mode.as_str())
    }

    /// Whether the tree is disabled.
    pub fn is_disabled(&self) -> bool {
        self.inner.base.flag("disabled")
    }

    /// Disable or enable the tree.
    pub fn set_disabled(&self, disabled: bool) -> bool {
        assign(self, "disabled", disabled)
    }

    /// Values of the selected items, depth first.
    pub fn selected_values(&self) -> Vec<String> {
        self.selected_items().iter().map(TreeItem::value).collect()
    }

    /// The selected items, depth first.
    pub fn selected_items(&self) -> Vec<TreeItem> {
        self.all_items().into_iter().filter(TreeItem::is_selected).collect()
    }

    /// Handle a request from `source` to be selected.
    ///
    /// Ignored when the tree or the item is disabled, when `source` is not
    /// an item of this tree, and in leaf mode when the item is not a leaf.
    /// Returns whether the intent was accepted.
    pub fn handle_intent(&self, source: NodeId) -> bool {
        if self.is_disabled() {
            tracing::debug!(target: targets::TREE, tree = ?self.id(), ?source, "intent ignored: tree disabled");
            return false;
        }
        let Some(item) = self.item(source) else {
            return false;
        };
        if item.is_disabled() {
            tracing::debug!(target: targets::TREE, tree = ?self.id(), ?source, "intent ignored: item disabled");
            return false;
        }

        let mode = self.selection_mode();
        let changed = match mode {
            SelectionMode::Leaf if !item.is_leaf() => {
                tracing::debug!(target: targets::TREE, tree = ?self.id(), ?source, "intent ignored: not a leaf");
                return false;
            }
            SelectionMode::Multiple => item.set_selected(!item.is_selected()),
            SelectionMode::Single | SelectionMode::Leaf => {
                let mut changed = false;
                for other in self.all_items() {
                    changed |= other.set_selected(other == item);
                }
                changed
            }
        };
        self.focus_item(source);
        if changed {
            self.selection_did_change();
        }
        true
    }

    /// Select every eligible item whose value equals `value`, deselecting the rest.
    ///
    /// An empty value clears the selection. Returns whether the selection changed.
    pub fn set_value(&self, value: &str) -> bool {
        let leaf_only = self.selection_mode() == SelectionMode::Leaf;
        self.apply_selection(|item| {
            !value.is_empty() && item.value() == value && (!leaf_only || item.is_leaf())
        })
    }

    /// Select exactly the eligible items whose values are in `values`.
    ///
    /// Only a `multiple` tree accepts more than one value.
    pub fn set_selection(&self, values: &[&str]) -> Result<bool> {
        let mode = self.selection_mode();
        if mode != SelectionMode::Multiple && values.len() > 1 {
            return Err(Error::TooManyValues {
                mode: mode.as_str(),
                count: values.len(),
            });
        }
        let leaf_only = mode == SelectionMode::Leaf;
        Ok(self.apply_selection(|item| {
            values.contains(&item.value().as_str()) && (!leaf_only || item.is_leaf())
        }))
    }

    /// Deselect every item.
    pub fn clear_selection(&self) -> bool {
        self.apply_selection(|_| false)
    }

    fn apply_selection<F>(&self, selected: F) -> bool
    where
        F: Fn(&TreeItem) -> bool,
    {
        let mut changed = false;
        for item in self.all_items() {
            changed |= item.set_selected(selected(&item));
        }
        if changed {
            self.selection_did_change();
        }
        changed
    }

    fn selection_did_change(&self) {
        let values = self.selected_values();
        tracing::debug!(target: targets::TREE, tree = ?self.id(), ?values, "selection changed");
        self.update();
        self.inner.selection_changed.emit(&values);
        self.document()
            .emit(self.id(), Topic::Select, EventDetail::Selection { values });
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Expand or collapse an item, raising `expand` or `collapse`.
    ///
    /// Leaves cannot expand. Expanding a lazy item also raises `lazy-load`
    /// so the application can append its children. Returns whether the item
    /// changed.
    pub fn set_item_expanded(&self, id: NodeId, expanded: bool) -> bool {
        let Some(item) = self.item(id) else {
            return false;
        };
        if item.is_leaf() || !item.set_expanded(expanded) {
            return false;
        }
        let topic = if expanded { Topic::Expand } else { Topic::Collapse };
        let detail = EventDetail::Item { item: id, expanded };
        self.update();
        self.document().emit(id, topic, detail.clone());
        if expanded && item.is_lazy() {
            self.document().emit(id, Topic::Custom("lazy-load".into()), detail);
        }
        true
    }

    /// Expand an item.
    pub fn expand_item(&self, id: NodeId) -> bool {
        self.set_item_expanded(id, true)
    }

    /// Collapse an item.
    pub fn collapse_item(&self, id: NodeId) -> bool {
        self.set_item_expanded(id, false)
    }

    /// Flip an item's expansion.
    pub fn toggle_expanded(&self, id: NodeId) -> bool {
        match self.item(id) {
            Some(item) => self.set_item_expanded(id, !item.is_expanded()),
            None => false,
        }
    }

    /// Expand every item that has children. Returns how many changed.
    pub fn expand_all(&self) -> usize {
        self.all_items()
            .into_iter()
            .filter(|item| self.set_item_expanded(item.id(), true))
            .count()
    }

    /// Collapse every expanded item. Returns how many changed.
    pub fn collapse_all(&self) -> usize {
        self.all_items()
            .into_iter()
            .filter(|item| self.set_item_expanded(item.id(), false))
            .count()
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// The item holding the roving focus.
    pub fn focused_item(&self) -> Option<NodeId> {
        self.inner.focused.get()
    }

    /// Move the roving focus to `id`. Returns `false` if it is not an item.
    pub fn focus_item(&self, id: NodeId) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        self.inner.focused.set(Some(id));
        for item in self.all_items() {
            item.set_focused(item.id() == id);
        }
        true
    }

    /// Handle a key pressed with focus at `origin`.
    ///
    /// Up and Down move focus through visible items; Home and End jump to
    /// the first and last. Right expands a collapsed item or enters an
    /// expanded one; Left collapses an expanded item or moves to its parent.
    /// Space and Enter select. Returns whether the key was used.
    pub fn handle_key(&self, origin: NodeId, key: Key) -> bool {
        let visible = self.visible_items();
        let current = self
            .item(origin)
            .or_else(|| self.focused_item().and_then(|id| self.item(id)));
        let index = current
            .as_ref()
            .and_then(|item| visible.iter().position(|v| v == item));

        match (key, current) {
            (Key::ArrowDown, _) => {
                let next = index.map_or(0, |i| (i + 1).min(visible.len().saturating_sub(1)));
                visible.get(next).is_some_and(|item| self.focus_item(item.id()))
            }
            (Key::ArrowUp, _) => {
                let previous = index.map_or(0, |i| i.saturating_sub(1));
                visible.get(previous).is_some_and(|item| self.focus_item(item.id()))
            }
            (Key::Home, _) => visible.first().is_some_and(|item| self.focus_item(item.id())),
            (Key::End, _) => visible.last().is_some_and(|item| self.focus_item(item.id())),
            (Key::ArrowRight, Some(item)) if !item.is_leaf() => {
                if item.is_expanded() {
                    match item.children().first() {
                        Some(child) => self.focus_item(child.id()),
                        None => false,
                    }
                } else {
                    self.expand_item(item.id())
                }
            }
            (Key::ArrowLeft, Some(item)) => {
                if item.is_expanded() && !item.is_leaf() {
                    self.collapse_item(item.id())
                } else {
                    match item.parent_item() {
                        Some(parent) => self.focus_item(parent.id()),
                        None => false,
                    }
                }
            }
            (Key::Space | Key::Enter, Some(item)) => self.handle_intent(item.id()),
            _ => false,
        }
    }
}

impl Render for Tree {
    fn render(&self) -> Surface {
        let items: Vec<Markup> = self.items().iter().map(TreeItem::render_subtree).collect();
        let base = Element::new("div")
            .part("base")
            .attr("class", "tree")
            .attr("role", "tree")
            .attr("data-selection", self.selection_mode().as_str())
            .flag("aria-multiselectable", self.selection_mode() == SelectionMode::Multiple)
            .flag("aria-disabled", self.is_disabled())
            .children(items);
        Surface::new(base).with_style(STYLES)
    }
}

impl Widget for Tree {
    fn widget_base(&self) -> &WidgetBase {
        &self.inner.base
    }

    fn property_changed(&self, name: &str) {
        if name == "selection" && self.selection_mode() != SelectionMode::Multiple {
            // Narrowing to a single selection keeps the first selected eligible item.
            let leaf_only = self.selection_mode() == SelectionMode::Leaf;
            let keep = self
                .selected_items()
                .into_iter()
                .find(|item| !leaf_only || item.is_leaf());
            let mut changed = false;
            for item in self.all_items() {
                changed |= item.set_selected(Some(&item) == keep.as_ref());
            }
            if changed {
                self.selection_did_change();
                return;
            }
        }
        self.update();
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("id", &self.id())
            .field("selection", &self.selection_mode())
            .field("items", &self.inner.items.read().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Tree: Send, Sync);
