//! Shared state for every widget.

use std::sync::atomic::{AtomicUsize, Ordering};

use glint_core::{Document, NodeId, PropertyDecl, PropertyError, PropertyStore, PropertyValue};
use parking_lot::RwLock;

use crate::render::Surface;

/// The common part of every widget: its node, its document, its declared
/// properties and its most recent render surface.
pub struct WidgetBase {
    id: NodeId,
    document: Document,
    props: RwLock<PropertyStore>,
    surface: RwLock<Option<Surface>>,
    render_count: AtomicUsize,
}

impl WidgetBase {
    /// Register a new root node in `document` with the given declared properties.
    pub fn new(document: &Document, tag: &'static str, declared: &'static [PropertyDecl]) -> Self {
        Self::with_node(document, document.create_node(tag), tag, declared)
    }

    /// Wrap an already-registered node.
    pub fn with_node(
        document: &Document,
        id: NodeId,
        tag: &'static str,
        declared: &'static [PropertyDecl],
    ) -> Self {
        Self {
            id,
            document: document.clone(),
            props: RwLock::new(PropertyStore::new(tag, declared)),
            surface: RwLock::new(None),
            render_count: AtomicUsize::new(0),
        }
    }

    /// The widget's node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document the widget lives in.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The widget tag.
    pub fn tag(&self) -> &'static str {
        self.props.read().tag()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Store a property value without re-rendering.
    pub fn set(&self, name: &str, value: impl Into<PropertyValue>) -> Result<bool, PropertyError> {
        self.props.write().set(name, value)
    }

    /// Remove a property without re-rendering.
    pub fn remove(&self, name: &str) -> Result<bool, PropertyError> {
        self.props.write().remove(name)
    }

    /// Run a closure with read access to the property store.
    pub fn with_props<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PropertyStore) -> R,
    {
        f(&self.props.read())
    }

    /// A string property, if present.
    pub fn string(&self, name: &str) -> Option<String> {
        self.props.read().string(name).map(str::to_owned)
    }

    /// A string property, or the empty string.
    pub fn string_or_empty(&self, name: &str) -> String {
        self.props.read().string_or(name, "")
    }

    /// Whether a boolean property is present.
    pub fn flag(&self, name: &str) -> bool {
        self.props.read().flag(name)
    }

    /// A parsed property with a fallback for absent or malformed values.
    pub fn parsed<T: std::str::FromStr>(&self, name: &str, default: T) -> T {
        self.props.read().parsed(name, default)
    }

    // =========================================================================
    // Surface
    // =========================================================================

    /// Replace the cached surface.
    pub fn store_surface(&self, surface: Surface) {
        *self.surface.write() = Some(surface);
        self.render_count.fetch_add(1, Ordering::SeqCst);
    }

    /// The cached surface, if the widget has rendered.
    pub fn surface(&self) -> Option<Surface> {
        self.surface.read().clone()
    }

    /// How many times the widget has rendered.
    pub fn render_count(&self) -> usize {
        self.render_count.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBase")
            .field("id", &self.id)
            .field("props", &*self.props.read())
            .field("render_count", &self.render_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(WidgetBase: Send, Sync);
