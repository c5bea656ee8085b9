//! The document: node tree, event bus and outside-interaction observer.
//!
//! A [`Document`] is a cheap, cloneable handle. Every widget keeps one and
//! uses it to register its nodes, emit bubbling events and, for disclosure
//! controllers, to join the outside-interaction registry.
//!
//! # Outside interactions
//!
//! A single global `interaction` handler is installed when the document is
//! created. Controllers that can be dismissed by clicking elsewhere register
//! a [`Dismissable`] while attached. When a click reaches the global scope
//! (nothing stopped its propagation), every registered controller that is
//! open and whose subtree does not contain the click target is dismissed.
//! Detaching a node removes the registry entries of its whole subtree.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::config::DocumentConfig;
use crate::error::NodeResult;
use crate::event::{Dispatch, Event, EventBus, EventDetail, Interaction, Key, Subscription, Topic};
use crate::logging::targets;
use crate::node::{Lifecycle, NodeId, NodeTree};

/// A controller that closes when the user interacts outside of it.
pub trait Dismissable: Send + Sync {
    /// Root node of the controller's subtree.
    fn node(&self) -> NodeId;

    /// Whether the controller is currently open.
    fn is_open(&self) -> bool;

    /// Close the controller as a user-initiated transition.
    fn dismiss(&self);
}

struct DocumentInner {
    tree: RwLock<NodeTree>,
    bus: EventBus,
    dismissables: RwLock<Vec<(NodeId, Weak<dyn Dismissable>)>>,
    config: DocumentConfig,
}

/// Shared handle to a document.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.tree.read().len())
            .field("dismissables", &self.inner.dismissables.read().len())
            .finish()
    }
}

impl Document {
    /// Create a document with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create a document with the given configuration.
    pub fn with_config(config: DocumentConfig) -> Self {
        let inner = Arc::new(DocumentInner {
            tree: RwLock::new(NodeTree::new()),
            bus: EventBus::new(),
            dismissables: RwLock::new(Vec::new()),
            config,
        });

        let weak = Arc::downgrade(&inner);
        inner.bus.subscribe_global(Topic::Interaction, move |event| {
            if let Some(inner) = weak.upgrade() {
                Document { inner }.dismiss_outside(event);
            }
        });

        Self { inner }
    }

    /// The document configuration.
    pub fn config(&self) -> &DocumentConfig {
        &self.inner.config
    }

    /// Whether two handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Register a new, unattached root node.
    pub fn create_node(&self, tag: &'static str) -> NodeId {
        self.inner.tree.write().register(tag)
    }

    /// Register a new node as the last child of `parent`.
    ///
    /// The child is attached immediately if the parent is attached.
    pub fn create_child(&self, parent: NodeId, tag: &'static str) -> NodeResult<NodeId> {
        let child = {
            let mut tree = self.inner.tree.write();
            let child = tree.register(tag);
            if let Err(err) = tree.set_parent(child, Some(parent)) {
                let _ = tree.destroy(child);
                return Err(err);
            }
            if tree.is_attached(parent) {
                tree.attach(child)?;
            }
            child
        };
        if self.is_attached(child) {
            self.notify_lifecycle(&[child], Topic::Attached);
        }
        Ok(child)
    }

    /// Move `node` under `parent` (or make it a root).
    ///
    /// When the new parent is attached the node's subtree becomes attached.
    /// Returns the nodes whose lifecycle changed.
    pub fn set_parent(&self, node: NodeId, parent: Option<NodeId>) -> NodeResult<Vec<NodeId>> {
        let changed = {
            let mut tree = self.inner.tree.write();
            tree.set_parent(node, parent)?;
            match parent {
                Some(parent) if tree.is_attached(parent) => tree.attach(node)?,
                _ => Vec::new(),
            }
        };
        self.notify_lifecycle(&changed, Topic::Attached);
        Ok(changed)
    }

    /// Connect `node` (and its subtree) to the document, optionally under `parent`.
    ///
    /// Inserting under a parent that is not attached only reparents. Returns
    /// the nodes whose lifecycle changed.
    pub fn attach(&self, node: NodeId, parent: Option<NodeId>) -> NodeResult<Vec<NodeId>> {
        let changed = {
            let mut tree = self.inner.tree.write();
            if let Some(parent) = parent {
                tree.set_parent(node, Some(parent))?;
                if !tree.is_attached(parent) {
                    return Ok(Vec::new());
                }
            }
            tree.attach(node)?
        };
        self.notify_lifecycle(&changed, Topic::Attached);
        Ok(changed)
    }

    /// Disconnect `node` (and its subtree) and release its registry entries.
    ///
    /// Scoped event handlers stay registered so the node can be re-attached.
    /// Every node that changed receives a `detached` event at its own scope,
    /// after the whole subtree has been marked detached.
    pub fn detach(&self, node: NodeId) -> NodeResult<Vec<NodeId>> {
        let changed = self.inner.tree.write().detach(node)?;
        self.release_dismissables(&changed);
        self.notify_lifecycle(&changed, Topic::Detached);
        Ok(changed)
    }

    /// Remove `node` and its subtree, dropping their handlers and registry entries.
    pub fn destroy(&self, node: NodeId) -> NodeResult<()> {
        let removed = self.inner.tree.write().destroy(node)?;
        for &id in &removed {
            self.inner.bus.clear_scope(id);
        }
        self.release_dismissables(&removed);
        Ok(())
    }

    /// Lifecycle state of a node.
    pub fn lifecycle(&self, node: NodeId) -> NodeResult<Lifecycle> {
        self.inner.tree.read().lifecycle(node)
    }

    /// Whether a node is attached.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.inner.tree.read().is_attached(node)
    }

    /// Parent of a node.
    pub fn parent(&self, node: NodeId) -> NodeResult<Option<NodeId>> {
        self.inner.tree.read().parent(node)
    }

    /// Whether `node` lies in the subtree rooted at `root`.
    pub fn contains(&self, root: NodeId, node: NodeId) -> bool {
        self.inner.tree.read().contains(root, node)
    }

    /// Run a closure with read access to the node tree.
    pub fn with_tree<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&NodeTree) -> R,
    {
        f(&self.inner.tree.read())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Observe `topic` at `scope` (events raised at the scope or below).
    pub fn subscribe<F>(&self, scope: NodeId, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.bus.subscribe(scope, topic, handler)
    }

    /// Observe `topic` anywhere in the document.
    pub fn subscribe_global<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.bus.subscribe_global(topic, handler)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.inner.bus.unsubscribe(subscription)
    }

    /// Deliver an already-built event from its source upwards.
    pub fn dispatch(&self, event: &Event) -> Dispatch {
        let path = {
            let tree = self.inner.tree.read();
            let mut path = vec![event.source()];
            match tree.ancestors(event.source()) {
                Ok(ancestors) => path.extend(ancestors),
                Err(err) => {
                    tracing::warn!(target: targets::DOCUMENT, %err, topic = %event.topic(), "dispatch from unknown node");
                    return Dispatch::default();
                }
            }
            path
        };
        self.inner.bus.dispatch(&path, event)
    }

    /// Raise an event at `source`.
    pub fn emit(&self, source: NodeId, topic: Topic, detail: EventDetail) -> Dispatch {
        self.dispatch(&Event::new(topic, source, detail))
    }

    /// Raise a failure event for a collaborator that could not load a resource.
    pub fn report_failure(&self, source: NodeId, message: impl Into<String>) -> Dispatch {
        let message = message.into();
        tracing::warn!(target: targets::DOCUMENT, ?source, %message, "collaborator failure");
        self.emit(source, Topic::Error, EventDetail::Error { message })
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// Deliver a user interaction at `target`.
    ///
    /// Interactions on nodes that are not attached are dropped.
    pub fn interact(&self, target: NodeId, interaction: Interaction) -> Dispatch {
        if !self.is_attached(target) {
            tracing::debug!(target: targets::DOCUMENT, ?target, "interaction on unattached node ignored");
            return Dispatch::default();
        }
        self.emit(target, Topic::Interaction, EventDetail::Interaction(interaction))
    }

    /// Click at `target`.
    pub fn click(&self, target: NodeId) -> Dispatch {
        self.interact(target, Interaction::Click)
    }

    /// Press `key` with focus at `target`.
    pub fn key_press(&self, target: NodeId, key: Key) -> Dispatch {
        self.interact(target, Interaction::Key(key))
    }

    /// Add a controller to the outside-interaction registry.
    ///
    /// Registering the same node again replaces the previous entry.
    pub fn register_dismissable(&self, controller: Weak<dyn Dismissable>) {
        let Some(strong) = controller.upgrade() else {
            return;
        };
        let node = strong.node();
        let mut entries = self.inner.dismissables.write();
        entries.retain(|(id, _)| *id != node);
        entries.push((node, controller));
        tracing::debug!(target: targets::DOCUMENT, ?node, registered = entries.len(), "dismissable registered");
    }

    /// Remove a controller from the outside-interaction registry.
    pub fn unregister_dismissable(&self, node: NodeId) -> bool {
        let mut entries = self.inner.dismissables.write();
        let before = entries.len();
        entries.retain(|(id, _)| *id != node);
        before != entries.len()
    }

    /// Whether `node` has a registry entry.
    pub fn is_dismissable_registered(&self, node: NodeId) -> bool {
        self.inner.dismissables.read().iter().any(|(id, _)| *id == node)
    }

    /// Number of live registry entries.
    pub fn dismissable_count(&self) -> usize {
        self.inner.dismissables.read().len()
    }

    fn notify_lifecycle(&self, nodes: &[NodeId], topic: Topic) {
        for &node in nodes {
            let event = Event::new(topic.clone(), node, EventDetail::None);
            self.inner.bus.dispatch(&[node], &event);
        }
    }

    fn release_dismissables(&self, nodes: &[NodeId]) {
        if nodes.is_empty() {
            return;
        }
        let mut entries = self.inner.dismissables.write();
        entries.retain(|(id, _)| !nodes.contains(id));
    }

    fn dismiss_outside(&self, event: &Event) {
        if event.interaction() != Some(Interaction::Click) {
            return;
        }
        let target = event.source();

        let candidates: Vec<Arc<dyn Dismissable>> = {
            let mut entries = self.inner.dismissables.write();
            entries.retain(|(_, weak)| weak.strong_count() > 0);
            entries.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
        };

        let outside: Vec<Arc<dyn Dismissable>> = {
            let tree = self.inner.tree.read();
            candidates
                .into_iter()
                .filter(|c| tree.is_attached(c.node()) && !tree.contains(c.node(), target))
                .collect()
        };

        for controller in outside {
            if controller.is_open() {
                tracing::debug!(target: targets::DOCUMENT, node = ?controller.node(), ?target, "dismissing on outside interaction");
                controller.dismiss();
            }
        }
    }
}

static_assertions::assert_impl_all!(Document: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Panel {
        node: NodeId,
        open: AtomicBool,
        dismissed: AtomicUsize,
    }

    impl Dismissable for Panel {
        fn node(&self) -> NodeId {
            self.node
        }

        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
        }

        fn dismiss(&self) {
            self.open.store(false, Ordering::SeqCst);
            self.dismissed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn panel(doc: &Document, parent: NodeId) -> (Arc<Panel>, NodeId) {
        let node = doc.create_child(parent, "x-panel").unwrap();
        let inner = doc.create_child(node, "x-panel-body").unwrap();
        let panel = Arc::new(Panel {
            node,
            open: AtomicBool::new(true),
            dismissed: AtomicUsize::new(0),
        });
        let weak: Weak<dyn Dismissable> = Arc::downgrade(&panel) as Weak<dyn Dismissable>;
        doc.register_dismissable(weak);
        (panel, inner)
    }

    fn page(doc: &Document) -> NodeId {
        let page = doc.create_node("x-page");
        doc.attach(page, None).unwrap();
        page
    }

    #[test]
    fn test_create_child_inherits_attachment() {
        let doc = Document::new();
        let page = page(&doc);
        let child = doc.create_child(page, "x-child").unwrap();
        assert_eq!(doc.lifecycle(child).unwrap(), Lifecycle::Attached);

        let loose = doc.create_node("x-loose");
        let loose_child = doc.create_child(loose, "x-child").unwrap();
        assert_eq!(doc.lifecycle(loose_child).unwrap(), Lifecycle::Unattached);
    }

    #[test]
    fn test_outside_click_dismisses() {
        let doc = Document::new();
        let page = page(&doc);
        let elsewhere = doc.create_child(page, "x-button").unwrap();
        let (panel, _) = panel(&doc, page);

        doc.click(elsewhere);
        assert!(!panel.is_open());
        assert_eq!(panel.dismissed.load(Ordering::SeqCst), 1);

        // Already closed: no second dismissal.
        doc.click(elsewhere);
        assert_eq!(panel.dismissed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inside_click_keeps_open() {
        let doc = Document::new();
        let page = page(&doc);
        let (panel, inner) = panel(&doc, page);

        doc.click(inner);
        assert!(panel.is_open());
    }

    #[test]
    fn test_key_press_does_not_dismiss() {
        let doc = Document::new();
        let page = page(&doc);
        let (panel, _) = panel(&doc, page);
        doc.key_press(page, Key::Tab);
        assert!(panel.is_open());
    }

    #[test]
    fn test_stopped_interaction_skips_observer() {
        let doc = Document::new();
        let page = page(&doc);
        let trigger = doc.create_child(page, "x-trigger").unwrap();
        doc.subscribe(trigger, Topic::Interaction, |event| event.stop_propagation());
        let (panel, _) = panel(&doc, page);

        let outcome = doc.click(trigger);
        assert!(outcome.stopped);
        assert!(panel.is_open());
    }

    #[test]
    fn test_detach_releases_registry_entry() {
        let doc = Document::new();
        let page = page(&doc);
        let other = doc.create_child(page, "x-other").unwrap();
        let (panel, _) = panel(&doc, page);
        assert_eq!(doc.dismissable_count(), 1);

        doc.detach(panel.node()).unwrap();
        assert_eq!(doc.dismissable_count(), 0);

        doc.click(other);
        assert!(panel.is_open());
    }

    #[test]
    fn test_lifecycle_events_at_own_scope() {
        let doc = Document::new();
        let page = page(&doc);
        let widget = doc.create_node("x-widget");
        let inner = doc.create_child(widget, "x-inner").unwrap();

        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for (node, label) in [(widget, "widget"), (inner, "inner")] {
            let attached = log.clone();
            doc.subscribe(node, Topic::Attached, move |_| attached.lock().push((label, "attached")));
            let detached = log.clone();
            doc.subscribe(node, Topic::Detached, move |_| detached.lock().push((label, "detached")));
        }

        doc.attach(widget, Some(page)).unwrap();
        doc.detach(widget).unwrap();
        assert_eq!(
            *log.lock(),
            vec![
                ("widget", "attached"),
                ("inner", "attached"),
                ("widget", "detached"),
                ("inner", "detached"),
            ]
        );
    }

    #[test]
    fn test_register_twice_keeps_one_entry() {
        let doc = Document::new();
        let page = page(&doc);
        let (panel, _) = panel(&doc, page);
        let weak: Weak<dyn Dismissable> = Arc::downgrade(&panel) as Weak<dyn Dismissable>;
        doc.register_dismissable(weak);
        assert_eq!(doc.dismissable_count(), 1);
        assert!(doc.unregister_dismissable(panel.node()));
        assert!(!doc.is_dismissable_registered(panel.node()));
    }

    #[test]
    fn test_dropped_controller_is_pruned() {
        let doc = Document::new();
        let page = page(&doc);
        let (panel, _) = panel(&doc, page);
        drop(panel);
        doc.click(page);
        assert_eq!(doc.dismissable_count(), 0);
    }

    #[test]
    fn test_interaction_on_unattached_node_dropped() {
        let doc = Document::new();
        let loose = doc.create_node("x-loose");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        doc.subscribe(loose, Topic::Interaction, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(doc.click(loose).delivered, 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_report_failure_emits_error() {
        let doc = Document::new();
        let page = page(&doc);
        let leaf = doc.create_child(page, "x-include").unwrap();
        let message = Arc::new(parking_lot::Mutex::new(String::new()));
        let message_clone = message.clone();
        doc.subscribe(page, Topic::Error, move |event| {
            if let EventDetail::Error { message } = event.detail() {
                *message_clone.lock() = message.clone();
            }
        });
        doc.report_failure(leaf, "404 Not Found");
        assert_eq!(*message.lock(), "404 Not Found");
    }

    #[test]
    fn test_destroy_clears_handlers() {
        let doc = Document::new();
        let page = page(&doc);
        let node = doc.create_child(page, "x-node").unwrap();
        doc.subscribe(node, Topic::Change, |_| {});
        doc.destroy(node).unwrap();
        assert!(!doc.with_tree(|t| t.exists(node)));
        assert_eq!(doc.emit(node, Topic::Change, EventDetail::None).delivered, 0);
    }
}
