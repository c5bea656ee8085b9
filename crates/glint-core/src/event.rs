//! Typed, bubbling events.
//!
//! An [`Event`] has a [`Topic`], the [`NodeId`] that raised it, and an
//! [`EventDetail`] payload. The [`EventBus`] delivers it along a propagation
//! path (the source node, then each ancestor) to handlers subscribed at those
//! scopes, and finally to global handlers. Any handler may stop propagation.
//!
//! Each scope/topic pair is backed by one [`Signal<Event>`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::logging::targets;
use crate::node::NodeId;
use crate::signal::{ConnectionId, Signal};

/// The name of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A coordinator's value changed.
    Change,
    /// A selectable node asks to become selected.
    Intent,
    /// A user interaction (click or key press) at a node.
    Interaction,
    /// A disclosure panel opened.
    Shown,
    /// A disclosure panel closed.
    Hidden,
    /// A closable tab asks to be closed.
    CloseRequest,
    /// A tree selection changed, or an item inside a dropdown panel was picked.
    Select,
    /// A tree item expanded.
    Expand,
    /// A tree item collapsed.
    Collapse,
    /// A collaborator failed to acquire a resource.
    Error,
    /// A node became attached. Delivered at the node's own scope only.
    Attached,
    /// A node became detached. Delivered at the node's own scope only.
    Detached,
    /// Any other application-defined topic.
    Custom(String),
}

impl Topic {
    /// The wire name of the topic.
    pub fn name(&self) -> &str {
        match self {
            Self::Change => "change",
            Self::Intent => "intent",
            Self::Interaction => "interaction",
            Self::Shown => "shown",
            Self::Hidden => "hidden",
            Self::CloseRequest => "close-request",
            Self::Select => "select",
            Self::Expand => "expand",
            Self::Collapse => "collapse",
            Self::Error => "error",
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key relevant to widget interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Enter,
    Space,
    Escape,
    Tab,
    /// A printable character.
    Char(char),
}

/// What kind of user interaction occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// A pointer click.
    Click,
    /// A key press.
    Key(Key),
}

/// The payload of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventDetail {
    /// No payload.
    #[default]
    None,
    /// A scalar value, e.g. `{ value }` on a radio group change.
    Value {
        /// The new value; empty when nothing is selected.
        value: String,
    },
    /// A set of selected values, in document order.
    Selection {
        /// The selected values.
        values: Vec<String>,
    },
    /// A reference to the node the event concerns, e.g. `{ source }` on a close request.
    Source {
        /// The referenced node.
        source: NodeId,
    },
    /// A tree item whose expansion changed.
    Item {
        /// The item node.
        item: NodeId,
        /// Expansion state after the change.
        expanded: bool,
    },
    /// A user interaction.
    Interaction(Interaction),
    /// A failure description.
    Error {
        /// Human-readable failure message.
        message: String,
    },
}

/// An event travelling through the bus.
#[derive(Debug)]
pub struct Event {
    topic: Topic,
    source: NodeId,
    detail: EventDetail,
    stopped: AtomicBool,
}

impl Event {
    /// Create a new event.
    pub fn new(topic: Topic, source: NodeId, detail: EventDetail) -> Self {
        Self {
            topic,
            source,
            detail,
            stopped: AtomicBool::new(false),
        }
    }

    /// The event topic.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// The node that raised the event.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The payload.
    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    /// The interaction carried by this event, if any.
    pub fn interaction(&self) -> Option<Interaction> {
        match self.detail {
            EventDetail::Interaction(interaction) => Some(interaction),
            _ => None,
        }
    }

    /// Stop the event from reaching further scopes and global handlers.
    ///
    /// Handlers already subscribed at the current scope still run.
    pub fn stop_propagation(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether propagation has been stopped.
    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// A handle to one subscription, used to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    scope: Option<NodeId>,
    topic: Topic,
    id: ConnectionId,
}

impl Subscription {
    /// The scope the handler is registered at; `None` for global handlers.
    pub fn scope(&self) -> Option<NodeId> {
        self.scope
    }

    /// The subscribed topic.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }
}

/// The outcome of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// Number of handlers invoked.
    pub delivered: usize,
    /// Whether a handler stopped propagation.
    pub stopped: bool,
}

/// Scope- and topic-keyed handler registry.
#[derive(Default)]
pub struct EventBus {
    scoped: RwLock<HashMap<(NodeId, Topic), Arc<Signal<Event>>>>,
    global: RwLock<HashMap<Topic, Arc<Signal<Event>>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe `topic` for events raised at `scope` or any of its descendants.
    pub fn subscribe<F>(&self, scope: NodeId, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let signal = self
            .scoped
            .write()
            .entry((scope, topic.clone()))
            .or_default()
            .clone();
        let id = signal.connect(handler);
        Subscription {
            scope: Some(scope),
            topic,
            id,
        }
    }

    /// Observe `topic` for events raised anywhere.
    pub fn subscribe_global<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let signal = self.global.write().entry(topic.clone()).or_default().clone();
        let id = signal.connect(handler);
        Subscription {
            scope: None,
            topic,
            id,
        }
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let signal = match subscription.scope {
            Some(scope) => self
                .scoped
                .read()
                .get(&(scope, subscription.topic.clone()))
                .cloned(),
            None => self.global.read().get(&subscription.topic).cloned(),
        };
        signal.is_some_and(|s| s.disconnect(subscription.id))
    }

    /// Drop every handler registered at `scope`. Returns how many topics were cleared.
    pub fn clear_scope(&self, scope: NodeId) -> usize {
        let mut scoped = self.scoped.write();
        let before = scoped.len();
        scoped.retain(|(node, _), _| *node != scope);
        before - scoped.len()
    }

    /// Number of handlers registered at `scope` across all topics.
    pub fn handler_count(&self, scope: NodeId) -> usize {
        self.scoped
            .read()
            .iter()
            .filter(|((node, _), _)| *node == scope)
            .map(|(_, signal)| signal.connection_count())
            .sum()
    }

    /// Deliver `event` to handlers at each scope of `path`, in order, then to
    /// global handlers, stopping early if a handler stops propagation.
    pub fn dispatch(&self, path: &[NodeId], event: &Event) -> Dispatch {
        let mut outcome = Dispatch::default();
        tracing::trace!(
            target: targets::EVENT,
            topic = %event.topic,
            source = ?event.source,
            depth = path.len(),
            "dispatching event"
        );

        for &scope in path {
            let signal = self
                .scoped
                .read()
                .get(&(scope, event.topic.clone()))
                .cloned();
            if let Some(signal) = signal {
                outcome.delivered += signal.emit(event);
            }
            if event.is_propagation_stopped() {
                outcome.stopped = true;
                return outcome;
            }
        }

        let global = self.global.read().get(&event.topic).cloned();
        if let Some(signal) = global {
            outcome.delivered += signal.emit(event);
        }
        outcome.stopped = event.is_propagation_stopped();
        outcome
    }
}
