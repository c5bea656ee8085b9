//! Tabs and tab panels.
//!
//! Both are passive state holders: a tab-group coordinator outside this
//! crate decides which [`Tab`] and [`TabPanel`] are active. The only thing a
//! tab raises on its own is a `close-request` event carrying `{ source }`
//! when its close button is clicked; removing the tab is up to whoever
//! listens.

use std::sync::{Arc, Weak};

use glint_core::{Document, EventDetail, Interaction, NodeId, PropertyDecl, Signal, Topic};

use crate::render::{Element, Markup, Render, Surface};
use crate::widget::{Widget, WidgetBase, assign, part_node, targets};

const TAB_PROPS: &[PropertyDecl] = &[
    PropertyDecl::string("panel"),
    PropertyDecl::flag("active"),
    PropertyDecl::flag("closable"),
    PropertyDecl::flag("disabled"),
];

const PANEL_PROPS: &[PropertyDecl] = &[PropertyDecl::string("name"), PropertyDecl::flag("active")];

struct TabInner {
    base: WidgetBase,
    close_button: NodeId,
    close_requested: Signal<NodeId>,
}

/// A tab header naming the panel it shows.
#[derive(Clone)]
pub struct Tab {
    inner: Arc<TabInner>,
}

impl Tab {
    /// Create an inactive, non-closable tab.
    pub fn new(document: &Document) -> Self {
        let base = WidgetBase::new(document, "x-tab", TAB_PROPS);
        let close_button = part_node(document, base.id(), "close-button");
        let tab = Self {
            inner: Arc::new(TabInner {
                base,
                close_button,
                close_requested: Signal::new(),
            }),
        };

        let weak: Weak<TabInner> = Arc::downgrade(&tab.inner);
        document.subscribe(close_button, Topic::Interaction, move |event| {
            if event.interaction() != Some(Interaction::Click) {
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let tab = Tab { inner };
            if tab.is_closable() {
                tab.request_close();
            }
        });

        tab
    }

    /// Link the tab to a panel name using builder pattern.
    pub fn with_panel(self, panel: impl Into<String>) -> Self {
        assign(&self, "panel", panel.into());
        self
    }

    /// Show a close button using builder pattern.
    pub fn with_closable(self, closable: bool) -> Self {
        self.set_closable(closable);
        self
    }

    /// Signal emitted with the tab's node when closing is requested.
    pub fn close_requested(&self) -> &Signal<NodeId> {
        &self.inner.close_requested
    }

    /// The close button's node.
    pub fn close_button(&self) -> NodeId {
        self.inner.close_button
    }

    /// The name of the linked panel.
    pub fn panel(&self) -> String {
        self.inner.base.string_or_empty("panel")
    }

    /// Whether the tab is the active one in its bar.
    pub fn is_active(&self) -> bool {
        self.inner.base.flag("active")
    }

    /// Mark the tab active or inactive. Returns whether the flag changed.
    pub fn set_active(&self, active: bool) -> bool {
        assign(self, "active", active)
    }

    /// Whether the tab shows a close button.
    pub fn is_closable(&self) -> bool {
        self.inner.base.flag("closable")
    }

    /// Show or hide the close button. Returns whether the flag changed.
    pub fn set_closable(&self, closable: bool) -> bool {
        assign(self, "closable", closable)
    }

    /// Whether the tab is disabled.
    pub fn is_disabled(&self) -> bool {
        self.inner.base.flag("disabled")
    }

    /// Disable or enable the tab. A disabled tab ignores close requests.
    /// Returns whether the flag changed.
    pub fn set_disabled(&self, disabled: bool) -> bool {
        assign(self, "disabled", disabled)
    }

    /// Raise `close-request` with this tab as `source`.
    ///
    /// Ignored when the tab is disabled. Returns whether the request was raised.
    pub fn request_close(&self) -> bool {
        if self.is_disabled() {
            tracing::debug!(target: targets::TAB, tab = ?self.id(), "close request on disabled tab ignored");
            return false;
        }
        let source = self.id();
        self.inner.close_requested.emit(&source);
        self.document()
            .emit(source, Topic::CloseRequest, EventDetail::Source { source });
        true
    }
}

impl Render for Tab {
    fn render(&self) -> Surface {
        let active = self.is_active();
        let disabled = self.is_disabled();
        let closable = self.is_closable();

        let mut base = Element::new("div")
            .part("base")
            .classes(&[
                ("tab", true),
                ("tab--active", active),
                ("tab--closable", closable),
                ("tab--disabled", disabled),
            ])
            .attr("role", "tab")
            .attr("aria-selected", active.to_string())
            .attr("aria-disabled", disabled.to_string())
            .attr("tabindex", if active && !disabled { "0" } else { "-1" })
            .child(Markup::slot());
        if closable {
            base = base.child(
                Element::new("button")
                    .part("close-button")
                    .attr("class", "tab__close-button")
                    .attr("type", "button")
                    .attr("tabindex", "-1"),
            );
        }
        Surface::new(base)
    }
}

impl Widget for Tab {
    fn widget_base(&self) -> &WidgetBase {
        &self.inner.base
    }
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id())
            .field("panel", &self.panel())
            .field("active", &self.is_active())
            .finish()
    }
}

/// The content shown for the tab whose `panel` equals this panel's `name`.
#[derive(Clone)]
pub struct TabPanel {
    base: Arc<WidgetBase>,
}

impl TabPanel {
    /// Create an inactive panel.
    pub fn new(document: &Document) -> Self {
        Self {
            base: Arc::new(WidgetBase::new(document, "x-tab-panel", PANEL_PROPS)),
        }
    }

    /// Set the name using builder pattern.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        assign(&self, "name", name.into());
        self
    }

    /// The panel name tabs refer to.
    pub fn name(&self) -> String {
        self.base.string_or_empty("name")
    }

    /// Whether the panel is shown.
    pub fn is_active(&self) -> bool {
        self.base.flag("active")
    }

    /// Show or hide the panel. Returns whether the flag changed.
    pub fn set_active(&self, active: bool) -> bool {
        assign(self, "active", active)
    }

    /// Whether this panel belongs to `tab`.
    pub fn is_linked_to(&self, tab: &Tab) -> bool {
        !self.name().is_empty() && self.name() == tab.panel()
    }
}

impl Render for TabPanel {
    fn render(&self) -> Surface {
        let active = self.is_active();
        let base = Element::new("div")
            .part("base")
            .classes(&[("tab-panel", true), ("tab-panel--active", active)])
            .attr("role", "tabpanel")
            .attr("aria-hidden", (!active).to_string())
            .flag("hidden", !active)
            .child(Markup::slot());
        Surface::new(base).with_style(":host{display:block}:host([hidden]){display:none}")
    }
}

impl Widget for TabPanel {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }
}

impl std::fmt::Debug for TabPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabPanel")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("active", &self.is_active())
            .finish()
    }
}

static_assertions::assert_impl_all!(Tab: Send, Sync);
static_assertions::assert_impl_all!(TabPanel: Send, Sync);
