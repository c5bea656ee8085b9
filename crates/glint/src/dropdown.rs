//! Dropdown disclosure controller.
//!
//! A [`Dropdown`] owns an open flag, a trigger node and a panel node. The
//! trigger toggles the panel; a click anywhere outside the dropdown's subtree
//! closes it through the document's dismissable registry.
//!
//! Only user-initiated transitions ([`show`](Dropdown::show),
//! [`hide`](Dropdown::hide), [`toggle`](Dropdown::toggle) and the
//! interactions that call them) emit `shown` and `hidden`.
//! [`set_open`](Dropdown::set_open) reconciles the surface silently.
//!
//! ```
//! use glint::prelude::*;
//!
//! let doc = Document::new();
//! let page = doc.create_node("page");
//! doc.attach(page, None).unwrap();
//!
//! let dropdown = Dropdown::new(&doc);
//! dropdown.attach(Some(page)).unwrap();
//!
//! doc.click(dropdown.trigger());
//! assert!(dropdown.is_open());
//! doc.click(page);
//! assert!(!dropdown.is_open());
//! ```

use std::sync::{Arc, Weak};

use glint_core::{
    Dismissable, Document, EventDetail, Interaction, Key, NodeId, Placement, PropertyDecl,
    Signal, Topic,
};

use crate::render::{Element, Markup, Render, Surface};
use crate::widget::{Widget, WidgetBase, assign, part_node, targets};

const DROPDOWN_PROPS: &[PropertyDecl] = &[
    PropertyDecl::flag("open"),
    PropertyDecl::string("placement"),
    PropertyDecl::flag("disabled"),
    PropertyDecl::flag("stay-open-on-select"),
];

const STYLES: &str = ":host{display:inline-block}\
.dropdown{position:relative}\
.dropdown__panel{position:absolute;z-index:900}\
.dropdown__panel[hidden]{display:none}";

/// The CSS transform origin a panel animates from for a placement.
pub fn transform_origin(placement: Placement) -> &'static str {
    match placement {
        Placement::TopStart => "bottom left",
        Placement::TopEnd => "bottom right",
        Placement::BottomStart => "top left",
        Placement::BottomEnd => "top right",
        Placement::LeftStart => "top right",
        Placement::RightStart => "top left",
    }
}

struct DropdownInner {
    base: WidgetBase,
    this: Weak<DropdownInner>,
    trigger: NodeId,
    panel: NodeId,
    open_changed: Signal<bool>,
}

impl Dismissable for DropdownInner {
    fn node(&self) -> NodeId {
        self.base.id()
    }

    fn is_open(&self) -> bool {
        self.base.flag("open")
    }

    fn dismiss(&self) {
        if let Some(inner) = self.this.upgrade() {
            Dropdown { inner }.hide();
        }
    }
}

/// A trigger with a panel that opens below (or beside) it.
///
/// Content goes under [`panel`](Self::panel); the element that opens the
/// dropdown goes under [`trigger`](Self::trigger).
///
/// # Signals
///
/// - `open_changed(bool)`: emitted with every `shown` or `hidden` event.
#[derive(Clone)]
pub struct Dropdown {
    inner: Arc<DropdownInner>,
}

impl Dropdown {
    /// Create a closed dropdown.
    pub fn new(document: &Document) -> Self {
        let inner = Arc::new_cyclic(|this| {
            let base = WidgetBase::new(document, "x-dropdown", DROPDOWN_PROPS);
            let trigger = part_node(document, base.id(), "trigger");
            let panel = part_node(document, base.id(), "panel");
            DropdownInner {
                base,
                this: this.clone(),
                trigger,
                panel,
                open_changed: Signal::new(),
            }
        });
        let dropdown = Self { inner };
        let id = dropdown.id();

        let weak = Arc::downgrade(&dropdown.inner);
        document.subscribe(id, Topic::Attached, move |_| {
            if let Some(inner) = weak.upgrade() {
                let controller: Weak<dyn Dismissable> = Arc::downgrade(&inner) as Weak<dyn Dismissable>;
                inner.base.document().register_dismissable(controller);
            }
        });

        let weak = Arc::downgrade(&dropdown.inner);
        document.subscribe(id, Topic::Detached, move |_| {
            // The registry entry is already gone; close without signalling.
            if let Some(inner) = weak.upgrade() {
                Dropdown { inner }.set_open(false);
            }
        });

        let weak = Arc::downgrade(&dropdown.inner);
        document.subscribe(dropdown.trigger(), Topic::Interaction, move |event| {
            let activates = matches!(
                event.interaction(),
                Some(Interaction::Click | Interaction::Key(Key::Enter | Key::Space))
            );
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let dropdown = Dropdown { inner };
            if !activates || dropdown.is_disabled() {
                return;
            }
            dropdown.toggle();
            event.stop_propagation();
        });

        let weak = Arc::downgrade(&dropdown.inner);
        document.subscribe(id, Topic::Interaction, move |event| {
            if event.interaction() != Some(Interaction::Key(Key::Escape)) {
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let dropdown = Dropdown { inner };
            if dropdown.hide() {
                event.stop_propagation();
            }
        });

        let weak = Arc::downgrade(&dropdown.inner);
        document.subscribe(dropdown.panel(), Topic::Select, move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let dropdown = Dropdown { inner };
            if !dropdown.stays_open_on_select() {
                dropdown.hide();
            }
        });

        dropdown
    }

    /// Set the placement using builder pattern.
    pub fn with_placement(self, placement: Placement) -> Self {
        self.set_placement(placement);
        self
    }

    /// Keep the panel open when something inside it is selected.
    pub fn with_stay_open_on_select(self, stay_open: bool) -> Self {
        self.set_stay_open_on_select(stay_open);
        self
    }

    /// Signal emitted on every user-initiated open or close.
    pub fn open_changed(&self) -> &Signal<bool> {
        &self.inner.open_changed
    }

    /// The node interactions on which toggle the dropdown.
    pub fn trigger(&self) -> NodeId {
        self.inner.trigger
    }

    /// The node panel content is placed under.
    pub fn panel(&self) -> NodeId {
        self.inner.panel
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Whether the panel is open.
    pub fn is_open(&self) -> bool {
        self.inner.base.flag("open")
    }

    /// Open the panel, emitting `shown`. Returns `false` if it was already open.
    pub fn show(&self) -> bool {
        self.transition(true)
    }

    /// Close the panel, emitting `hidden`. Returns `false` if it was already closed.
    pub fn hide(&self) -> bool {
        self.transition(false)
    }

    /// Flip the open flag, emitting the matching event.
    pub fn toggle(&self) -> bool {
        self.transition(!self.is_open())
    }

    /// Set the open flag as an attribute write: the surface follows but no
    /// event is emitted.
    pub fn set_open(&self, open: bool) -> bool {
        assign(self, "open", open)
    }

    fn transition(&self, open: bool) -> bool {
        if !self.set_open(open) {
            return false;
        }
        let topic = if open { Topic::Shown } else { Topic::Hidden };
        tracing::debug!(target: targets::DROPDOWN, dropdown = ?self.id(), %topic, "transition");
        self.inner.open_changed.emit(&open);
        self.document().emit(self.id(), topic, EventDetail::None);
        true
    }

    /// Whether the trigger is inert.
    pub fn is_disabled(&self) -> bool {
        self.inner.base.flag("disabled")
    }

    /// Disable or enable the trigger.
    pub fn set_disabled(&self, disabled: bool) -> bool {
        assign(self, "disabled", disabled)
    }

    /// Whether a `select` from inside the panel leaves it open.
    pub fn stays_open_on_select(&self) -> bool {
        self.inner.base.flag("stay-open-on-select")
    }

    /// Set whether a `select` from inside the panel leaves it open.
    pub fn set_stay_open_on_select(&self, stay_open: bool) -> bool {
        assign(self, "stay-open-on-select", stay_open)
    }

    /// The panel placement; missing or unknown tokens fall back to the
    /// document's default placement.
    pub fn placement(&self) -> Placement {
        self.inner
            .base
            .parsed("placement", self.document().config().default_placement)
    }

    /// Change the panel placement.
    pub fn set_placement(&self, placement: Placement) -> bool {
        assign(self, "placement", placement.as_str())
    }
}

impl Render for Dropdown {
    fn render(&self) -> Surface {
        let open = self.is_open();
        let placement = self.placement();

        let trigger = Element::new("div")
            .part("trigger")
            .attr("class", "dropdown__trigger")
            .attr("aria-haspopup", "true")
            .attr("aria-expanded", open.to_string())
            .flag("aria-disabled", self.is_disabled())
            .child(Markup::named_slot("trigger"));

        let panel = Element::new("div")
            .part("panel")
            .attr("class", "dropdown__panel")
            .attr("data-placement", placement.as_str())
            .attr("style", format!("transform-origin: {}", transform_origin(placement)))
            .attr("aria-hidden", (!open).to_string())
            .flag("hidden", !open)
            .child(Markup::slot());

        let base = Element::new("div")
            .part("base")
            .classes(&[("dropdown", true), ("dropdown--open", open)])
            .child(trigger)
            .child(panel);

        Surface::new(base).with_style(STYLES)
    }
}

impl Widget for Dropdown {
    fn widget_base(&self) -> &WidgetBase {
        &self.inner.base
    }
}

impl std::fmt::Debug for Dropdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dropdown")
            .field("id", &self.id())
            .field("open", &self.is_open())
            .field("placement", &self.placement())
            .finish()
    }
}

static_assertions::assert_impl_all!(Dropdown: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::DocumentConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counts {
        shown: Arc<AtomicUsize>,
        hidden: Arc<AtomicUsize>,
    }

    fn count_events(doc: &Document, dropdown: &Dropdown) -> Counts {
        let shown = Arc::new(AtomicUsize::new(0));
        let hidden = Arc::new(AtomicUsize::new(0));
        let s = shown.clone();
        doc.subscribe(dropdown.id(), Topic::Shown, move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });
        let h = hidden.clone();
        doc.subscribe(dropdown.id(), Topic::Hidden, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        Counts { shown, hidden }
    }

    fn setup() -> (Document, NodeId, Dropdown) {
        let doc = Document::new();
        let page = doc.create_node("page");
        doc.attach(page, None).unwrap();
        let dropdown = Dropdown::new(&doc);
        dropdown.attach(Some(page)).unwrap();
        (doc, page, dropdown)
    }

    #[test]
    fn test_trigger_toggles_and_signals_once() {
        let (doc, _, dropdown) = setup();
        let counts = count_events(&doc, &dropdown);

        doc.click(dropdown.trigger());
        assert!(dropdown.is_open());
        assert_eq!(counts.shown.load(Ordering::SeqCst), 1);

        doc.key_press(dropdown.trigger(), Key::Enter);
        assert!(!dropdown.is_open());
        assert_eq!(counts.hidden.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_outside_click_closes_inside_click_does_not() {
        let (doc, page, dropdown) = setup();
        let item = doc.create_child(dropdown.panel(), "menu-item").unwrap();
        let counts = count_events(&doc, &dropdown);

        dropdown.show();
        doc.click(item);
        assert!(dropdown.is_open());
        doc.click(page);
        assert!(!dropdown.is_open());
        assert_eq!(counts.hidden.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_escape_closes() {
        let (doc, _, dropdown) = setup();
        dropdown.show();
        let dispatch = doc.key_press(dropdown.panel(), Key::Escape);
        assert!(!dropdown.is_open());
        assert!(dispatch.stopped);
    }

    #[test]
    fn test_escape_while_closed_keeps_bubbling() {
        let (doc, _, dropdown) = setup();
        let counts = count_events(&doc, &dropdown);
        let dispatch = doc.key_press(dropdown.panel(), Key::Escape);
        assert!(!dropdown.is_open());
        assert!(!dispatch.stopped);
        assert_eq!(counts.hidden.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_trigger_is_inert() {
        let (doc, _, dropdown) = setup();
        dropdown.set_disabled(true);
        doc.click(dropdown.trigger());
        assert!(!dropdown.is_open());
    }

    #[test]
    fn test_select_inside_panel_closes_unless_configured() {
        let (doc, _, dropdown) = setup();
        let item = doc.create_child(dropdown.panel(), "menu-item").unwrap();

        dropdown.show();
        doc.emit(item, Topic::Select, EventDetail::None);
        assert!(!dropdown.is_open());

        dropdown.set_stay_open_on_select(true);
        dropdown.show();
        doc.emit(item, Topic::Select, EventDetail::None);
        assert!(dropdown.is_open());
    }

    #[test]
    fn test_set_open_is_silent() {
        let (doc, _, dropdown) = setup();
        let counts = count_events(&doc, &dropdown);
        assert!(dropdown.set_open(true));
        assert!(dropdown.surface().part("panel").is_some_and(|p| !p.has_attribute("hidden")));
        assert!(dropdown.set_open(false));
        assert_eq!(counts.shown.load(Ordering::SeqCst), 0);
        assert_eq!(counts.hidden.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_detach_releases_registration() {
        let (doc, page, dropdown) = setup();
        assert!(doc.is_dismissable_registered(dropdown.id()));
        dropdown.show();
        dropdown.detach().unwrap();
        assert!(!doc.is_dismissable_registered(dropdown.id()));
        assert!(!dropdown.is_open());

        dropdown.attach(Some(page)).unwrap();
        assert_eq!(doc.dismissable_count(), 1);
    }

    #[test]
    fn test_placement_falls_back_to_document_default() {
        let doc = Document::with_config(DocumentConfig::default().with_default_placement(Placement::TopEnd));
        let dropdown = Dropdown::new(&doc);
        assert_eq!(dropdown.placement(), Placement::TopEnd);
        dropdown.set_property("placement", "sideways").unwrap();
        assert_eq!(dropdown.placement(), Placement::TopEnd);
        dropdown.set_placement(Placement::LeftStart);
        let surface = dropdown.surface();
        let panel = surface.part("panel").unwrap();
        assert_eq!(panel.attribute("style"), Some("transform-origin: top right"));
    }

    #[test]
    fn test_transform_origin_table() {
        assert_eq!(transform_origin(Placement::TopStart), "bottom left");
        assert_eq!(transform_origin(Placement::BottomEnd), "top right");
        assert_eq!(transform_origin(Placement::RightStart), "top left");
    }
}
