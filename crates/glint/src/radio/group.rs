//! The radio group: single-selection coordinator and form control.

use std::sync::{Arc, Weak};

use glint_core::{
    Document, EventDetail, Interaction, Key, NodeId, Property, PropertyDecl, Signal, Size,
    Subscription, Topic,
};
use parking_lot::RwLock;

use super::selectable::{CheckState, Selectable};
use crate::error::{Error, Result};
use crate::form::{FormAssociated, Validity, ValidityReport};
use crate::render::{Element, Markup, Render, Surface};
use crate::widget::{Widget, WidgetBase, assign, targets};

const GROUP_PROPS: &[PropertyDecl] = &[
    PropertyDecl::string("label"),
    PropertyDecl::string("help-text"),
    PropertyDecl::string("name"),
    PropertyDecl::string("value"),
    PropertyDecl::string("size"),
    PropertyDecl::flag("disabled"),
    PropertyDecl::flag("required"),
];

const STYLES: &str = ":host{display:block}\
.form-control{border:none;padding:0;margin:0;min-width:0}\
.form-control__label{padding:0}";

struct Member {
    widget: Arc<dyn Selectable>,
    on_detached: Subscription,
}

struct GroupInner {
    base: WidgetBase,
    members: RwLock<Vec<Member>>,
    focused: Property<Option<NodeId>>,
    selected: Property<String>,
    validity: Validity,
    value_changed: Signal<String>,
}

/// Coordinates a set of radios so that exactly one of them is checked.
///
/// Members are registered explicitly with [`add_member`](Self::add_member),
/// which also makes them children of the group node so their `intent`
/// events bubble here. A member that is detached on its own (while the
/// group stays attached) is dropped from the group automatically.
///
/// # Signals
///
/// - `value_changed(String)`: emitted together with the bubbling `change`
///   event whenever the group's value changes.
#[derive(Clone)]
pub struct RadioGroup {
    inner: Arc<GroupInner>,
}

impl RadioGroup {
    /// Create an empty group with no value.
    pub fn new(document: &Document) -> Self {
        let group = Self {
            inner: Arc::new(GroupInner {
                base: WidgetBase::new(document, "x-radio-group", GROUP_PROPS),
                members: RwLock::new(Vec::new()),
                focused: Property::new(None),
                selected: Property::default(),
                validity: Validity::new(),
                value_changed: Signal::new(),
            }),
        };

        let id = group.id();
        let weak = group.downgrade();
        document.subscribe(id, Topic::Intent, move |event| {
            if let Some(group) = RadioGroup::upgrade(&weak) {
                group.handle_intent(event.source());
            }
        });

        let weak = group.downgrade();
        document.subscribe(id, Topic::Interaction, move |event| {
            let Some(Interaction::Key(key)) = event.interaction() else {
                return;
            };
            if let Some(group) = RadioGroup::upgrade(&weak)
                && group.handle_key(event.source(), key)
            {
                event.stop_propagation();
            }
        });

        group
    }

    fn downgrade(&self) -> Weak<GroupInner> {
        Arc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<GroupInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Set the label using builder pattern.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        assign(&self, "label", label.into());
        self
    }

    /// Set the form name using builder pattern.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        assign(&self, "name", name.into());
        self
    }

    /// Signal emitted when the value changes.
    pub fn value_changed(&self) -> &Signal<String> {
        &self.inner.value_changed
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Add a member. The member's node becomes a child of the group node.
    ///
    /// If the group has a value, the member's checked flag is reconciled with
    /// it. If the group is empty and the member arrives checked, the group
    /// adopts the member's value without emitting a change.
    pub fn add_member<S>(&self, member: &S) -> Result<()>
    where
        S: Selectable + Clone + 'static,
    {
        let node = member.id();
        if !member.document().ptr_eq(self.document()) {
            return Err(Error::ForeignDocument { node });
        }
        if self.member(node).is_some() {
            return Err(Error::DuplicateMember { node });
        }

        self.document().set_parent(node, Some(self.id()))?;

        let weak = self.downgrade();
        let on_detached = self.document().subscribe(node, Topic::Detached, move |_| {
            if let Some(group) = RadioGroup::upgrade(&weak)
                && group.document().is_attached(group.id())
            {
                group.remove_member(node);
            }
        });

        let widget: Arc<dyn Selectable> = Arc::new(member.clone());
        self.inner.members.write().push(Member {
            widget: widget.clone(),
            on_detached,
        });

        let value = self.value();
        if !value.is_empty() {
            widget.set_checked(widget.value() == value);
        } else if widget.is_checked() {
            self.adopt(node, widget.value());
        }
        widget.set_inherited_size(self.group_size());
        tracing::debug!(target: targets::RADIO, group = ?self.id(), member = ?node, "member added");
        Ok(())
    }

    /// Remove a member. Its node stays where it is in the tree.
    pub fn remove_member(&self, node: NodeId) -> bool {
        let removed = {
            let mut members = self.inner.members.write();
            members
                .iter()
                .position(|m| m.widget.id() == node)
                .map(|index| members.remove(index))
        };
        let Some(removed) = removed else {
            return false;
        };
        self.document().unsubscribe(&removed.on_detached);
        if self.inner.focused.get() == Some(node) {
            self.inner.focused.set(None);
            removed.widget.set_focused(false);
        }
        tracing::debug!(target: targets::RADIO, group = ?self.id(), member = ?node, "member removed");
        true
    }

    /// The members, in insertion order.
    pub fn members(&self) -> Vec<Arc<dyn Selectable>> {
        self.inner.members.read().iter().map(|m| m.widget.clone()).collect()
    }

    /// The member with the given node, if any.
    pub fn member(&self, node: NodeId) -> Option<Arc<dyn Selectable>> {
        self.inner
            .members
            .read()
            .iter()
            .find(|m| m.widget.id() == node)
            .map(|m| m.widget.clone())
    }

    /// The members that are currently checked.
    pub fn checked_members(&self) -> Vec<Arc<dyn Selectable>> {
        self.members().into_iter().filter(|m| m.is_checked()).collect()
    }

    // =========================================================================
    // Value
    // =========================================================================

    /// The current value; empty when nothing is selected.
    pub fn value(&self) -> String {
        self.inner.base.string_or_empty("value")
    }

    /// Set the value and check every member whose value equals it.
    ///
    /// Members sharing a value are all checked; keeping values unique is up
    /// to the caller. A change is emitted only when the value differs from
    /// the current one, but members are reconciled either way.
    pub fn set_value(&self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.value() {
            self.sync_members(&value);
            return false;
        }
        assign(self, "value", value)
    }

    /// Handle a request from `source` to become the selected member.
    ///
    /// Ignored when the group is disabled, when `source` is not a member or
    /// when the member is disabled. Otherwise `source` becomes the only
    /// checked member and the group takes its value. Returns whether the
    /// intent was accepted.
    pub fn handle_intent(&self, source: NodeId) -> bool {
        if self.is_disabled() {
            tracing::debug!(target: targets::RADIO, group = ?self.id(), ?source, "intent ignored: group disabled");
            return false;
        }
        let Some(member) = self.member(source) else {
            tracing::debug!(target: targets::RADIO, group = ?self.id(), ?source, "intent ignored: not a member");
            return false;
        };
        if member.is_disabled() {
            tracing::debug!(target: targets::RADIO, group = ?self.id(), ?source, "intent ignored: member disabled");
            return false;
        }

        for other in self.members() {
            other.set_checked(other.id() == source);
        }
        let value = member.value();
        if value != self.value()
            && self.inner.base.set("value", value.clone()).unwrap_or(false)
        {
            self.update();
            self.emit_change(value);
        }
        true
    }

    fn adopt(&self, source: NodeId, value: String) {
        for other in self.members() {
            if other.id() != source {
                other.set_checked(false);
            }
        }
        if value != self.value()
            && self.inner.base.set("value", value.clone()).unwrap_or(false)
        {
            self.inner.selected.set(value);
            self.update();
        }
    }

    fn sync_members(&self, value: &str) {
        for member in self.members() {
            member.set_checked(!value.is_empty() && member.value() == value);
        }
    }

    fn emit_change(&self, value: String) {
        if !self.inner.selected.set(value.clone()) {
            return;
        }
        tracing::debug!(target: targets::RADIO, group = ?self.id(), %value, "value changed");
        self.inner.value_changed.emit(&value);
        self.document()
            .emit(self.id(), Topic::Change, EventDetail::Value { value });
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Whether the group is disabled.
    pub fn is_disabled(&self) -> bool {
        self.inner.base.flag("disabled")
    }

    /// Disable or enable the whole group.
    pub fn set_disabled(&self, disabled: bool) -> bool {
        assign(self, "disabled", disabled)
    }

    /// Whether a value is required.
    pub fn is_required(&self) -> bool {
        self.inner.base.flag("required")
    }

    /// Require a value.
    pub fn set_required(&self, required: bool) -> bool {
        assign(self, "required", required)
    }

    /// Declare the size pushed down to members without their own size.
    pub fn set_size(&self, size: Size) -> bool {
        assign(self, "size", size.as_str())
    }

    /// The size members inherit.
    pub fn group_size(&self) -> Size {
        self.inner
            .base
            .parsed("size", self.document().config().default_size)
    }

    fn cascade_size(&self) {
        let size = self.group_size();
        for member in self.members() {
            member.set_inherited_size(size);
        }
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// The member holding the roving focus.
    pub fn focused_member(&self) -> Option<NodeId> {
        self.inner.focused.get()
    }

    /// Move the roving focus to `node`. Returns `false` if it is not a member.
    pub fn focus_member(&self, node: NodeId) -> bool {
        if self.member(node).is_none() {
            return false;
        }
        self.inner.focused.set(Some(node));
        for member in self.members() {
            member.set_focused(member.id() == node);
        }
        true
    }

    /// Handle a key pressed with focus at `origin`.
    ///
    /// Arrow keys move focus and selection to the next or previous enabled
    /// member, wrapping around; Home and End jump to the first and last.
    /// Space selects the focused member. Returns whether the key was used.
    pub fn handle_key(&self, origin: NodeId, key: Key) -> bool {
        if self.is_disabled() {
            return false;
        }
        let members = self.members();
        let enabled: Vec<usize> = (0..members.len()).filter(|&i| !members[i].is_disabled()).collect();
        let (Some(&first), Some(&last)) = (enabled.first(), enabled.last()) else {
            return false;
        };

        let current = self
            .member(origin)
            .map(|m| m.id())
            .or_else(|| self.focused_member())
            .or_else(|| members.iter().find(|m| m.is_checked()).map(|m| m.id()))
            .and_then(|node| members.iter().position(|m| m.id() == node));

        let target = match key {
            Key::Space => {
                let Some(index) = current else {
                    return false;
                };
                members[index].id()
            }
            Key::ArrowDown | Key::ArrowRight => {
                let next = match current {
                    Some(index) => enabled.iter().copied().find(|&i| i > index).unwrap_or(first),
                    None => first,
                };
                members[next].id()
            }
            Key::ArrowUp | Key::ArrowLeft => {
                let previous = match current {
                    Some(index) => enabled.iter().rev().copied().find(|&i| i < index).unwrap_or(last),
                    None => last,
                };
                members[previous].id()
            }
            Key::Home => members[first].id(),
            Key::End => members[last].id(),
            _ => return false,
        };

        self.focus_member(target);
        self.handle_intent(target);
        true
    }
}

impl Render for RadioGroup {
    fn render(&self) -> Surface {
        let base = &self.inner.base;
        let label = base.string_or_empty("label");
        let help_text = base.string_or_empty("help-text");
        let size = self.group_size();
        let report = self.report_validity();

        let fieldset = Element::new("fieldset")
            .part("form-control")
            .classes(&[
                ("form-control", true),
                ("form-control--small", size == Size::Small),
                ("form-control--medium", size == Size::Medium),
                ("form-control--large", size == Size::Large),
                ("form-control--radio-group", true),
                ("form-control--has-label", !label.is_empty()),
                ("form-control--has-help-text", !help_text.is_empty()),
            ])
            .attr("role", "radiogroup")
            .flag("disabled", self.is_disabled())
            .flag("data-required", self.is_required())
            .flag("data-invalid", !report.valid)
            .attr_opt("data-validation-message", (!report.valid).then_some(report.message))
            .child(
                Element::new("label")
                    .part("form-control-label")
                    .attr("class", "form-control__label")
                    .child(Markup::text(label))
                    .child(Markup::named_slot("label")),
            )
            .child(
                Element::new("div")
                    .part("form-control-input")
                    .attr("class", "form-control-input")
                    .child(Markup::slot()),
            )
            .child(
                Element::new("div")
                    .part("form-control-help-text")
                    .attr("class", "form-control__help-text")
                    .child(Markup::text(help_text))
                    .child(Markup::named_slot("help-text")),
            );

        Surface::new(fieldset).with_style(STYLES)
    }
}

impl Widget for RadioGroup {
    fn widget_base(&self) -> &WidgetBase {
        &self.inner.base
    }

    fn update(&self) {
        self.cascade_size();
        let surface = self.render();
        self.inner.base.store_surface(surface);
    }

    fn property_changed(&self, name: &str) {
        match name {
            "value" => {
                let value = self.value();
                self.sync_members(&value);
                self.update();
                self.emit_change(value);
            }
            _ => self.update(),
        }
    }
}

impl FormAssociated for RadioGroup {
    fn form_name(&self) -> Option<String> {
        self.inner.base.string("name").filter(|name| !name.is_empty())
    }

    fn form_value(&self) -> Option<String> {
        Some(self.value()).filter(|value| !value.is_empty())
    }

    fn report_validity(&self) -> ValidityReport {
        self.inner.validity.report(
            self.is_required(),
            self.value().is_empty(),
            &self.document().config().required_message,
        )
    }

    fn set_custom_validity(&self, message: &str) {
        if self.inner.validity.set_custom(message) {
            self.update();
        }
    }
}

impl std::fmt::Debug for RadioGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioGroup")
            .field("id", &self.id())
            .field("value", &self.value())
            .field("members", &self.inner.members.read().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(RadioGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::{Radio, RadioButton};
    use parking_lot::Mutex;

    fn setup(values: &[&str]) -> (Document, RadioGroup, Vec<Radio>) {
        let doc = Document::new();
        let group = RadioGroup::new(&doc);
        group.attach(None).unwrap();
        let radios: Vec<Radio> = values
            .iter()
            .map(|v| {
                let radio = Radio::new(&doc).with_value(*v);
                group.add_member(&radio).unwrap();
                radio
            })
            .collect();
        (doc, group, radios)
    }

    fn checked(radios: &[Radio]) -> Vec<String> {
        radios.iter().filter(|r| r.is_checked()).map(|r| r.value()).collect()
    }

    #[test]
    fn test_set_value_checks_matching_member() {
        let (_doc, group, radios) = setup(&["a", "b", "c"]);
        let values = Arc::new(Mutex::new(Vec::new()));
        let values_clone = values.clone();
        group.value_changed().connect(move |v| values_clone.lock().push(v.clone()));

        assert!(group.set_value("b"));
        assert_eq!(checked(&radios), vec!["b"]);
        assert!(!group.set_value("b"));
        assert_eq!(*values.lock(), vec!["b".to_string()]);
    }

    #[test]
    fn test_set_value_with_duplicates_checks_all() {
        let (_doc, group, radios) = setup(&["a", "b", "b"]);
        group.set_value("b");
        assert_eq!(checked(&radios), vec!["b", "b"]);
    }

    fn change_log(doc: &Document, group: &RadioGroup) -> Arc<Mutex<Vec<EventDetail>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        doc.subscribe(group.id(), Topic::Change, move |event| {
            log_clone.lock().push(event.detail().clone());
        });
        log
    }

    #[test]
    fn test_clearing_an_empty_group_is_silent() {
        let (doc, group, radios) = setup(&["a", "b"]);
        let log = change_log(&doc, &group);

        assert!(!group.set_value(""));
        assert_eq!(group.set_property("value", ""), Ok(true));
        assert!(log.lock().is_empty());
        assert!(checked(&radios).is_empty());

        group.set_value("a");
        group.set_value("");
        assert_eq!(
            *log.lock(),
            vec![
                EventDetail::Value { value: "a".into() },
                EventDetail::Value { value: String::new() },
            ]
        );
    }

    #[test]
    fn test_intent_on_empty_valued_member_is_silent() {
        let (doc, group, radios) = setup(&["", "b"]);
        let log = change_log(&doc, &group);

        assert!(group.handle_intent(radios[0].id()));
        assert!(radios[0].is_checked());
        assert_eq!(group.value(), "");
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_clearing_after_adoption_emits_once() {
        let doc = Document::new();
        let group = RadioGroup::new(&doc);
        let radio = Radio::new(&doc).with_value("x");
        radio.set_checked(true);
        group.add_member(&radio).unwrap();
        let log = change_log(&doc, &group);

        assert!(group.set_value(""));
        assert!(!radio.is_checked());
        assert_eq!(*log.lock(), vec![EventDetail::Value { value: String::new() }]);
    }

    #[test]
    fn test_intent_makes_source_sole_checked() {
        let (_doc, group, radios) = setup(&["a", "b", "b"]);
        group.set_value("b");
        assert!(group.handle_intent(radios[2].id()));
        assert!(!radios[1].is_checked());
        assert!(radios[2].is_checked());
        assert_eq!(group.value(), "b");
    }

    #[test]
    fn test_intent_ignored_when_disabled() {
        let (_doc, group, radios) = setup(&["a", "b"]);
        radios[1].set_disabled(true);
        assert!(!group.handle_intent(radios[1].id()));
        assert_eq!(group.value(), "");

        group.set_disabled(true);
        assert!(!group.handle_intent(radios[0].id()));
        assert!(checked(&radios).is_empty());
    }

    #[test]
    fn test_intent_from_stranger_ignored() {
        let (doc, group, _radios) = setup(&["a"]);
        let stranger = Radio::new(&doc).with_value("z");
        assert!(!group.handle_intent(stranger.id()));
    }

    #[test]
    fn test_checked_member_is_adopted() {
        let doc = Document::new();
        let group = RadioGroup::new(&doc);
        let radio = Radio::new(&doc).with_value("x");
        radio.set_checked(true);
        let events = Arc::new(Mutex::new(0));
        let events_clone = events.clone();
        group.value_changed().connect(move |_| *events_clone.lock() += 1);

        group.add_member(&radio).unwrap();
        assert_eq!(group.value(), "x");
        assert_eq!(*events.lock(), 0);
    }

    #[test]
    fn test_add_member_errors() {
        let (_doc, group, radios) = setup(&["a"]);
        assert_eq!(
            group.add_member(&radios[0]),
            Err(Error::DuplicateMember { node: radios[0].id() })
        );
        let other = Document::new();
        let foreign = Radio::new(&other);
        assert!(matches!(group.add_member(&foreign), Err(Error::ForeignDocument { .. })));
    }

    #[test]
    fn test_size_cascades_to_members_without_override() {
        let (_doc, group, radios) = setup(&["a", "b"]);
        radios[1].set_size(Some(Size::Small));
        group.set_size(Size::Large);
        assert_eq!(radios[0].effective_size(), Size::Large);
        assert_eq!(radios[1].effective_size(), Size::Small);
    }

    #[test]
    fn test_mixed_member_kinds() {
        let doc = Document::new();
        let group = RadioGroup::new(&doc);
        let radio = Radio::new(&doc).with_value("r");
        let button = RadioButton::new(&doc).with_value("b");
        group.add_member(&radio).unwrap();
        group.add_member(&button).unwrap();
        group.set_value("b");
        assert!(button.is_checked());
        assert!(!radio.is_checked());
    }

    #[test]
    fn test_arrow_keys_wrap_and_skip_disabled() {
        let (_doc, group, radios) = setup(&["a", "b", "c"]);
        radios[1].set_disabled(true);

        assert!(group.handle_key(group.id(), Key::ArrowDown));
        assert_eq!(group.value(), "a");
        group.handle_key(radios[0].id(), Key::ArrowDown);
        assert_eq!(group.value(), "c");
        group.handle_key(radios[2].id(), Key::ArrowDown);
        assert_eq!(group.value(), "a");
        group.handle_key(radios[0].id(), Key::ArrowUp);
        assert_eq!(group.value(), "c");
        assert_eq!(group.focused_member(), Some(radios[2].id()));
        assert!(radios[2].is_focused());
        assert!(!radios[0].is_focused());
    }

    #[test]
    fn test_space_selects_focused_member() {
        let (_doc, group, radios) = setup(&["a", "b"]);
        group.focus_member(radios[1].id());
        assert!(group.handle_key(group.id(), Key::Space));
        assert_eq!(group.value(), "b");
        assert!(!group.handle_key(group.id(), Key::Char('x')));
    }

    #[test]
    fn test_validity() {
        let (_doc, group, _radios) = setup(&["a"]);
        group.set_required(true);
        let report = group.report_validity();
        assert!(!report.valid);
        assert_eq!(report.message, "Please select an option.");
        assert!(group.surface().part("form-control").unwrap().has_attribute("data-invalid"));

        group.set_value("a");
        assert!(group.check_validity());

        group.set_custom_validity("Not this one");
        assert_eq!(group.report_validity().message, "Not this one");
        group.set_custom_validity("");
        assert!(group.check_validity());
    }
}
