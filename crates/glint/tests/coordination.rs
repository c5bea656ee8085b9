//! End-to-end coordination tests: user interactions delivered through the
//! document, observed through bubbling events.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glint::form::{FormData, check_all};
use glint::prelude::*;
use parking_lot::Mutex;

fn setup() -> (Document, NodeId) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let doc = Document::new();
    let page = doc.create_node("x-page");
    doc.attach(page, None).unwrap();
    (doc, page)
}

fn record(doc: &Document, scope: NodeId, topic: Topic) -> Arc<Mutex<Vec<EventDetail>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = log.clone();
    doc.subscribe(scope, topic, move |event| {
        log_clone.lock().push(event.detail().clone());
    });
    log
}

fn counter(doc: &Document, scope: NodeId, topic: Topic) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();
    doc.subscribe(scope, topic, move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    count
}

fn radio_group(doc: &Document, page: NodeId, values: &[&str]) -> (RadioGroup, Vec<Radio>) {
    let group = RadioGroup::new(doc).with_name("choice");
    group.attach(Some(page)).unwrap();
    let radios: Vec<Radio> = values
        .iter()
        .map(|value| {
            let radio = Radio::new(doc).with_value(*value);
            group.add_member(&radio).unwrap();
            radio
        })
        .collect();
    (group, radios)
}

// =========================================================================
// Radio group
// =========================================================================

#[test]
fn test_single_mode_click_sequence_keeps_one_checked() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["a", "b", "c", "d"]);

    for index in [2, 0, 0, 3, 1, 2] {
        doc.click(radios[index].id());
        let checked: Vec<_> = radios.iter().filter(|r| r.is_checked()).collect();
        assert_eq!(checked.len(), 1);
        assert_eq!(group.value(), checked[0].value());
        assert_eq!(group.value(), radios[index].value());
    }
}

#[test]
fn test_programmatic_value_checks_matching_member() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["a", "b", "c"]);
    let changes = record(&doc, page, Topic::Change);

    group.set_value("b");

    let checked: Vec<String> = radios.iter().filter(|r| r.is_checked()).map(|r| r.value()).collect();
    assert_eq!(checked, ["b"]);
    assert_eq!(*changes.lock(), vec![EventDetail::Value { value: "b".into() }]);
}

#[test]
fn test_set_value_twice_emits_once() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["a", "b"]);
    let changes = counter(&doc, page, Topic::Change);

    assert!(group.set_value("a"));
    assert!(!group.set_value("a"));
    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert!(radios[0].is_checked());
}

#[test]
fn test_clearing_an_empty_group_emits_nothing() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["", "b"]);
    let changes = counter(&doc, page, Topic::Change);

    assert!(!group.set_value(""));
    doc.click(radios[0].id());
    assert!(radios[0].is_checked());
    assert_eq!(changes.load(Ordering::SeqCst), 0);

    doc.click(radios[1].id());
    doc.click(radios[0].id());
    assert_eq!(changes.load(Ordering::SeqCst), 2);
    assert_eq!(group.value(), "");
}

#[test]
fn test_disabled_group_and_member_ignore_clicks() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["a", "b"]);
    let changes = counter(&doc, page, Topic::Change);

    radios[1].set_disabled(true);
    doc.click(radios[1].id());
    group.set_disabled(true);
    doc.click(radios[0].id());

    assert_eq!(changes.load(Ordering::SeqCst), 0);
    assert_eq!(group.value(), "");
    assert!(radios.iter().all(|r| !r.is_checked()));
}

#[test]
fn test_required_validity_and_custom_override() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["a"]);
    group.set_required(true);

    let report = group.report_validity();
    assert!(!report.valid);
    assert_eq!(report.message, glint::DEFAULT_REQUIRED_MESSAGE);

    group.set_custom_validity("Pick a plan first.");
    assert_eq!(group.report_validity().message, "Pick a plan first.");

    doc.click(radios[0].id());
    assert_eq!(group.report_validity().message, "Pick a plan first.");
    group.set_custom_validity("");
    assert!(group.check_validity());
}

#[test]
fn test_required_message_comes_from_document_config() {
    let _ = setup();
    let doc = Document::with_config(DocumentConfig::default().with_required_message("Choose one."));
    let group = RadioGroup::new(&doc);
    group.set_required(true);
    assert_eq!(group.report_validity().message, "Choose one.");
}

#[test]
fn test_form_data_collects_named_groups() {
    let (doc, page) = setup();
    let (plan, plan_radios) = radio_group(&doc, page, &["basic", "pro"]);
    let (size, _) = radio_group(&doc, page, &["s", "m"]);
    size.set_required(true);
    doc.click(plan_radios[1].id());

    let controls: [&dyn FormAssociated; 2] = [&plan, &size];
    let data = FormData::collect(&controls);
    assert_eq!(data.get("choice"), Some("pro"));
    assert_eq!(data.len(), 1);

    let invalid = check_all(&controls);
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].0, 1);
}

#[test]
fn test_group_size_cascades_to_members_without_override() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["a", "b"]);
    radios[1].set_size(Some(Size::Small));
    group.set_size(Size::Large);

    assert_eq!(radios[0].effective_size(), Size::Large);
    assert_eq!(radios[1].effective_size(), Size::Small);
}

#[test]
fn test_arrow_keys_move_selection() {
    let (doc, page) = setup();
    let (group, radios) = radio_group(&doc, page, &["a", "b", "c"]);
    radios[1].set_disabled(true);

    doc.click(radios[0].id());
    doc.key_press(radios[0].id(), Key::ArrowDown);
    assert_eq!(group.value(), "c");
    doc.key_press(radios[2].id(), Key::ArrowDown);
    assert_eq!(group.value(), "a");
}

// =========================================================================
// Tree
// =========================================================================

#[test]
fn test_multiple_mode_toggle_scenario() {
    let (doc, page) = setup();
    let tree = Tree::new(&doc).with_selection_mode(SelectionMode::Multiple);
    tree.attach(Some(page)).unwrap();
    let a = TreeItem::new(&doc).with_value("x");
    let b = TreeItem::new(&doc).with_value("y");
    tree.add_item(&a).unwrap();
    tree.add_item(&b).unwrap();
    let selections = record(&doc, page, Topic::Select);

    doc.click(a.id());
    assert!(a.is_selected());
    assert_eq!(tree.selected_values(), ["x"]);
    doc.click(b.id());
    assert_eq!(tree.selected_values(), ["x", "y"]);
    doc.click(a.id());
    assert_eq!(tree.selected_values(), ["y"]);

    let last = selections.lock().last().cloned();
    assert_eq!(last, Some(EventDetail::Selection { values: vec!["y".into()] }));
}

#[test]
fn test_leaf_mode_click_on_branch_changes_nothing() {
    let (doc, page) = setup();
    let tree = Tree::new(&doc).with_selection_mode(SelectionMode::Leaf);
    tree.attach(Some(page)).unwrap();
    let branch = TreeItem::new(&doc).with_value("branch");
    let leaf = TreeItem::new(&doc).with_value("leaf");
    branch.append(&leaf).unwrap();
    tree.add_item(&branch).unwrap();
    let selects = counter(&doc, page, Topic::Select);
    let expands = counter(&doc, page, Topic::Expand);

    doc.click(branch.id());
    assert!(!branch.is_selected());
    assert!(!branch.is_expanded());
    assert_eq!(selects.load(Ordering::SeqCst), 0);
    assert_eq!(expands.load(Ordering::SeqCst), 0);

    doc.click(leaf.id());
    assert_eq!(tree.selected_values(), ["leaf"]);
    assert_eq!(selects.load(Ordering::SeqCst), 1);
}

#[test]
fn test_nested_click_selects_only_the_clicked_item() {
    let (doc, page) = setup();
    let tree = Tree::new(&doc);
    tree.attach(Some(page)).unwrap();
    let parent = TreeItem::new(&doc).with_value("parent");
    let child = TreeItem::new(&doc).with_value("child");
    parent.append(&child).unwrap();
    tree.add_item(&parent).unwrap();

    doc.click(child.id());
    assert_eq!(tree.selected_values(), ["child"]);
}

#[test]
fn test_tree_keyboard_expands_and_selects() {
    let (doc, page) = setup();
    let tree = Tree::new(&doc);
    tree.attach(Some(page)).unwrap();
    let parent = TreeItem::new(&doc).with_value("parent");
    let child = TreeItem::new(&doc).with_value("child");
    parent.append(&child).unwrap();
    tree.add_item(&parent).unwrap();
    let expanded = record(&doc, page, Topic::Expand);

    doc.key_press(parent.id(), Key::ArrowRight);
    assert_eq!(
        *expanded.lock(),
        vec![EventDetail::Item { item: parent.id(), expanded: true }]
    );
    doc.key_press(parent.id(), Key::ArrowRight);
    doc.key_press(child.id(), Key::Enter);
    assert_eq!(tree.selected_values(), ["child"]);
    assert_eq!(tree.focused_item(), Some(child.id()));
}

// =========================================================================
// Dropdown
// =========================================================================

#[test]
fn test_dropdown_trigger_and_outside_click() {
    let (doc, page) = setup();
    let dropdown = Dropdown::new(&doc);
    dropdown.attach(Some(page)).unwrap();
    let content = doc.create_child(dropdown.panel(), "x-menu").unwrap();
    let shown = counter(&doc, page, Topic::Shown);
    let hidden = counter(&doc, page, Topic::Hidden);

    doc.click(dropdown.trigger());
    assert!(dropdown.is_open());
    assert_eq!(shown.load(Ordering::SeqCst), 1);

    doc.click(content);
    assert!(dropdown.is_open());
    assert_eq!(hidden.load(Ordering::SeqCst), 0);

    doc.click(page);
    assert!(!dropdown.is_open());
    assert_eq!(hidden.load(Ordering::SeqCst), 1);

    doc.click(page);
    assert_eq!(hidden.load(Ordering::SeqCst), 1);
}

#[test]
fn test_detached_dropdown_ignores_outside_clicks() {
    let (doc, page) = setup();
    let dropdown = Dropdown::new(&doc);
    dropdown.attach(Some(page)).unwrap();

    for _ in 0..3 {
        dropdown.detach().unwrap();
        dropdown.attach(Some(page)).unwrap();
    }
    assert_eq!(doc.dismissable_count(), 1);

    dropdown.detach().unwrap();
    dropdown.set_open(true);
    doc.click(page);
    assert!(dropdown.is_open());
    assert_eq!(doc.dismissable_count(), 0);

    dropdown.attach(Some(page)).unwrap();
    dropdown.show();
    doc.click(page);
    assert!(!dropdown.is_open());
}

#[test]
fn test_two_dropdowns_dismiss_independently() {
    let (doc, page) = setup();
    let first = Dropdown::new(&doc);
    let second = Dropdown::new(&doc);
    first.attach(Some(page)).unwrap();
    second.attach(Some(page)).unwrap();

    first.show();
    second.show();
    let inside_second = doc.create_child(second.panel(), "x-item").unwrap();
    doc.click(inside_second);

    assert!(!first.is_open());
    assert!(second.is_open());
}

#[test]
fn test_tree_in_dropdown_closes_on_select() {
    let (doc, page) = setup();
    let dropdown = Dropdown::new(&doc);
    dropdown.attach(Some(page)).unwrap();
    let tree = Tree::new(&doc);
    tree.attach(Some(dropdown.panel())).unwrap();
    let item = TreeItem::new(&doc).with_value("pick");
    tree.add_item(&item).unwrap();

    doc.click(dropdown.trigger());
    doc.click(item.id());
    assert_eq!(tree.selected_values(), ["pick"]);
    assert!(!dropdown.is_open());
}

// =========================================================================
// Tabs
// =========================================================================

#[test]
fn test_close_request_reaches_tab_group_scope() {
    let (doc, page) = setup();
    let bar = doc.create_child(page, "x-tab-group").unwrap();
    let tab = Tab::new(&doc).with_panel("general").with_closable(true);
    tab.attach(Some(bar)).unwrap();
    let requests = record(&doc, bar, Topic::CloseRequest);

    doc.click(tab.close_button());
    assert_eq!(*requests.lock(), vec![EventDetail::Source { source: tab.id() }]);

    tab.set_disabled(true);
    doc.click(tab.close_button());
    assert_eq!(requests.lock().len(), 1);
}

#[test]
fn test_tab_close_click_dismisses_open_dropdown() {
    let (doc, page) = setup();
    let dropdown = Dropdown::new(&doc);
    dropdown.attach(Some(page)).unwrap();
    let tab = Tab::new(&doc).with_panel("general").with_closable(true);
    tab.attach(Some(page)).unwrap();
    let requests = record(&doc, page, Topic::CloseRequest);

    dropdown.show();
    doc.click(tab.close_button());

    assert!(!dropdown.is_open());
    assert_eq!(*requests.lock(), vec![EventDetail::Source { source: tab.id() }]);
}
