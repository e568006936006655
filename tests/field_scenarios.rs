use numeral_core::config::NormalizerConfig;
use numeral_core::core::selector::SelectorPreset;
use numeral_core::core::types::{EventKind, NodeId};
use numeral_core::dom::{Document, Event, Page};
use numeral_core::{DigitNormalizer, NumeralEngine};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

fn create_input(page: &mut Page, input_type: &str, name: Option<&str>) -> NodeId {
    let doc = page.document_mut();
    let input = doc.create_element("input");
    doc.set_attribute(input, "type", input_type).unwrap();
    if let Some(name) = name {
        doc.set_attribute(input, "name", name).unwrap();
    }
    input
}

fn change_counter(page: &mut Page, target: NodeId) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    page.add_event_listener(
        target,
        EventKind::Change,
        Rc::new(move |_: &mut Page, _: &Event| c.set(c.get() + 1)),
    );
    count
}

fn installed_page(config: NormalizerConfig) -> (Page, NumeralEngine, NodeId) {
    let mut page = Page::default();
    let body = page.document().body().unwrap();
    let form = page.document_mut().create_element("form");
    page.append_child(body, form).unwrap();
    let mut engine = NumeralEngine::new(config).unwrap();
    engine.install(&mut page).unwrap();
    (page, engine, form)
}

#[test]
fn input_event_normalizes_and_fires_change() {
    let mut page = Page::default();
    let body = page.document().body().unwrap();
    let input = create_input(&mut page, "text", None);
    page.append_child(body, input).unwrap();

    let mut engine = NumeralEngine::new(NormalizerConfig::default()).unwrap();
    engine.install(&mut page).unwrap();
    let changes = change_counter(&mut page, body);

    page.document_mut().set_value(input, "١٢٣").unwrap();
    page.dispatch_event(input, EventKind::Input, true);

    assert_eq!(page.document().value(input), Some("123"));
    assert_eq!(changes.get(), 1);
}

#[test]
fn caret_position_survives_normalization() {
    let (mut page, engine, form) = installed_page(NormalizerConfig::default());
    let input = create_input(&mut page, "tel", None);
    page.append_child(form, input).unwrap();

    page.document_mut().set_value(input, "١٢").unwrap();
    page.document_mut().set_selection_range(input, 2, 2).unwrap();
    page.dispatch_event(input, EventKind::Input, true);

    assert_eq!(page.document().value(input), Some("12"));
    assert_eq!(page.document().selection_start(input), Some(2));
    assert_eq!(engine.normalizer().rewrites(), 1);
}

#[test]
fn typing_in_the_middle_keeps_caret_after_typed_char() {
    let (mut page, _engine, form) = installed_page(NormalizerConfig::default());
    let input = create_input(&mut page, "number", None);
    page.append_child(form, input).unwrap();

    page.type_text(input, "19").unwrap();
    page.document_mut().set_selection_range(input, 1, 1).unwrap();
    page.type_text(input, "٥").unwrap();

    assert_eq!(page.document().value(input), Some("159"));
    assert_eq!(page.document().selection_start(input), Some(2));
}

#[test]
fn dynamically_inserted_field_is_normalized_like_initial_ones() {
    let (mut page, _engine, form) = installed_page(NormalizerConfig::default());
    let changes = change_counter(&mut page, form);

    let container = page.document_mut().create_element("div");
    let late = create_input(&mut page, "tel", None);
    page.document_mut().append_child(container, late).unwrap();
    page.append_child(form, container).unwrap();

    page.type_text(late, "٠٥٩").unwrap();
    assert_eq!(page.document().value(late), Some("059"));
    assert_eq!(changes.get(), 3);
}

#[test]
fn attach_twice_runs_one_pass_per_event() {
    let mut page = Page::default();
    let body = page.document().body().unwrap();
    let input = create_input(&mut page, "text", None);
    page.append_child(body, input).unwrap();

    let normalizer = DigitNormalizer::from_config(&NormalizerConfig::default()).unwrap();
    assert!(normalizer.attach(&mut page, input));
    assert!(!normalizer.attach(&mut page, input));

    page.type_text(input, "٧").unwrap();
    // One keystroke is one `input` plus one `keyup`.
    assert_eq!(normalizer.passes(), 2);
    assert_eq!(normalizer.rewrites(), 1);
}

#[test]
fn paste_is_normalized_only_after_the_delay() {
    let (mut page, _engine, form) = installed_page(NormalizerConfig::default());
    let input = create_input(&mut page, "tel", None);
    page.append_child(form, input).unwrap();
    let changes = change_counter(&mut page, input);

    page.paste_text(input, "٠٥٠-١٢٣").unwrap();
    assert_eq!(page.document().value(input), Some("٠٥٠-١٢٣"));
    assert_eq!(page.pending_timers(), 1);

    page.advance(Duration::from_millis(9));
    assert_eq!(page.document().value(input), Some("٠٥٠-١٢٣"));

    page.advance(Duration::from_millis(1));
    assert_eq!(page.document().value(input), Some("050-123"));
    assert_eq!(page.document().selection_start(input), Some(7));
    assert_eq!(changes.get(), 1);
}

#[test]
fn stopped_watcher_ignores_new_fields() {
    let (mut page, mut engine, form) = installed_page(NormalizerConfig::default());
    assert!(engine.shutdown(&mut page));

    let late = create_input(&mut page, "text", None);
    page.append_child(form, late).unwrap();
    page.type_text(late, "٣").unwrap();
    assert_eq!(page.document().value(late), Some("٣"));
}

#[test]
fn install_while_loading_defers_initial_scan() {
    let mut page = Page::loading(Document::new());
    let body = page.document().body().unwrap();
    let early = create_input(&mut page, "text", None);
    page.document_mut().append_child(body, early).unwrap();

    let mut engine = NumeralEngine::new(NormalizerConfig::default()).unwrap();
    engine.install(&mut page).unwrap();
    assert!(!engine.normalizer().is_attached(page.document(), early));

    page.finish_loading();
    assert!(engine.normalizer().is_attached(page.document(), early));
    page.type_text(early, "٨").unwrap();
    assert_eq!(page.document().value(early), Some("8"));
}

#[test]
fn name_heuristic_preset_targets_named_text_fields() {
    let config = NormalizerConfig {
        preset: SelectorPreset::NameHeuristic,
        ..Default::default()
    };
    let (mut page, engine, form) = installed_page(config);
    let phone = create_input(&mut page, "text", Some("phone_number"));
    let notes = create_input(&mut page, "text", Some("notes"));
    page.append_child(form, phone).unwrap();
    page.append_child(form, notes).unwrap();

    page.type_text(phone, "٩").unwrap();
    page.type_text(notes, "٩").unwrap();
    assert_eq!(page.document().value(phone), Some("9"));
    assert_eq!(page.document().value(notes), Some("٩"));
    assert!(!engine.normalizer().is_attached(page.document(), notes));
}

#[test]
fn moved_field_is_not_attached_again() {
    let (mut page, engine, form) = installed_page(NormalizerConfig::default());
    let input = create_input(&mut page, "text", None);
    page.append_child(form, input).unwrap();
    let other = page.document_mut().create_element("div");
    page.append_child(form, other).unwrap();
    page.append_child(other, input).unwrap();

    assert_eq!(page.listener_count(input, EventKind::Input), 1);
    page.type_text(input, "١").unwrap();
    assert_eq!(engine.normalizer().passes(), 2);
}
