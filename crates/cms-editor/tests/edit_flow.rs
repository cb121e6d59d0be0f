//! Integration tests: editing sections end to end through the admin
//! controller, the session and the in-memory gateway.

use cms_core::{Content, Path, SectionKey};
use cms_editor::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn set(path: Path, key: &str, value: &str) -> EditEvent {
    EditEvent::SetField {
        path,
        field_key: key.into(),
        value: value.into(),
    }
}

/// Render-driven edit: find the leaf the host would show and write through
/// its own path.
fn edit_leaf(session: &mut EditSession<'_>, registry: &EditorRegistry, target: &str, value: &str) {
    let nodes = session.render(registry);
    let (path, field_key) = nodes
        .iter()
        .flat_map(EditorNode::leaves)
        .find_map(|leaf| match leaf {
            EditorNode::Leaf {
                path, field_key, ..
            } if path.join_key(field_key).to_string() == target => {
                Some((path.clone(), field_key.clone()))
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no leaf at {target}"));
    session
        .apply(EditEvent::SetField {
            path,
            field_key,
            value: value.into(),
        })
        .unwrap();
}

#[test]
fn hero_create_flow() {
    let mut gateway = MemoryGateway::new();
    let mut screen = AdminScreen::default();
    screen.select_page("home").unwrap();
    let registry = screen.registry().clone();

    let session = screen.open_create(SectionKey::intern("hero")).unwrap();
    edit_leaf(session, &registry, "title", "Join Us");
    edit_leaf(session, &registry, "cta_primary.text", "Go");

    let record = screen.save(&mut gateway).unwrap();
    let stored = record.content.to_json();
    assert_eq!(stored["title"], json!("Join Us"));
    assert_eq!(
        stored["cta_primary"],
        json!({ "text": "Go", "link": "", "action": "" })
    );
    assert_eq!(record.order, 0);
    assert!(record.is_active);
    assert_eq!(gateway.records().len(), 1);
}

#[test]
fn array_items_add_edit_remove() {
    let mut screen = AdminScreen::default();
    let session = screen.open_create(SectionKey::intern("trainers")).unwrap();
    let items = Path::from_iter(["items"]);
    session.apply(EditEvent::AddItem { path: items.clone() }).unwrap();
    session.apply(EditEvent::AddItem { path: items.clone() }).unwrap();

    let socials = items.join_index(1).join_key("socials");
    session
        .apply(set(socials.clone(), "instagram", "@ravi.yoga"))
        .unwrap();
    session
        .apply(EditEvent::RemoveItem {
            path: items.clone(),
            index: 0,
        })
        .unwrap();

    let doc = session.document().to_json();
    assert_eq!(doc["items"].as_array().unwrap().len(), 1);
    assert_eq!(doc["items"][0]["socials"]["instagram"], json!("@ravi.yoga"));
}

#[test]
fn dates_are_saved_without_time() {
    let mut gateway = MemoryGateway::new();
    let mut screen = AdminScreen::default();
    let session = screen
        .open_create(SectionKey::intern("announcement"))
        .unwrap();
    session
        .apply(set(Path::root(), "message", "Summer break"))
        .unwrap();
    session
        .apply(set(Path::root(), "expires_on", "2025-08-31T18:30:00.000Z"))
        .unwrap();
    let record = screen.save(&mut gateway).unwrap();
    assert_eq!(record.content.get("expires_on"), Some(&Content::from("2025-08-31")));
}

#[test]
fn edit_preserves_unknown_keys() {
    let mut gateway = MemoryGateway::new();
    let created = gateway
        .create_section(SectionDraft {
            section_key: SectionKey::intern("about_intro"),
            content: Content::from(json!({ "heading": "Our story", "legacy_flag": true })),
            order: 2,
            is_active: true,
        })
        .unwrap();

    let mut screen = AdminScreen::default();
    screen.refresh(&gateway);
    screen.open_edit(created.id).unwrap();
    screen
        .session_mut()
        .unwrap()
        .apply(set(Path::root(), "body", "Since 2012"))
        .unwrap();
    let saved = screen.save(&mut gateway).unwrap();

    assert_eq!(saved.order, 2);
    assert_eq!(
        saved.content.to_json(),
        json!({ "heading": "Our story", "legacy_flag": true, "body": "Since 2012" })
    );
}

#[test]
fn save_failure_keeps_edits() {
    let mut gateway = MemoryGateway::new();
    let mut screen = AdminScreen::default();
    let session = screen.open_create(SectionKey::intern("contact_cta")).unwrap();
    session.apply(set(Path::root(), "heading", "Visit us")).unwrap();

    gateway.set_offline(true);
    assert!(matches!(
        screen.save(&mut gateway),
        Err(AdminError::Gateway(GatewayError::Network(_)))
    ));

    gateway.set_offline(false);
    let record = screen.save(&mut gateway).unwrap();
    assert_eq!(record.content.get("heading"), Some(&Content::from("Visit us")));
}

#[test]
fn host_driven_save_and_stale_listing() {
    let mut gateway = MemoryGateway::new();
    let mut screen = AdminScreen::default();

    let ticket = screen.begin_load();
    let listing = gateway.list_sections(&screen.list_filter());

    screen.open_create(SectionKey::intern("stats")).unwrap();
    let request = screen.prepare_save().unwrap();
    let SaveRequest::Create { draft } = request else {
        panic!("expected create");
    };
    let record = screen.finish_save(gateway.create_section(draft)).unwrap();
    assert_eq!(screen.instances(SectionKey::intern("stats")), [record]);

    // The empty listing fetched before the save must not clobber it.
    assert!(!screen.accept_listing(ticket, listing));
    assert_eq!(screen.instances(SectionKey::intern("stats")).len(), 1);
}

#[test]
fn listing_lands_after_form_opened_and_cancelled() {
    let mut gateway = MemoryGateway::new();
    let mut screen = AdminScreen::default();
    screen.open_create(SectionKey::intern("stats")).unwrap();
    screen.save(&mut gateway).unwrap();

    let ticket = screen.begin_load();
    let listing = gateway.list_sections(&screen.list_filter());
    screen.open_create(SectionKey::intern("hero")).unwrap();
    screen.cancel();

    assert!(screen.accept_listing(ticket, listing));
    assert_eq!(screen.instances(SectionKey::intern("stats")).len(), 1);
    assert!(screen.session().is_none());
}

#[test]
fn edit_events_from_json() {
    let event: EditEvent = serde_json::from_value(json!({
        "op": "set_field",
        "path": ["items", 0],
        "field_key": "name",
        "value": "Asha"
    }))
    .unwrap();
    assert_eq!(
        event,
        set(Path::root().join_key("items").join_index(0), "name", "Asha")
    );
}
