//! WASM bridge for the studio CMS: exposes the admin controller and edit
//! session to the admin web app.
//!
//! Compiled via `wasm-pack build --target web`. Every call returns a JSON
//! envelope, `{"ok":true,...}` or `{"ok":false,"error":"..."}`. The JS
//! side performs the backend requests itself and hands results back
//! through the ticket API.

use cms_core::{SectionKey, catalog, lint_content};
use cms_editor::{
    AdminConfig, AdminScreen, EditEvent, GatewayError, InstituteInfo, LoadTicket,
    PersistedSection, ScheduleEdit, ScheduleEditor, SectionId, SectionListing,
};
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// The WASM-facing admin screen. One instance per mounted admin page.
#[wasm_bindgen]
pub struct CmsEditor {
    screen: AdminScreen,
}

#[wasm_bindgen]
impl CmsEditor {
    /// `config` is an optional `AdminConfig` JSON object; missing keys take
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Self {
        console_error_panic_hook_setup();
        let config = match config.as_deref().map(serde_json::from_str::<AdminConfig>) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn(&format!("bad admin config, using defaults: {e}"));
                AdminConfig::default()
            }
            None => AdminConfig::default(),
        };
        Self {
            screen: AdminScreen::from_config(config),
        }
    }

    /// Section schemas of `page_id`.
    pub fn select_page(&mut self, page_id: &str) -> String {
        match self.screen.select_page(page_id) {
            Ok(sections) => ok(json!({ "sections": sections })),
            Err(e) => err(e),
        }
    }

    /// Ticket to hand back with the listing the host is about to fetch.
    pub fn begin_load(&mut self) -> String {
        ok(json!({ "ticket": self.screen.begin_load(), "filter": self.screen.list_filter() }))
    }

    /// Apply a fetched listing (`{"ok":true,"listing":...}` or
    /// `{"ok":false,"error":"..."}`). `applied` is false for a stale ticket.
    pub fn accept_listing(&mut self, ticket_json: &str, result_json: &str) -> String {
        let ticket: LoadTicket = match serde_json::from_str(ticket_json) {
            Ok(ticket) => ticket,
            Err(e) => return err(e),
        };
        let result = host_result::<SectionListing>(result_json, "listing");
        let applied = self.screen.accept_listing(ticket, result);
        ok(json!({ "applied": applied }))
    }

    pub fn instances(&self, section_key: &str) -> String {
        ok(json!({ "instances": self.screen.instances(SectionKey::intern(section_key)) }))
    }

    pub fn open_create(&mut self, section_key: &str) -> String {
        match self.screen.open_create(SectionKey::intern(section_key)) {
            Ok(_) => self.render(),
            Err(e) => err(e),
        }
    }

    pub fn open_edit(&mut self, id: f64) -> String {
        let Some(id) = section_id(id) else {
            return err(format!("invalid section id {id}"));
        };
        match self.screen.open_edit(id) {
            Ok(_) => self.render(),
            Err(e) => err(e),
        }
    }

    /// Apply one `EditEvent` and return the re-rendered form.
    pub fn apply_event(&mut self, event_json: &str) -> String {
        let event: EditEvent = match serde_json::from_str(event_json) {
            Ok(event) => event,
            Err(e) => return err(e),
        };
        let applied = self
            .screen
            .session_mut()
            .map_err(|e| e.to_string())
            .and_then(|session| session.apply(event).map_err(|e| e.to_string()));
        match applied {
            Ok(()) => self.render(),
            Err(e) => err(e),
        }
    }

    /// Apply one `ScheduleEdit` to the open weekly-schedule session.
    pub fn apply_schedule(&mut self, edit_json: &str) -> String {
        let edit: ScheduleEdit = match serde_json::from_str(edit_json) {
            Ok(edit) => edit,
            Err(e) => return err(e),
        };
        let applied = self
            .screen
            .session_mut()
            .map_err(|e| e.to_string())
            .and_then(|session| ScheduleEditor::apply(session, edit).map_err(|e| e.to_string()));
        match applied {
            Ok(()) => self.render(),
            Err(e) => err(e),
        }
    }

    /// Editor tree and document of the open session.
    pub fn render(&self) -> String {
        match self.screen.session() {
            Some(session) => ok(json!({
                "mode": session.mode(),
                "section": session.section().key,
                "nodes": session.render(self.screen.registry()),
                "document": session.document(),
                "order": session.order(),
                "is_active": session.is_active(),
                "dirty": session.is_dirty(),
            })),
            None => err("no edit session is open"),
        }
    }

    pub fn set_session_order(&mut self, order: i32) -> String {
        match self.screen.session_mut() {
            Ok(session) => {
                session.set_order(order);
                self.render()
            }
            Err(e) => err(e),
        }
    }

    pub fn set_session_active(&mut self, is_active: bool) -> String {
        match self.screen.session_mut() {
            Ok(session) => {
                session.set_active(is_active);
                self.render()
            }
            Err(e) => err(e),
        }
    }

    /// The gateway call to make, or the missing required paths.
    pub fn prepare_save(&self) -> String {
        match self.screen.prepare_save() {
            Ok(request) => ok(json!({ "request": request })),
            Err(cms_editor::AdminError::MissingRequired(paths)) => to_json(&json!({
                "ok": false,
                "error": "required fields are empty",
                "missing": paths,
            })),
            Err(e) => err(e),
        }
    }

    /// Close the session on a stored record; keep it open on an error.
    pub fn finish_save(&mut self, result_json: &str) -> String {
        let result = host_result::<PersistedSection>(result_json, "record");
        match self.screen.finish_save(result) {
            Ok(record) => ok(json!({ "record": record })),
            Err(e) => err(e),
        }
    }

    pub fn cancel(&mut self) {
        self.screen.cancel();
    }

    /// Institute info from a fetched result, falling back when absent.
    pub fn institute_info(&self, result_json: &str) -> String {
        let info = match host_result::<Option<InstituteInfo>>(result_json, "info") {
            Ok(Some(info)) => info,
            Ok(None) => InstituteInfo::fallback(),
            Err(e) => {
                warn(&format!("failed to load institute info: {e}"));
                InstituteInfo::fallback()
            }
        };
        ok(json!({ "info": info }))
    }

    /// Check an institute-info form before the host sends it.
    pub fn validate_institute_info(&self, info_json: &str) -> String {
        let mut info: InstituteInfo = match serde_json::from_str(info_json) {
            Ok(info) => info,
            Err(e) => return err(e),
        };
        info.phone_numbers.retain(|p| !p.trim().is_empty());
        match info.validate() {
            Ok(()) => ok(json!({ "info": info })),
            Err(e) => err(e),
        }
    }
}

// ─── Envelopes ───────────────────────────────────────────────────────────

fn to_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| err(e))
}

fn ok(mut payload: Value) -> String {
    if let Value::Object(map) = &mut payload {
        map.insert("ok".into(), Value::Bool(true));
    }
    to_json(&payload)
}

fn err(e: impl ToString) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

/// Largest integer a JS number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A JS number that is an exact integer id.
fn section_id(id: f64) -> Option<SectionId> {
    if !id.is_finite() || id.fract() != 0.0 || id.abs() > MAX_SAFE_INTEGER {
        return None;
    }
    Some(SectionId(id as i64))
}

/// Decode a host-side backend result: `{"ok":true,"<field>":...}` or
/// `{"ok":false,"error":"..."}`.
fn host_result<T: serde::de::DeserializeOwned>(
    json: &str,
    field: &str,
) -> Result<T, GatewayError> {
    let mut value: Value =
        serde_json::from_str(json).map_err(|e| GatewayError::Invalid(e.to_string()))?;
    if value.get("ok").and_then(Value::as_bool) != Some(true) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        return Err(GatewayError::Network(message.to_string()));
    }
    let payload = value.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(payload).map_err(|e| GatewayError::Invalid(e.to_string()))
}

fn warn(message: &str) {
    log::warn!("{message}");
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("CMS WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Every page with its section schemas.
#[wasm_bindgen]
pub fn catalog_json() -> String {
    ok(json!({ "pages": catalog().pages() }))
}

/// Conformance findings for a stored document of `section_key`.
#[wasm_bindgen]
pub fn lint_json(section_key: &str, content_json: &str) -> String {
    let Some(section) = catalog().section(SectionKey::intern(section_key)) else {
        return err(format!("unknown section `{section_key}`"));
    };
    match serde_json::from_str(content_json) {
        Ok(doc) => ok(json!({ "diagnostics": lint_content(section, &doc) })),
        Err(e) => err(e),
    }
}

#[derive(Serialize)]
struct TimeChoices {
    part: cms_core::TimePart,
    choices: Vec<String>,
}

/// Dropdown values for each of the six time components.
#[wasm_bindgen]
pub fn time_part_choices() -> String {
    let parts: Vec<TimeChoices> = cms_core::TimePart::ALL
        .iter()
        .map(|part| TimeChoices {
            part: *part,
            choices: part.choices(),
        })
        .collect();
    ok(json!({ "parts": parts }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn create_edit_and_prepare_save() {
        let mut editor = CmsEditor::new(None);
        let opened = parse(&editor.open_create("hero"));
        assert_eq!(opened["ok"], json!(true));
        assert_eq!(opened["mode"], json!({ "mode": "create" }));

        let missing = parse(&editor.prepare_save());
        assert_eq!(missing["missing"], json!([["title"]]));

        let event = r#"{"op":"set_field","path":[],"field_key":"title","value":"Join Us"}"#;
        let rendered = parse(&editor.apply_event(event));
        assert_eq!(rendered["document"]["title"], json!("Join Us"));
        assert_eq!(rendered["dirty"], json!(true));

        let request = parse(&editor.prepare_save());
        assert_eq!(request["request"]["call"], json!("create"));
        assert_eq!(request["request"]["draft"]["section_key"], json!("hero"));
    }

    #[test]
    fn failed_save_keeps_session() {
        let mut editor = CmsEditor::new(None);
        editor.open_create("stats");
        let failed = parse(&editor.finish_save(r#"{"ok":false,"error":"503"}"#));
        assert_eq!(failed["ok"], json!(false));
        assert_eq!(parse(&editor.render())["ok"], json!(true));
    }

    #[test]
    fn stale_listing_is_not_applied() {
        let mut editor = CmsEditor::new(None);
        let ticket = parse(&editor.begin_load())["ticket"].to_string();
        let fresh = parse(&editor.begin_load())["ticket"].to_string();
        let result = parse(&editor.accept_listing(&ticket, r#"{"ok":true,"listing":{}}"#));
        assert_eq!(result["applied"], json!(false));
        let result = parse(&editor.accept_listing(&fresh, r#"{"ok":true,"listing":{}}"#));
        assert_eq!(result["applied"], json!(true));
    }

    #[test]
    fn cancelled_form_keeps_listing_current() {
        let mut editor = CmsEditor::new(None);
        let ticket = parse(&editor.begin_load())["ticket"].to_string();
        editor.open_create("hero");
        editor.cancel();
        let result = parse(&editor.accept_listing(&ticket, r#"{"ok":true,"listing":{}}"#));
        assert_eq!(result["applied"], json!(true));
    }

    #[test]
    fn open_edit_rejects_inexact_ids() {
        let mut editor = CmsEditor::new(None);
        for id in [f64::NAN, f64::INFINITY, 1.5, 1e19, -1e300] {
            let opened = parse(&editor.open_edit(id));
            assert_eq!(opened["ok"], json!(false));
            assert!(opened["error"].as_str().unwrap().starts_with("invalid section id"));
        }
        assert_eq!(section_id(42.0), Some(SectionId(42)));
        // A well-formed id that is not listed is a lookup miss.
        let missing = parse(&editor.open_edit(42.0));
        assert_eq!(missing["error"], json!("section 42 is not in the current listing"));
    }

    #[test]
    fn institute_info_falls_back_on_error() {
        let editor = CmsEditor::new(None);
        let info = parse(&editor.institute_info(r#"{"ok":false,"error":"offline"}"#));
        assert_eq!(info["info"]["phone_numbers"], json!([""]));
        let invalid = parse(&editor.validate_institute_info(
            r#"{"location":"","phone_numbers":[" "],"email":""}"#,
        ));
        assert_eq!(invalid["ok"], json!(false));
    }

    #[test]
    fn catalog_lists_four_pages() {
        let pages = parse(&catalog_json());
        assert_eq!(pages["pages"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn lint_reports_unknown_keys() {
        let report = parse(&lint_json("hero", r#"{"title":"Hi","colour":"red"}"#));
        assert_eq!(report["diagnostics"][0]["rule"], json!("unknown-key"));
        assert_eq!(report["diagnostics"][0]["severity"], json!("info"));
    }
}
