//! Edit session: the document store behind one open section form.
//!
//! A session owns exactly one content document. It is seeded empty
//! (create) or from a stored record (edit), changed only through
//! [`EditEvent`]s, and dropped on save or cancel. Every event replaces the
//! whole document value synchronously. There is no undo; cancelling
//! discards the session.

use crate::gateway::{PersistedSection, SectionId};
use crate::render::{EditorNode, date_only, render_section};
use crate::registry::EditorRegistry;
use cms_core::schema::{FieldKind, FieldSchema, SectionSchema};
use cms_core::store::{self, push_item, read, remove_item, write};
use cms_core::{Content, Path};
use serde::{Deserialize, Serialize};

/// A change requested by a field editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditEvent {
    /// Leaf edit: set `field_key` inside the container at `path`.
    SetField {
        path: Path,
        field_key: String,
        value: Content,
    },
    /// Whole-value write from a custom editor; no leaf normalization.
    ReplaceField {
        path: Path,
        field_key: String,
        value: Content,
    },
    /// Append a default element to the array at `path`.
    AddItem { path: Path },
    /// Remove element `index` of the array at `path`.
    RemoveItem { path: Path, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no array field at {0}")]
    NotAnArray(Path),
    #[error("index past the end of its array in {0}")]
    OutOfRange(Path),
    #[error("required fields are empty: {}", join_paths(.0))]
    MissingRequired(Vec<Path>),
}

pub(crate) fn join_paths(paths: &[Path]) -> String {
    paths
        .iter()
        .map(Path::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum SessionMode {
    Create,
    Edit(SectionId),
}

pub struct EditSession<'s> {
    section: &'s SectionSchema,
    mode: SessionMode,
    document: Content,
    original: Content,
    order: i32,
    is_active: bool,
}

impl<'s> EditSession<'s> {
    /// New instance of `section`, every field at its empty default.
    pub fn create(section: &'s SectionSchema, order: i32) -> Self {
        let document = section.empty_document();
        log::debug!("open create form for {}", section.key);
        Self {
            section,
            mode: SessionMode::Create,
            original: document.clone(),
            document,
            order,
            is_active: true,
        }
    }

    /// Edit a stored record. Its content is loaded verbatim; a null
    /// content is treated as an empty document.
    pub fn edit(section: &'s SectionSchema, record: &PersistedSection) -> Self {
        let document = if record.content.is_null() {
            section.empty_document()
        } else {
            record.content.clone()
        };
        log::debug!("open edit form for {} #{}", section.key, record.id);
        Self {
            section,
            mode: SessionMode::Edit(record.id),
            original: document.clone(),
            document,
            order: record.order,
            is_active: record.is_active,
        }
    }

    pub fn section(&self) -> &'s SectionSchema {
        self.section
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn document(&self) -> &Content {
        &self.document
    }

    pub fn read(&self, path: &Path) -> Content {
        read(&self.document, path)
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Whether the document differs from what the form opened with.
    pub fn is_dirty(&self) -> bool {
        self.document != self.original
    }

    /// Editor tree for the current document.
    pub fn render(&self, registry: &EditorRegistry) -> Vec<EditorNode> {
        render_section(self.section, &self.document, registry)
    }

    /// Apply one edit. Leaf edits are rejected only when an index step
    /// skips past the end of its array; list operations must also address
    /// an array field.
    pub fn apply(&mut self, event: EditEvent) -> Result<(), EditError> {
        let target = match &event {
            EditEvent::SetField { path, .. }
            | EditEvent::ReplaceField { path, .. }
            | EditEvent::AddItem { path }
            | EditEvent::RemoveItem { path, .. } => path,
        };
        if !store::can_write(&self.document, target) {
            return Err(EditError::OutOfRange(target.clone()));
        }
        let next = match event {
            EditEvent::SetField {
                path,
                field_key,
                value,
            } => {
                let value = self.normalize_leaf(&path, &field_key, value);
                write(&self.document, &path, &field_key, value)
            }
            EditEvent::ReplaceField {
                path,
                field_key,
                value,
            } => write(&self.document, &path, &field_key, value),
            EditEvent::AddItem { path } => {
                let item = self
                    .section
                    .field_at(&path)
                    .and_then(FieldSchema::default_item)
                    .ok_or_else(|| EditError::NotAnArray(path.clone()))?;
                push_item(&self.document, &path, item)
            }
            EditEvent::RemoveItem { path, index } => {
                let is_array = self
                    .section
                    .field_at(&path)
                    .is_some_and(|f| matches!(f.kind, FieldKind::Array(_)));
                if !is_array {
                    return Err(EditError::NotAnArray(path));
                }
                remove_item(&self.document, &path, index)
            }
        };
        self.document = next;
        Ok(())
    }

    /// Date fields store date-only strings.
    fn normalize_leaf(&self, path: &Path, field_key: &str, value: Content) -> Content {
        let is_date = self
            .section
            .field_at(&path.join_key(field_key))
            .is_some_and(|f| f.kind == FieldKind::Date);
        match value {
            Content::String(s) if is_date => Content::from(date_only(&s)),
            other => other,
        }
    }

    /// Paths of required scalar fields that are still empty.
    pub fn missing_required(&self) -> Vec<Path> {
        let mut out = Vec::new();
        collect_missing(&self.section.fields, &self.document, &Path::root(), &mut out);
        out
    }

    /// The document to persist, once every required field is filled.
    pub fn submit(&self) -> Result<Content, EditError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(EditError::MissingRequired(missing));
        }
        Ok(self.document.clone())
    }
}

fn collect_missing(fields: &[FieldSchema], doc: &Content, at: &Path, out: &mut Vec<Path>) {
    for field in fields {
        let value_path = at.join_key(&field.key);
        match &field.kind {
            FieldKind::Object(children) => collect_missing(children, doc, &value_path, out),
            FieldKind::Array(children) => {
                let len = store::lookup(doc, &value_path)
                    .and_then(Content::as_array)
                    .map_or(0, <[Content]>::len);
                for index in 0..len {
                    collect_missing(children, doc, &value_path.join_index(index), out);
                }
            }
            _ => {
                if field.required && read(doc, &value_path).to_display_string().trim().is_empty() {
                    out.push(value_path);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cms_core::SectionKey;
    use cms_core::catalog::catalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn section(key: &str) -> &'static SectionSchema {
        catalog().section(SectionKey::intern(key)).unwrap()
    }

    fn set(path: Path, key: &str, value: &str) -> EditEvent {
        EditEvent::SetField {
            path,
            field_key: key.into(),
            value: value.into(),
        }
    }

    #[test]
    fn create_starts_clean() {
        let session = EditSession::create(section("hero"), 0);
        assert_eq!(session.mode(), SessionMode::Create);
        assert!(!session.is_dirty());
        assert!(session.is_active());
    }

    #[test]
    fn set_field_replaces_document() {
        let mut session = EditSession::create(section("hero"), 0);
        let before = session.document().clone();
        session.apply(set(Path::root(), "title", "Breathe")).unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.read(&Path::from_iter(["title"])), Content::from("Breathe"));
        assert_eq!(before.get("title"), Some(&Content::from("")));
    }

    #[test]
    fn date_writes_are_date_only() {
        let mut session = EditSession::create(section("announcement"), 0);
        session
            .apply(set(Path::root(), "expires_on", "2024-07-01T00:00:00Z"))
            .unwrap();
        assert_eq!(
            session.read(&Path::from_iter(["expires_on"])),
            Content::from("2024-07-01")
        );
    }

    #[test]
    fn add_and_remove_items() {
        let mut session = EditSession::create(section("testimonials"), 0);
        let items = Path::from_iter(["items"]);
        for _ in 0..3 {
            session.apply(EditEvent::AddItem { path: items.clone() }).unwrap();
        }
        session
            .apply(set(items.join_index(2), "name", "Third"))
            .unwrap();
        session
            .apply(EditEvent::RemoveItem {
                path: items.clone(),
                index: 0,
            })
            .unwrap();
        let doc = session.document().to_json();
        assert_eq!(doc["items"].as_array().unwrap().len(), 2);
        assert_eq!(doc["items"][1]["name"], json!("Third"));
        assert_eq!(
            doc["items"][0],
            json!({ "name": "", "quote": "", "rating": "", "photo": "" })
        );
    }

    #[test]
    fn list_ops_need_an_array_field() {
        let mut session = EditSession::create(section("hero"), 0);
        let err = session
            .apply(EditEvent::AddItem {
                path: Path::from_iter(["title"]),
            })
            .unwrap_err();
        assert_eq!(err, EditError::NotAnArray(Path::from_iter(["title"])));
    }

    #[test]
    fn far_index_is_rejected_without_growing() {
        let mut session = EditSession::create(section("testimonials"), 0);
        let items = Path::from_iter(["items"]);
        session.apply(EditEvent::AddItem { path: items.clone() }).unwrap();
        let before = session.document().clone();
        for index in [1_000_000_000, usize::MAX] {
            let path = items.join_index(index);
            let err = session.apply(set(path.clone(), "name", "x")).unwrap_err();
            assert_eq!(err, EditError::OutOfRange(path));
        }
        assert_eq!(session.document(), &before);

        // One past the end appends.
        session.apply(set(items.join_index(1), "name", "Next")).unwrap();
        assert_eq!(session.document().to_json()["items"][1], json!({ "name": "Next" }));
    }

    #[test]
    fn submit_requires_required_fields() {
        let mut session = EditSession::create(section("testimonials"), 0);
        session
            .apply(EditEvent::AddItem {
                path: Path::from_iter(["items"]),
            })
            .unwrap();
        let Err(EditError::MissingRequired(missing)) = session.submit() else {
            panic!("expected missing fields");
        };
        let missing: Vec<String> = missing.iter().map(Path::to_string).collect();
        assert_eq!(missing, ["items[0].name", "items[0].quote"]);

        let item = Path::root().join_key("items").join_index(0);
        session.apply(set(item.clone(), "name", "Meera")).unwrap();
        session.apply(set(item, "quote", "Lovely")).unwrap();
        assert!(session.submit().is_ok());
    }

    #[test]
    fn edit_loads_record_verbatim() {
        let record = PersistedSection {
            id: SectionId(4),
            section_key: SectionKey::intern("hero"),
            content: Content::from(json!({ "title": "Stored", "legacy": true })),
            order: 3,
            is_active: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let session = EditSession::edit(section("hero"), &record);
        assert_eq!(session.mode(), SessionMode::Edit(SectionId(4)));
        assert_eq!(session.document(), &record.content);
        assert_eq!(session.order(), 3);
        assert!(!session.is_active());
    }
}
