//! Declarative schema of the editable surface: pages → sections → fields.
//!
//! Field kinds are a closed tagged union. Composite kinds (`Object`,
//! `Array`) own their child schemas; scalar kinds cannot carry children.
//! Schemas are immutable configuration; see [`crate::catalog`].

use crate::content::{Content, ContentMap};
use crate::id::SectionKey;
use crate::path::{Path, PathStep};
use serde::Serialize;
use std::collections::HashSet;

// ─── Field kinds ─────────────────────────────────────────────────────────

/// One entry of a `Select` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "children", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Url,
    Number,
    Color,
    Select(Vec<SelectOption>),
    Date,
    Object(Vec<FieldSchema>),
    Array(Vec<FieldSchema>),
}

impl FieldKind {
    pub fn is_composite(&self) -> bool {
        matches!(self, FieldKind::Object(_) | FieldKind::Array(_))
    }

    /// Child schemas of a composite kind.
    pub fn children(&self) -> Option<&[FieldSchema]> {
        match self {
            FieldKind::Object(children) | FieldKind::Array(children) => Some(children),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Url => "url",
            FieldKind::Number => "number",
            FieldKind::Color => "color",
            FieldKind::Select(_) => "select",
            FieldKind::Date => "date",
            FieldKind::Object(_) => "object",
            FieldKind::Array(_) => "array",
        }
    }

    /// Empty value for a fresh document: `""` for scalars, `[]` for arrays,
    /// and for objects a `{}` seeded with each child's default.
    pub fn default_value(&self) -> Content {
        match self {
            FieldKind::Object(children) => default_object(children),
            FieldKind::Array(_) => Content::array(),
            _ => Content::empty_string(),
        }
    }
}

/// Object holding every field's default value, in schema order.
pub fn default_object(fields: &[FieldSchema]) -> Content {
    let map: ContentMap = fields
        .iter()
        .map(|f| (f.key.clone(), f.kind.default_value()))
        .collect();
    Content::from_map(map)
}

// ─── Field schema ────────────────────────────────────────────────────────

/// One editable unit of a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    /// Unique among its siblings.
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSchema {
    pub fn new(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            placeholder: None,
        }
    }

    pub fn text(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn textarea(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Textarea)
    }

    pub fn url(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Url)
    }

    pub fn number(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    pub fn color(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Color)
    }

    pub fn date(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Date)
    }

    /// `options` are `(value, label)` pairs, in display order.
    pub fn select(key: &str, label: &str, options: &[(&str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(value, label)| SelectOption::new(value, label))
            .collect();
        Self::new(key, label, FieldKind::Select(options))
    }

    pub fn object(key: &str, label: &str, children: Vec<FieldSchema>) -> Self {
        Self::new(key, label, FieldKind::Object(children))
    }

    pub fn array(key: &str, label: &str, children: Vec<FieldSchema>) -> Self {
        Self::new(key, label, FieldKind::Array(children))
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    /// Child schema by key, for composite kinds.
    pub fn child(&self, key: &str) -> Option<&FieldSchema> {
        self.kind.children()?.iter().find(|c| c.key == key)
    }

    /// A new element for an `Array` field: an object with each child at
    /// its default. `None` for every other kind.
    pub fn default_item(&self) -> Option<Content> {
        match &self.kind {
            FieldKind::Array(children) => Some(default_object(children)),
            _ => None,
        }
    }

    /// Check composite kinds have children with sibling-unique keys,
    /// recursively.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.key.is_empty() {
            return Err(SchemaError::EmptyKey);
        }
        match &self.kind {
            FieldKind::Object(children) | FieldKind::Array(children) => {
                if children.is_empty() {
                    return Err(SchemaError::NoChildren {
                        field: self.key.clone(),
                    });
                }
                validate_siblings(children, &self.key)
            }
            FieldKind::Select(options) if options.is_empty() => Err(SchemaError::NoOptions {
                field: self.key.clone(),
            }),
            _ => Ok(()),
        }
    }
}

fn validate_siblings(fields: &[FieldSchema], owner: &str) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.key.as_str()) {
            return Err(SchemaError::DuplicateField {
                owner: owner.to_string(),
                field: field.key.clone(),
            });
        }
        field.validate()?;
    }
    Ok(())
}

// ─── Sections & pages ────────────────────────────────────────────────────

/// A keyed group of fields; one addressable content block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSchema {
    pub key: SectionKey,
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldSchema>,
}

impl SectionSchema {
    pub fn new(key: &str, name: &str, description: &str, fields: Vec<FieldSchema>) -> Self {
        Self {
            key: SectionKey::intern(key),
            name: name.to_string(),
            description: description.to_string(),
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Schema of the field a full value path points at. Index steps are
    /// skipped; `items[2].name` resolves to `items`' child `name`.
    pub fn field_at(&self, path: &Path) -> Option<&FieldSchema> {
        let mut level: &[FieldSchema] = &self.fields;
        let mut found = None;
        for step in path.steps() {
            let PathStep::Key(key) = step else {
                continue;
            };
            let field = level.iter().find(|f| &f.key == key)?;
            level = field.kind.children().unwrap_or(&[]);
            found = Some(field);
        }
        found
    }

    /// Document used when adding a new instance of this section.
    pub fn empty_document(&self) -> Content {
        default_object(&self.fields)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_siblings(&self.fields, self.key.as_str())
    }
}

/// A navigational page and the sections it shows, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSchema {
    pub id: String,
    pub name: String,
    pub route: String,
    pub sections: Vec<SectionSchema>,
}

impl PageSchema {
    pub fn new(id: &str, name: &str, route: &str, sections: Vec<SectionSchema>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            route: route.to_string(),
            sections,
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("field with empty key")]
    EmptyKey,
    #[error("composite field `{field}` has no children")]
    NoChildren { field: String },
    #[error("select field `{field}` has no options")]
    NoOptions { field: String },
    #[error("duplicate field `{field}` in `{owner}`")]
    DuplicateField { owner: String, field: String },
    #[error("section key `{0}` used more than once")]
    DuplicateSection(String),
    #[error("page id `{0}` used more than once")]
    DuplicatePage(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cta() -> FieldSchema {
        FieldSchema::object(
            "cta_primary",
            "Primary CTA",
            vec![
                FieldSchema::text("text", "Text"),
                FieldSchema::url("link", "Link"),
                FieldSchema::select(
                    "action",
                    "Action",
                    &[("link", "Link"), ("booking", "Booking")],
                ),
            ],
        )
    }

    #[test]
    fn scalar_defaults_are_empty_strings() {
        assert_eq!(FieldKind::Text.default_value(), Content::empty_string());
        assert_eq!(FieldKind::Date.default_value(), Content::empty_string());
        assert_eq!(
            FieldKind::Array(vec![FieldSchema::text("a", "A")]).default_value(),
            Content::array()
        );
    }

    #[test]
    fn object_default_is_seeded_with_children() {
        assert_eq!(
            cta().kind.default_value().to_json(),
            json!({ "text": "", "link": "", "action": "" })
        );
    }

    #[test]
    fn default_item_only_for_arrays() {
        let list = FieldSchema::array(
            "items",
            "Items",
            vec![FieldSchema::text("name", "Name"), FieldSchema::number("qty", "Qty")],
        );
        assert_eq!(
            list.default_item().unwrap().to_json(),
            json!({ "name": "", "qty": "" })
        );
        assert!(cta().default_item().is_none());
    }

    #[test]
    fn empty_composite_is_rejected() {
        let bad = FieldSchema::array("items", "Items", vec![]);
        assert_eq!(
            bad.validate(),
            Err(SchemaError::NoChildren {
                field: "items".into()
            })
        );
    }

    #[test]
    fn duplicate_child_keys_are_rejected() {
        let bad = FieldSchema::object(
            "o",
            "O",
            vec![FieldSchema::text("a", "A"), FieldSchema::url("a", "A2")],
        );
        assert!(matches!(
            bad.validate(),
            Err(SchemaError::DuplicateField { .. })
        ));
    }

    #[test]
    fn builder_flags() {
        let f = FieldSchema::text("title", "Title")
            .required()
            .placeholder("Welcome");
        assert!(f.required);
        assert_eq!(f.placeholder.as_deref(), Some("Welcome"));
    }

    #[test]
    fn section_empty_document() {
        let section = SectionSchema::new(
            "hero",
            "Hero",
            "Top banner",
            vec![FieldSchema::text("title", "Title").required(), cta()],
        );
        assert_eq!(
            section.empty_document().to_json(),
            json!({ "title": "", "cta_primary": { "text": "", "link": "", "action": "" } })
        );
        assert!(section.validate().is_ok());
    }

    #[test]
    fn field_at_skips_indices() {
        let section = SectionSchema::new(
            "list",
            "List",
            "",
            vec![FieldSchema::array(
                "items",
                "Items",
                vec![FieldSchema::date("when", "When")],
            )],
        );
        let path = Path::root().join_key("items").join_index(4).join_key("when");
        assert_eq!(section.field_at(&path).unwrap().kind, FieldKind::Date);
        assert_eq!(section.field_at(&Path::from_iter(["items"])).unwrap().key, "items");
        assert!(section.field_at(&Path::from_iter(["items", "nope"])).is_none());
        assert!(section.field_at(&Path::root()).is_none());
    }
}
