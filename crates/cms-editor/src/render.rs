//! Recursive field renderer: schema + document → editor tree.
//!
//! The renderer is pure. It walks a section's field schemas against the
//! current document and produces an [`EditorNode`] tree that a host (the
//! WASM bridge, a test, a TUI) turns into widgets. Every leaf carries the
//! container path and field key its edits must be written to, so a host
//! only has to send back [`crate::session::EditEvent::SetField`].

use crate::registry::EditorRegistry;
use cms_core::schema::{FieldKind, FieldSchema, SectionSchema, SelectOption};
use cms_core::store::read_typed;
use cms_core::{Content, Path, SectionKey};
use serde::Serialize;

// ─── Editor tree ─────────────────────────────────────────────────────────

/// Editing primitive for a scalar field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Text,
    Textarea,
    Url,
    Number,
    /// Free text plus a picker. `swatch` is set only when the text is a
    /// valid hex color.
    Color { swatch: Option<String> },
    Date,
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub index: usize,
    pub children: Vec<EditorNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum EditorNode {
    Leaf {
        /// Container the value lives in.
        path: Path,
        field_key: String,
        label: String,
        #[serde(flatten)]
        widget: Widget,
        value: String,
        required: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Group {
        /// Path of the object value itself.
        path: Path,
        label: String,
        children: Vec<EditorNode>,
    },
    List {
        /// Path of the array value itself.
        path: Path,
        label: String,
        items: Vec<ListItem>,
    },
    Custom {
        path: Path,
        field_key: String,
        label: String,
        editor_id: &'static str,
        value: Content,
    },
}

impl EditorNode {
    pub fn label(&self) -> &str {
        match self {
            EditorNode::Leaf { label, .. }
            | EditorNode::Group { label, .. }
            | EditorNode::List { label, .. }
            | EditorNode::Custom { label, .. } => label,
        }
    }

    /// Depth-first iterator over leaves, for hosts and tests that only
    /// care about inputs.
    pub fn leaves(&self) -> Vec<&EditorNode> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }
}

fn collect_leaves<'a>(node: &'a EditorNode, out: &mut Vec<&'a EditorNode>) {
    match node {
        EditorNode::Leaf { .. } => out.push(node),
        EditorNode::Group { children, .. } => {
            for child in children {
                collect_leaves(child, out);
            }
        }
        EditorNode::List { items, .. } => {
            for child in items.iter().flat_map(|i| &i.children) {
                collect_leaves(child, out);
            }
        }
        EditorNode::Custom { .. } => {}
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────

/// Render every top-level field of `section` against `doc`.
#[must_use]
pub fn render_section(
    section: &SectionSchema,
    doc: &Content,
    registry: &EditorRegistry,
) -> Vec<EditorNode> {
    let root = Path::root();
    section
        .fields
        .iter()
        .map(|field| render_field(section.key, field, &root, doc, registry))
        .collect()
}

/// Render one field living in the container at `path`.
pub fn render_field(
    section: SectionKey,
    field: &FieldSchema,
    path: &Path,
    doc: &Content,
    registry: &EditorRegistry,
) -> EditorNode {
    let value_path = path.join_key(&field.key);
    let value = read_typed(doc, &value_path, field);

    if let Some(editor) = registry.lookup(section, &value_path.field_path()) {
        return EditorNode::Custom {
            path: path.clone(),
            field_key: field.key.clone(),
            label: field.label.clone(),
            editor_id: editor.id(),
            value: editor.normalize(&value),
        };
    }

    let widget = match &field.kind {
        FieldKind::Object(children) => {
            return EditorNode::Group {
                label: field.label.clone(),
                children: children
                    .iter()
                    .map(|child| render_field(section, child, &value_path, doc, registry))
                    .collect(),
                path: value_path,
            };
        }
        FieldKind::Array(children) => {
            let len = value.as_array().map_or(0, <[Content]>::len);
            let items = (0..len)
                .map(|index| {
                    let item_path = value_path.join_index(index);
                    ListItem {
                        index,
                        children: children
                            .iter()
                            .map(|child| render_field(section, child, &item_path, doc, registry))
                            .collect(),
                    }
                })
                .collect();
            return EditorNode::List {
                path: value_path,
                label: field.label.clone(),
                items,
            };
        }
        FieldKind::Text => Widget::Text,
        FieldKind::Textarea => Widget::Textarea,
        FieldKind::Url => Widget::Url,
        FieldKind::Number => Widget::Number,
        FieldKind::Date => Widget::Date,
        FieldKind::Color => Widget::Color {
            swatch: hex_swatch(&value.to_display_string()),
        },
        FieldKind::Select(options) => Widget::Select {
            options: options.clone(),
        },
    };

    let mut text = value.to_display_string();
    if matches!(field.kind, FieldKind::Date) {
        text = date_only(&text).to_string();
    }

    EditorNode::Leaf {
        path: path.clone(),
        field_key: field.key.clone(),
        label: field.label.clone(),
        widget,
        value: text,
        required: field.required,
        placeholder: field.placeholder.clone(),
    }
}

// ─── Leaf value helpers ──────────────────────────────────────────────────

/// Cut an ISO timestamp (`2024-05-01T10:00:00Z`) down to its date part.
pub fn date_only(value: &str) -> &str {
    value.split_once('T').map_or(value, |(date, _)| date).trim()
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Normalized `#RRGGBB` / `#RRGGBBAA` for picker display; `None` for
/// anything that isn't `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
pub fn hex_swatch(value: &str) -> Option<String> {
    let hex = value.trim().strip_prefix('#')?;
    let digits: Vec<u8> = hex.bytes().map(hex_val).collect::<Option<_>>()?;
    let expanded: Vec<u8> = match digits.len() {
        3 | 4 => digits.iter().flat_map(|d| [*d, *d]).collect(),
        6 | 8 => digits,
        _ => return None,
    };
    const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(expanded.len() + 1);
    out.push('#');
    out.extend(expanded.iter().map(|d| HEX_CHARS[*d as usize] as char));
    Some(out)
}
