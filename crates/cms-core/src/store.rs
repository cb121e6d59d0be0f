//! Path-addressed reads and writes over content documents.
//!
//! Writes never touch the input document. They clone the root handle and
//! copy-on-write each container along the path (`Arc::make_mut`), so
//! siblings off the path stay shared with the previous version and the
//! previous version remains valid for change comparison.
//!
//! Missing intermediates are created as `{}` while writing; they are
//! never an error. An index step may address an existing element or
//! append one (`index == len`); anything further out leaves the document
//! as it was. [`can_write`] tells the two apart up front.

use crate::content::{Content, ContentMap};
use crate::path::{Path, PathStep};
use crate::schema::FieldSchema;
use std::sync::Arc;

// ─── Reads ───────────────────────────────────────────────────────────────

/// Borrow the value at `path`, if every step resolves.
pub fn lookup<'a>(doc: &'a Content, path: &Path) -> Option<&'a Content> {
    let mut node = doc;
    for step in path.steps() {
        node = match step {
            PathStep::Key(key) => node.get(key)?,
            PathStep::Index(index) => match node.get_index(*index) {
                Some(item) => item,
                None => {
                    log::debug!("read past end of array at {path} (index {index})");
                    return None;
                }
            },
        };
    }
    Some(node)
}

/// Value at `path`, or `Content::Null` when any step is missing.
pub fn read(doc: &Content, path: &Path) -> Content {
    lookup(doc, path).cloned().unwrap_or_default()
}

/// Value at `path`, substituting the field kind's empty default when the
/// value is missing or null.
pub fn read_typed(doc: &Content, path: &Path, field: &FieldSchema) -> Content {
    match lookup(doc, path) {
        Some(value) if !value.is_null() => value.clone(),
        _ => field.kind.default_value(),
    }
}

/// Whether every index step of `path` lands on an existing element or
/// appends one. Missing or non-array containers count as empty.
pub fn can_write(doc: &Content, path: &Path) -> bool {
    let mut node = Some(doc);
    for step in path.steps() {
        node = match step {
            PathStep::Key(key) => node.and_then(|n| n.get(key)),
            PathStep::Index(index) => {
                let len = node.and_then(Content::as_array).map_or(0, <[Content]>::len);
                if *index > len {
                    return false;
                }
                node.and_then(|n| n.get_index(*index))
            }
        };
    }
    true
}

// ─── Writes ──────────────────────────────────────────────────────────────

/// Set property `field_key` inside the container at `path`.
///
/// Returns the new document; `doc` is left untouched.
#[must_use]
pub fn write(doc: &Content, path: &Path, field_key: &str, value: Content) -> Content {
    let mut next = doc.clone();
    let Some(container) = descend_mut(&mut next, path.steps()) else {
        log::debug!("write past end of array at {path}");
        return doc.clone();
    };
    object_mut(container).insert(field_key.to_string(), value);
    log::trace!("write {}", path.join_key(field_key));
    next
}

/// Replace the value at a full path. The root path replaces the document.
#[must_use]
pub fn write_at(doc: &Content, path: &Path, value: Content) -> Content {
    let Some((parent, last)) = path.split_last() else {
        return value;
    };
    let mut next = doc.clone();
    let Some(container) = descend_mut(&mut next, parent.steps()) else {
        log::debug!("write past end of array at {path}");
        return doc.clone();
    };
    match last {
        PathStep::Key(key) => {
            object_mut(container).insert(key.clone(), value);
        }
        PathStep::Index(index) => match element_mut(array_mut(container), *index) {
            Some(slot) => *slot = value,
            None => {
                log::debug!("write past end of array at {path}");
                return doc.clone();
            }
        },
    }
    next
}

/// Append `item` to the array at `path`, creating the array if absent.
#[must_use]
pub fn push_item(doc: &Content, path: &Path, item: Content) -> Content {
    let mut next = doc.clone();
    let Some(container) = descend_mut(&mut next, path.steps()) else {
        log::debug!("push past end of array at {path}");
        return doc.clone();
    };
    array_mut(container).push(item);
    next
}

/// Remove element `index` of the array at `path`; later elements shift
/// down. Out-of-range indices leave the document as it was.
#[must_use]
pub fn remove_item(doc: &Content, path: &Path, index: usize) -> Content {
    let len = lookup(doc, path)
        .and_then(Content::as_array)
        .map_or(0, <[Content]>::len);
    if index >= len {
        log::debug!("remove past end of array at {path} (index {index}, len {len})");
        return doc.clone();
    }
    let mut next = doc.clone();
    if let Some(container) = descend_mut(&mut next, path.steps()) {
        array_mut(container).remove(index);
    }
    next
}

// ─── Copy-on-write descent ───────────────────────────────────────────────

/// `None` when an index step lies past the end of its array.
fn descend_mut<'a>(node: &'a mut Content, steps: &[PathStep]) -> Option<&'a mut Content> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(node);
    };
    let child = match step {
        PathStep::Key(key) => object_mut(node)
            .entry(key.clone())
            .or_insert_with(Content::object),
        PathStep::Index(index) => element_mut(array_mut(node), *index)?,
    };
    // Scalars or nulls sitting where a container belongs become `{}`.
    if rest.first().is_some_and(|s| matches!(s, PathStep::Key(_)))
        && !matches!(child, Content::Object(_))
    {
        *child = Content::object();
    }
    descend_mut(child, rest)
}

/// Existing element `index`, or a fresh `{}` appended when `index == len`.
fn element_mut(items: &mut Vec<Content>, index: usize) -> Option<&mut Content> {
    if index == items.len() {
        items.push(Content::object());
    }
    items.get_mut(index)
}

fn object_mut(node: &mut Content) -> &mut ContentMap {
    if !matches!(node, Content::Object(_)) {
        *node = Content::object();
    }
    match node {
        Content::Object(map) => Arc::make_mut(map),
        _ => unreachable!("node was just replaced by an object"),
    }
}

fn array_mut(node: &mut Content) -> &mut Vec<Content> {
    if !matches!(node, Content::Array(_)) {
        *node = Content::array();
    }
    match node {
        Content::Array(items) => Arc::make_mut(items),
        _ => unreachable!("node was just replaced by an array"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Content {
        Content::from(value)
    }

    #[test]
    fn write_top_level_field() {
        let before = doc(json!({ "title": "Old", "subtitle": "Keep" }));
        let after = write(&before, &Path::root(), "title", "New".into());
        assert_eq!(after.to_json(), json!({ "title": "New", "subtitle": "Keep" }));
        assert_eq!(before.to_json(), json!({ "title": "Old", "subtitle": "Keep" }));
    }

    #[test]
    fn write_into_object_field() {
        let before = doc(json!({ "cta": { "text": "", "link": "/a" } }));
        let after = write(&before, &Path::from_iter(["cta"]), "text", "Go".into());
        assert_eq!(after.to_json(), json!({ "cta": { "text": "Go", "link": "/a" } }));
    }

    #[test]
    fn write_into_array_element() {
        let before = doc(json!({ "items": [{ "name": "a" }, { "name": "b" }] }));
        let path = Path::root().join_key("items").join_index(1);
        let after = write(&before, &path, "name", "B".into());
        assert_eq!(
            after.to_json(),
            json!({ "items": [{ "name": "a" }, { "name": "B" }] })
        );
    }

    #[test]
    fn write_creates_missing_intermediates() {
        let after = write(
            &Content::object(),
            &Path::from_iter(["a", "b", "c"]),
            "d",
            "deep".into(),
        );
        assert_eq!(after.to_json(), json!({ "a": { "b": { "c": { "d": "deep" } } } }));
    }

    #[test]
    fn write_replaces_scalar_intermediate_with_object() {
        let before = doc(json!({ "cta": "legacy" }));
        let after = write(&before, &Path::from_iter(["cta"]), "text", "Go".into());
        assert_eq!(after.to_json(), json!({ "cta": { "text": "Go" } }));
    }

    #[test]
    fn write_shares_untouched_siblings() {
        let before = doc(json!({ "left": { "x": 1 }, "right": { "y": 2 } }));
        let after = write(&before, &Path::from_iter(["right"]), "y", "3".into());
        let (Some(Content::Object(l1)), Some(Content::Object(l2))) =
            (before.get("left"), after.get("left"))
        else {
            panic!("expected objects");
        };
        assert!(Arc::ptr_eq(l1, l2));
    }

    #[test]
    fn read_missing_is_null_and_typed_read_defaults() {
        let d = doc(json!({ "title": "x" }));
        assert_eq!(read(&d, &Path::from_iter(["nope"])), Content::Null);
        assert_eq!(read(&d, &Path::root().join_key("title").join_index(0)), Content::Null);
        let list = FieldSchema::array("items", "Items", vec![FieldSchema::text("n", "N")]);
        assert_eq!(
            read_typed(&d, &Path::from_iter(["items"]), &list),
            Content::array()
        );
    }

    #[test]
    fn push_and_remove_items() {
        let path = Path::from_iter(["items"]);
        let d = push_item(&Content::object(), &path, "a".into());
        let d = push_item(&d, &path, "b".into());
        let d = push_item(&d, &path, "c".into());
        assert_eq!(d.to_json(), json!({ "items": ["a", "b", "c"] }));
        let removed = remove_item(&d, &path, 0);
        assert_eq!(removed.to_json(), json!({ "items": ["b", "c"] }));
        assert_eq!(remove_item(&removed, &path, 9), removed);
    }

    #[test]
    fn index_may_append_but_not_skip() {
        let d = doc(json!({ "items": [{ "name": "a" }] }));
        let items = Path::from_iter(["items"]);
        let appended = write(&d, &items.join_index(1), "name", "b".into());
        assert_eq!(
            appended.to_json(),
            json!({ "items": [{ "name": "a" }, { "name": "b" }] })
        );
        for index in [2, 1_000_000_000, usize::MAX] {
            let path = items.join_index(index);
            assert!(!can_write(&d, &path));
            assert_eq!(write(&d, &path, "name", "x".into()), d);
            assert_eq!(write_at(&d, &path, "x".into()), d);
            assert_eq!(push_item(&d, &path.join_key("tags"), "x".into()), d);
        }
        assert!(can_write(&d, &items.join_index(1).join_key("socials")));
        assert!(!can_write(&d, &items.join_index(1).join_key("tags").join_index(1)));
    }

    #[test]
    fn write_at_root_replaces_document() {
        let d = doc(json!({ "a": 1 }));
        assert_eq!(write_at(&d, &Path::root(), "x".into()), Content::from("x"));
        let nested = write_at(&d, &Path::root().join_key("list").join_index(0), "v".into());
        assert_eq!(nested.to_json(), json!({ "a": 1, "list": ["v"] }));
    }
}
