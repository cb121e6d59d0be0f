//! Typed paths into a content document.
//!
//! A path is a sequence of steps, each either an object key or an array
//! index. Keys stay keys even when they look numeric: `"0"` and `[0]`
//! are distinct steps.

use crate::schema::{FieldKind, FieldSchema};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathStep {
    /// Descend into an object's named property.
    Key(String),
    /// Descend into an array element.
    Index(usize),
}

/// Location of a container or value inside a content document.
/// The empty path is the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(SmallVec<[PathStep; 4]>);

impl Path {
    pub fn root() -> Self {
        Path(SmallVec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn push(&mut self, step: PathStep) {
        self.0.push(step);
    }

    /// `self ++ [key]`
    #[must_use]
    pub fn join_key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.0.push(PathStep::Key(key.to_string()));
        next
    }

    /// `self ++ [index]`
    #[must_use]
    pub fn join_index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathStep::Index(index));
        next
    }

    /// Split off the final step: `(parent, last)`.
    pub fn split_last(&self) -> Option<(Path, &PathStep)> {
        let (last, parent) = self.0.split_last()?;
        Some((Path(parent.iter().cloned().collect()), last))
    }

    /// The schema location this path addresses: key steps joined with
    /// `.`, array indices dropped. `items[2].socials` gives
    /// `items.socials`.
    pub fn field_path(&self) -> String {
        let keys: Vec<&str> = self
            .0
            .iter()
            .filter_map(|step| match step {
                PathStep::Key(key) => Some(key.as_str()),
                PathStep::Index(_) => None,
            })
            .collect();
        keys.join(".")
    }

    /// Check that the steps alternate the way `fields` nests: key steps at
    /// the root or under an `Object` field, index steps only under an
    /// `Array` field, and each array element is entered by a key next.
    pub fn conforms_to(&self, fields: &[FieldSchema]) -> bool {
        let mut level = fields;
        let mut steps = self.0.iter().peekable();
        while let Some(step) = steps.next() {
            let PathStep::Key(key) = step else {
                return false;
            };
            let Some(field) = level.iter().find(|f| &f.key == key) else {
                return false;
            };
            match &field.kind {
                FieldKind::Object(children) => level = children,
                FieldKind::Array(children) => {
                    match steps.peek() {
                        Some(PathStep::Index(_)) => {
                            steps.next();
                        }
                        // The array field itself.
                        None => return true,
                        Some(PathStep::Key(_)) => return false,
                    }
                    level = children;
                }
                _ => return steps.peek().is_none(),
            }
        }
        true
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    /// Collect key-only steps.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path(iter.into_iter().map(|k| PathStep::Key(k.into())).collect())
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Path(SmallVec::from_vec(steps))
    }
}

impl From<usize> for PathStep {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_string())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
