//! Custom editor registry.
//!
//! Some fields are edited through a dedicated surface instead of the
//! generic recursive renderer. Editors are keyed by section and schema
//! path (the field's key steps joined with `.`, array indices dropped, so
//! `cta_primary.text` or `items.name`). The renderer asks the registry
//! about every field it visits; on a match it emits a
//! [`crate::render::EditorNode::Custom`] placeholder and the host mounts
//! that editor. Custom editors still read and write through the session's
//! path-addressed store.

use cms_core::catalog::{SCHEDULE_FIELD, WEEKLY_SCHEDULE};
use cms_core::{Content, SectionKey};
use std::collections::HashMap;
use std::sync::Arc;

/// A purpose-built editor for one field.
pub trait CustomEditor: Send + Sync {
    /// Stable identifier the host uses to pick a component.
    fn id(&self) -> &'static str;

    /// Canonical form of a stored value, as the editor presents it.
    /// Must produce the same persisted shape the generic store writes.
    fn normalize(&self, value: &Content) -> Content;
}

#[derive(Clone, Default)]
pub struct EditorRegistry {
    /// `(section, schema path)` to editor.
    editors: HashMap<(SectionKey, String), Arc<dyn CustomEditor>>,
}

impl EditorRegistry {
    /// An empty registry: every field renders generically.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the studio's built-in editors.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            SectionKey::intern(WEEKLY_SCHEDULE),
            SCHEDULE_FIELD,
            Arc::new(crate::schedule::ScheduleEditor),
        );
        registry
    }

    /// Replace any editor already registered at `field_path`.
    pub fn register(
        &mut self,
        section: SectionKey,
        field_path: &str,
        editor: Arc<dyn CustomEditor>,
    ) {
        log::debug!("custom editor `{}` for {section}.{field_path}", editor.id());
        self.editors.insert((section, field_path.to_string()), editor);
    }

    /// Editor for the field at `field_path`; a top-level field's path is
    /// its key.
    pub fn lookup(&self, section: SectionKey, field_path: &str) -> Option<&dyn CustomEditor> {
        self.editors
            .get(&(section, field_path.to_string()))
            .map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}

impl std::fmt::Debug for EditorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.editors
                    .iter()
                    .map(|((section, field), e)| format!("{section}.{field} → {}", e.id())),
            )
            .finish()
    }
}
