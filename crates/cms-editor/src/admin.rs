//! Admin screen controller.
//!
//! Orchestrates what the CMS screen does: pick a page, list stored
//! instances of its sections, open one create/edit session at a time, and
//! push saves, deletes and toggles to the backend.
//!
//! The controller does not own a gateway. Synchronous hosts pass one to
//! [`AdminScreen::refresh`], [`AdminScreen::save`] and friends; async
//! hosts use the ticket API ([`AdminScreen::begin_load`] /
//! [`AdminScreen::accept_listing`], [`AdminScreen::prepare_save`] /
//! [`AdminScreen::finish_save`]) and perform the calls themselves.

use crate::gateway::{
    GatewayError, InstituteGateway, InstituteInfo, ListFilter, PersistedSection, SectionDraft,
    SectionGateway, SectionId, SectionListing, SectionPatch,
};
use crate::registry::EditorRegistry;
use crate::schedule::ScheduleError;
use crate::session::{EditError, EditSession, SessionMode, join_paths};
use cms_core::schema::{PageSchema, SectionSchema};
use cms_core::{Catalog, Path, SectionKey, catalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Config ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// `order` given to newly created instances. Default: **0**.
    pub default_order: i32,
    /// List inactive instances alongside active ones. Default: **true**.
    pub include_inactive: bool,
    /// Edit `weekly_schedule.schedule` with the day-grouped editor instead
    /// of the generic array form. Default: **true**.
    pub schedule_editor: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            default_order: 0,
            include_inactive: true,
            schedule_editor: true,
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("no edit session is open")]
    NoSession,
    #[error("unknown page `{0}`")]
    UnknownPage(String),
    #[error("unknown section `{0}`")]
    UnknownSection(String),
    #[error("section {0} is not in the current listing")]
    UnknownRecord(SectionId),
    #[error("required fields are empty: {}", join_paths(.0))]
    MissingRequired(Vec<Path>),
    #[error(transparent)]
    Edit(EditError),
    #[error(transparent)]
    Schedule(ScheduleError),
}

impl From<EditError> for AdminError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::MissingRequired(paths) => AdminError::MissingRequired(paths),
            other => AdminError::Edit(other),
        }
    }
}

impl From<ScheduleError> for AdminError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Edit(edit) => edit.into(),
            other => AdminError::Schedule(other),
        }
    }
}

// ─── Tickets ─────────────────────────────────────────────────────────────

/// Handle for an in-flight listing fetch. A result is applied only while
/// its ticket is current. A later `begin_load` invalidates it, and so does
/// any local listing change (save, patch, delete) made after it was taken.
/// Opening or closing a form leaves it current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTicket {
    generation: u64,
}

/// The gateway call a save needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SaveRequest {
    Create { draft: SectionDraft },
    Update { id: SectionId, patch: SectionPatch },
}

// ─── Controller ──────────────────────────────────────────────────────────

pub struct AdminScreen {
    catalog: &'static Catalog,
    registry: EditorRegistry,
    config: AdminConfig,
    page: Option<&'static PageSchema>,
    listing: BTreeMap<String, Vec<PersistedSection>>,
    session: Option<EditSession<'static>>,
    listing_generation: u64,
}

impl AdminScreen {
    pub fn new(registry: EditorRegistry, config: AdminConfig) -> Self {
        Self {
            catalog: catalog(),
            registry,
            config,
            page: None,
            listing: BTreeMap::new(),
            session: None,
            listing_generation: 0,
        }
    }

    /// Controller with the registry `config` asks for.
    pub fn from_config(config: AdminConfig) -> Self {
        let registry = if config.schedule_editor {
            EditorRegistry::with_builtin()
        } else {
            EditorRegistry::new()
        };
        Self::new(registry, config)
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn registry(&self) -> &EditorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn list_filter(&self) -> ListFilter {
        ListFilter {
            include_inactive: self.config.include_inactive,
            grouped: true,
        }
    }

    // ─── Pages & listing ─────────────────────────────────────────────────

    /// Make `page_id` current and return its section schemas.
    pub fn select_page(&mut self, page_id: &str) -> Result<&'static [SectionSchema], AdminError> {
        let catalog = self.catalog;
        let page = catalog
            .page(page_id)
            .ok_or_else(|| AdminError::UnknownPage(page_id.to_string()))?;
        log::debug!("select page {}", page.id);
        self.page = Some(page);
        Ok(&page.sections)
    }

    pub fn page(&self) -> Option<&'static PageSchema> {
        self.page
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.listing_generation += 1;
        LoadTicket {
            generation: self.listing_generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.listing_generation
    }

    /// Apply a listing fetched under `ticket`. Returns `false` for a stale
    /// ticket, leaving the listing untouched. A failed fetch leaves an
    /// empty listing.
    pub fn accept_listing(
        &mut self,
        ticket: LoadTicket,
        result: Result<SectionListing, GatewayError>,
    ) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "dropping stale listing (ticket {}, current {})",
                ticket.generation,
                self.listing_generation
            );
            return false;
        }
        self.listing = match result {
            Ok(listing) => listing.into_grouped(),
            Err(err) => {
                log::warn!("failed to load sections: {err}");
                BTreeMap::new()
            }
        };
        true
    }

    pub fn refresh(&mut self, gateway: &dyn SectionGateway) {
        let ticket = self.begin_load();
        let result = gateway.list_sections(&self.list_filter());
        self.accept_listing(ticket, result);
    }

    pub fn listing(&self) -> &BTreeMap<String, Vec<PersistedSection>> {
        &self.listing
    }

    /// Stored instances of `key`, in `(order, id)` order.
    pub fn instances(&self, key: SectionKey) -> &[PersistedSection] {
        self.listing.get(key.as_str()).map_or(&[], Vec::as_slice)
    }

    fn record(&self, id: SectionId) -> Result<&PersistedSection, AdminError> {
        self.listing
            .values()
            .flatten()
            .find(|r| r.id == id)
            .ok_or(AdminError::UnknownRecord(id))
    }

    fn section_schema(&self, key: SectionKey) -> Result<&'static SectionSchema, AdminError> {
        let catalog = self.catalog;
        catalog
            .section(key)
            .ok_or_else(|| AdminError::UnknownSection(key.to_string()))
    }

    /// Insert or replace `record`, keeping its group sorted.
    fn upsert(&mut self, record: PersistedSection) {
        self.listing_generation += 1;
        for group in self.listing.values_mut() {
            group.retain(|r| r.id != record.id);
        }
        self.listing.retain(|_, group| !group.is_empty());
        if !record.is_active && !self.config.include_inactive {
            return;
        }
        let group = self
            .listing
            .entry(record.section_key.to_string())
            .or_default();
        group.push(record);
        group.sort_by_key(|r| (r.order, r.id));
    }

    fn forget(&mut self, id: SectionId) {
        self.listing_generation += 1;
        for group in self.listing.values_mut() {
            group.retain(|r| r.id != id);
        }
        self.listing.retain(|_, group| !group.is_empty());
    }

    // ─── Sessions ────────────────────────────────────────────────────────

    pub fn open_create(
        &mut self,
        key: SectionKey,
    ) -> Result<&mut EditSession<'static>, AdminError> {
        let section = self.section_schema(key)?;
        let session = EditSession::create(section, self.config.default_order);
        Ok(self.session.insert(session))
    }

    pub fn open_edit(&mut self, id: SectionId) -> Result<&mut EditSession<'static>, AdminError> {
        let record = self.record(id)?;
        let section = self.section_schema(record.section_key)?;
        let session = EditSession::edit(section, record);
        Ok(self.session.insert(session))
    }

    pub fn session(&self) -> Option<&EditSession<'static>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Result<&mut EditSession<'static>, AdminError> {
        self.session.as_mut().ok_or(AdminError::NoSession)
    }

    /// Discard the open session, unsaved.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("discard session for {}", session.section().key);
        }
    }

    /// Validate the open session and build the gateway call that saves it.
    pub fn prepare_save(&self) -> Result<SaveRequest, AdminError> {
        let session = self.session.as_ref().ok_or(AdminError::NoSession)?;
        let content = session.submit()?;
        Ok(match session.mode() {
            SessionMode::Create => SaveRequest::Create {
                draft: SectionDraft {
                    section_key: session.section().key,
                    content,
                    order: session.order(),
                    is_active: session.is_active(),
                },
            },
            SessionMode::Edit(id) => SaveRequest::Update {
                id,
                patch: SectionPatch {
                    section_key: None,
                    content: Some(content),
                    order: Some(session.order()),
                    is_active: Some(session.is_active()),
                },
            },
        })
    }

    /// Apply the result of a save. On success the session closes and the
    /// listing picks up the stored record; on failure the session stays
    /// open with its edits.
    pub fn finish_save(
        &mut self,
        result: Result<PersistedSection, GatewayError>,
    ) -> Result<PersistedSection, AdminError> {
        let record = result?;
        log::debug!("saved {} #{}", record.section_key, record.id);
        self.session = None;
        self.upsert(record.clone());
        Ok(record)
    }

    pub fn save(
        &mut self,
        gateway: &mut dyn SectionGateway,
    ) -> Result<PersistedSection, AdminError> {
        let result = match self.prepare_save()? {
            SaveRequest::Create { draft } => gateway.create_section(draft),
            SaveRequest::Update { id, patch } => gateway.update_section(id, patch),
        };
        self.finish_save(result)
    }

    // ─── Record operations ───────────────────────────────────────────────

    pub fn delete(
        &mut self,
        gateway: &mut dyn SectionGateway,
        id: SectionId,
    ) -> Result<(), AdminError> {
        gateway.delete_section(id)?;
        self.forget(id);
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.mode() == SessionMode::Edit(id))
        {
            self.cancel();
        }
        Ok(())
    }

    pub fn toggle_active(
        &mut self,
        gateway: &mut dyn SectionGateway,
        id: SectionId,
    ) -> Result<PersistedSection, AdminError> {
        let is_active = !self.record(id)?.is_active;
        self.patch(
            gateway,
            id,
            SectionPatch {
                is_active: Some(is_active),
                ..SectionPatch::default()
            },
        )
    }

    pub fn set_order(
        &mut self,
        gateway: &mut dyn SectionGateway,
        id: SectionId,
        order: i32,
    ) -> Result<PersistedSection, AdminError> {
        self.patch(
            gateway,
            id,
            SectionPatch {
                order: Some(order),
                ..SectionPatch::default()
            },
        )
    }

    fn patch(
        &mut self,
        gateway: &mut dyn SectionGateway,
        id: SectionId,
        patch: SectionPatch,
    ) -> Result<PersistedSection, AdminError> {
        let record = gateway.update_section(id, patch)?;
        self.upsert(record.clone());
        Ok(record)
    }

    // ─── Institute info ──────────────────────────────────────────────────

    /// Stored institute info, or the blank fallback when there is none or
    /// the backend fails.
    pub fn load_institute_info(&self, gateway: &dyn InstituteGateway) -> InstituteInfo {
        let mut info = match gateway.get_institute_info() {
            Ok(Some(info)) => info,
            Ok(None) => InstituteInfo::fallback(),
            Err(err) => {
                log::warn!("failed to load institute info: {err}");
                InstituteInfo::fallback()
            }
        };
        if info.phone_numbers.is_empty() {
            info.phone_numbers.push(String::new());
        }
        info
    }

    /// Drop blank phone entries, validate, then store.
    pub fn save_institute_info(
        &self,
        gateway: &mut dyn InstituteGateway,
        mut info: InstituteInfo,
    ) -> Result<InstituteInfo, AdminError> {
        info.phone_numbers.retain(|p| !p.trim().is_empty());
        info.validate()?;
        Ok(gateway.update_institute_info(info)?)
    }
}

impl Default for AdminScreen {
    fn default() -> Self {
        Self::from_config(AdminConfig::default())
    }
}
