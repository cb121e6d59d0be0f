//! Persistence gateway: the backend the CMS reads from and saves to.
//!
//! The editor does not talk HTTP. Hosts implement these traits over their
//! transport of choice; [`MemoryGateway`] is an in-process implementation
//! used by tests and offline tooling.

use chrono::{DateTime, Utc};
use cms_core::{Content, SectionKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─── Records ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub i64);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stored instance of a section. Several may share a `section_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSection {
    pub id: SectionId,
    pub section_key: SectionKey,
    pub content: Content,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of `create_section`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDraft {
    pub section_key: SectionKey,
    pub content: Content,
    pub order: i32,
    pub is_active: bool,
}

/// Payload of `update_section`; absent fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_key: Option<SectionKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    pub include_inactive: bool,
    pub grouped: bool,
}

/// Result of `list_sections`: keyed groups, or one flat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionListing {
    Grouped(BTreeMap<String, Vec<PersistedSection>>),
    Flat(Vec<PersistedSection>),
}

impl Default for SectionListing {
    fn default() -> Self {
        SectionListing::Grouped(BTreeMap::new())
    }
}

impl SectionListing {
    /// Regroup by section key, keeping each group's order.
    pub fn into_grouped(self) -> BTreeMap<String, Vec<PersistedSection>> {
        match self {
            SectionListing::Grouped(groups) => groups,
            SectionListing::Flat(records) => {
                let mut groups: BTreeMap<String, Vec<PersistedSection>> = BTreeMap::new();
                for record in records {
                    groups
                        .entry(record.section_key.to_string())
                        .or_default()
                        .push(record);
                }
                groups
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMedia {
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub youtube: String,
    #[serde(default)]
    pub whatsapp: String,
}

/// Studio contact details shown site-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstituteInfo {
    pub location: String,
    pub phone_numbers: Vec<String>,
    pub email: String,
    #[serde(default)]
    pub social_media: SocialMedia,
}

impl InstituteInfo {
    /// Used whenever the backend has no record or cannot be reached.
    pub fn fallback() -> Self {
        Self {
            location: String::new(),
            phone_numbers: vec![String::new()],
            email: String::new(),
            social_media: SocialMedia::default(),
        }
    }

    /// At least one non-blank phone number.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.phone_numbers.iter().all(|p| p.trim().is_empty()) {
            return Err(GatewayError::Invalid(
                "at least one phone number is required".into(),
            ));
        }
        Ok(())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("section {0} not found")]
    NotFound(SectionId),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("invalid request: {0}")]
    Invalid(String),
}

// ─── Traits ──────────────────────────────────────────────────────────────

/// Storage of section instances.
pub trait SectionGateway {
    fn list_sections(&self, filter: &ListFilter) -> Result<SectionListing, GatewayError>;

    fn list_sections_by_key(&self, key: SectionKey) -> Result<Vec<PersistedSection>, GatewayError>;

    fn create_section(&mut self, draft: SectionDraft) -> Result<PersistedSection, GatewayError>;

    fn update_section(
        &mut self,
        id: SectionId,
        patch: SectionPatch,
    ) -> Result<PersistedSection, GatewayError>;

    fn delete_section(&mut self, id: SectionId) -> Result<(), GatewayError>;
}

/// Storage of the single institute-info record.
pub trait InstituteGateway {
    /// `Ok(None)` when no record exists yet.
    fn get_institute_info(&self) -> Result<Option<InstituteInfo>, GatewayError>;

    fn update_institute_info(&mut self, info: InstituteInfo) -> Result<InstituteInfo, GatewayError>;
}

// ─── In-memory gateway ───────────────────────────────────────────────────

/// Gateway backed by a `Vec`. Ids are assigned sequentially; listings are
/// sorted by `(order, id)`.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    records: Vec<PersistedSection>,
    institute: Option<InstituteInfo>,
    next_id: i64,
    offline: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`GatewayError::Network`].
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn records(&self) -> &[PersistedSection] {
        &self.records
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.offline {
            return Err(GatewayError::Network("gateway offline".into()));
        }
        Ok(())
    }

    fn sorted(&self, filter: impl Fn(&PersistedSection) -> bool) -> Vec<PersistedSection> {
        let mut out: Vec<PersistedSection> =
            self.records.iter().filter(|r| filter(r)).cloned().collect();
        out.sort_by_key(|r| (r.order, r.id));
        out
    }
}

impl SectionGateway for MemoryGateway {
    fn list_sections(&self, filter: &ListFilter) -> Result<SectionListing, GatewayError> {
        self.check_online()?;
        let records = self.sorted(|r| filter.include_inactive || r.is_active);
        let listing = SectionListing::Flat(records);
        Ok(if filter.grouped {
            SectionListing::Grouped(listing.into_grouped())
        } else {
            listing
        })
    }

    fn list_sections_by_key(&self, key: SectionKey) -> Result<Vec<PersistedSection>, GatewayError> {
        self.check_online()?;
        Ok(self.sorted(|r| r.section_key == key))
    }

    fn create_section(&mut self, draft: SectionDraft) -> Result<PersistedSection, GatewayError> {
        self.check_online()?;
        self.next_id += 1;
        let now = Utc::now();
        let record = PersistedSection {
            id: SectionId(self.next_id),
            section_key: draft.section_key,
            content: draft.content,
            order: draft.order,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    fn update_section(
        &mut self,
        id: SectionId,
        patch: SectionPatch,
    ) -> Result<PersistedSection, GatewayError> {
        self.check_online()?;
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(GatewayError::NotFound(id))?;
        if let Some(key) = patch.section_key {
            record.section_key = key;
        }
        if let Some(content) = patch.content {
            record.content = content;
        }
        if let Some(order) = patch.order {
            record.order = order;
        }
        if let Some(is_active) = patch.is_active {
            record.is_active = is_active;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn delete_section(&mut self, id: SectionId) -> Result<(), GatewayError> {
        self.check_online()?;
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(GatewayError::NotFound(id));
        }
        Ok(())
    }
}

impl InstituteGateway for MemoryGateway {
    fn get_institute_info(&self) -> Result<Option<InstituteInfo>, GatewayError> {
        self.check_online()?;
        Ok(self.institute.clone())
    }

    fn update_institute_info(
        &mut self,
        info: InstituteInfo,
    ) -> Result<InstituteInfo, GatewayError> {
        self.check_online()?;
        info.validate()?;
        self.institute = Some(info.clone());
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(key: &str, order: i32, is_active: bool) -> SectionDraft {
        SectionDraft {
            section_key: SectionKey::intern(key),
            content: Content::from(json!({ "message": key })),
            order,
            is_active,
        }
    }

    #[test]
    fn create_assigns_ids_and_lists_by_order() {
        let mut gw = MemoryGateway::new();
        let a = gw.create_section(draft("announcement", 2, true)).unwrap();
        let b = gw.create_section(draft("announcement", 1, true)).unwrap();
        assert_eq!(a.id, SectionId(1));
        assert_eq!(b.id, SectionId(2));
        let listed = gw
            .list_sections_by_key(SectionKey::intern("announcement"))
            .unwrap();
        let ids: Vec<SectionId> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, [b.id, a.id]);
    }

    #[test]
    fn inactive_hidden_unless_requested() {
        let mut gw = MemoryGateway::new();
        gw.create_section(draft("hero", 0, false)).unwrap();
        let visible = gw
            .list_sections(&ListFilter {
                include_inactive: false,
                grouped: true,
            })
            .unwrap()
            .into_grouped();
        assert!(visible.is_empty());
        let all = gw
            .list_sections(&ListFilter {
                include_inactive: true,
                grouped: true,
            })
            .unwrap()
            .into_grouped();
        assert_eq!(all["hero"].len(), 1);
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut gw = MemoryGateway::new();
        let rec = gw.create_section(draft("hero", 0, true)).unwrap();
        let updated = gw
            .update_section(
                rec.id,
                SectionPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.content, rec.content);
        assert_eq!(
            gw.update_section(SectionId(99), SectionPatch::default()),
            Err(GatewayError::NotFound(SectionId(99)))
        );
    }

    #[test]
    fn offline_fails_every_call() {
        let mut gw = MemoryGateway::new();
        gw.set_offline(true);
        assert!(matches!(
            gw.list_sections(&ListFilter::default()),
            Err(GatewayError::Network(_))
        ));
        assert!(matches!(gw.get_institute_info(), Err(GatewayError::Network(_))));
    }

    #[test]
    fn institute_info_requires_phone_number() {
        let mut gw = MemoryGateway::new();
        assert_eq!(gw.get_institute_info(), Ok(None));
        let mut info = InstituteInfo::fallback();
        assert!(gw.update_institute_info(info.clone()).is_err());
        info.phone_numbers = vec!["+91 98765 43210".into()];
        assert_eq!(gw.update_institute_info(info.clone()), Ok(info));
    }

    #[test]
    fn persisted_record_json_shape() {
        let raw = json!({
            "id": 7,
            "section_key": "hero",
            "content": { "title": "Hi" },
            "order": 0,
            "is_active": true,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-02T10:00:00Z"
        });
        let rec: PersistedSection = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(rec.id, SectionId(7));
        assert_eq!(rec.section_key.as_str(), "hero");
        assert_eq!(serde_json::to_value(&rec).unwrap(), raw);
    }
}
