//! The fixed catalog of editable pages and sections.
//!
//! Built once on first use and immutable afterwards. Every section key in
//! here is also a `section_key` on the persistence side.

use crate::id::SectionKey;
use crate::schema::{FieldSchema, PageSchema, SchemaError, SectionSchema};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Section key of the weekly class timetable.
pub const WEEKLY_SCHEDULE: &str = "weekly_schedule";
/// Field inside [`WEEKLY_SCHEDULE`] that holds the seven day buckets.
pub const SCHEDULE_FIELD: &str = "schedule";

pub const CLASS_LEVELS: [&str; 4] = ["Beginner", "Intermediate", "Advanced", "All Levels"];
pub const CLASS_TYPES: [&str; 4] = ["Yoga", "Dance", "Fitness", "Meditation"];

static CATALOG: LazyLock<Catalog> = LazyLock::new(Catalog::studio);

/// The process-wide catalog.
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

/// Ordered set of pages making up the whole editable surface.
#[derive(Debug, Clone)]
pub struct Catalog {
    pages: Vec<PageSchema>,
}

impl Catalog {
    pub fn new(pages: Vec<PageSchema>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[PageSchema] {
        &self.pages
    }

    pub fn page(&self, id: &str) -> Option<&PageSchema> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn section(&self, key: SectionKey) -> Option<&SectionSchema> {
        self.sections().find(|s| s.key == key)
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionSchema> {
        self.pages.iter().flat_map(|p| p.sections.iter())
    }

    /// Page ids and section keys are unique; every field tree is valid.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut page_ids = HashSet::new();
        let mut section_keys = HashSet::new();
        for page in &self.pages {
            if !page_ids.insert(page.id.as_str()) {
                return Err(SchemaError::DuplicatePage(page.id.clone()));
            }
            for section in &page.sections {
                if !section_keys.insert(section.key) {
                    return Err(SchemaError::DuplicateSection(section.key.to_string()));
                }
                section.validate()?;
            }
        }
        Ok(())
    }

    /// The studio website's pages.
    pub fn studio() -> Self {
        Self::new(vec![
            PageSchema::new(
                "home",
                "Home",
                "/",
                vec![hero(), announcement(), testimonials(), stats()],
            ),
            PageSchema::new(
                "classes",
                "Classes",
                "/classes",
                vec![weekly_schedule(), class_types()],
            ),
            PageSchema::new(
                "about",
                "About",
                "/about",
                vec![about_intro(), trainers()],
            ),
            PageSchema::new("contact", "Contact", "/contact", vec![contact_cta()]),
        ])
    }
}

// ─── Sections ────────────────────────────────────────────────────────────

const CTA_ACTIONS: &[(&str, &str)] = &[
    ("link", "Open link"),
    ("booking", "Open booking"),
    ("scroll", "Scroll to section"),
    ("whatsapp", "Message on WhatsApp"),
];

fn cta(key: &str, label: &str) -> FieldSchema {
    FieldSchema::object(
        key,
        label,
        vec![
            FieldSchema::text("text", "Button text").placeholder("Book a class"),
            FieldSchema::url("link", "Link"),
            FieldSchema::select("action", "Action", CTA_ACTIONS),
        ],
    )
}

fn hero() -> SectionSchema {
    SectionSchema::new(
        "hero",
        "Hero",
        "Headline banner at the top of the home page",
        vec![
            FieldSchema::text("title", "Title").required(),
            FieldSchema::textarea("subtitle", "Subtitle"),
            FieldSchema::url("background_image", "Background image"),
            cta("cta_primary", "Primary button"),
            cta("cta_secondary", "Secondary button"),
        ],
    )
}

fn announcement() -> SectionSchema {
    SectionSchema::new(
        "announcement",
        "Announcement",
        "Dismissible banner; several may be active at once",
        vec![
            FieldSchema::textarea("message", "Message").required(),
            FieldSchema::color("bg_color", "Background color").placeholder("#F59E0B"),
            FieldSchema::date("expires_on", "Expires on"),
            FieldSchema::url("link", "Link"),
        ],
    )
}

fn testimonials() -> SectionSchema {
    SectionSchema::new(
        "testimonials",
        "Testimonials",
        "Quotes from members",
        vec![
            FieldSchema::text("heading", "Heading"),
            FieldSchema::array(
                "items",
                "Testimonials",
                vec![
                    FieldSchema::text("name", "Name").required(),
                    FieldSchema::textarea("quote", "Quote").required(),
                    FieldSchema::select(
                        "rating",
                        "Rating",
                        &[("5", "5"), ("4", "4"), ("3", "3"), ("2", "2"), ("1", "1")],
                    ),
                    FieldSchema::url("photo", "Photo"),
                ],
            ),
        ],
    )
}

fn stats() -> SectionSchema {
    SectionSchema::new(
        "stats",
        "Stats",
        "Headline numbers",
        vec![FieldSchema::array(
            "items",
            "Stats",
            vec![
                FieldSchema::number("value", "Value").required(),
                FieldSchema::text("suffix", "Suffix").placeholder("+"),
                FieldSchema::text("label", "Label").required(),
            ],
        )],
    )
}

fn weekly_schedule() -> SectionSchema {
    let levels: Vec<(&str, &str)> = CLASS_LEVELS.iter().map(|l| (*l, *l)).collect();
    let types: Vec<(&str, &str)> = CLASS_TYPES.iter().map(|t| (*t, *t)).collect();
    let days: Vec<(&str, &str)> = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .map(|d| (*d, *d))
        .collect();
    SectionSchema::new(
        WEEKLY_SCHEDULE,
        "Weekly schedule",
        "Class timetable, Monday to Sunday",
        vec![
            FieldSchema::text("title", "Title"),
            FieldSchema::array(
                SCHEDULE_FIELD,
                "Schedule",
                vec![
                    FieldSchema::select("day", "Day", &days),
                    FieldSchema::array(
                        "classes",
                        "Classes",
                        vec![
                            FieldSchema::text("time", "Time").placeholder("7:00 PM - 8:00 PM"),
                            FieldSchema::text("name", "Class"),
                            FieldSchema::text("instructor", "Instructor"),
                            FieldSchema::select("level", "Level", &levels),
                            FieldSchema::select("type", "Type", &types),
                        ],
                    ),
                ],
            ),
        ],
    )
}

fn class_types() -> SectionSchema {
    SectionSchema::new(
        "class_types",
        "Class types",
        "Cards describing each discipline",
        vec![FieldSchema::array(
            "items",
            "Class types",
            vec![
                FieldSchema::text("title", "Title").required(),
                FieldSchema::textarea("description", "Description"),
                FieldSchema::url("image", "Image"),
                FieldSchema::color("accent", "Accent color"),
            ],
        )],
    )
}

fn about_intro() -> SectionSchema {
    SectionSchema::new(
        "about_intro",
        "About intro",
        "Studio story",
        vec![
            FieldSchema::text("heading", "Heading").required(),
            FieldSchema::textarea("body", "Body"),
            FieldSchema::url("image", "Image"),
            FieldSchema::date("founded_on", "Founded on"),
        ],
    )
}

fn trainers() -> SectionSchema {
    SectionSchema::new(
        "trainers",
        "Trainers",
        "Instructor profiles",
        vec![FieldSchema::array(
            "items",
            "Trainers",
            vec![
                FieldSchema::text("name", "Name").required(),
                FieldSchema::text("role", "Role"),
                FieldSchema::textarea("bio", "Bio"),
                FieldSchema::url("photo", "Photo"),
                FieldSchema::object(
                    "socials",
                    "Social links",
                    vec![
                        FieldSchema::url("instagram", "Instagram"),
                        FieldSchema::url("youtube", "YouTube"),
                    ],
                ),
            ],
        )],
    )
}

fn contact_cta() -> SectionSchema {
    SectionSchema::new(
        "contact_cta",
        "Contact call-to-action",
        "Closing banner on the contact page",
        vec![
            FieldSchema::text("heading", "Heading").required(),
            FieldSchema::textarea("body", "Body"),
            cta("cta", "Button"),
            FieldSchema::color("bg_color", "Background color"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    #[test]
    fn studio_catalog_is_valid() {
        assert_eq!(catalog().validate(), Ok(()));
    }

    #[test]
    fn lookup_by_page_and_section() {
        let page = catalog().page("classes").unwrap();
        assert_eq!(page.route, "/classes");
        let section = catalog().section(SectionKey::intern(WEEKLY_SCHEDULE)).unwrap();
        assert!(matches!(
            section.field(SCHEDULE_FIELD).unwrap().kind,
            FieldKind::Array(_)
        ));
        assert!(catalog().section(SectionKey::intern("nope")).is_none());
    }

    #[test]
    fn catalog_never_nests_past_two_levels() {
        fn depth(fields: &[FieldSchema]) -> usize {
            fields
                .iter()
                .map(|f| f.kind.children().map_or(0, |c| 1 + depth(c)))
                .max()
                .unwrap_or(0)
        }
        for section in catalog().sections() {
            assert!(depth(&section.fields) <= 2, "{} too deep", section.key);
        }
    }

    #[test]
    fn duplicate_section_keys_are_rejected() {
        let twice = Catalog::new(vec![
            PageSchema::new("a", "A", "/a", vec![hero()]),
            PageSchema::new("b", "B", "/b", vec![hero()]),
        ]);
        assert_eq!(
            twice.validate(),
            Err(SchemaError::DuplicateSection("hero".into()))
        );
    }
}
