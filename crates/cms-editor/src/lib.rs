pub mod admin;
pub mod gateway;
pub mod registry;
pub mod render;
pub mod schedule;
pub mod session;

pub use admin::{AdminConfig, AdminError, AdminScreen, LoadTicket, SaveRequest};
pub use gateway::{
    GatewayError, InstituteGateway, InstituteInfo, ListFilter, MemoryGateway, PersistedSection,
    SectionDraft, SectionGateway, SectionId, SectionListing, SectionPatch, SocialMedia,
};
pub use registry::{CustomEditor, EditorRegistry};
pub use render::{EditorNode, ListItem, Widget, render_field, render_section};
pub use schedule::{
    ClassEntry, ClassField, ClassLevel, ClassType, Day, DayBucket, ScheduleEdit, ScheduleEditor,
    ScheduleError, WeeklySchedule,
};
pub use session::{EditError, EditEvent, EditSession, SessionMode};
