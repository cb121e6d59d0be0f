//! Weekly schedule editor.
//!
//! The `weekly_schedule.schedule` field is a list of day buckets, each
//! holding class entries whose `time` is a compound range string. Editing
//! it through generic nested lists is awkward, so this editor works on a
//! typed [`WeeklySchedule`] instead and writes the same JSON shape back
//! through the session store.
//!
//! Invariant: a `WeeklySchedule` always holds exactly seven buckets in
//! Mon→Sun order, whatever the stored document contained.

use crate::registry::CustomEditor;
use crate::session::{EditError, EditEvent, EditSession};
use cms_core::catalog::SCHEDULE_FIELD;
use cms_core::store::read;
use cms_core::{Content, ContentMap, Path, TimePart, TimeRange, TimeRangeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Vocabulary ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl FromStr for Day {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ScheduleError::UnknownDay(s.to_string()))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLevel {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    #[serde(rename = "All Levels")]
    AllLevels,
}

impl ClassLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassLevel::Beginner => "Beginner",
            ClassLevel::Intermediate => "Intermediate",
            ClassLevel::Advanced => "Advanced",
            ClassLevel::AllLevels => "All Levels",
        }
    }
}

impl FromStr for ClassLevel {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(ClassLevel::Beginner),
            "Intermediate" => Ok(ClassLevel::Intermediate),
            "Advanced" => Ok(ClassLevel::Advanced),
            "All Levels" => Ok(ClassLevel::AllLevels),
            _ => Err(ScheduleError::UnknownLevel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassType {
    #[default]
    Yoga,
    Dance,
    Fitness,
    Meditation,
}

impl ClassType {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassType::Yoga => "Yoga",
            ClassType::Dance => "Dance",
            ClassType::Fitness => "Fitness",
            ClassType::Meditation => "Meditation",
        }
    }
}

impl FromStr for ClassType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yoga" => Ok(ClassType::Yoga),
            "Dance" => Ok(ClassType::Dance),
            "Fitness" => Ok(ClassType::Fitness),
            "Meditation" => Ok(ClassType::Meditation),
            _ => Err(ScheduleError::UnknownType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("unknown day `{0}`")]
    UnknownDay(String),
    #[error("unknown level `{0}`")]
    UnknownLevel(String),
    #[error("unknown class type `{0}`")]
    UnknownType(String),
    #[error("{day} has no class at index {index}")]
    NoSuchClass { day: Day, index: usize },
    #[error(transparent)]
    Time(#[from] TimeRangeError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

// ─── Document ────────────────────────────────────────────────────────────

/// Editable field of a [`ClassEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassField {
    Time,
    Name,
    Instructor,
    Level,
    Type,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassEntry {
    /// Canonical range string, or whatever was stored if never edited.
    pub time: String,
    pub name: String,
    pub instructor: String,
    pub level: ClassLevel,
    pub class_type: ClassType,
}

impl ClassEntry {
    /// Lenient read: missing or unknown values take their defaults.
    fn from_content(value: &Content) -> Self {
        let text = |key: &str| value.get(key).map(Content::to_display_string).unwrap_or_default();
        Self {
            time: text("time"),
            name: text("name"),
            instructor: text("instructor"),
            level: text("level").parse().unwrap_or_default(),
            class_type: text("type").parse().unwrap_or_default(),
        }
    }

    fn to_content(&self) -> Content {
        let mut map = ContentMap::new();
        map.insert("time".into(), self.time.as_str().into());
        map.insert("name".into(), self.name.as_str().into());
        map.insert("instructor".into(), self.instructor.as_str().into());
        map.insert("level".into(), self.level.as_str().into());
        map.insert("type".into(), self.class_type.as_str().into());
        Content::from_map(map)
    }

    /// The six-component view of `time`; malformed text yields the default.
    pub fn time_range(&self) -> TimeRange {
        TimeRange::parse_or_default(&self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub day: Day,
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [DayBucket; 7],
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            days: Day::ALL.map(|day| DayBucket {
                day,
                classes: Vec::new(),
            }),
        }
    }
}

impl WeeklySchedule {
    /// Load from the stored `schedule` array. Missing days are synthesized
    /// empty; unknown days are dropped; a repeated day's classes are
    /// appended to the first occurrence.
    pub fn from_content(value: &Content) -> Self {
        let mut schedule = Self::default();
        for bucket in value.as_array().unwrap_or(&[]) {
            let Some(day_name) = bucket.get("day").and_then(Content::as_str) else {
                log::debug!("schedule bucket without a day: {bucket}");
                continue;
            };
            let Ok(day) = day_name.parse::<Day>() else {
                log::debug!("schedule bucket for unknown day `{day_name}`");
                continue;
            };
            let classes = bucket
                .get("classes")
                .and_then(Content::as_array)
                .unwrap_or(&[]);
            schedule.days[day.position()]
                .classes
                .extend(classes.iter().map(ClassEntry::from_content));
        }
        schedule
    }

    /// Seven `{ day, classes }` objects in Mon→Sun order.
    pub fn to_content(&self) -> Content {
        let buckets = self
            .days
            .iter()
            .map(|bucket| {
                let mut map = ContentMap::new();
                map.insert("day".into(), bucket.day.as_str().into());
                let classes = bucket.classes.iter().map(ClassEntry::to_content).collect();
                map.insert("classes".into(), Content::from_items(classes));
                Content::from_map(map)
            })
            .collect();
        Content::from_items(buckets)
    }

    pub fn days(&self) -> &[DayBucket; 7] {
        &self.days
    }

    pub fn classes(&self, day: Day) -> &[ClassEntry] {
        &self.days[day.position()].classes
    }

    /// Append an empty class to `day`.
    pub fn add_class(&mut self, day: Day) {
        self.days[day.position()].classes.push(ClassEntry::default());
    }

    /// Remove class `index` of `day`; out-of-range indices are ignored.
    pub fn remove_class(&mut self, day: Day, index: usize) {
        let classes = &mut self.days[day.position()].classes;
        if index < classes.len() {
            classes.remove(index);
        }
    }

    pub fn update_class(
        &mut self,
        day: Day,
        index: usize,
        field: ClassField,
        value: &str,
    ) -> Result<(), ScheduleError> {
        let entry = self.entry_mut(day, index)?;
        match field {
            ClassField::Time => entry.time = value.to_string(),
            ClassField::Name => entry.name = value.to_string(),
            ClassField::Instructor => entry.instructor = value.to_string(),
            ClassField::Level => entry.level = value.parse()?,
            ClassField::Type => entry.class_type = value.parse()?,
        }
        Ok(())
    }

    /// Change one of the six time components and re-serialize the range.
    /// A malformed stored time is replaced by the default range first.
    pub fn set_time_part(
        &mut self,
        day: Day,
        index: usize,
        part: TimePart,
        value: &str,
    ) -> Result<(), ScheduleError> {
        let entry = self.entry_mut(day, index)?;
        let mut range = entry.time_range();
        range.set_part(part, value)?;
        entry.time = range.to_canonical();
        Ok(())
    }

    pub fn time_range(&self, day: Day, index: usize) -> Option<TimeRange> {
        self.classes(day).get(index).map(ClassEntry::time_range)
    }

    fn entry_mut(&mut self, day: Day, index: usize) -> Result<&mut ClassEntry, ScheduleError> {
        self.days[day.position()]
            .classes
            .get_mut(index)
            .ok_or(ScheduleError::NoSuchClass { day, index })
    }
}

// ─── Session adapter ─────────────────────────────────────────────────────

/// One schedule edit, as sent by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScheduleEdit {
    AddClass {
        day: Day,
    },
    RemoveClass {
        day: Day,
        index: usize,
    },
    UpdateClass {
        day: Day,
        index: usize,
        field: ClassField,
        value: String,
    },
    SetTimePart {
        day: Day,
        index: usize,
        part: TimePart,
        value: String,
    },
}

/// Custom editor for `weekly_schedule.schedule`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleEditor;

impl ScheduleEditor {
    fn field_path() -> Path {
        Path::root().join_key(SCHEDULE_FIELD)
    }

    /// Typed view of the session's schedule field.
    pub fn load(session: &EditSession<'_>) -> WeeklySchedule {
        WeeklySchedule::from_content(&read(session.document(), &Self::field_path()))
    }

    /// Apply `edit` and write the whole seven-day array back to the session.
    pub fn apply(session: &mut EditSession<'_>, edit: ScheduleEdit) -> Result<(), ScheduleError> {
        let mut schedule = Self::load(session);
        match edit {
            ScheduleEdit::AddClass { day } => schedule.add_class(day),
            ScheduleEdit::RemoveClass { day, index } => schedule.remove_class(day, index),
            ScheduleEdit::UpdateClass {
                day,
                index,
                field,
                value,
            } => schedule.update_class(day, index, field, &value)?,
            ScheduleEdit::SetTimePart {
                day,
                index,
                part,
                value,
            } => schedule.set_time_part(day, index, part, &value)?,
        }
        session.apply(EditEvent::ReplaceField {
            path: Path::root(),
            field_key: SCHEDULE_FIELD.to_string(),
            value: schedule.to_content(),
        })?;
        Ok(())
    }
}

impl CustomEditor for ScheduleEditor {
    fn id(&self) -> &'static str {
        "weekly-schedule"
    }

    fn normalize(&self, value: &Content) -> Content {
        WeeklySchedule::from_content(value).to_content()
    }
}
