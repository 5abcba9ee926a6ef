use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub type EntryId = String;
pub type ShiftId = String;
pub type ScheduleId = String;

/// Category of a shift template, drives the default color and label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    #[default]
    Day,
    Rest,
    Overnight,
    Special,
}

impl ShiftType {
    pub const ALL: [ShiftType; 4] = [
        ShiftType::Day,
        ShiftType::Rest,
        ShiftType::Overnight,
        ShiftType::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Day => "day",
            ShiftType::Rest => "rest",
            ShiftType::Overnight => "overnight",
            ShiftType::Special => "special",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Day => "Day shift",
            ShiftType::Rest => "Rest day",
            ShiftType::Overnight => "Overnight",
            ShiftType::Special => "Special",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShiftType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown shift type '{s}' (expected day, rest, overnight or special)"))
    }
}

/// Ids written by older exports may be numbers (epoch millis).
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Int(i64),
    Float(f64),
}

fn id_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(id) => id,
        IdRepr::Int(id) => id.to_string(),
        IdRepr::Float(id) => id.to_string(),
    })
}

fn text_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn hue_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u16>, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map(|hue| hue.round().clamp(0.0, 360.0) as u16))
}

/// An ad hoc recorded time span that is not tied to a shift template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    #[serde(deserialize_with = "id_from_any")]
    pub id: EntryId,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Worked minutes, derived at creation.
    #[serde(default)]
    pub duration: u32,
    #[serde(default, deserialize_with = "text_or_null")]
    pub notes: String,
    #[serde(
        default,
        deserialize_with = "hue_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_hue: Option<u16>,
}

pub(crate) enum EntryQuery {
    All,
    ByDate(String),
    ByRange(String, String),
}

/// Reusable shift template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(deserialize_with = "id_from_any")]
    pub id: ShiftId,
    pub name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_duration: Option<String>,
    #[serde(default)]
    pub shift_type: ShiftType,
    #[serde(
        default,
        deserialize_with = "hue_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_hue: Option<u16>,
}

/// A shift applied to a calendar date.
///
/// `selected_shift` is a lookup-only reference. The snapshot fields are
/// copied from the shift at creation and stay as they were when the shift
/// is later edited or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(deserialize_with = "id_from_any")]
    pub id: ScheduleId,
    pub date: String,
    #[serde(default, deserialize_with = "id_from_any")]
    pub selected_shift: ShiftId,
    #[serde(default, deserialize_with = "text_or_null")]
    pub title: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_duration: Option<String>,
}

pub(crate) enum ScheduleQuery {
    All,
    ByDate(String),
    ByRange(String, String),
    ByShift(ShiftId),
}

/// Something stored under an id, unique within its collection.
pub trait Record {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

impl Record for TimeEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Shift {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Schedule {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Records that belong to a calendar date (`yyyy-MM-dd`).
pub trait Dated {
    fn date(&self) -> &str;
}

impl Dated for TimeEntry {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for Schedule {
    fn date(&self) -> &str {
        &self.date
    }
}
