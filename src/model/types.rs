use serde::{Deserialize, Deserializer, Serialize};

/// A faculty member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
  pub faculty_id: String,
  pub name: String,
  pub department: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_number: Option<String>,
}

/// A course offered by a department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub course_code: String,
  pub course_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub course_type: Option<String>,
  pub department: String,
}

/// A teaching room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
  pub room_number: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub building: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub capacity: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub equipment: Option<String>,
}

/// A bookable time slot ("HH:MM" bounds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
  #[serde(deserialize_with = "string_or_number")]
  pub slot_id: String,
  pub start_time: String,
  pub end_time: String,
}

/// One scheduled class meeting. Foreign keys are nullable and unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSchedule {
  #[serde(deserialize_with = "string_or_number")]
  pub schedule_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub course_code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub faculty_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub room_number: Option<String>,
  pub day_of_week: String,
  #[serde(
    default,
    deserialize_with = "opt_string_or_number",
    skip_serializing_if = "Option::is_none"
  )]
  pub time_slot_id: Option<String>,
  #[serde(
    default,
    deserialize_with = "opt_string_or_number",
    skip_serializing_if = "Option::is_none"
  )]
  pub semester: Option<String>,
  #[serde(
    default,
    deserialize_with = "opt_string_or_number",
    skip_serializing_if = "Option::is_none"
  )]
  pub academic_year: Option<String>,
}

/// Read-only join of a schedule row with its faculty, course, room and slot.
///
/// `faculty_name` and `department` are always present: schedule rows without
/// a matching faculty never become a view row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleView {
  #[serde(deserialize_with = "string_or_number")]
  pub schedule_id: String,
  pub faculty_name: String,
  pub faculty_id: String,
  pub department: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub course_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub room_number: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub building: Option<String>,
  pub day_of_week: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_time: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_time: Option<String>,
  #[serde(
    default,
    deserialize_with = "opt_string_or_number",
    skip_serializing_if = "Option::is_none"
  )]
  pub semester: Option<String>,
  #[serde(
    default,
    deserialize_with = "opt_string_or_number",
    skip_serializing_if = "Option::is_none"
  )]
  pub academic_year: Option<String>,
}

// ============================================================================
// Key deserialization
// ============================================================================

/// Ids arrive as JSON strings from the API but as numbers from some exports.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
  String(String),
  Integer(i64),
  Float(f64),
}

impl From<StringOrNumber> for String {
  fn from(value: StringOrNumber) -> Self {
    match value {
      StringOrNumber::String(s) => s,
      StringOrNumber::Integer(n) => n.to_string(),
      StringOrNumber::Float(n) => n.to_string(),
    }
  }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  StringOrNumber::deserialize(deserializer).map(String::from)
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}
