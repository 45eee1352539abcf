//! Serde-deserializable types matching scheduling API responses.
//!
//! These types are separate from domain types to allow lenient decoding of
//! joined rows while keeping domain types focused on application needs.

use serde::Deserialize;

use crate::model::{opt_string_or_number, string_or_number, ScheduleView};

/// One row of `GET /schedules/view`.
///
/// The backend left-joins faculty, so every faculty column may be null; it
/// also returns `course_code`, which the view does not carry.
#[derive(Debug, Deserialize)]
pub struct ApiScheduleViewRow {
  #[serde(deserialize_with = "string_or_number")]
  pub schedule_id: String,
  pub faculty_name: Option<String>,
  pub faculty_id: Option<String>,
  pub department: Option<String>,
  pub course_name: Option<String>,
  pub course_code: Option<String>,
  pub room_number: Option<String>,
  pub building: Option<String>,
  #[serde(default)]
  pub day_of_week: String,
  pub start_time: Option<String>,
  pub end_time: Option<String>,
  #[serde(default, deserialize_with = "opt_string_or_number")]
  pub semester: Option<String>,
  #[serde(default, deserialize_with = "opt_string_or_number")]
  pub academic_year: Option<String>,
}

impl ApiScheduleViewRow {
  /// Convert to a view row; `None` when the schedule has no faculty.
  pub fn into_view(self) -> Option<ScheduleView> {
    let (faculty_id, faculty_name, department) =
      match (self.faculty_id, self.faculty_name, self.department) {
        (Some(id), Some(name), Some(department)) => (id, name, department),
        _ => return None,
      };

    Some(ScheduleView {
      schedule_id: self.schedule_id,
      faculty_name,
      faculty_id,
      department,
      course_name: self.course_name,
      room_number: self.room_number,
      building: self.building,
      day_of_week: self.day_of_week,
      start_time: self.start_time,
      end_time: self.end_time,
      semester: self.semester,
      academic_year: self.academic_year,
    })
  }
}
