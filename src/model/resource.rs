//! Traits binding entities to their cache slot, endpoint and static table.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::api::ApiScheduleViewRow;
use crate::cache::CacheKey;
use crate::fallback::StaticDataset;

use super::types::{Course, CourseSchedule, Faculty, Room, ScheduleView, TimeSlot};

/// An entity collection served by a data-access service.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Entity type name for logs and errors (e.g., "faculty", "room")
  fn entity_type() -> &'static str;

  /// Path segments of the list endpoint, relative to the API base URL
  fn endpoint() -> &'static [&'static str];

  /// Cache slot holding the whole collection
  fn cache_key() -> CacheKey;

  /// Primary key of this record
  fn resource_key(&self) -> &str;

  /// Rows of this entity in the bundled snapshot
  fn from_dataset(dataset: &StaticDataset) -> Vec<Self>;

  /// Decode a list response body.
  fn decode_list(value: Value) -> Result<Vec<Self>> {
    serde_json::from_value(value)
      .map_err(|e| eyre!("Failed to parse {} list: {}", Self::entity_type(), e))
  }
}

/// Entities that support create/update/delete against the remote API.
pub trait Editable: Resource {}

/// Entities that belong to a department.
pub trait Departmental {
  fn department(&self) -> &str;
}

// ============================================================================
// Resource implementations
// ============================================================================

impl Resource for Faculty {
  fn entity_type() -> &'static str {
    "faculty"
  }

  fn endpoint() -> &'static [&'static str] {
    &["faculty"]
  }

  fn cache_key() -> CacheKey {
    CacheKey::Faculty
  }

  fn resource_key(&self) -> &str {
    &self.faculty_id
  }

  fn from_dataset(dataset: &StaticDataset) -> Vec<Self> {
    dataset.faculty().to_vec()
  }
}

impl Resource for Course {
  fn entity_type() -> &'static str {
    "course"
  }

  fn endpoint() -> &'static [&'static str] {
    &["courses"]
  }

  fn cache_key() -> CacheKey {
    CacheKey::Courses
  }

  fn resource_key(&self) -> &str {
    &self.course_code
  }

  fn from_dataset(dataset: &StaticDataset) -> Vec<Self> {
    dataset.courses().to_vec()
  }
}

impl Resource for Room {
  fn entity_type() -> &'static str {
    "room"
  }

  fn endpoint() -> &'static [&'static str] {
    &["rooms"]
  }

  fn cache_key() -> CacheKey {
    CacheKey::Rooms
  }

  fn resource_key(&self) -> &str {
    &self.room_number
  }

  fn from_dataset(dataset: &StaticDataset) -> Vec<Self> {
    dataset.rooms().to_vec()
  }
}

impl Resource for TimeSlot {
  fn entity_type() -> &'static str {
    "time slot"
  }

  fn endpoint() -> &'static [&'static str] {
    &["timeslots"]
  }

  fn cache_key() -> CacheKey {
    CacheKey::TimeSlots
  }

  fn resource_key(&self) -> &str {
    &self.slot_id
  }

  fn from_dataset(dataset: &StaticDataset) -> Vec<Self> {
    dataset.time_slots().to_vec()
  }
}

impl Resource for CourseSchedule {
  fn entity_type() -> &'static str {
    "schedule"
  }

  fn endpoint() -> &'static [&'static str] {
    &["schedules"]
  }

  fn cache_key() -> CacheKey {
    CacheKey::Schedules
  }

  fn resource_key(&self) -> &str {
    &self.schedule_id
  }

  fn from_dataset(dataset: &StaticDataset) -> Vec<Self> {
    dataset.schedules().to_vec()
  }
}

impl Resource for ScheduleView {
  fn entity_type() -> &'static str {
    "schedule view"
  }

  fn endpoint() -> &'static [&'static str] {
    &["schedules", "view"]
  }

  fn cache_key() -> CacheKey {
    CacheKey::ScheduleViews
  }

  fn resource_key(&self) -> &str {
    &self.schedule_id
  }

  fn from_dataset(dataset: &StaticDataset) -> Vec<Self> {
    dataset.schedule_views()
  }

  /// The remote view is left-joined on faculty; rows without one are dropped.
  fn decode_list(value: Value) -> Result<Vec<Self>> {
    let rows: Vec<ApiScheduleViewRow> = serde_json::from_value(value)
      .map_err(|e| eyre!("Failed to parse schedule view list: {}", e))?;
    Ok(rows.into_iter().filter_map(ApiScheduleViewRow::into_view).collect())
  }
}

impl Editable for Faculty {}
impl Editable for Course {}
impl Editable for Room {}
impl Editable for TimeSlot {}
impl Editable for CourseSchedule {}

impl Departmental for Faculty {
  fn department(&self) -> &str {
    &self.department
  }
}

impl Departmental for Course {
  fn department(&self) -> &str {
    &self.department
  }
}

impl Departmental for ScheduleView {
  fn department(&self) -> &str {
    &self.department
  }
}
