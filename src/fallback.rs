//! Bundled read-only snapshot of every table, used when the API is unreachable.

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::cache::{CacheKey, LocalCache};
use crate::model::{Course, CourseSchedule, Faculty, Room, ScheduleView, TimeSlot};

const BUNDLED_DATASET: &str = include_str!("../data/fallback.json");

/// Snapshot of the five scheduling tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticDataset {
  #[serde(rename = "Faculty", default)]
  faculty: Vec<Faculty>,
  #[serde(rename = "Courses", default)]
  courses: Vec<Course>,
  #[serde(rename = "Rooms", default)]
  rooms: Vec<Room>,
  #[serde(rename = "TimeSlots", default)]
  time_slots: Vec<TimeSlot>,
  #[serde(rename = "CourseSchedule", default)]
  schedules: Vec<CourseSchedule>,
}

impl StaticDataset {
  /// The snapshot compiled into the binary.
  pub fn bundled() -> Result<Self> {
    Self::from_json(BUNDLED_DATASET).map_err(|e| eyre!("Bundled dataset is invalid: {}", e))
  }

  /// Load a snapshot file with the same layout as the bundled one.
  pub fn from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read dataset {}: {}", path.display(), e))?;
    Self::from_json(&contents)
      .map_err(|e| eyre!("Failed to parse dataset {}: {}", path.display(), e))
  }

  pub fn from_json(contents: &str) -> Result<Self> {
    let dataset: StaticDataset = serde_json::from_str(contents)?;
    Ok(dataset)
  }

  pub fn new(
    faculty: Vec<Faculty>,
    courses: Vec<Course>,
    rooms: Vec<Room>,
    time_slots: Vec<TimeSlot>,
    schedules: Vec<CourseSchedule>,
  ) -> Self {
    Self {
      faculty,
      courses,
      rooms,
      time_slots,
      schedules,
    }
  }

  pub fn faculty(&self) -> &[Faculty] {
    &self.faculty
  }

  pub fn courses(&self) -> &[Course] {
    &self.courses
  }

  pub fn rooms(&self) -> &[Room] {
    &self.rooms
  }

  pub fn time_slots(&self) -> &[TimeSlot] {
    &self.time_slots
  }

  pub fn schedules(&self) -> &[CourseSchedule] {
    &self.schedules
  }

  /// Join schedules with faculty (required), course, room and time slot.
  ///
  /// Schedule rows whose faculty is unknown are dropped. When a key occurs
  /// more than once in a table, the first row wins.
  pub fn schedule_views(&self) -> Vec<ScheduleView> {
    let faculty = first_by_key(&self.faculty, |f| f.faculty_id.as_str());
    let courses = first_by_key(&self.courses, |c| c.course_code.as_str());
    let rooms = first_by_key(&self.rooms, |r| r.room_number.as_str());
    let slots = first_by_key(&self.time_slots, |t| t.slot_id.as_str());

    self
      .schedules
      .iter()
      .filter_map(|schedule| {
        let member = faculty.get(schedule.faculty_id.as_deref()?)?;
        let course = schedule
          .course_code
          .as_deref()
          .and_then(|code| courses.get(code));
        let room = schedule
          .room_number
          .as_deref()
          .and_then(|number| rooms.get(number));
        let slot = schedule
          .time_slot_id
          .as_deref()
          .and_then(|id| slots.get(id));

        Some(ScheduleView {
          schedule_id: schedule.schedule_id.clone(),
          faculty_name: member.name.clone(),
          faculty_id: member.faculty_id.clone(),
          department: member.department.clone(),
          course_name: course.map(|c| c.course_name.clone()),
          room_number: room.map(|r| r.room_number.clone()),
          building: room.and_then(|r| r.building.clone()),
          day_of_week: schedule.day_of_week.clone(),
          start_time: slot.map(|t| t.start_time.clone()),
          end_time: slot.map(|t| t.end_time.clone()),
          semester: schedule.semester.clone(),
          academic_year: schedule.academic_year.clone(),
        })
      })
      .collect()
  }

  pub fn schedule_views_by_department(&self, department: &str) -> Vec<ScheduleView> {
    self
      .schedule_views()
      .into_iter()
      .filter(|view| view.department == department)
      .collect()
  }

  /// Overwrite every cache key with this snapshot and touch the clock.
  pub fn load_into(&self, cache: &LocalCache) {
    info!("Initializing cache from bundled dataset...");

    cache.set(CacheKey::Faculty, &self.faculty);
    cache.set(CacheKey::Courses, &self.courses);
    cache.set(CacheKey::Rooms, &self.rooms);
    cache.set(CacheKey::TimeSlots, &self.time_slots);
    cache.set(CacheKey::Schedules, &self.schedules);
    cache.set(CacheKey::ScheduleViews, &self.schedule_views());
    cache.touch_last_updated();

    info!("Cache initialization from bundled dataset complete");
  }
}

fn first_by_key<'a, T>(rows: &'a [T], key: impl Fn(&T) -> &str) -> HashMap<&'a str, &'a T> {
  let mut map = HashMap::with_capacity(rows.len());
  for row in rows {
    map.entry(key(row)).or_insert(row);
  }
  map
}
