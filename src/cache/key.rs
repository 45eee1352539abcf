/// The fixed set of keys the local cache knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
  Faculty,
  Courses,
  Rooms,
  TimeSlots,
  Schedules,
  ScheduleViews,
  /// Epoch milliseconds of the last successful refresh
  LastUpdated,
}

impl CacheKey {
  /// Every key, in the order they are cleared.
  pub const ALL: [CacheKey; 7] = [
    CacheKey::Faculty,
    CacheKey::Courses,
    CacheKey::Rooms,
    CacheKey::TimeSlots,
    CacheKey::Schedules,
    CacheKey::ScheduleViews,
    CacheKey::LastUpdated,
  ];

  /// Storage key string
  pub fn as_str(self) -> &'static str {
    match self {
      CacheKey::Faculty => "faculty_data",
      CacheKey::Courses => "courses_data",
      CacheKey::Rooms => "rooms_data",
      CacheKey::TimeSlots => "timeslots_data",
      CacheKey::Schedules => "schedules_data",
      CacheKey::ScheduleViews => "schedule_views_data",
      CacheKey::LastUpdated => "cache_last_updated",
    }
  }
}

impl std::fmt::Display for CacheKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}
