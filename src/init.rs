//! Startup and on-demand reload of every cached collection.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::api::RemoteApi;
use crate::cache::LocalCache;
use crate::fallback::StaticDataset;
use crate::service::{CourseService, FacultyService, RoomService, ScheduleService, TimeSlotService};

/// What an initialization or refresh ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
  /// The cache was still fresh; nothing was loaded
  CacheValid,
  /// Every collection was reloaded from the API
  Remote,
  /// The API was unreachable; the bundled snapshot was loaded
  Fallback,
  /// Another refresh was already running
  AlreadyRefreshing,
}

/// Decides when to reload and reloads every collection together.
#[derive(Clone)]
pub struct DataInit {
  remote: Arc<dyn RemoteApi>,
  cache: LocalCache,
  dataset: Arc<StaticDataset>,
  faculty: FacultyService,
  courses: CourseService,
  rooms: RoomService,
  time_slots: TimeSlotService,
  schedules: ScheduleService,
  refreshing: Arc<AtomicBool>,
  last_refreshed: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl DataInit {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    remote: Arc<dyn RemoteApi>,
    cache: LocalCache,
    dataset: Arc<StaticDataset>,
    faculty: FacultyService,
    courses: CourseService,
    rooms: RoomService,
    time_slots: TimeSlotService,
    schedules: ScheduleService,
  ) -> Self {
    Self {
      remote,
      cache,
      dataset,
      faculty,
      courses,
      rooms,
      time_slots,
      schedules,
      refreshing: Arc::new(AtomicBool::new(false)),
      last_refreshed: Arc::new(Mutex::new(None)),
    }
  }

  /// Reload everything if the cache has expired. Safe to call on every start.
  pub async fn initialize_app_data(&self) -> Result<InitOutcome> {
    info!("Initializing application data...");

    if !self.cache.is_expired() {
      info!("Using cached data, cache is still valid");
      return Ok(InitOutcome::CacheValid);
    }

    info!("Cache expired or not found, fetching fresh data...");
    self.reload().await.map_err(|e| {
      warn!("Error initializing application data: {}", e);
      e
    })
  }

  /// Reload everything regardless of cache age.
  ///
  /// A call made while another refresh is running returns
  /// `AlreadyRefreshing` without doing anything.
  pub async fn refresh_all_data(&self) -> Result<InitOutcome> {
    if self.refreshing.swap(true, Ordering::SeqCst) {
      info!("Refresh already in progress");
      return Ok(InitOutcome::AlreadyRefreshing);
    }
    let _guard = RefreshGuard(&self.refreshing);

    info!("Force refreshing all application data...");
    let outcome = self.reload().await.map_err(|e| {
      warn!("Error refreshing application data: {}", e);
      e
    })?;

    let mut last = self
      .last_refreshed
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *last = Some(Utc::now());

    Ok(outcome)
  }

  /// When the last successful `refresh_all_data` finished.
  pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
    self.last_refreshed.lock().ok().and_then(|last| *last)
  }

  /// Probe the API, then reload all collections concurrently or load the
  /// bundled snapshot. Any failed reload fails the whole call.
  async fn reload(&self) -> Result<InitOutcome> {
    info!("Attempting to fetch data from API...");

    if let Err(e) = self.remote.ping().await {
      warn!("API unreachable, falling back to bundled data: {}", e);
      self.dataset.load_into(&self.cache);
      return Ok(InitOutcome::Fallback);
    }

    futures::try_join!(
      self.faculty.get_all(true),
      self.courses.get_all(true),
      self.rooms.get_all(true),
      self.time_slots.get_all(true),
      self.schedules.get_all_schedules(true),
      self.schedules.get_schedule_view(true),
    )?;

    info!("All application data loaded from API");
    Ok(InitOutcome::Remote)
  }
}

/// Clears the in-progress flag however the refresh ends.
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::SeqCst);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheKey;
  use crate::service::ResourceService;
  use crate::testing::FakeRemote;
  use chrono::Duration;
  use serde_json::json;

  fn online_remote() -> FakeRemote {
    FakeRemote::new()
      .with_response(
        "faculty",
        json!([{"faculty_id": "F1", "name": "Prof F1", "department": "Physics"}]),
      )
      .with_response(
        "courses",
        json!([{"course_code": "PH1", "course_name": "Mechanics", "department": "Physics"}]),
      )
      .with_response("rooms", json!([{"room_number": "R1"}]))
      .with_response(
        "timeslots",
        json!([{"slot_id": "1", "start_time": "09:00", "end_time": "10:00"}]),
      )
      .with_response(
        "schedules",
        json!([{"schedule_id": "1", "faculty_id": "F1", "day_of_week": "Monday"}]),
      )
      .with_response(
        "schedules/view",
        json!([{
          "schedule_id": "1",
          "faculty_name": "Prof F1",
          "faculty_id": "F1",
          "department": "Physics",
          "day_of_week": "Monday"
        }]),
      )
  }

  fn data_init(remote: Arc<FakeRemote>, cache: &LocalCache) -> DataInit {
    let remote: Arc<dyn RemoteApi> = remote;
    let dataset = Arc::new(StaticDataset::bundled().unwrap());
    DataInit::new(
      Arc::clone(&remote),
      cache.clone(),
      Arc::clone(&dataset),
      ResourceService::new(Arc::clone(&remote), cache.clone()),
      ResourceService::new(Arc::clone(&remote), cache.clone()),
      ResourceService::new(Arc::clone(&remote), cache.clone()),
      ResourceService::new(Arc::clone(&remote), cache.clone()),
      ScheduleService::new(Arc::clone(&remote), cache.clone(), dataset),
    )
  }

  #[tokio::test]
  async fn test_expired_cache_reloads_everything_from_api() {
    let remote = Arc::new(online_remote());
    let cache = LocalCache::in_memory();

    let outcome = data_init(remote.clone(), &cache)
      .initialize_app_data()
      .await
      .unwrap();
    assert_eq!(outcome, InitOutcome::Remote);
    assert_eq!(remote.call_count("PING"), 1);
    for path in [
      "faculty",
      "courses",
      "rooms",
      "timeslots",
      "schedules",
      "schedules/view",
    ] {
      assert_eq!(remote.call_count(&format!("GET {}", path)), 1, "{}", path);
    }
    for key in CacheKey::ALL {
      assert!(cache.contains(key), "missing {}", key);
    }
  }

  #[tokio::test]
  async fn test_second_initialize_is_a_no_op() {
    let remote = Arc::new(online_remote());
    let cache = LocalCache::in_memory();
    let init = data_init(remote.clone(), &cache);

    init.initialize_app_data().await.unwrap();
    remote.clear_calls();

    let outcome = init.initialize_app_data().await.unwrap();
    assert_eq!(outcome, InitOutcome::CacheValid);
    assert!(remote.calls().is_empty());
  }

  #[tokio::test]
  async fn test_unreachable_api_loads_bundled_dataset() {
    let remote = Arc::new(online_remote());
    remote.set_offline(true);
    let cache = LocalCache::in_memory();

    let outcome = data_init(remote.clone(), &cache)
      .initialize_app_data()
      .await
      .unwrap();
    assert_eq!(outcome, InitOutcome::Fallback);
    assert_eq!(remote.calls(), vec!["PING".to_string()]);
    assert!(!cache.is_expired());

    let bundled = StaticDataset::bundled().unwrap();
    let faculty: Vec<crate::model::Faculty> = cache.get(CacheKey::Faculty).unwrap();
    assert_eq!(faculty, bundled.faculty());
  }

  #[tokio::test]
  async fn test_one_failed_reload_fails_initialization() {
    let remote = Arc::new(online_remote());
    remote.set_response("rooms", json!({"unexpected": true}));
    let cache = LocalCache::in_memory();

    let result = data_init(remote, &cache).initialize_app_data().await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_numeric_academic_year_does_not_fail_reload() {
    let remote = Arc::new(online_remote());
    remote.set_response(
      "schedules",
      json!([{"schedule_id": 1, "faculty_id": "F1", "day_of_week": "Monday", "academic_year": 2024}]),
    );
    let cache = LocalCache::in_memory();

    let outcome = data_init(remote, &cache)
      .initialize_app_data()
      .await
      .unwrap();
    assert_eq!(outcome, InitOutcome::Remote);
    let schedules: Vec<crate::model::CourseSchedule> = cache.get(CacheKey::Schedules).unwrap();
    assert_eq!(schedules[0].academic_year.as_deref(), Some("2024"));
  }

  #[tokio::test]
  async fn test_refresh_ignores_fresh_cache() {
    let remote = Arc::new(online_remote());
    let cache = LocalCache::in_memory();
    cache.touch_last_updated();
    let init = data_init(remote.clone(), &cache);

    let outcome = init.refresh_all_data().await.unwrap();
    assert_eq!(outcome, InitOutcome::Remote);
    assert_eq!(remote.call_count("GET faculty"), 1);
    assert!(init.last_refreshed().is_some());
    assert!(!init.refreshing.load(Ordering::SeqCst));
  }

  #[tokio::test]
  async fn test_expired_timestamp_triggers_reload() {
    let remote = Arc::new(online_remote());
    let cache = LocalCache::in_memory();
    let old = (Utc::now() - Duration::minutes(20)).timestamp_millis();
    cache.set(CacheKey::LastUpdated, &old);

    let outcome = data_init(remote, &cache)
      .initialize_app_data()
      .await
      .unwrap();
    assert_eq!(outcome, InitOutcome::Remote);
  }

  #[tokio::test]
  async fn test_concurrent_refresh_is_skipped() {
    let remote = Arc::new(online_remote().with_delay(std::time::Duration::from_millis(20)));
    let cache = LocalCache::in_memory();
    let init = data_init(remote.clone(), &cache);

    let (first, second) = tokio::join!(init.refresh_all_data(), init.refresh_all_data());
    assert_eq!(first.unwrap(), InitOutcome::Remote);
    assert_eq!(second.unwrap(), InitOutcome::AlreadyRefreshing);
    assert_eq!(remote.call_count("PING"), 1);
    assert!(!init.refreshing.load(Ordering::SeqCst));
  }

  #[tokio::test]
  async fn test_failed_refresh_clears_in_progress_flag() {
    let remote = Arc::new(online_remote());
    remote.set_response("courses", json!("nope"));
    let cache = LocalCache::in_memory();
    let init = data_init(remote, &cache);

    assert!(init.refresh_all_data().await.is_err());
    assert!(!init.refreshing.load(Ordering::SeqCst));
    assert!(init.last_refreshed().is_none());
  }
}
