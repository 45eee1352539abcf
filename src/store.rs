//! Session-wide wiring of cache, API client, snapshot and services.

use chrono::Duration;
use color_eyre::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{HttpRemote, RemoteApi};
use crate::cache::{LocalCache, SqliteStorage};
use crate::config::Config;
use crate::fallback::StaticDataset;
use crate::init::DataInit;
use crate::service::{
  CourseService, FacultyService, ResourceService, RoomService, ScheduleService, TimeSlotService,
};

/// Everything a client needs to read and edit scheduling data.
///
/// Built once per session; every service shares the same cache.
#[derive(Clone)]
pub struct DataStore {
  pub faculty: FacultyService,
  pub courses: CourseService,
  pub rooms: RoomService,
  pub time_slots: TimeSlotService,
  pub schedules: ScheduleService,
  pub init: DataInit,
  cache: LocalCache,
}

impl DataStore {
  /// Build the store described by `config`.
  ///
  /// If the cache database cannot be opened, an in-memory cache is used for
  /// this session instead.
  pub fn new(config: &Config) -> Result<Self> {
    let remote: Arc<dyn RemoteApi> = Arc::new(HttpRemote::new(&config.api)?);

    let storage = match &config.cache.path {
      Some(path) => SqliteStorage::open(path),
      None => SqliteStorage::default_path().and_then(|path| SqliteStorage::open(&path)),
    };
    let cache = match storage {
      Ok(storage) => LocalCache::new(storage),
      Err(e) => {
        warn!("Cache unavailable, continuing without persistence: {}", e);
        LocalCache::in_memory()
      }
    }
    .with_ttl(Duration::minutes(config.cache.ttl_minutes));

    let dataset = match &config.fallback.path {
      Some(path) => StaticDataset::from_path(path)?,
      None => StaticDataset::bundled()?,
    };

    Ok(Self::from_parts(
      remote,
      cache,
      Arc::new(dataset),
      config.fallback.serve_schedule_reads,
    ))
  }

  /// Assemble a store from already-built parts.
  pub fn from_parts(
    remote: Arc<dyn RemoteApi>,
    cache: LocalCache,
    dataset: Arc<StaticDataset>,
    serve_schedule_reads: bool,
  ) -> Self {
    debug!(
      "Building data store (static schedule reads: {})",
      serve_schedule_reads
    );

    let faculty = ResourceService::new(Arc::clone(&remote), cache.clone());
    let courses = ResourceService::new(Arc::clone(&remote), cache.clone());
    let rooms = ResourceService::new(Arc::clone(&remote), cache.clone());
    let time_slots = ResourceService::new(Arc::clone(&remote), cache.clone());
    let schedules = ScheduleService::new(Arc::clone(&remote), cache.clone(), Arc::clone(&dataset))
      .with_static_reads(serve_schedule_reads);

    let init = DataInit::new(
      remote,
      cache.clone(),
      dataset,
      faculty.clone(),
      courses.clone(),
      rooms.clone(),
      time_slots.clone(),
      schedules.clone(),
    );

    Self {
      faculty,
      courses,
      rooms,
      time_slots,
      schedules,
      init,
      cache,
    }
  }

  pub fn cache(&self) -> &LocalCache {
    &self.cache
  }
}
