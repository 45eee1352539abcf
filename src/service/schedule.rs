//! Schedules have two read shapes: raw rows and the joined view.

use color_eyre::Result;
use std::sync::Arc;
use tracing::{info, warn};

use super::resource::ResourceService;
use crate::api::RemoteApi;
use crate::cache::{CacheKey, CacheResult, LocalCache};
use crate::fallback::StaticDataset;
use crate::model::{CourseSchedule, Resource, ScheduleView};

/// Data-access service for course schedules and the schedule view.
#[derive(Clone)]
pub struct ScheduleService {
  schedules: ResourceService<CourseSchedule>,
  views: ResourceService<ScheduleView>,
  remote: Arc<dyn RemoteApi>,
  cache: LocalCache,
  dataset: Arc<StaticDataset>,
}

impl ScheduleService {
  pub fn new(remote: Arc<dyn RemoteApi>, cache: LocalCache, dataset: Arc<StaticDataset>) -> Self {
    Self {
      schedules: ResourceService::new(Arc::clone(&remote), cache.clone()),
      views: ResourceService::new(Arc::clone(&remote), cache.clone()),
      remote,
      cache,
      dataset,
    }
  }

  /// Let full-collection reads fall back to the bundled snapshot.
  pub fn with_static_reads(mut self, enabled: bool) -> Self {
    if enabled {
      self.schedules = self
        .schedules
        .with_static_fallback(Arc::clone(&self.dataset));
      self.views = self.views.with_static_fallback(Arc::clone(&self.dataset));
    }
    self
  }

  pub async fn get_all_schedules(&self, force_refresh: bool) -> Result<Vec<CourseSchedule>> {
    self.schedules.get_all(force_refresh).await
  }

  pub async fn get_all_schedules_with_origin(
    &self,
    force_refresh: bool,
  ) -> Result<CacheResult<Vec<CourseSchedule>>> {
    self.schedules.get_all_with_origin(force_refresh).await
  }

  pub async fn get_schedule_view(&self, force_refresh: bool) -> Result<Vec<ScheduleView>> {
    self.views.get_all(force_refresh).await
  }

  pub async fn get_schedule_view_with_origin(
    &self,
    force_refresh: bool,
  ) -> Result<CacheResult<Vec<ScheduleView>>> {
    self.views.get_all_with_origin(force_refresh).await
  }

  pub async fn get_schedule_view_by_department(
    &self,
    department: &str,
  ) -> Result<Vec<ScheduleView>> {
    Ok(
      self
        .get_schedule_view_by_department_with_origin(department)
        .await?
        .data,
    )
  }

  /// Schedule view rows of one department.
  ///
  /// 1. Ask the API for the department's rows and splice them into the cached
  ///    view, replacing every cached row of that department
  /// 2. On failure, filter the cached view
  /// 3. If that is empty, use the bundled snapshot and cache its whole view
  pub async fn get_schedule_view_by_department_with_origin(
    &self,
    department: &str,
  ) -> Result<CacheResult<Vec<ScheduleView>>> {
    info!("Fetching schedule views for department {} from API...", department);

    let path = ["schedules", "view", "department", department];
    let remote_error = match self
      .remote
      .get(&path)
      .await
      .and_then(ScheduleView::decode_list)
    {
      Ok(rows) => {
        let rows = in_department(rows, department);
        self.replace_department(department, &rows);
        return Ok(CacheResult::from_network(rows));
      }
      Err(e) => e,
    };

    warn!(
      "API error fetching schedule views for department {}: {}",
      department, remote_error
    );

    let cached = self.cache.filter_views_by_department(department);
    if !cached.is_empty() {
      info!("Using cached schedule views for department {}", department);
      return Ok(CacheResult::offline(cached));
    }

    info!("Falling back to bundled schedule views for department {}", department);
    self
      .cache
      .set(CacheKey::ScheduleViews, &self.dataset.schedule_views());
    self.cache.mark_fresh(CacheKey::ScheduleViews);
    Ok(CacheResult::from_fallback(
      self.dataset.schedule_views_by_department(department),
    ))
  }

  pub async fn create_schedule(&self, schedule: &CourseSchedule) -> Result<CourseSchedule> {
    self.schedules.create(schedule).await
  }

  pub async fn update_schedule(&self, schedule: &CourseSchedule) -> Result<CourseSchedule> {
    self.schedules.update(schedule).await
  }

  pub async fn delete_schedule(&self, schedule_id: &str) -> Result<()> {
    self.schedules.delete(schedule_id).await
  }

  /// Drop every cached view row of `department` and append `rows`.
  fn replace_department(&self, department: &str, rows: &[ScheduleView]) {
    let mut all: Vec<ScheduleView> = self
      .cache
      .get(CacheKey::ScheduleViews)
      .unwrap_or_default();
    all.retain(|view| view.department != department);
    all.extend_from_slice(rows);
    self.cache.set(CacheKey::ScheduleViews, &all);
    self.cache.mark_fresh(CacheKey::ScheduleViews);
  }
}

fn in_department(rows: Vec<ScheduleView>, department: &str) -> Vec<ScheduleView> {
  rows
    .into_iter()
    .filter(|view| view.department == department)
    .collect()
}
