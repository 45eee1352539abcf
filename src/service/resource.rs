//! Generic data-access service for one entity collection.

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::source::{Attempt, Source};
use crate::api::RemoteApi;
use crate::cache::{CacheResult, LocalCache};
use crate::fallback::StaticDataset;
use crate::model::{Departmental, Editable, Resource};

/// Reads and writes one resource through the cache and the remote API.
///
/// Reads walk an ordered chain of sources and return the first hit. Writes
/// go to the remote API first and patch the cached collection only after
/// the remote call succeeds.
pub struct ResourceService<T: Resource> {
  remote: Arc<dyn RemoteApi>,
  cache: LocalCache,
  dataset: Option<Arc<StaticDataset>>,
  chain: &'static [Source],
  _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> ResourceService<T> {
  pub fn new(remote: Arc<dyn RemoteApi>, cache: LocalCache) -> Self {
    Self {
      remote,
      cache,
      dataset: None,
      chain: Source::DEFAULT_CHAIN,
      _resource: PhantomData,
    }
  }

  /// Serve the bundled snapshot when network and cache both come up empty.
  pub fn with_static_fallback(mut self, dataset: Arc<StaticDataset>) -> Self {
    self.dataset = Some(dataset);
    self.chain = Source::WITH_STATIC;
    self
  }

  /// The whole collection.
  pub async fn get_all(&self, force_refresh: bool) -> Result<Vec<T>> {
    Ok(self.get_all_with_origin(force_refresh).await?.data)
  }

  /// The whole collection, tagged with the source that produced it.
  ///
  /// When every source misses, the last source error is returned.
  pub async fn get_all_with_origin(&self, force_refresh: bool) -> Result<CacheResult<Vec<T>>> {
    let mut cached: Option<Vec<T>> = self.cache.get(T::cache_key());
    let mut last_error = None;

    for &source in self.chain {
      match self.attempt(source, force_refresh, &mut cached).await {
        Attempt::Hit(result) => return Ok(result),
        Attempt::Miss => {}
        Attempt::Failed(e) => last_error = Some(e),
      }
    }

    Err(last_error.unwrap_or_else(|| eyre!("No {} data available", T::entity_type())))
  }

  async fn attempt(
    &self,
    source: Source,
    force_refresh: bool,
    cached: &mut Option<Vec<T>>,
  ) -> Attempt<CacheResult<Vec<T>>> {
    let key = T::cache_key();

    match source {
      Source::FreshCache => {
        if force_refresh || cached.is_none() || self.cache.is_stale(key) {
          return Attempt::Miss;
        }
        debug!("Using cached {} data", T::entity_type());
        match cached.take() {
          Some(data) => Attempt::Hit(CacheResult::from_cache(data)),
          None => Attempt::Miss,
        }
      }
      Source::Remote => match self.fetch_remote().await {
        Ok(data) => {
          self.cache.set(key, &data);
          self.cache.mark_fresh(key);
          Attempt::Hit(CacheResult::from_network(data))
        }
        Err(e) => {
          warn!("Error fetching {} from API: {}", T::entity_type(), e);
          Attempt::Failed(e)
        }
      },
      Source::StaleCache => match cached.take() {
        Some(data) => {
          info!("Using cached {} data as fallback after API error", T::entity_type());
          Attempt::Hit(CacheResult::offline(data))
        }
        None => Attempt::Miss,
      },
      Source::Static => match &self.dataset {
        Some(dataset) => {
          info!("Using bundled {} data", T::entity_type());
          let data = T::from_dataset(dataset);
          self.cache.set(key, &data);
          self.cache.mark_fresh(key);
          Attempt::Hit(CacheResult::from_fallback(data))
        }
        None => Attempt::Miss,
      },
    }
  }

  async fn fetch_remote(&self) -> Result<Vec<T>> {
    debug!("Fetching {} from API", T::entity_type());
    let body = self.remote.get(T::endpoint()).await?;
    T::decode_list(body)
  }

  /// Apply `patch` to the cached collection (empty if nothing is cached).
  fn patch_cache(&self, patch: impl FnOnce(&mut Vec<T>)) {
    let key = T::cache_key();
    let mut rows: Vec<T> = self.cache.get(key).unwrap_or_default();
    patch(&mut rows);
    self.cache.set(key, &rows);
  }
}

impl<T: Resource + Departmental> ResourceService<T> {
  /// Rows of one department, filtered from `get_all(false)`.
  pub async fn get_by_department(&self, department: &str) -> Result<Vec<T>> {
    Ok(
      self
        .get_by_department_with_origin(department, false)
        .await?
        .data,
    )
  }

  /// Rows of one department, filtered from the whole collection.
  pub async fn get_by_department_with_origin(
    &self,
    department: &str,
    force_refresh: bool,
  ) -> Result<CacheResult<Vec<T>>> {
    let all = self.get_all_with_origin(force_refresh).await?;
    Ok(all.map(|rows| {
      rows
        .into_iter()
        .filter(|row| row.department() == department)
        .collect()
    }))
  }
}

impl<T: Editable> ResourceService<T> {
  /// Create `entity` remotely, then append it to the cached collection.
  pub async fn create(&self, entity: &T) -> Result<T> {
    let body = encode(entity)?;
    let response = self
      .remote
      .post(T::endpoint(), body)
      .await
      .map_err(|e| {
        error!("Error creating {}: {}", T::entity_type(), e);
        e
      })?;

    let created = canonical(response, entity, "create");
    self.patch_cache(|rows| rows.push(created.clone()));
    Ok(created)
  }

  /// Update `entity` remotely, then replace the cached row with its key.
  pub async fn update(&self, entity: &T) -> Result<T> {
    let key = entity.resource_key().to_string();
    let body = encode(entity)?;
    let response = self
      .remote
      .put(&item_path::<T>(&key), body)
      .await
      .map_err(|e| {
        error!("Error updating {} {}: {}", T::entity_type(), key, e);
        e
      })?;

    let updated = canonical(response, entity, "update");
    self.patch_cache(|rows| {
      for row in rows.iter_mut().filter(|row| row.resource_key() == key) {
        *row = updated.clone();
      }
    });
    Ok(updated)
  }

  /// Delete the record with `key` remotely, then drop it from the cache.
  pub async fn delete(&self, key: &str) -> Result<()> {
    self
      .remote
      .delete(&item_path::<T>(key))
      .await
      .map_err(|e| {
        error!("Error deleting {} {}: {}", T::entity_type(), key, e);
        e
      })?;

    self.patch_cache(|rows| rows.retain(|row| row.resource_key() != key));
    Ok(())
  }
}

impl<T: Resource> Clone for ResourceService<T> {
  fn clone(&self) -> Self {
    Self {
      remote: Arc::clone(&self.remote),
      cache: self.cache.clone(),
      dataset: self.dataset.clone(),
      chain: self.chain,
      _resource: PhantomData,
    }
  }
}

fn item_path<T: Resource>(key: &str) -> Vec<&str> {
  let mut path = T::endpoint().to_vec();
  path.push(key);
  path
}

fn encode<T: Resource>(entity: &T) -> Result<Value> {
  serde_json::to_value(entity)
    .map_err(|e| eyre!("Failed to serialize {}: {}", T::entity_type(), e))
}

/// The entity echoed by the API, or the submitted one if the echo is unusable.
fn canonical<T: Resource>(response: Value, submitted: &T, operation: &str) -> T {
  match serde_json::from_value(response) {
    Ok(entity) => entity,
    Err(e) => {
      warn!(
        "Unexpected {} {} response ({}); caching the submitted record",
        T::entity_type(),
        operation,
        e
      );
      submitted.clone()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheKey, DataOrigin};
  use crate::model::Faculty;
  use crate::testing::{faculty, FakeRemote};
  use chrono::{Duration, Utc};
  use serde_json::json;

  fn service(remote: &Arc<FakeRemote>, cache: &LocalCache) -> ResourceService<Faculty> {
    ResourceService::new(remote.clone(), cache.clone())
  }

  fn expire(cache: &LocalCache) {
    let old = (Utc::now() - Duration::minutes(30)).timestamp_millis();
    cache.set(CacheKey::LastUpdated, &old);
  }

  fn online_remote() -> Arc<FakeRemote> {
    Arc::new(FakeRemote::new().with_response(
      "faculty",
      json!([
        {"faculty_id": "F1", "name": "Prof F1", "department": "Mathematics"},
        {"faculty_id": "F2", "name": "Prof F2", "department": "Physics"}
      ]),
    ))
  }

  #[tokio::test]
  async fn test_second_read_served_from_cache() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);

    let first = service.get_all_with_origin(false).await.unwrap();
    let second = service.get_all_with_origin(false).await.unwrap();

    assert_eq!(first.origin, DataOrigin::Network);
    assert_eq!(second.origin, DataOrigin::CacheFresh);
    assert_eq!(first.data, second.data);
    assert_eq!(remote.call_count("GET faculty"), 1);
  }

  #[tokio::test]
  async fn test_force_refresh_bypasses_fresh_cache() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);

    service.get_all(false).await.unwrap();
    service.get_all(true).await.unwrap();
    assert_eq!(remote.call_count("GET faculty"), 2);
  }

  #[tokio::test]
  async fn test_expired_cache_refetches_and_touches_clock() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    cache.set(CacheKey::Faculty, &vec![faculty("OLD", "History")]);
    expire(&cache);

    let result = service(&remote, &cache).get_all_with_origin(false).await.unwrap();
    assert_eq!(result.origin, DataOrigin::Network);
    assert_eq!(result.data.len(), 2);
    assert!(!cache.is_expired());
  }

  #[tokio::test]
  async fn test_network_failure_serves_stale_cache() {
    let remote = online_remote();
    remote.set_offline(true);
    let cache = LocalCache::in_memory();
    cache.set(CacheKey::Faculty, &vec![faculty("F9", "History")]);
    expire(&cache);

    let result = service(&remote, &cache).get_all_with_origin(false).await.unwrap();
    assert_eq!(result.origin, DataOrigin::Offline);
    assert_eq!(result.data, vec![faculty("F9", "History")]);
  }

  #[tokio::test]
  async fn test_forced_refresh_failure_serves_cache() {
    let remote = online_remote();
    remote.set_offline(true);
    let cache = LocalCache::in_memory();
    cache.set(CacheKey::Faculty, &vec![faculty("F9", "History")]);
    cache.touch_last_updated();

    let data = service(&remote, &cache).get_all(true).await.unwrap();
    assert_eq!(data, vec![faculty("F9", "History")]);
  }

  #[tokio::test]
  async fn test_network_failure_without_cache_is_an_error() {
    let remote = online_remote();
    remote.set_offline(true);
    let cache = LocalCache::in_memory();

    let result = service(&remote, &cache).get_all(false).await;
    assert!(result.is_err());
    assert!(!cache.contains(CacheKey::Faculty));
  }

  #[tokio::test]
  async fn test_static_fallback_when_enabled() {
    let remote = online_remote();
    remote.set_offline(true);
    let cache = LocalCache::in_memory();
    let dataset = Arc::new(StaticDataset::new(
      vec![faculty("S1", "Mathematics")],
      vec![],
      vec![],
      vec![],
      vec![],
    ));

    let service = service(&remote, &cache).with_static_fallback(dataset);
    let result = service.get_all_with_origin(false).await.unwrap();
    assert_eq!(result.origin, DataOrigin::Fallback);
    assert_eq!(result.data, vec![faculty("S1", "Mathematics")]);
    assert!(cache.contains(CacheKey::Faculty));
    assert!(!cache.is_expired());
  }

  #[tokio::test]
  async fn test_department_filter_reuses_cached_read() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);

    let maths = service.get_by_department("Mathematics").await.unwrap();
    let physics = service.get_by_department("Physics").await.unwrap();
    assert_eq!(maths.len(), 1);
    assert_eq!(physics[0].faculty_id, "F2");
    assert_eq!(remote.call_count("GET faculty"), 1);
  }

  #[tokio::test]
  async fn test_department_read_keeps_origin_and_honours_refresh() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);

    let first = service
      .get_by_department_with_origin("Physics", false)
      .await
      .unwrap();
    assert_eq!(first.origin, DataOrigin::Network);
    assert_eq!(first.data, vec![faculty("F2", "Physics")]);

    let cached = service
      .get_by_department_with_origin("Physics", false)
      .await
      .unwrap();
    assert_eq!(cached.origin, DataOrigin::CacheFresh);

    let forced = service
      .get_by_department_with_origin("Mathematics", true)
      .await
      .unwrap();
    assert_eq!(forced.origin, DataOrigin::Network);
    assert_eq!(forced.data.len(), 1);
    assert_eq!(remote.call_count("GET faculty"), 2);
  }

  #[tokio::test]
  async fn test_create_is_visible_without_another_fetch() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);
    service.get_all(false).await.unwrap();

    let created = service.create(&faculty("F3", "Physics")).await.unwrap();
    assert_eq!(created, faculty("F3", "Physics"));

    let all = service.get_all(false).await.unwrap();
    assert!(all.contains(&faculty("F3", "Physics")));
    assert_eq!(remote.call_count("GET faculty"), 1);
    assert_eq!(remote.call_count("POST faculty"), 1);
  }

  #[tokio::test]
  async fn test_rejected_create_leaves_cache_untouched() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);
    let before = service.get_all(false).await.unwrap();

    remote.reject_mutations(true);
    assert!(service.create(&faculty("F3", "Physics")).await.is_err());

    let after: Vec<Faculty> = cache.get(CacheKey::Faculty).unwrap();
    assert_eq!(before, after);
  }

  #[tokio::test]
  async fn test_update_replaces_by_key() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);
    service.get_all(false).await.unwrap();

    let mut changed = faculty("F1", "Mathematics");
    changed.name = "Prof Renamed".to_string();
    service.update(&changed).await.unwrap();

    let all = service.get_all(false).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Prof Renamed");
    assert_eq!(remote.call_count("PUT faculty/F1"), 1);
  }

  #[tokio::test]
  async fn test_update_with_unusable_response_caches_submitted_record() {
    let remote = online_remote();
    remote.set_mutation_response(json!({"message": "ok"}));
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);
    service.get_all(false).await.unwrap();

    let mut changed = faculty("F2", "Physics");
    changed.email = Some("f2@univ.edu".to_string());
    let returned = service.update(&changed).await.unwrap();

    assert_eq!(returned, changed);
    let all: Vec<Faculty> = cache.get(CacheKey::Faculty).unwrap();
    assert_eq!(all[1], changed);
  }

  #[tokio::test]
  async fn test_delete_removes_by_key() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);
    service.get_all(false).await.unwrap();

    service.delete("F1").await.unwrap();
    let all = service.get_all(false).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].faculty_id, "F2");
    assert_eq!(remote.call_count("DELETE faculty/F1"), 1);
  }

  #[tokio::test]
  async fn test_rejected_delete_keeps_row() {
    let remote = online_remote();
    let cache = LocalCache::in_memory();
    let service = service(&remote, &cache);
    service.get_all(false).await.unwrap();

    remote.reject_mutations(true);
    assert!(service.delete("F1").await.is_err());
    assert_eq!(service.get_all(false).await.unwrap().len(), 2);
  }
}
