use async_trait::async_trait;
use color_eyre::Result;
use serde_json::Value;

/// JSON-over-HTTP CRUD endpoints of the scheduling backend.
///
/// Paths are given as segments relative to the API base URL, e.g.
/// `&["schedules", "view", "department", "Mathematics"]`.
#[async_trait]
pub trait RemoteApi: Send + Sync {
  /// Lightweight liveness probe.
  async fn ping(&self) -> Result<()>;

  async fn get(&self, path: &[&str]) -> Result<Value>;

  async fn post(&self, path: &[&str], body: Value) -> Result<Value>;

  async fn put(&self, path: &[&str], body: Value) -> Result<Value>;

  async fn delete(&self, path: &[&str]) -> Result<()>;
}
