//! In-process stand-ins for the remote API, shared by unit tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::RemoteApi;
use crate::model::{CourseSchedule, Faculty};

/// Fake scheduling API.
///
/// GETs answer from canned bodies keyed by joined path, mutations echo the
/// request body. Every call is recorded as e.g. "GET faculty" or
/// "PUT faculty/F1".
#[derive(Default)]
pub struct FakeRemote {
  responses: Mutex<HashMap<String, Value>>,
  mutation_response: Mutex<Option<Value>>,
  offline: AtomicBool,
  reject_mutations: AtomicBool,
  calls: Mutex<Vec<String>>,
  delay: Option<Duration>,
}

impl FakeRemote {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_response(self, path: &str, body: Value) -> Self {
    self.set_response(path, body);
    self
  }

  /// Suspend every call for `delay` before answering.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn set_response(&self, path: &str, body: Value) {
    self
      .responses
      .lock()
      .unwrap()
      .insert(path.to_string(), body);
  }

  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  pub fn reject_mutations(&self, reject: bool) {
    self.reject_mutations.store(reject, Ordering::SeqCst);
  }

  /// Answer POST/PUT with `body` instead of echoing the request.
  pub fn set_mutation_response(&self, body: Value) {
    *self.mutation_response.lock().unwrap() = Some(body);
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self, call: &str) -> usize {
    self.calls().iter().filter(|c| c.as_str() == call).count()
  }

  pub fn clear_calls(&self) {
    self.calls.lock().unwrap().clear();
  }

  async fn enter(&self, method: &str, path: &[&str]) -> Result<String> {
    let joined = path.join("/");
    self
      .calls
      .lock()
      .unwrap()
      .push(format!("{} {}", method, joined).trim_end().to_string());

    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    if self.offline.load(Ordering::SeqCst) {
      return Err(eyre!("{} {} failed: connection refused", method, joined));
    }
    Ok(joined)
  }

  fn mutation_reply(&self, method: &str, path: &str, body: Value) -> Result<Value> {
    if self.reject_mutations.load(Ordering::SeqCst) {
      return Err(eyre!("{} {} returned 500 Internal Server Error", method, path));
    }
    Ok(
      self
        .mutation_response
        .lock()
        .unwrap()
        .clone()
        .unwrap_or(body),
    )
  }
}

#[async_trait]
impl RemoteApi for FakeRemote {
  async fn ping(&self) -> Result<()> {
    self.enter("PING", &[]).await?;
    Ok(())
  }

  async fn get(&self, path: &[&str]) -> Result<Value> {
    let joined = self.enter("GET", path).await?;
    self
      .responses
      .lock()
      .unwrap()
      .get(&joined)
      .cloned()
      .ok_or_else(|| eyre!("GET {} returned 404 Not Found", joined))
  }

  async fn post(&self, path: &[&str], body: Value) -> Result<Value> {
    let joined = self.enter("POST", path).await?;
    self.mutation_reply("POST", &joined, body)
  }

  async fn put(&self, path: &[&str], body: Value) -> Result<Value> {
    let joined = self.enter("PUT", path).await?;
    self.mutation_reply("PUT", &joined, body)
  }

  async fn delete(&self, path: &[&str]) -> Result<()> {
    let joined = self.enter("DELETE", path).await?;
    self.mutation_reply("DELETE", &joined, Value::Null)?;
    Ok(())
  }
}

pub fn faculty(id: &str, department: &str) -> Faculty {
  Faculty {
    faculty_id: id.to_string(),
    name: format!("Prof {}", id),
    department: department.to_string(),
    email: None,
    contact_number: None,
  }
}

pub fn schedule(id: &str, faculty_id: Option<&str>) -> CourseSchedule {
  CourseSchedule {
    schedule_id: id.to_string(),
    course_code: None,
    faculty_id: faculty_id.map(String::from),
    room_number: None,
    day_of_week: "Monday".to_string(),
    time_slot_id: None,
    semester: None,
    academic_year: None,
  }
}
