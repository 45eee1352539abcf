//! Command execution over a [`DataStore`].

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheResult};
use crate::commands::{self, ResourceKind};
use crate::init::InitOutcome;
use crate::model::{Departmental, Editable};
use crate::render::{self, Tabular};
use crate::service::ResourceService;
use crate::store::DataStore;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Load data if the cache has expired
  Init,
  /// Reload every collection from the API
  Refresh,
  /// List a resource (faculty, courses, rooms, timeslots, schedules)
  List {
    resource: String,
    /// Only rows of this department (faculty and courses)
    #[arg(short, long)]
    department: Option<String>,
    /// Skip the cache and ask the API
    #[arg(short, long)]
    refresh: bool,
  },
  /// Show the joined schedule view
  Schedule {
    /// Only rows of this department (always asks the API first)
    #[arg(short, long, conflicts_with = "refresh")]
    department: Option<String>,
    /// Skip the cache and ask the API
    #[arg(short, long)]
    refresh: bool,
  },
  /// Create a record from a JSON object
  Create { resource: String, json: String },
  /// Update a record from a JSON object
  Update { resource: String, json: String },
  /// Delete a record by its key
  Delete { resource: String, key: String },
  /// Inspect or clear the local cache
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
  Status,
  Clear,
}

/// Runs one command and renders its result as text.
pub struct App {
  store: DataStore,
  json: bool,
}

impl App {
  pub fn new(store: DataStore, json: bool) -> Self {
    Self { store, json }
  }

  pub fn store(&self) -> &DataStore {
    &self.store
  }

  pub async fn run(&self, command: Command) -> Result<String> {
    debug!("Running {:?}", command);

    match command {
      Command::Init => {
        let outcome = self.store.init.initialize_app_data().await?;
        Ok(outcome_message(outcome))
      }
      Command::Refresh => {
        let outcome = self.store.init.refresh_all_data().await?;
        Ok(outcome_message(outcome))
      }
      Command::List {
        resource,
        department,
        refresh,
      } => {
        self.prepare().await;
        let kind = parse_resource(&resource)?;
        let department = department.as_deref();
        match kind {
          ResourceKind::Faculty => {
            self
              .list_departmental(&self.store.faculty, department, refresh)
              .await
          }
          ResourceKind::Courses => {
            self
              .list_departmental(&self.store.courses, department, refresh)
              .await
          }
          ResourceKind::Rooms => {
            no_department(kind, department)?;
            self.list(&self.store.rooms, refresh).await
          }
          ResourceKind::TimeSlots => {
            no_department(kind, department)?;
            self.list(&self.store.time_slots, refresh).await
          }
          ResourceKind::Schedules => {
            no_department(kind, department)?;
            let result = self.store.schedules.get_all_schedules_with_origin(refresh).await?;
            self.output(result)
          }
        }
      }
      Command::Schedule { department, refresh } => {
        self.prepare().await;
        let result = match department {
          Some(department) => {
            self
              .store
              .schedules
              .get_schedule_view_by_department_with_origin(&department)
              .await?
          }
          None => self.store.schedules.get_schedule_view_with_origin(refresh).await?,
        };
        self.output(result)
      }
      Command::Create { resource, json } => {
        self.prepare().await;
        match parse_resource(&resource)? {
          ResourceKind::Faculty => self.create(&self.store.faculty, &json).await,
          ResourceKind::Courses => self.create(&self.store.courses, &json).await,
          ResourceKind::Rooms => self.create(&self.store.rooms, &json).await,
          ResourceKind::TimeSlots => self.create(&self.store.time_slots, &json).await,
          ResourceKind::Schedules => {
            let schedule = parse_entity(&json)?;
            let created = self.store.schedules.create_schedule(&schedule).await?;
            self.single(created)
          }
        }
      }
      Command::Update { resource, json } => {
        self.prepare().await;
        match parse_resource(&resource)? {
          ResourceKind::Faculty => self.update(&self.store.faculty, &json).await,
          ResourceKind::Courses => self.update(&self.store.courses, &json).await,
          ResourceKind::Rooms => self.update(&self.store.rooms, &json).await,
          ResourceKind::TimeSlots => self.update(&self.store.time_slots, &json).await,
          ResourceKind::Schedules => {
            let schedule = parse_entity(&json)?;
            let updated = self.store.schedules.update_schedule(&schedule).await?;
            self.single(updated)
          }
        }
      }
      Command::Delete { resource, key } => {
        self.prepare().await;
        match parse_resource(&resource)? {
          ResourceKind::Faculty => self.store.faculty.delete(&key).await?,
          ResourceKind::Courses => self.store.courses.delete(&key).await?,
          ResourceKind::Rooms => self.store.rooms.delete(&key).await?,
          ResourceKind::TimeSlots => self.store.time_slots.delete(&key).await?,
          ResourceKind::Schedules => self.store.schedules.delete_schedule(&key).await?,
        }
        Ok(format!("Deleted {}\n", key))
      }
      Command::Cache { action } => match action {
        CacheAction::Status => Ok(self.cache_status()),
        CacheAction::Clear => {
          self.store.cache().clear();
          Ok("Cache cleared\n".to_string())
        }
      },
    }
  }

  /// Load data on first use. A failed load is not fatal: reads still walk
  /// their own fallback chain.
  async fn prepare(&self) {
    if let Err(e) = self.store.init.initialize_app_data().await {
      warn!("Continuing without a full reload: {}", e);
    }
  }

  async fn list<T>(&self, service: &ResourceService<T>, refresh: bool) -> Result<String>
  where
    T: Editable + Tabular + Serialize,
  {
    let result = service.get_all_with_origin(refresh).await?;
    self.output(result)
  }

  async fn list_departmental<T>(
    &self,
    service: &ResourceService<T>,
    department: Option<&str>,
    refresh: bool,
  ) -> Result<String>
  where
    T: Editable + Departmental + Tabular + Serialize,
  {
    let result = match department {
      Some(department) => {
        service
          .get_by_department_with_origin(department, refresh)
          .await?
      }
      None => service.get_all_with_origin(refresh).await?,
    };
    self.output(result)
  }

  async fn create<T>(&self, service: &ResourceService<T>, json: &str) -> Result<String>
  where
    T: Editable + Tabular + Serialize,
  {
    let entity: T = parse_entity(json)?;
    let created = service.create(&entity).await?;
    self.single(created)
  }

  async fn update<T>(&self, service: &ResourceService<T>, json: &str) -> Result<String>
  where
    T: Editable + Tabular + Serialize,
  {
    let entity: T = parse_entity(json)?;
    let updated = service.update(&entity).await?;
    self.single(updated)
  }

  fn output<T: Tabular + Serialize>(&self, result: CacheResult<Vec<T>>) -> Result<String> {
    if self.json {
      return to_json(&result.data);
    }
    let mut out = render::table(&result.data);
    out.push_str(&format!(
      "\n{} row(s), {}\n",
      result.data.len(),
      result.origin.label()
    ));
    Ok(out)
  }

  fn single<T: Tabular + Serialize>(&self, row: T) -> Result<String> {
    if self.json {
      to_json(&row)
    } else {
      Ok(render::table(std::slice::from_ref(&row)))
    }
  }

  fn cache_status(&self) -> String {
    let cache = self.store.cache();
    let mut out = String::new();

    let updated = cache
      .last_updated()
      .map(|t| t.to_rfc3339())
      .unwrap_or_else(|| "never".to_string());
    out.push_str(&format!("Last updated: {}\n", updated));
    out.push_str(&format!("TTL: {} min\n", cache.ttl().num_minutes()));
    out.push_str(&format!(
      "Status: {}\n",
      if cache.is_expired() { "expired" } else { "fresh" }
    ));
    if let Some(at) = self.store.init.last_refreshed() {
      out.push_str(&format!("Last refresh: {}\n", at.to_rfc3339()));
    }

    for key in CacheKey::ALL {
      if key == CacheKey::LastUpdated {
        continue;
      }
      let mark = if cache.contains(key) { "cached" } else { "-" };
      out.push_str(&format!("  {:<22}{}\n", key.as_str(), mark));
    }
    out
  }
}

fn outcome_message(outcome: InitOutcome) -> String {
  match outcome {
    InitOutcome::CacheValid => "Cache is still valid, nothing to load\n",
    InitOutcome::Remote => "Loaded all data from the API\n",
    InitOutcome::Fallback => "API unreachable, loaded bundled data\n",
    InitOutcome::AlreadyRefreshing => "A refresh is already running\n",
  }
  .to_string()
}

fn parse_resource(input: &str) -> Result<ResourceKind> {
  commands::resolve(input).ok_or_else(|| {
    let names: Vec<String> = commands::get_suggestions(input)
      .iter()
      .map(|res| format!("{} ({})", res.name, res.description))
      .collect();
    if names.is_empty() {
      eyre!("Unknown resource '{}'", input)
    } else {
      eyre!("Unknown resource '{}'. Did you mean: {}", input, names.join(", "))
    }
  })
}

fn no_department(kind: ResourceKind, department: Option<&str>) -> Result<()> {
  match department {
    Some(_) => Err(eyre!("{:?} cannot be filtered by department", kind)),
    None => Ok(()),
  }
}

fn parse_entity<T: DeserializeOwned>(json: &str) -> Result<T> {
  serde_json::from_str(json).map_err(|e| eyre!("Invalid record JSON: {}", e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  let mut out =
    serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to encode output: {}", e))?;
  out.push('\n');
  Ok(out)
}
