//! Plain-text tables for command output.

use crate::model::{Course, CourseSchedule, Faculty, Room, ScheduleView, TimeSlot};

/// Widest a single cell may get before it is truncated
pub const MAX_CELL_WIDTH: usize = 32;

/// Rows that can be printed as a table
pub trait Tabular {
  fn headers() -> &'static [&'static str];
  fn cells(&self) -> Vec<String>;
}

/// Truncate a string to a maximum length in characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Render rows as left-aligned columns under a header line.
pub fn table<T: Tabular>(rows: &[T]) -> String {
  let headers = T::headers();
  let body: Vec<Vec<String>> = rows
    .iter()
    .map(|row| {
      row
        .cells()
        .iter()
        .map(|cell| truncate(cell, MAX_CELL_WIDTH))
        .collect()
    })
    .collect();

  let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
  for row in &body {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  push_line(&mut out, headers.iter().map(|h| h.to_string()), &widths);
  for row in body {
    push_line(&mut out, row.into_iter(), &widths);
  }
  out
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
  let line: Vec<String> = cells
    .zip(widths)
    .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
    .collect();
  out.push_str(line.join("  ").trim_end());
  out.push('\n');
}

fn opt(value: &Option<String>) -> String {
  value.clone().unwrap_or_default()
}

impl Tabular for Faculty {
  fn headers() -> &'static [&'static str] {
    &["ID", "NAME", "DEPARTMENT", "EMAIL", "CONTACT"]
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.faculty_id.clone(),
      self.name.clone(),
      self.department.clone(),
      opt(&self.email),
      opt(&self.contact_number),
    ]
  }
}

impl Tabular for Course {
  fn headers() -> &'static [&'static str] {
    &["CODE", "NAME", "TYPE", "DEPARTMENT"]
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.course_code.clone(),
      self.course_name.clone(),
      opt(&self.course_type),
      self.department.clone(),
    ]
  }
}

impl Tabular for Room {
  fn headers() -> &'static [&'static str] {
    &["ROOM", "BUILDING", "CAPACITY", "EQUIPMENT"]
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.room_number.clone(),
      opt(&self.building),
      self.capacity.map(|c| c.to_string()).unwrap_or_default(),
      opt(&self.equipment),
    ]
  }
}

impl Tabular for TimeSlot {
  fn headers() -> &'static [&'static str] {
    &["SLOT", "START", "END"]
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.slot_id.clone(),
      self.start_time.clone(),
      self.end_time.clone(),
    ]
  }
}

impl Tabular for CourseSchedule {
  fn headers() -> &'static [&'static str] {
    &["ID", "COURSE", "FACULTY", "ROOM", "DAY", "SLOT", "SEMESTER", "YEAR"]
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.schedule_id.clone(),
      opt(&self.course_code),
      opt(&self.faculty_id),
      opt(&self.room_number),
      self.day_of_week.clone(),
      opt(&self.time_slot_id),
      opt(&self.semester),
      opt(&self.academic_year),
    ]
  }
}

impl Tabular for ScheduleView {
  fn headers() -> &'static [&'static str] {
    &["ID", "FACULTY", "DEPARTMENT", "COURSE", "ROOM", "DAY", "TIME", "SEMESTER"]
  }

  fn cells(&self) -> Vec<String> {
    let time = match (&self.start_time, &self.end_time) {
      (Some(start), Some(end)) => format!("{}-{}", start, end),
      (Some(start), None) => start.clone(),
      _ => String::new(),
    };
    let room = match (&self.room_number, &self.building) {
      (Some(room), Some(building)) => format!("{} ({})", room, building),
      (Some(room), None) => room.clone(),
      _ => String::new(),
    };
    vec![
      self.schedule_id.clone(),
      self.faculty_name.clone(),
      self.department.clone(),
      opt(&self.course_name),
      room,
      self.day_of_week.clone(),
      time,
      opt(&self.semester),
    ]
  }
}
