//! Scheduling entities and the traits that tie them to cache keys and endpoints.

mod resource;
mod types;

pub use resource::{Departmental, Editable, Resource};
pub use types::{Course, CourseSchedule, Faculty, Room, ScheduleView, TimeSlot};
pub(crate) use types::{opt_string_or_number, string_or_number};
