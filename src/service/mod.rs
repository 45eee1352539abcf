//! Data-access services: one per resource, each walking cache, API and
//! bundled snapshot in a fixed order.

mod resource;
mod schedule;
mod source;

pub use resource::ResourceService;
pub use schedule::ScheduleService;
pub use source::Source;

use crate::model::{Course, Faculty, Room, TimeSlot};

pub type FacultyService = ResourceService<Faculty>;
pub type CourseService = ResourceService<Course>;
pub type RoomService = ResourceService<Room>;
pub type TimeSlotService = ResourceService<TimeSlot>;
