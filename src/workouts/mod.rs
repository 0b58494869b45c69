//! Workout records and ownership-scoped access to them.

pub mod access;
pub mod calendar;
pub mod types;

pub use access::WorkoutAccess;
pub use calendar::{parse_date_param, today_in, DayWindow};
pub use types::{NewWorkout, UserId, Workout, WorkoutPatch, MAX_NAME_LEN};
