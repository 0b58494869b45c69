//! LiftTrack - Workout Log
//!
//! A self-hosted workout log. Users record workouts, list the ones they
//! started on a given day, and edit their own records. Every read and write
//! is scoped to the owning user.

pub mod actions;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use actions::{ActionOutcome, Rejection, WorkoutForm};
pub use storage::config::AppConfig;
pub use storage::database::{Database, DatabaseError};
pub use workouts::access::WorkoutAccess;
pub use workouts::types::{NewWorkout, UserId, Workout, WorkoutPatch};
