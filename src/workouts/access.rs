//! Ownership-scoped access to workout records.
//!
//! Every call takes the already-authenticated user and issues exactly one
//! store statement filtered by that user.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use uuid::Uuid;

use crate::storage::database::{Database, DatabaseError};
use crate::workouts::calendar::DayWindow;
use crate::workouts::types::{NewWorkout, UserId, Workout, WorkoutPatch};

/// Access layer over the workout store.
pub struct WorkoutAccess<'a> {
    db: &'a Database,
    day_offset: FixedOffset,
}

impl<'a> WorkoutAccess<'a> {
    /// Create an access layer that splits days in `day_offset`.
    pub fn new(db: &'a Database, day_offset: FixedOffset) -> Self {
        Self { db, day_offset }
    }

    /// Create an access layer that splits days at UTC midnight.
    pub fn utc(db: &'a Database) -> Self {
        Self::new(db, Utc.fix())
    }

    /// Log a new workout for `user_id`.
    pub fn create_workout_for_user(
        &self,
        user_id: &UserId,
        workout: &NewWorkout,
    ) -> Result<Workout, DatabaseError> {
        let created = self.db.insert_workout(user_id, workout)?;
        tracing::debug!(user = %user_id, workout = %created.id, "Created workout");
        Ok(created)
    }

    /// Fetch a workout owned by `user_id`.
    ///
    /// Returns `None` both when the id is unknown and when another user owns
    /// it.
    pub fn get_workout_by_id_for_user(
        &self,
        user_id: &UserId,
        workout_id: &Uuid,
    ) -> Result<Option<Workout>, DatabaseError> {
        let workout = self.db.get_workout_for_user(workout_id, user_id)?;

        tracing::debug!(
            user = %user_id,
            workout = %workout_id,
            found = workout.is_some(),
            "Fetched workout"
        );
        Ok(workout)
    }

    /// List the workouts `user_id` started on `date`.
    ///
    /// The order of the returned workouts is unspecified.
    pub fn get_workouts_for_user_on_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<Workout>, DatabaseError> {
        let window = DayWindow::for_date(date, self.day_offset);
        let workouts = self
            .db
            .find_workouts_in_range(user_id, &window.start, &window.end)?;

        tracing::debug!(user = %user_id, %date, count = workouts.len(), "Listed workouts for day");
        Ok(workouts)
    }

    /// Number of workouts `user_id` has logged in total.
    pub fn count_workouts_for_user(&self, user_id: &UserId) -> Result<usize, DatabaseError> {
        self.db.count_workouts(user_id)
    }

    /// Apply `patch` to a workout owned by `user_id`.
    ///
    /// Unknown or foreign ids leave every record untouched and return
    /// `Ok(false)`.
    pub fn update_workout_for_user(
        &self,
        user_id: &UserId,
        workout_id: &Uuid,
        patch: &WorkoutPatch,
    ) -> Result<bool, DatabaseError> {
        let matched = self.db.update_workout(workout_id, user_id, patch)?;

        if matched {
            tracing::debug!(user = %user_id, workout = %workout_id, "Updated workout");
        } else {
            tracing::warn!(user = %user_id, workout = %workout_id, "Update matched no owned workout");
        }
        Ok(matched)
    }
}
