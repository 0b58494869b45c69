//! Request-level workout actions.
//!
//! Each action validates its input, then checks that a user was resolved,
//! then makes a single access-layer call. Validation and authentication
//! failures come back as [`Rejection`]s; storage failures propagate as
//! [`DatabaseError`].

pub mod form;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::storage::database::DatabaseError;
use crate::workouts::access::WorkoutAccess;
use crate::workouts::calendar::{format_date_param, parse_date_param};
use crate::workouts::types::{UserId, Workout};

pub use form::{ValidWorkout, ValidationErrors, WorkoutForm};

/// Why an action refused to run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("Unauthorized.")]
    Unauthorized,
}

/// Result of an action that reached a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome<T> {
    Success(T),
    Rejected(Rejection),
}

impl<T> ActionOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success(_))
    }

    /// The success value, if any.
    pub fn success(self) -> Option<T> {
        match self {
            ActionOutcome::Success(value) => Some(value),
            ActionOutcome::Rejected(_) => None,
        }
    }

    /// The rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ActionOutcome::Success(_) => None,
            ActionOutcome::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Log a workout for the signed-in user.
pub fn create_workout(
    access: &WorkoutAccess<'_>,
    user: Option<&UserId>,
    form: &WorkoutForm,
) -> Result<ActionOutcome<Workout>, DatabaseError> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return Ok(ActionOutcome::Rejected(errors.into())),
    };

    let Some(user) = user else {
        return Ok(ActionOutcome::Rejected(Rejection::Unauthorized));
    };

    let workout = access.create_workout_for_user(user, &valid.into())?;
    Ok(ActionOutcome::Success(workout))
}

/// Edit one of the signed-in user's workouts.
///
/// Succeeds with `false` when the id is malformed, unknown, or not owned by
/// the user; nothing is changed in that case.
pub fn update_workout(
    access: &WorkoutAccess<'_>,
    user: Option<&UserId>,
    workout_id: &str,
    form: &WorkoutForm,
) -> Result<ActionOutcome<bool>, DatabaseError> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return Ok(ActionOutcome::Rejected(errors.into())),
    };

    let Some(user) = user else {
        return Ok(ActionOutcome::Rejected(Rejection::Unauthorized));
    };

    let Ok(workout_id) = Uuid::parse_str(workout_id.trim()) else {
        tracing::debug!(user = %user, "Ignoring update for malformed workout id");
        return Ok(ActionOutcome::Success(false));
    };

    let matched = access.update_workout_for_user(user, &workout_id, &valid.into())?;
    Ok(ActionOutcome::Success(matched))
}

/// Prefilled values for the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDefaults {
    /// Current name, empty if absent
    pub name: String,
    /// `YYYY-MM-DDTHH:MM` in UTC
    pub started_at: String,
}

impl EditDefaults {
    pub fn from_workout(workout: &Workout) -> Self {
        Self {
            name: workout.name.clone().unwrap_or_default(),
            started_at: workout.started_at.format("%Y-%m-%dT%H:%M").to_string(),
        }
    }
}

/// What the edit page should render.
#[derive(Debug, Clone, PartialEq)]
pub enum EditPage {
    Unauthorized,
    NotFound,
    Found {
        workout: Workout,
        defaults: EditDefaults,
    },
}

/// Load a workout for editing.
pub fn load_edit_page(
    access: &WorkoutAccess<'_>,
    user: Option<&UserId>,
    workout_id: &str,
) -> Result<EditPage, DatabaseError> {
    let Some(user) = user else {
        return Ok(EditPage::Unauthorized);
    };

    let Ok(workout_id) = Uuid::parse_str(workout_id.trim()) else {
        return Ok(EditPage::NotFound);
    };

    Ok(match access.get_workout_by_id_for_user(user, &workout_id)? {
        Some(workout) => EditPage::Found {
            defaults: EditDefaults::from_workout(&workout),
            workout,
        },
        None => EditPage::NotFound,
    })
}

/// Workouts logged on the selected day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    /// Sorted by start time
    pub workouts: Vec<Workout>,
}

impl Dashboard {
    /// Heading date such as `1st Mar 2024`.
    pub fn display_date(&self) -> String {
        format!(
            "{}{} {}",
            self.date.day(),
            ordinal_suffix(self.date.day()),
            self.date.format("%b %Y")
        )
    }

    /// The selected date as a `YYYY-MM-DD` parameter.
    pub fn date_param(&self) -> String {
        format_date_param(self.date)
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Load the dashboard for the date in `date_param`, or `today` if the
/// parameter is absent or malformed.
pub fn load_dashboard(
    access: &WorkoutAccess<'_>,
    user: Option<&UserId>,
    date_param: Option<&str>,
    today: NaiveDate,
) -> Result<ActionOutcome<Dashboard>, DatabaseError> {
    let Some(user) = user else {
        return Ok(ActionOutcome::Rejected(Rejection::Unauthorized));
    };

    let date = parse_date_param(date_param, today);
    let mut workouts = access.get_workouts_for_user_on_date(user, date)?;
    workouts.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));

    Ok(ActionOutcome::Success(Dashboard { date, workouts }))
}
