//! Workout record types.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a workout name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Identifier of an authenticated user.
///
/// Opaque to this crate: whatever the identity provider hands out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single logged workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: UserId,
    /// Optional display label
    pub name: Option<String>,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the session was marked finished
    pub completed_at: Option<DateTime<Utc>>,
    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
}

impl Workout {
    /// Name to show when the workout has none.
    pub const UNTITLED: &'static str = "Untitled Workout";

    /// Display title, falling back to [`Workout::UNTITLED`].
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::UNTITLED)
    }
}

/// Fields supplied when logging a new workout.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl NewWorkout {
    /// Create a new workout description.
    pub fn new(name: Option<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            name,
            started_at: started_at.trunc_subsecs(3),
        }
    }
}

/// Partial change applied by an update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutPatch {
    pub name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl WorkoutPatch {
    /// Patch that only renames.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            started_at: None,
        }
    }

    /// Patch that only moves the start time.
    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            started_at: Some(started_at.trunc_subsecs(3)),
        }
    }
}
