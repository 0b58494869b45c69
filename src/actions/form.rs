//! Workout form validation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workouts::types::{NewWorkout, WorkoutPatch, MAX_NAME_LEN};

/// Raw workout form as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutForm {
    /// Optional label; empty means absent
    #[serde(default)]
    pub name: Option<String>,
    /// RFC 3339 datetime
    #[serde(default)]
    pub started_at: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidWorkout {
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl From<ValidWorkout> for NewWorkout {
    fn from(valid: ValidWorkout) -> Self {
        NewWorkout::new(valid.name, valid.started_at)
    }
}

impl From<ValidWorkout> for WorkoutPatch {
    fn from(valid: ValidWorkout) -> Self {
        WorkoutPatch {
            name: valid.name,
            ..WorkoutPatch::started_at(valid.started_at)
        }
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Invalid input.")]
pub struct ValidationErrors {
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for a field.
    pub fn field(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }
}

impl WorkoutForm {
    /// Build a form from its parts.
    pub fn new(name: Option<&str>, started_at: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            started_at: started_at.to_string(),
        }
    }

    /// Check shapes and ranges, normalizing an empty name to absent.
    pub fn validate(&self) -> Result<ValidWorkout, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if let Some(name) = &self.name {
            if name.chars().count() > MAX_NAME_LEN {
                errors.add(
                    "name",
                    format!("Must contain at most {} character(s)", MAX_NAME_LEN),
                );
            }
        }

        let started_at = if self.started_at.trim().is_empty() {
            errors.add("startedAt", "Required");
            None
        } else {
            match DateTime::parse_from_rfc3339(self.started_at.trim()) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(_) => {
                    errors.add("startedAt", "Invalid datetime");
                    None
                }
            }
        };

        match started_at {
            Some(started_at) if errors.is_empty() => Ok(ValidWorkout {
                name: self.name.clone().filter(|name| !name.is_empty()),
                started_at,
            }),
            _ => Err(errors),
        }
    }
}
