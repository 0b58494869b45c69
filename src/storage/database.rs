//! Database operations using rusqlite.
//!
//! Timestamps are stored as fixed-width RFC 3339 text in UTC with millisecond
//! precision, so text comparison in SQL orders the same way as time does.

use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::workouts::types::{NewWorkout, UserId, Workout, WorkoutPatch};
use chrono::{DateTime, Datelike, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const WORKOUT_COLUMNS: &str = "id, user_id, name, started_at, completed_at, created_at";

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        // Other handles on the same file may hold the write lock briefly.
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let mut db = Self { conn };
        db.initialize()?;

        tracing::info!("Opened database at {}", path.display());
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let mut db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    ///
    /// The version check and migration run under one write lock, so handles
    /// opening the same fresh file at once migrate it exactly once.
    fn initialize(&mut self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tx.execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = read_schema_version(&tx)?;

        if current_version < CURRENT_VERSION {
            migrate(&tx, current_version)?;
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Get the current schema version.
    pub fn schema_version(&self) -> Result<i32, DatabaseError> {
        read_schema_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Workout Operations ==========

    /// Insert a new workout owned by `user_id`.
    ///
    /// The id and creation time are assigned here.
    pub fn insert_workout(
        &self,
        user_id: &UserId,
        workout: &NewWorkout,
    ) -> Result<Workout, DatabaseError> {
        let stored = Workout {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            name: workout.name.clone(),
            started_at: workout.started_at.trunc_subsecs(3),
            completed_at: None,
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.conn
            .execute(
                "INSERT INTO workouts (id, user_id, name, started_at, completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
                params![
                    stored.id.to_string(),
                    stored.user_id.as_str(),
                    stored.name,
                    format_timestamp(&stored.started_at),
                    format_timestamp(&stored.created_at),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(stored)
    }

    /// Get a workout by ID, regardless of owner.
    pub fn get_workout(&self, id: &Uuid) -> Result<Option<Workout>, DatabaseError> {
        let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?1");

        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], WorkoutRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(WorkoutRow::into_workout).transpose()
    }

    /// Get a workout by ID only if `user_id` owns it.
    pub fn get_workout_for_user(
        &self,
        id: &Uuid,
        user_id: &UserId,
    ) -> Result<Option<Workout>, DatabaseError> {
        let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?1 AND user_id = ?2");

        let row = self
            .conn
            .query_row(
                &sql,
                params![id.to_string(), user_id.as_str()],
                WorkoutRow::from_row,
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(WorkoutRow::into_workout).transpose()
    }

    /// List a user's workouts with `start <= started_at < end`.
    ///
    /// No ordering is applied.
    pub fn find_workouts_in_range(
        &self,
        user_id: &UserId,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<Workout>, DatabaseError> {
        let sql = format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts
             WHERE user_id = ?1 AND started_at >= ?2 AND started_at < ?3"
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![
                    user_id.as_str(),
                    format_range_bound(start),
                    format_range_bound(end)
                ],
                WorkoutRow::from_row,
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut workouts = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            workouts.push(row.into_workout()?);
        }

        Ok(workouts)
    }

    /// Apply a patch to the workout matching both `id` and `user_id`.
    ///
    /// Returns whether a row matched. No match is not an error.
    pub fn update_workout(
        &self,
        id: &Uuid,
        user_id: &UserId,
        patch: &WorkoutPatch,
    ) -> Result<bool, DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE workouts
                 SET name = COALESCE(?3, name), started_at = COALESCE(?4, started_at)
                 WHERE id = ?1 AND user_id = ?2",
                params![
                    id.to_string(),
                    user_id.as_str(),
                    patch.name,
                    patch.started_at.as_ref().map(format_timestamp),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(rows_affected > 0)
    }

    /// Count workouts owned by a user.
    pub fn count_workouts(&self, user_id: &UserId) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM workouts WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

fn read_schema_version(conn: &Connection) -> Result<i32, DatabaseError> {
    let result: SqliteResult<i32> = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    );

    match result {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
    }
}

/// Run database migrations.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), DatabaseError> {
    if from_version < 1 {
        conn.execute_batch(SCHEMA)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![CURRENT_VERSION, format_timestamp(&Utc::now())],
        )
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        tracing::info!("Database migrated to version {}", CURRENT_VERSION);
    }

    Ok(())
}

/// Render a timestamp in the stored text form.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a range bound, clamped to the four-digit years the stored form
/// can order correctly.
fn format_range_bound(dt: &DateTime<Utc>) -> String {
    match dt.year() {
        year if year < 0 => "0000-01-01T00:00:00.000Z".to_string(),
        year if year > 9999 => "9999-12-31T23:59:59.999Z".to_string(),
        _ => format_timestamp(dt),
    }
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid {}: {}", column, e)))
}

/// Intermediate struct for reading workout rows from database.
struct WorkoutRow {
    id: String,
    user_id: String,
    name: Option<String>,
    started_at: String,
    completed_at: Option<String>,
    created_at: String,
}

impl WorkoutRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            started_at: row.get(3)?,
            completed_at: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_workout(self) -> Result<Workout, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let completed_at = self
            .completed_at
            .map(|s| parse_timestamp(&s, "completed_at"))
            .transpose()?;

        Ok(Workout {
            id,
            user_id: UserId::new(self.user_id),
            name: self.name,
            started_at: parse_timestamp(&self.started_at, "started_at")?,
            completed_at,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
        })
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
