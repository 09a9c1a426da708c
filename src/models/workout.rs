use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub user_id: String,
    pub workout_date: NaiveDate,
    pub location_id: Option<i64>,
    pub session_start: Option<String>,
    pub session_end: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            workout_date: row.get("workout_date")?,
            location_id: row.get("location_id")?,
            session_start: row.get("session_start")?,
            session_end: row.get("session_end")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// One recorded set, joined with its exercise name. `workout_date` is only
/// populated by the per-exercise history query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub exercise: i64,
    pub exercise_name: String,
    pub weight: String,
    pub reps: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromSqliteRow for WorkoutSet {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            exercise: row.get("exercise")?,
            exercise_name: row.get("exercise_name")?,
            weight: row.get("weight")?,
            reps: row.get("reps")?,
            // Absent from the per-workout queries.
            workout_date: row.get("workout_date").unwrap_or(None),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Wire shape of a set as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPayload {
    pub exercise: i64,
    pub reps: i64,
    pub weight: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkout {
    pub workout_date: NaiveDate,
    pub location: Option<i64>,
    #[serde(default)]
    pub sets: Vec<SetPayload>,
}

/// Whole-record update. `session_start`/`session_end` are epoch milliseconds
/// as decimal strings; when `sets` is present the stored sets are replaced.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkout {
    pub session_start: Option<String>,
    pub session_end: Option<String>,
    pub location: Option<i64>,
    pub sets: Option<Vec<SetPayload>>,
}

#[derive(Debug, Deserialize)]
pub struct AddSets {
    pub sets: Vec<SetPayload>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutDetail {
    pub id: i64,
    pub workout_date: NaiveDate,
    pub location: Option<i64>,
    pub session_start: Option<String>,
    pub session_end: Option<String>,
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutDetail {
    pub fn new(workout: Workout, sets: Vec<WorkoutSet>) -> Self {
        Self {
            id: workout.id,
            workout_date: workout.workout_date,
            location: workout.location_id,
            session_start: workout.session_start,
            session_end: workout.session_end,
            sets,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkoutListItem {
    pub id: i64,
    pub workout_date: NaiveDate,
    pub url: String,
    pub location: Option<i64>,
}
