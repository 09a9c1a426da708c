use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, SetPayload, Workout, WorkoutSet};

const SET_COLUMNS: &str = "s.id, s.exercise_id AS exercise, e.name AS exercise_name,
        s.weight, s.reps, s.created_at, s.updated_at";

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        date: NaiveDate,
        location_id: Option<i64>,
        sets: Vec<SetPayload>,
    ) -> Result<(Workout, Vec<WorkoutSet>)> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workouts (user_id, workout_date, location_id, created_at)
                 VALUES (?, ?, ?, ?)",
                rusqlite::params![user_id, date, location_id, now],
            )?;
            let workout_id = conn.last_insert_rowid();

            insert_sets(&conn, workout_id, &sets)?;

            let workout = Workout {
                id: workout_id,
                user_id,
                workout_date: date,
                location_id,
                session_start: None,
                session_end: None,
                created_at: now,
            };
            let sets = sets_for_workout(&conn, workout_id)?;
            Ok((workout, sets))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_user_and_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Workout>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT * FROM workouts WHERE user_id = ? AND workout_date = ?")?;
            let result = stmt
                .query_row(rusqlite::params![user_id, date], Workout::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn
                .prepare("SELECT * FROM workouts WHERE user_id = ? ORDER BY workout_date DESC")?;
            let workouts = stmt
                .query_map([&user_id], Workout::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(workouts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn sets_for_workout(&self, workout_id: i64) -> Result<Vec<WorkoutSet>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            sets_for_workout(&conn, workout_id)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Append sets to an existing workout, returning the full stored list.
    pub async fn add_sets(&self, workout_id: i64, sets: Vec<SetPayload>) -> Result<Vec<WorkoutSet>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            insert_sets(&conn, workout_id, &sets)?;
            sets_for_workout(&conn, workout_id)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Whole-record update: session window, location and (when given) a full
    /// replacement of the stored sets.
    pub async fn update(
        &self,
        workout_id: i64,
        session_start: Option<String>,
        session_end: Option<String>,
        location_id: Option<i64>,
        sets: Option<Vec<SetPayload>>,
    ) -> Result<Vec<WorkoutSet>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;

            let mut clauses = Vec::new();
            let mut params: Vec<&dyn rusqlite::ToSql> = Vec::new();
            if let Some(value) = &session_start {
                clauses.push("session_start = ?");
                params.push(value);
            }
            if let Some(value) = &session_end {
                clauses.push("session_end = ?");
                params.push(value);
            }
            if let Some(value) = &location_id {
                clauses.push("location_id = ?");
                params.push(value);
            }

            if !clauses.is_empty() {
                let query = format!("UPDATE workouts SET {} WHERE id = ?", clauses.join(", "));
                params.push(&workout_id);
                conn.execute(&query, &params[..])?;
            }

            if let Some(sets) = &sets {
                conn.execute("DELETE FROM sets WHERE workout_id = ?", [workout_id])?;
                insert_sets(&conn, workout_id, sets)?;
            }

            sets_for_workout(&conn, workout_id)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Every set a user has recorded for one exercise, across workouts,
    /// each row carrying its workout_date.
    pub async fn sets_for_exercise(
        &self,
        user_id: &str,
        exercise_id: i64,
    ) -> Result<Vec<WorkoutSet>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {SET_COLUMNS}, w.workout_date
                 FROM sets s
                 JOIN exercises e ON s.exercise_id = e.id
                 JOIN workouts w ON s.workout_id = w.id
                 WHERE w.user_id = ? AND s.exercise_id = ?
                 ORDER BY w.workout_date, s.id"
            ))?;
            let sets = stmt
                .query_map(rusqlite::params![user_id, exercise_id], WorkoutSet::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sets)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn insert_sets(conn: &Connection, workout_id: i64, sets: &[SetPayload]) -> Result<()> {
    let now = Utc::now();
    let mut stmt = conn.prepare(
        "INSERT INTO sets (workout_id, exercise_id, reps, weight, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )?;
    for set in sets {
        stmt.execute(rusqlite::params![
            workout_id, set.exercise, set.reps, set.weight, now, now
        ])?;
    }
    Ok(())
}

fn sets_for_workout(conn: &Connection, workout_id: i64) -> Result<Vec<WorkoutSet>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SET_COLUMNS}
         FROM sets s
         JOIN exercises e ON s.exercise_id = e.id
         WHERE s.workout_id = ?
         ORDER BY s.id"
    ))?;
    let sets = stmt
        .query_map([workout_id], WorkoutSet::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(sets)
}
