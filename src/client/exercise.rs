use serde_json::from_value;

use super::aggregate::{most_recent_by_date, Set};
use super::sync::{SyncInterceptor, Syncable};
use super::transport::Method;
use super::ClientError;

/// Every set the user has logged for one exercise, across workouts. Each
/// set carries the date of the workout it belongs to.
pub struct ExerciseHistory {
    pub exercise: i64,
    pub sets: Vec<Set>,
}

impl Syncable for ExerciseHistory {
    fn resource_url(&self) -> String {
        format!("/api/exercises/{}/sets", self.exercise)
    }

    fn record_type(&self) -> &'static str {
        "exercise"
    }
}

impl ExerciseHistory {
    pub async fn fetch(sync: &SyncInterceptor, exercise: i64) -> Result<Self, ClientError> {
        let mut history = Self {
            exercise,
            sets: Vec::new(),
        };
        let response = sync.sync(&history, Method::Get, None).await?;
        history.sets = from_value(response)?;
        Ok(history)
    }

    pub fn all_sets(&self) -> &[Set] {
        &self.sets
    }

    /// The sets from the most recent workout this exercise appeared in.
    pub fn last_performed(&self) -> Vec<Set> {
        most_recent_by_date(&self.sets)
    }
}
