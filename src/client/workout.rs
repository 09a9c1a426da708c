use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::aggregate::{group_by_exercise, ExerciseGroup, Set};
use super::events::{EventChannel, EVENT_SAVE};
use super::sync::{SyncInterceptor, Syncable};
use super::transport::Method;
use super::ClientError;

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn workout_url(date: NaiveDate) -> String {
    format!("/api/workouts/{}", date.format("%Y-%m-%d"))
}

/// Server shape of a workout, as returned by the workout resource.
#[derive(Debug, Deserialize)]
struct WorkoutDetail {
    #[allow(dead_code)]
    id: i64,
    workout_date: NaiveDate,
    location: Option<i64>,
    session_start: Option<String>,
    session_end: Option<String>,
    sets: Vec<Set>,
}

/// One workout under edit: its sets, the derived session window and the
/// derived summary group. Times are epoch milliseconds.
pub struct WorkoutRecord {
    pub workout_date: NaiveDate,
    pub location: Option<i64>,
    pub sets: Vec<Set>,
    pub session_start: Option<i64>,
    pub session_end: Option<i64>,
    summary: Option<ExerciseGroup>,
    events: Arc<EventChannel>,
}

impl Syncable for WorkoutRecord {
    fn resource_url(&self) -> String {
        workout_url(self.workout_date)
    }

    fn record_type(&self) -> &'static str {
        "workout"
    }
}

/// Probe for fetching by date before any record exists locally.
struct WorkoutRef(NaiveDate);

impl Syncable for WorkoutRef {
    fn resource_url(&self) -> String {
        workout_url(self.0)
    }

    fn record_type(&self) -> &'static str {
        "workout"
    }
}

impl WorkoutRecord {
    /// A fresh record. The session clock starts here: `session_start`
    /// defaults to now when not supplied later by the server.
    pub fn new(workout_date: NaiveDate, location: Option<i64>, sets: Vec<Set>) -> Self {
        Self {
            workout_date,
            location,
            sets,
            session_start: Some(now_millis()),
            session_end: None,
            summary: None,
            events: Arc::new(EventChannel::new("workout")),
        }
    }

    /// Retrieve a workout by date. A 404 is an explicit absence, not an
    /// error.
    pub async fn fetch(
        sync: &SyncInterceptor,
        date: NaiveDate,
    ) -> Result<Option<Self>, ClientError> {
        let response = match sync.sync(&WorkoutRef(date), Method::Get, None).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let detail: WorkoutDetail = serde_json::from_value(response)?;
        Ok(Some(Self::from_detail(detail)))
    }

    fn from_detail(detail: WorkoutDetail) -> Self {
        let parse_millis =
            |value: Option<String>| value.and_then(|value| value.parse::<i64>().ok());
        Self {
            workout_date: detail.workout_date,
            location: detail.location,
            sets: detail.sets,
            session_start: parse_millis(detail.session_start).or_else(|| Some(now_millis())),
            session_end: parse_millis(detail.session_end),
            summary: None,
            events: Arc::new(EventChannel::new("workout")),
        }
    }

    /// Create the workout server-side. The server owns set ids, so the
    /// returned sets replace the local ones. A second workout on the same
    /// date is rejected with 400.
    pub async fn record(&mut self, sync: &SyncInterceptor) -> Result<(), ClientError> {
        let body = json!({
            "workout_date": self.workout_date.format("%Y-%m-%d").to_string(),
            "location": self.location,
            "sets": self.set_payloads(),
        });

        let response = sync
            .dispatch(self, Method::Post, "/api/workouts", Some(body))
            .await?;

        let detail: WorkoutDetail = serde_json::from_value(response)?;
        self.sets = detail.sets;
        self.summary = None;
        Ok(())
    }

    /// Append sets to the existing workout and adopt the full stored list.
    pub async fn add_sets(
        &mut self,
        sync: &SyncInterceptor,
        sets: Vec<Set>,
    ) -> Result<(), ClientError> {
        let payloads: Vec<Value> = sets
            .iter()
            .map(|set| json!({ "exercise": set.exercise, "reps": set.reps, "weight": set.weight }))
            .collect();
        let url = format!("{}/sets", self.resource_url());

        let response = sync
            .dispatch(self, Method::Post, &url, Some(json!({ "sets": payloads })))
            .await?;

        #[derive(Deserialize)]
        struct AddSetsResponse {
            sets: Vec<Set>,
        }
        let response: AddSetsResponse = serde_json::from_value(response)?;
        self.sets = response.sets;
        self.summary = None;
        Ok(())
    }

    /// Whole-record update against the workout resource. The start of the
    /// session window stays fixed; the end defaults to now. Fires a local
    /// `save` event on success.
    pub async fn save(&mut self, sync: &SyncInterceptor) -> Result<(), ClientError> {
        let start = *self.session_start.get_or_insert_with(now_millis);
        let end = *self.session_end.get_or_insert_with(now_millis);

        let body = json!({
            "workout_date": self.workout_date.format("%Y-%m-%d").to_string(),
            "session_start": start.to_string(),
            "session_end": end.to_string(),
            "sets": self.set_payloads(),
        });

        sync.sync(self, Method::Put, Some(body)).await?;

        self.events.trigger(
            EVENT_SAVE,
            &json!({ "workout_date": self.workout_date.format("%Y-%m-%d").to_string() }),
        );
        Ok(())
    }

    /// The workout's sets as exercise groups, first-appearance order.
    pub fn exercises(&self) -> Vec<ExerciseGroup> {
        group_by_exercise(&self.sets)
    }

    /// Pick the group with the most sets as the workout's summary. Ties go
    /// to the earlier first appearance. Local only; never synced.
    pub fn summarise(&mut self) -> Option<&ExerciseGroup> {
        let mut best: Option<ExerciseGroup> = None;
        for group in self.exercises() {
            match &best {
                Some(current) if group.sets.len() <= current.sets.len() => {}
                _ => best = Some(group),
            }
        }
        self.summary = best;
        self.summary.as_ref()
    }

    pub fn summary(&self) -> Option<&ExerciseGroup> {
        self.summary.as_ref()
    }

    /// Subscribe to local record events (`save`).
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    fn set_payloads(&self) -> Vec<Value> {
        self.sets
            .iter()
            .map(|set| json!({ "exercise": set.exercise, "reps": set.reps, "weight": set.weight }))
            .collect()
    }
}
