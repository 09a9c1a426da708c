use chrono::Utc;
use serde::Serialize;

use super::workout::WorkoutRecord;

/// Weight-training activity code in the external fitness service's scheme.
const ACTIVITY_WEIGHT_TRAINING: u32 = 97;

/// Payload the external fitness service expects for one recorded activity
/// session. Dispatch itself happens outside this crate; failures there are
/// not retried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySession {
    pub activity_type: u32,
    pub start_time_millis: i64,
    pub end_time_millis: i64,
    pub application: Application,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub name: String,
}

/// Derive the activity-session payload from a workout's session window.
/// Needs a known start; the end falls back to now.
pub fn activity_session(workout: &WorkoutRecord, app_name: &str) -> Option<ActivitySession> {
    let start = workout.session_start?;
    let end = workout
        .session_end
        .unwrap_or_else(|| Utc::now().timestamp_millis());

    Some(ActivitySession {
        activity_type: ACTIVITY_WEIGHT_TRAINING,
        start_time_millis: start,
        end_time_millis: end,
        application: Application {
            name: app_name.to_string(),
        },
        name: format!("{} workout", app_name),
    })
}
