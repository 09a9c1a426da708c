use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{AddSets, CreateWorkout, UpdateWorkout, WorkoutDetail, WorkoutListItem};
use crate::repositories::WorkoutRepository;

#[derive(Clone)]
pub struct WorkoutsState {
    pub workout_repo: WorkoutRepository,
}

/// Record a new workout. One workout per user per calendar date; the
/// check-then-create here is racy under concurrent requests from the same
/// user, which we accept.
pub async fn record(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Json(form): Json<CreateWorkout>,
) -> Result<Response> {
    let existing = state
        .workout_repo
        .find_by_user_and_date(&auth_user.id, form.workout_date)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation(
            "Cannot duplicate the workout_date".to_string(),
        ));
    }

    let (workout, sets) = state
        .workout_repo
        .create(&auth_user.id, form.workout_date, form.location, form.sets)
        .await?;

    tracing::debug!(
        "Recorded workout {} for {}",
        workout.workout_date,
        auth_user.email
    );

    Ok((StatusCode::CREATED, Json(WorkoutDetail::new(workout, sets))).into_response())
}

pub async fn list(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
) -> Result<Response> {
    let workouts = state.workout_repo.list_by_user(&auth_user.id).await?;

    let items: Vec<WorkoutListItem> = workouts
        .into_iter()
        .map(|workout| WorkoutListItem {
            id: workout.id,
            workout_date: workout.workout_date,
            url: format!("/api/workouts/{}", workout.workout_date),
            location: workout.location_id,
        })
        .collect();

    Ok(Json(items).into_response())
}

pub async fn retrieve(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(date): Path<NaiveDate>,
) -> Result<Response> {
    let workout = state
        .workout_repo
        .find_by_user_and_date(&auth_user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    let sets = state.workout_repo.sets_for_workout(workout.id).await?;

    Ok(Json(WorkoutDetail::new(workout, sets)).into_response())
}

/// Whole-record update against an existing workout. The workout identity
/// (date) must already exist; this never creates.
pub async fn update(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(date): Path<NaiveDate>,
    Json(form): Json<UpdateWorkout>,
) -> Result<Response> {
    let workout = state
        .workout_repo
        .find_by_user_and_date(&auth_user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    let sets = state
        .workout_repo
        .update(
            workout.id,
            form.session_start,
            form.session_end,
            form.location,
            form.sets,
        )
        .await?;

    let workout = state
        .workout_repo
        .find_by_user_and_date(&auth_user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    Ok(Json(WorkoutDetail::new(workout, sets)).into_response())
}

pub async fn add_sets(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(date): Path<NaiveDate>,
    Json(form): Json<AddSets>,
) -> Result<Response> {
    let workout = state
        .workout_repo
        .find_by_user_and_date(&auth_user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    let sets = state.workout_repo.add_sets(workout.id, form.sets).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": workout.id,
            "workout_date": workout.workout_date,
            "sets": sets,
        })),
    )
        .into_response())
}
