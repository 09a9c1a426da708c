use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::CreateExercise;
use crate::repositories::{ExerciseRepository, WorkoutRepository};

#[derive(Clone)]
pub struct ExercisesState {
    pub exercise_repo: ExerciseRepository,
    pub workout_repo: WorkoutRepository,
}

pub async fn list(State(state): State<ExercisesState>, _auth_user: AuthUser) -> Result<Response> {
    let exercises = state.exercise_repo.find_all().await?;
    Ok(Json(exercises).into_response())
}

pub async fn create(
    State(state): State<ExercisesState>,
    _auth_user: AuthUser,
    Json(form): Json<CreateExercise>,
) -> Result<Response> {
    if form.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if state
        .exercise_repo
        .find_by_name(&form.name)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("Exercise already exists".to_string()));
    }

    let exercise = state.exercise_repo.create(&form.name).await?;

    Ok((StatusCode::CREATED, Json(exercise)).into_response())
}

/// Every set the caller has logged for one exercise, across workouts. Rows
/// carry their workout_date so the client can pick out the latest session.
pub async fn history(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response> {
    state
        .exercise_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    let sets = state.workout_repo.sets_for_exercise(&auth_user.id, id).await?;

    Ok(Json(sets).into_response())
}
