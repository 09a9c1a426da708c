use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::handlers::{auth, exercises, health, workouts};
use crate::middleware::AuthContext;

pub fn create_router(
    auth_state: auth::AuthState,
    workouts_state: workouts::WorkoutsState,
    exercises_state: exercises::ExercisesState,
    auth_ctx: AuthContext,
) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Auth routes
        .route(
            "/api/users",
            post(auth::register).with_state(auth_state.clone()),
        )
        .route(
            "/api/users/me",
            get(auth::me)
                .patch(auth::update_me)
                .put(auth::update_me)
                .with_state(auth_state.clone()),
        )
        .route(
            "/api/sessions",
            post(auth::login)
                .delete(auth::logout)
                .with_state(auth_state),
        )
        // Workout routes
        .route(
            "/api/workouts",
            get(workouts::list)
                .post(workouts::record)
                .with_state(workouts_state.clone()),
        )
        .route(
            "/api/workouts/{date}",
            get(workouts::retrieve)
                .put(workouts::update)
                .with_state(workouts_state.clone()),
        )
        .route(
            "/api/workouts/{date}/sets",
            post(workouts::add_sets).with_state(workouts_state),
        )
        // Exercise routes
        .route(
            "/api/exercises",
            get(exercises::list)
                .post(exercises::create)
                .with_state(exercises_state.clone()),
        )
        .route(
            "/api/exercises/{id}/sets",
            get(exercises::history).with_state(exercises_state),
        )
        // Token lookup for the AuthUser extractor
        .layer(Extension(auth_ctx))
}
