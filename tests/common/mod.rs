use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::{header, Request};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use setlog::client::{Method, RequestConfig, Transport, TransportError};
use setlog::db::{create_memory_pool, DbPool};
use setlog::handlers::{auth, exercises, workouts};
use setlog::middleware::AuthContext;
use setlog::migrations::run_migrations_for_tests;
use setlog::models::{Exercise, User};
use setlog::repositories::{
    ExerciseRepository, TokenRepository, UserRepository, WorkoutRepository,
};

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    let user_repo = UserRepository::new(pool.clone());
    let token_repo = TokenRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    let auth_state = auth::AuthState {
        user_repo: user_repo.clone(),
        token_repo: token_repo.clone(),
    };
    let workouts_state = workouts::WorkoutsState {
        workout_repo: workout_repo.clone(),
    };
    let exercises_state = exercises::ExercisesState {
        exercise_repo,
        workout_repo,
    };
    let auth_ctx = AuthContext {
        user_repo,
        token_repo,
    };

    setlog::routes::create_router(auth_state, workouts_state, exercises_state, auth_ctx)
}

pub async fn create_test_user(pool: &DbPool, email: &str, password: &str) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo
        .create("Test", "User", email, password)
        .await
        .unwrap()
}

pub async fn auth_token(pool: &DbPool, user: &User) -> String {
    let token_repo = TokenRepository::new(pool.clone());
    token_repo.create(&user.id).await.unwrap()
}

pub async fn create_test_exercise(pool: &DbPool, name: &str) -> Exercise {
    let exercise_repo = ExerciseRepository::new(pool.clone());
    exercise_repo.create(name).await.unwrap()
}

/// Issue one JSON request against the router and return (status, body).
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Drives the client core against the in-process router, standing in for a
/// real network transport.
pub struct RouterTransport {
    router: Router,
}

impl RouterTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn send(&self, request: RequestConfig) -> Result<Value, TransportError> {
        let method = match request.method {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };

        let mut builder = Request::builder().method(method).uri(&request.url);
        if let Some(token) = &request.credential {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match &request.body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?
            .to_bytes();

        if status >= 400 {
            return Err(TransportError {
                status,
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_slice(&bytes).map_err(|e| TransportError::network(e.to_string()))
        }
    }
}
