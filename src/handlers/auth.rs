use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateUser, Credentials, UpdateUser, UserResponse};
use crate::repositories::{TokenRepository, UserRepository};

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
    pub token_repo: TokenRepository,
}

#[derive(Serialize)]
struct SessionResponse {
    token: String,
    first_name: String,
    last_name: String,
    email: String,
}

pub async fn register(
    State(state): State<AuthState>,
    Json(form): Json<CreateUser>,
) -> Result<Response> {
    if form.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if form.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if state.user_repo.find_by_email(&form.email).await?.is_some() {
        return Err(AppError::Validation(
            "Email is already registered".to_string(),
        ));
    }

    let user = state
        .user_repo
        .create(&form.first_name, &form.last_name, &form.email, &form.password)
        .await?;

    tracing::info!("Registered user {}", user.email);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}

pub async fn login(
    State(state): State<AuthState>,
    Json(credentials): Json<Credentials>,
) -> Result<Response> {
    let user = state
        .user_repo
        .verify_password(&credentials.email, &credentials.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = state.token_repo.create(&user.id).await?;

    Ok(Json(SessionResponse {
        token,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
    })
    .into_response())
}

pub async fn logout(State(state): State<AuthState>, auth_user: AuthUser) -> Result<Response> {
    state.token_repo.delete(&auth_user.token).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn me(State(state): State<AuthState>, auth_user: AuthUser) -> Result<Response> {
    let user = state
        .user_repo
        .find_by_id(&auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    Ok(Json(UserResponse::from(user)).into_response())
}

/// Partial profile update. A password change is accepted only when both
/// password fields match, and revokes every other live token for the user.
pub async fn update_me(
    State(state): State<AuthState>,
    auth_user: AuthUser,
    Json(update): Json<UpdateUser>,
) -> Result<Response> {
    if let Some(password) = &update.password {
        if update.password_confirmation.as_deref() != Some(password.as_str()) {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        if password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        state.user_repo.update_password(&auth_user.id, password).await?;
        state
            .token_repo
            .delete_all_for_user_except(&auth_user.id, &auth_user.token)
            .await?;

        tracing::info!("Password changed for user {}", auth_user.email);
    }

    let user = state
        .user_repo
        .update_profile(&auth_user.id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Not Found".to_string()))?;

    Ok(Json(UserResponse::from(user)).into_response())
}
