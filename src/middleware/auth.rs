use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::repositories::{TokenRepository, UserRepository};

/// Repositories the extractor needs, installed as an Extension layer on the
/// router.
#[derive(Clone)]
pub struct AuthContext {
    pub user_repo: UserRepository,
    pub token_repo: TokenRepository,
}

/// The authenticated caller, resolved from an `Authorization: Bearer` token.
/// Expired and unknown tokens are rejected with 401.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::Internal("AuthContext not installed".to_string()))?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let user_id = ctx
            .token_repo
            .find_valid(&token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = ctx
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            token,
        })
    }
}
