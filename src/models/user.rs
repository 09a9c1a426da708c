use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub fit_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            fit_token: row.get("fit_token")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Partial profile update. The password pair travels together and is never
/// echoed back.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub fit_token: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl UpdateUser {
    pub fn has_profile_fields(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.email.is_some()
            || self.fit_token.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub fit_token: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            fit_token: user.fit_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_profile_fields() {
        let update = UpdateUser {
            first_name: Some("Test".to_string()),
            ..Default::default()
        };
        assert!(update.has_profile_fields());

        let password_only = UpdateUser {
            password: Some("secret".to_string()),
            password_confirmation: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(!password_only.has_profile_fields());
    }
}
