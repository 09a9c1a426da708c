use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, UpdateUser, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?")?;
            let result = stmt.query_row([&id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let email = email.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?")?;
            let result = stmt.query_row([&email], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let password_hash = hash_password(password)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password_hash,
            fit_token: None,
            created_at: Utc::now(),
        };
        let user_clone = user.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    user_clone.id,
                    user_clone.first_name,
                    user_clone.last_name,
                    user_clone.email,
                    user_clone.password_hash,
                    user_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(user)
    }

    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = self.find_by_email(email).await?;

        match user {
            Some(user) => {
                if verify_password(password, &user.password_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Apply the profile fields of a partial update. Password fields are
    /// handled separately by `update_password`.
    pub async fn update_profile(&self, id: &str, update: &UpdateUser) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let first_name = update.first_name.clone();
        let last_name = update.last_name.clone();
        let email = update.email.clone();
        let fit_token = update.fit_token.clone();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;

            let mut clauses = Vec::new();
            let mut params: Vec<&dyn rusqlite::ToSql> = Vec::new();
            if let Some(value) = &first_name {
                clauses.push("first_name = ?");
                params.push(value);
            }
            if let Some(value) = &last_name {
                clauses.push("last_name = ?");
                params.push(value);
            }
            if let Some(value) = &email {
                clauses.push("email = ?");
                params.push(value);
            }
            if let Some(value) = &fit_token {
                clauses.push("fit_token = ?");
                params.push(value);
            }

            if !clauses.is_empty() {
                let query = format!("UPDATE users SET {} WHERE id = ?", clauses.join(", "));
                params.push(&id);
                conn.execute(&query, &params[..])?;
            }

            let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?")?;
            let result = stmt.query_row([&id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn update_password(&self, id: &str, password: &str) -> Result<bool> {
        let password_hash = hash_password(password)?;
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE users SET password_hash = ? WHERE id = ?",
                rusqlite::params![password_hash, id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
