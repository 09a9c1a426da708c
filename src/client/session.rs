use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::events::{EventChannel, EVENT_LOGOUT};
use super::kv::KeyValueStore;
use super::sync::{SyncInterceptor, Syncable};
use super::transport::Method;
use super::ClientError;

/// The single persisted authentication identity. An empty `token` means
/// logged out. Passwords are write-only and never live on this record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fit_token: String,
}

impl Session {
    /// Storage key of the singleton record.
    pub const STORAGE_KEY: &'static str = "session-current";
}

impl Syncable for Session {
    fn resource_url(&self) -> String {
        "/api/users/me".to_string()
    }

    fn record_type(&self) -> &'static str {
        "session"
    }
}

/// Login credentials, a transient record that syncs against the session
/// resource.
struct Credentials;

impl Syncable for Credentials {
    fn resource_url(&self) -> String {
        "/api/sessions".to_string()
    }

    fn record_type(&self) -> &'static str {
        "credentials"
    }
}

/// Outcome of a password change. A mismatch is not an error; it simply never
/// reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChange {
    Updated,
    Mismatch,
}

/// Partial profile fields for a whole-record push.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Owns the persisted session record. All mutation goes through this store;
/// reads materialize the record from the key-value store on every call so a
/// concurrent logout is never missed.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    events: Arc<EventChannel>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, events: Arc<EventChannel>) -> Self {
        Self { store, events }
    }

    /// The current session, materialized with empty defaults when nothing
    /// (or nothing decodable) is stored.
    pub fn current(&self) -> Session {
        self.store
            .get(Session::STORAGE_KEY)
            .and_then(|data| match serde_json::from_str(&data) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Discarding undecodable session record: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn is_logged_in(&self) -> bool {
        !self.current().token.is_empty()
    }

    /// Pass-through persist of the given fields.
    pub fn login(&self, fields: Session) {
        self.persist(&fields);
    }

    /// Zero the token, keep everything else. Only the session record is
    /// touched; other stored keys survive.
    pub fn logout(&self) {
        let mut session = self.current();
        session.token = String::new();
        self.persist(&session);
        self.events.trigger(EVENT_LOGOUT, &serde_json::Value::Null);
    }

    /// Exchange credentials for a token and persist the returned identity.
    /// The stored fit token is preserved across logins.
    pub async fn authenticate(
        &self,
        sync: &SyncInterceptor,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let response = sync
            .sync(
                &Credentials,
                Method::Post,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        let mut session: Session = serde_json::from_value(response)?;
        if session.fit_token.is_empty() {
            session.fit_token = self.current().fit_token;
        }
        self.login(session.clone());

        tracing::debug!("Authenticated as {}", session.email);
        Ok(session)
    }

    /// Merge partial profile fields, persist, and push the whole profile to
    /// the server.
    pub async fn update_profile(
        &self,
        sync: &SyncInterceptor,
        update: ProfileUpdate,
    ) -> Result<Session, ClientError> {
        let mut session = self.current();
        if let Some(first_name) = update.first_name {
            session.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            session.last_name = last_name;
        }
        if let Some(email) = update.email {
            session.email = email;
        }
        self.persist(&session);

        self.push_profile(sync, &session).await?;
        Ok(session)
    }

    /// Parse a leading `?code=<value>` query fragment into the fit token and
    /// push the profile. An absent fragment is a no-op, not an error.
    pub async fn update_fit_token(
        &self,
        sync: &SyncInterceptor,
        query: Option<&str>,
    ) -> Result<(), ClientError> {
        let Some(code) = query.and_then(parse_oauth_code) else {
            return Ok(());
        };

        let mut session = self.current();
        session.fit_token = code;
        self.persist(&session);

        self.push_profile(sync, &session).await?;
        Ok(())
    }

    /// Change the password. On a confirmation mismatch nothing is sent; on a
    /// match the request body carries only the two password fields.
    pub async fn change_password(
        &self,
        sync: &SyncInterceptor,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<PasswordChange, ClientError> {
        if new_password != confirm_password {
            tracing::debug!("Password confirmation mismatch; nothing sent");
            return Ok(PasswordChange::Mismatch);
        }

        let session = self.current();
        sync.sync(
            &session,
            Method::Patch,
            Some(json!({
                "password": new_password,
                "password_confirmation": confirm_password,
            })),
        )
        .await?;

        Ok(PasswordChange::Updated)
    }

    /// Subscribe to local session events (`logout`).
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    async fn push_profile(
        &self,
        sync: &SyncInterceptor,
        session: &Session,
    ) -> Result<(), ClientError> {
        sync.sync(
            session,
            Method::Put,
            Some(json!({
                "first_name": session.first_name,
                "last_name": session.last_name,
                "email": session.email,
                "fit_token": session.fit_token,
            })),
        )
        .await?;
        Ok(())
    }

    fn persist(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(data) => self.store.set(Session::STORAGE_KEY, data),
            Err(e) => tracing::warn!("Failed to encode session record: {}", e),
        }
    }
}

fn parse_oauth_code(query: &str) -> Option<String> {
    let code = query.strip_prefix("?code=")?;
    let code = code.split('&').next().unwrap_or(code);
    Some(code.to_string())
}
