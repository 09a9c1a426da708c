use std::sync::Arc;

use serde_json::{json, Value};

use super::events::{EventChannel, EVENT_TOKEN_INVALID};
use super::session::SessionStore;
use super::transport::{Method, RequestConfig, Transport, TransportError};

/// A record type that syncs through the interceptor. The identity travels as
/// the payload of an auth-invalidation broadcast, so subscribers can tell
/// which record hit the rejection.
pub trait Syncable {
    fn resource_url(&self) -> String;
    fn record_type(&self) -> &'static str;
}

/// Sync strategy wrapping the raw transport. Attaches the current session
/// token to every outgoing request and turns a 401 response into a
/// `token:invalid` broadcast on the auth channel, on top of the normal error
/// propagation. It never mutates the session itself; acting on the broadcast
/// is a subscriber's job.
pub struct SyncInterceptor {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    auth_events: Arc<EventChannel>,
}

impl SyncInterceptor {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        auth_events: Arc<EventChannel>,
    ) -> Self {
        Self {
            transport,
            session,
            auth_events,
        }
    }

    /// Dispatch against the record's own resource URL.
    pub async fn sync(
        &self,
        record: &dyn Syncable,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let url = record.resource_url();
        self.dispatch(record, method, &url, body).await
    }

    /// Dispatch to an explicit URL (collection endpoints, sub-resources).
    pub async fn dispatch(
        &self,
        record: &dyn Syncable,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        // The token is read at the point of request construction, never
        // cached, so a logout between two calls is always observed.
        let token = self.session.current().token;
        let credential = if token.is_empty() { None } else { Some(token) };

        let request = RequestConfig {
            method,
            url: url.to_string(),
            credential,
            body,
        };

        match self.transport.send(request).await {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.status == 401 {
                    tracing::warn!(
                        "{} {} rejected: token invalid",
                        method.as_str(),
                        url
                    );
                    self.auth_events.trigger(
                        EVENT_TOKEN_INVALID,
                        &json!({
                            "record": record.record_type(),
                            "url": record.resource_url(),
                        }),
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::super::events::AUTH_CHANNEL;
    use super::super::kv::MemoryStore;
    use super::super::session::{Session, SessionStore};
    use super::super::transport::testing::MockTransport;
    use super::*;

    struct Probe;

    impl Syncable for Probe {
        fn resource_url(&self) -> String {
            "/something".to_string()
        }

        fn record_type(&self) -> &'static str {
            "probe"
        }
    }

    fn store_with_token(token: &str) -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::new(
            Arc::new(MemoryStore::new()),
            Arc::new(EventChannel::new("session")),
        ));
        store.login(Session {
            token: token.to_string(),
            ..Default::default()
        });
        store
    }

    fn capture(channel: &EventChannel) -> Arc<Mutex<Vec<Value>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        channel.on(EVENT_TOKEN_INVALID, move |payload| {
            sink.lock().unwrap().push(payload.clone());
        });
        seen
    }

    #[tokio::test]
    async fn test_attaches_current_token() {
        let transport = Arc::new(MockTransport::new());
        let auth = Arc::new(EventChannel::new(AUTH_CHANNEL));
        let sync = SyncInterceptor::new(transport.clone(), store_with_token("abc"), auth);

        sync.sync(&Probe, Method::Get, None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].credential.as_deref(), Some("abc"));
        assert_eq!(requests[0].url, "/something");
    }

    #[tokio::test]
    async fn test_token_is_read_fresh_per_dispatch() {
        let transport = Arc::new(MockTransport::new());
        let auth = Arc::new(EventChannel::new(AUTH_CHANNEL));
        let session = store_with_token("abc");
        let sync = SyncInterceptor::new(transport.clone(), session.clone(), auth);

        sync.sync(&Probe, Method::Get, None).await.unwrap();
        session.logout();
        sync.sync(&Probe, Method::Get, None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].credential.as_deref(), Some("abc"));
        assert_eq!(requests[1].credential, None);
    }

    #[tokio::test]
    async fn test_broadcasts_token_invalid_on_401() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(Err(TransportError {
            status: 401,
            message: "Unauthorized".to_string(),
        }));
        let auth = Arc::new(EventChannel::new(AUTH_CHANNEL));
        let seen = capture(&auth);
        let sync = SyncInterceptor::new(transport, store_with_token("abc"), auth.clone());

        let err = sync.sync(&Probe, Method::Get, None).await.unwrap_err();

        // The error still propagates; the broadcast is additive.
        assert_eq!(err.status, 401);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["record"], "probe");
    }

    #[tokio::test]
    async fn test_only_401_broadcasts() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(Err(TransportError {
            status: 400,
            message: "Bad Request".to_string(),
        }));
        let auth = Arc::new(EventChannel::new(AUTH_CHANNEL));
        let seen = capture(&auth);
        let sync = SyncInterceptor::new(transport, store_with_token("abc"), auth.clone());

        let err = sync.sync(&Probe, Method::Get, None).await.unwrap_err();

        assert_eq!(err.status, 400);
        assert!(seen.lock().unwrap().is_empty());
    }
}
