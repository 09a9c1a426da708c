use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Channel name carrying auth invalidation broadcasts.
pub const AUTH_CHANNEL: &str = "auth";

/// Fired on the auth channel when the server rejects a request with 401.
pub const EVENT_TOKEN_INVALID: &str = "token:invalid";

/// Fired locally by the session store after a logout.
pub const EVENT_LOGOUT: &str = "logout";

/// Fired locally by a workout record after a successful save.
pub const EVENT_SAVE: &str = "save";

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Named pub/sub channel. Channels are injected where needed rather than
/// looked up through a global registry, so tests can observe events in
/// isolation.
pub struct EventChannel {
    name: String,
    handlers: Mutex<HashMap<String, Vec<Handler>>>,
}

impl EventChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .expect("event lock poisoned")
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn trigger(&self, event: &str, payload: &Value) {
        tracing::debug!("[{}] {}", self.name, event);
        // Handlers run outside the lock; a handler may trigger again.
        let handlers: Vec<Handler> = self
            .handlers
            .lock()
            .expect("event lock poisoned")
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in handlers {
            handler(payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_reaches_every_handler() {
        let channel = EventChannel::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..2 {
            let seen = seen.clone();
            channel.on("ping", move |payload| {
                seen.lock().unwrap().push(payload.clone());
            });
        }

        channel.trigger("ping", &json!({"n": 1}));

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_trigger_without_handlers_is_harmless() {
        let channel = EventChannel::new("test");
        channel.trigger("nothing-listens", &Value::Null);
    }

    #[test]
    fn test_handlers_are_per_event() {
        let channel = EventChannel::new("test");
        let seen = Arc::new(Mutex::new(0));

        let counter = seen.clone();
        channel.on("a", move |_| *counter.lock().unwrap() += 1);

        channel.trigger("b", &Value::Null);
        assert_eq!(*seen.lock().unwrap(), 0);

        channel.trigger("a", &Value::Null);
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
