use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable string storage by key. The session record persists through this;
/// implementations must keep unrelated keys untouched by each other's
/// operations.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory store, used in tests and as an ephemeral fallback.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("kv lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .expect("kv lock poisoned")
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().expect("kv lock poisoned").remove(key);
    }
}

/// File-backed store: one JSON object per file, written through on every
/// mutation. Write failures are logged and swallowed so callers see
/// localStorage-like semantics rather than an error path.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        let data = match serde_json::to_string_pretty(entries) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to encode local store: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, data) {
            tracing::warn!("Failed to write local store {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("kv lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.lock().expect("kv lock poisoned");
        entries.insert(key.to_string(), value);
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().expect("kv lock poisoned");
        entries.remove(key);
        self.flush(&entries);
    }
}
