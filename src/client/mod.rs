//! Client-side core: the persisted authentication session, the sync strategy
//! that rides a credential along with every outgoing request, and the pure
//! workout-aggregation layer. Everything here talks to the server only
//! through the [`Transport`] trait and persists only through the
//! [`KeyValueStore`] trait, so both can be swapped for test doubles.

pub mod aggregate;
pub mod events;
pub mod exercise;
pub mod fit;
pub mod kv;
pub mod session;
pub mod sync;
pub mod transport;
pub mod workout;

pub use aggregate::{group_by_exercise, most_recent_by_date, ExerciseGroup, Set};
pub use events::{EventChannel, AUTH_CHANNEL, EVENT_LOGOUT, EVENT_SAVE, EVENT_TOKEN_INVALID};
pub use exercise::ExerciseHistory;
pub use fit::{activity_session, ActivitySession};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use session::{PasswordChange, ProfileUpdate, Session, SessionStore};
pub use sync::{SyncInterceptor, Syncable};
pub use transport::{Method, RequestConfig, Transport, TransportError};
pub use workout::WorkoutRecord;

use thiserror::Error;

/// Errors surfaced by client operations. Local validation failures are not
/// errors; they come back as explicit result values with no network call
/// issued.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
