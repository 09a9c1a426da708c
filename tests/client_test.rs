//! End-to-end: the client core driving the real router through an
//! in-process transport.

mod common;

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::Value;

use setlog::client::{
    EventChannel, ExerciseHistory, MemoryStore, Session, SessionStore, Set, SyncInterceptor,
    WorkoutRecord, AUTH_CHANNEL, EVENT_TOKEN_INVALID,
};

struct Client {
    session: Arc<SessionStore>,
    sync: SyncInterceptor,
    auth_events: Arc<EventChannel>,
}

fn client(app: axum::Router) -> Client {
    let session = Arc::new(SessionStore::new(
        Arc::new(MemoryStore::new()),
        Arc::new(EventChannel::new("session")),
    ));
    let auth_events = Arc::new(EventChannel::new(AUTH_CHANNEL));
    let sync = SyncInterceptor::new(
        Arc::new(common::RouterTransport::new(app)),
        session.clone(),
        auth_events.clone(),
    );
    Client {
        session,
        sync,
        auth_events,
    }
}

fn local_set(exercise: i64, name: &str, weight: &str, reps: i64) -> Set {
    Set {
        id: 0,
        exercise,
        exercise_name: name.to_string(),
        weight: weight.to_string(),
        reps,
        workout_date: String::new(),
        created_at: None,
        updated_at: None,
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_full_workout_lifecycle() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    common::create_test_user(&pool, "test@example.com", "password123").await;
    let bench = common::create_test_exercise(&pool, "Bench Press").await.id;
    let flies = common::create_test_exercise(&pool, "Flies").await.id;

    let client = client(app);

    // Log in through the wire.
    let session = client
        .session
        .authenticate(&client.sync, "test@example.com", "password123")
        .await
        .unwrap();
    assert!(client.session.is_logged_in());
    assert_eq!(session.first_name, "Test");

    // Record a workout, then top it up with one more set.
    let mut workout = WorkoutRecord::new(
        date("2016-02-20"),
        None,
        vec![
            local_set(bench, "Bench Press", "85Kg", 6),
            local_set(flies, "Flies", "18Kg", 8),
        ],
    );
    workout.record(&client.sync).await.unwrap();
    // Server-issued ids replace the placeholder zeros.
    assert!(workout.sets.iter().all(|set| set.id > 0));

    workout
        .add_sets(
            &client.sync,
            vec![local_set(bench, "Bench Press", "80Kg", 6)],
        )
        .await
        .unwrap();
    assert_eq!(workout.sets.len(), 3);

    // Summarise locally: Bench Press holds two of the three sets.
    let summary = workout.summarise().unwrap().clone();
    assert_eq!(summary.exercise_name, "Bench Press");
    assert_eq!(summary.sets.len(), 2);

    // Save pushes the session window up to the server.
    workout.save(&client.sync).await.unwrap();

    let fetched = WorkoutRecord::fetch(&client.sync, date("2016-02-20"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.session_start, workout.session_start);
    assert_eq!(fetched.session_end, workout.session_end);
    assert_eq!(fetched.sets.len(), 3);

    // Absent dates come back as an explicit nothing.
    let missing = WorkoutRecord::fetch(&client.sync, date("2016-02-21"))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_exercise_history_last_performed() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    common::create_test_user(&pool, "test@example.com", "password123").await;
    let bench = common::create_test_exercise(&pool, "Bench Press").await.id;

    let client = client(app);
    client
        .session
        .authenticate(&client.sync, "test@example.com", "password123")
        .await
        .unwrap();

    for (day, weight) in [("2016-02-18", "80Kg"), ("2016-02-20", "85Kg")] {
        let mut workout = WorkoutRecord::new(
            date(day),
            None,
            vec![local_set(bench, "Bench Press", weight, 6)],
        );
        workout.record(&client.sync).await.unwrap();
    }

    let history = ExerciseHistory::fetch(&client.sync, bench).await.unwrap();
    assert_eq!(history.all_sets().len(), 2);

    let latest = history.last_performed();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].workout_date, "2016-02-20");
    assert_eq!(latest[0].weight, "85Kg");
}

#[tokio::test]
async fn test_profile_and_password_roundtrip() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    common::create_test_user(&pool, "test@example.com", "password123").await;

    let client = client(app);
    client
        .session
        .authenticate(&client.sync, "test@example.com", "password123")
        .await
        .unwrap();

    client
        .session
        .update_fit_token(&client.sync, Some("?code=abcdef"))
        .await
        .unwrap();
    assert_eq!(client.session.current().fit_token, "abcdef");

    let outcome = client
        .session
        .change_password(&client.sync, "newpassword", "newpassword")
        .await
        .unwrap();
    assert_eq!(outcome, setlog::client::PasswordChange::Updated);

    // The new password authenticates; the fit token rides along locally.
    client.session.logout();
    let session = client
        .session
        .authenticate(&client.sync, "test@example.com", "newpassword")
        .await
        .unwrap();
    assert_eq!(session.fit_token, "abcdef");
}

#[tokio::test]
async fn test_stale_client_save_broadcasts_token_invalid() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    common::create_test_user(&pool, "test@example.com", "password123").await;
    let bench = common::create_test_exercise(&pool, "Bench Press").await.id;

    let client = client(app);
    client
        .session
        .authenticate(&client.sync, "test@example.com", "password123")
        .await
        .unwrap();

    let mut workout = WorkoutRecord::new(
        date("2016-02-20"),
        None,
        vec![local_set(bench, "Bench Press", "85Kg", 6)],
    );
    workout.record(&client.sync).await.unwrap();

    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.auth_events.on(EVENT_TOKEN_INVALID, move |payload| {
        sink.lock().unwrap().push(payload.clone());
    });

    // A logout elsewhere clears the persisted token; the next save reads it
    // fresh, goes out uncredentialed, and the 401 comes back as a broadcast.
    client.session.logout();

    let err = workout.save(&client.sync).await.unwrap_err();
    match err {
        setlog::client::ClientError::Transport(transport) => {
            assert_eq!(transport.status, 401)
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["record"], "workout");
    assert_eq!(seen[0]["url"], "/api/workouts/2016-02-20");
}

#[tokio::test]
async fn test_login_persists_given_fields_verbatim() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let client = client(app);
    client.session.login(Session {
        token: "abc".to_string(),
        email: "test@example.com".to_string(),
        ..Default::default()
    });

    assert!(client.session.is_logged_in());
    assert_eq!(client.session.current().email, "test@example.com");
}
