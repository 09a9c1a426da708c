use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use setlog::config::Config;
use setlog::handlers::{auth, exercises, workouts};
use setlog::middleware::AuthContext;
use setlog::repositories::{
    ExerciseRepository, TokenRepository, UserRepository, WorkoutRepository,
};
use setlog::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setlog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    let user_repo = UserRepository::new(pool.clone());
    let token_repo = TokenRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    let auth_state = auth::AuthState {
        user_repo: user_repo.clone(),
        token_repo: token_repo.clone(),
    };
    let workouts_state = workouts::WorkoutsState {
        workout_repo: workout_repo.clone(),
    };
    let exercises_state = exercises::ExercisesState {
        exercise_repo: exercise_repo.clone(),
        workout_repo: workout_repo.clone(),
    };
    let auth_ctx = AuthContext {
        user_repo,
        token_repo,
    };

    let app = routes::create_router(auth_state, workouts_state, exercises_state, auth_ctx);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
