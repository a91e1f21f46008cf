use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fittrack::config::Config;
use fittrack::handlers::{auth, exercises, workouts};
use fittrack::repositories::{ExerciseRepository, TokenRepository, UserRepository, WorkoutRepository};
use fittrack::version::GIT_VERSION;
use fittrack::{db, import, migrations, routes};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Import a CSV workout log into a user's account
    Import {
        /// Log file with Date, Exercise, Weight and Status columns
        csv_file: PathBuf,
        /// Email of the account receiving the sessions
        #[arg(long)]
        email: String,
        /// Exercise catalog with exercise, exercise_type and MuscleGroup columns
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fittrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("fittrack {}", GIT_VERSION);
    tracing::info!("Connecting to database: {}", config.database_url);

    // Create database pool
    let pool = db::create_pool(&config.database_url)?;

    // Run migrations
    migrations::run_migrations(&pool)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, pool).await,
        Command::Import {
            csv_file,
            email,
            catalog,
        } => {
            let summary =
                import::import_file(&pool, &email, &csv_file, catalog.as_deref()).await?;
            tracing::info!(
                "Imported {} sessions and {} entries from {}",
                summary.sessions_created,
                summary.entries_created,
                csv_file.display()
            );
            Ok(())
        }
    }
}

async fn serve(config: &Config, pool: db::DbPool) -> anyhow::Result<()> {
    // Create repositories
    let user_repo = UserRepository::new(pool.clone());
    let token_repo = TokenRepository::new(pool.clone(), config.token_lifetimes());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    let purged = token_repo.cleanup_expired().await?;
    if purged > 0 {
        tracing::info!("Purged {} expired token pairs", purged);
    }

    // Create handler states
    let auth_state = auth::AuthState {
        user_repo,
        token_repo: token_repo.clone(),
    };
    let workouts_state = workouts::WorkoutsState { workout_repo };
    let exercises_state = exercises::ExercisesState { exercise_repo };

    // Build router
    let app = routes::create_router(
        auth_state,
        workouts_state,
        exercises_state,
        token_repo,
        pool,
    );

    // Start server
    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
