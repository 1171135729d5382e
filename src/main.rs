use clap::{Parser, Subcommand};
use time::OffsetDateTime;

use horas::{app, bootstrap, config::AppConfig, db, seed, state::AppState};

/// Work-hour tracking service
#[derive(Parser)]
#[command(name = "horas")]
#[command(about = "Work-hour tracking service: entries, annual rates and spreadsheet reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate, reconcile the admin account and serve HTTP (default)
    Serve,
    /// Create or refresh demo users with six months of random entries
    SeedDemo,
    /// Print database location, configured admin and stored users
    DbStatus,
    /// Delete the database file; it is recreated on next start
    DbReset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::SeedDemo => seed_demo(config).await,
        Commands::DbStatus => seed::print_status(&config.db_path(), &config.admin.username).await,
        Commands::DbReset { yes } => {
            if yes {
                seed::reset_database(&config.db_path()).map(|_| ())
            } else {
                Err(anyhow::anyhow!("refusing to delete {} without --yes", config.db_path().display()))
            }
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "command failed");
    }
    result
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "horas=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let (host, port) = (config.host.clone(), config.port);
    let state = AppState::init(config).await?;
    bootstrap::reconcile_admin(&state.db, &state.config.admin).await?;

    let app = app::build_app(state);
    app::serve(app, &host, port).await
}

async fn seed_demo(config: AppConfig) -> anyhow::Result<()> {
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;
    seed::seed_demo(&pool, OffsetDateTime::now_utc().date()).await?;
    pool.close().await;
    Ok(())
}
