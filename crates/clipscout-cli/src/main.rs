mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "clipscout-cli")]
#[command(about = "Clipscout command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full discovery-to-script pipeline for a topic.
    Run {
        topic: String,
        #[arg(long, env = "CLIPSCOUT_USER_ID")]
        user: String,
        /// Discover and rank without touching the database or the model.
        #[arg(long)]
        dry_run: bool,
    },
    /// List a user's recent sessions.
    Sessions {
        #[arg(long, env = "CLIPSCOUT_USER_ID")]
        user: String,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Show the videos collected for a session.
    Videos {
        /// Session public id.
        #[arg(long)]
        session: uuid::Uuid,
        /// Only show videos flagged as viral.
        #[arg(long)]
        viral: bool,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Print the latest script draft for a session.
    Script {
        /// Session public id.
        #[arg(long)]
        session: uuid::Uuid,
    },
    /// Cancel an active session.
    Cancel {
        /// Session public id.
        #[arg(long)]
        session: uuid::Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = clipscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            topic,
            user,
            dry_run,
        } => commands::run(&config, &user, &topic, dry_run).await,
        Commands::Sessions { user, limit } => commands::sessions(&config, &user, limit).await,
        Commands::Videos {
            session,
            viral,
            limit,
        } => commands::videos(&config, session, viral, limit).await,
        Commands::Script { session } => commands::script(&config, session).await,
        Commands::Cancel { session } => commands::cancel(&config, session).await,
    }
}
