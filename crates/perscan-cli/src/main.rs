mod analyze;
mod history;
mod scan;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::scan::ScanArgs;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "perscan-cli")]
#[command(about = "Scan product feedback across app stores and communities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch reviews from one or more platforms and summarize their sentiment
    Scan(ScanArgs),
    /// Show stored sentiment snapshots for a product
    History {
        /// Product name as used when scanning
        product: String,
        /// Restrict to one platform (key or label), or `combined`
        #[arg(long)]
        platform: Option<String>,
        /// How many days back to look
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
    /// Score text given as arguments, or one text per line on stdin
    Analyze {
        texts: Vec<String>,
        /// Maximum number of keywords to report
        #[arg(long, default_value_t = perscan_sentiment::DEFAULT_TOP_N)]
        top: usize,
    },
    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Logs go to stderr so `--json` output stays parseable.
    let default_level =
        std::env::var("PERSCAN_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scan(args)) => scan::run_scan(&args).await,
        Some(Commands::History {
            product,
            platform,
            days,
        }) => {
            let pool = connect().await?;
            history::run_history(&pool, &product, platform.as_deref(), days).await
        }
        Some(Commands::Analyze { texts, top }) => analyze::run_analyze(texts, top),
        Some(Commands::Db { command }) => {
            let pool = connect().await?;
            match command {
                DbCommands::Ping => {
                    perscan_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = perscan_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
            Ok(())
        }
        None => {
            println!("perscan-cli: use --help to see available commands");
            Ok(())
        }
    }
}

/// Connect to the database named by `DATABASE_URL`.
pub(crate) async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = perscan_core::load_app_config()?;
    let pool_config = perscan_db::PoolConfig::from_app_config(&config);
    let pool = perscan_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
