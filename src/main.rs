use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "daily-checkin",
    about = "Scheduled daily check-in runner for web forums and portals",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily check-in for one service
    Run {
        /// Service key (huaxia, kanxue, yuchen)
        #[arg(long)]
        service: String,
    },

    /// Run every known service in sequence
    RunAll,

    /// Show the stored daily status record for a service
    Status {
        /// Service key
        #[arg(long)]
        service: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // DEBUG=true widens the default filter; RUST_LOG still wins.
    let default_level = if daily_checkin::config::debug_enabled() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Run { service } => daily_checkin::run_service(&service).await?,
        Commands::RunAll => {
            let mut worst = 0;
            for key in daily_checkin::services::SERVICE_KEYS {
                let code = daily_checkin::run_service(key).await?;
                if code == daily_checkin::EXIT_INTERRUPTED {
                    worst = code;
                    break;
                }
                worst = worst.max(code);
            }
            worst
        }
        Commands::Status { service } => {
            let store = daily_checkin::status::StatusStore::default_location();
            match store.load(&service) {
                Some(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    0
                }
                None => {
                    println!("no status record for '{service}'");
                    1
                }
            }
        }
    };

    std::process::exit(code);
}
