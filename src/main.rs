use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use clap::{Parser, Subcommand};
use signalbot::api::CoinGeckoClient;
use signalbot::config::AppConfig;
use signalbot::service::{render_message, SignalService, GENERIC_ERROR_MESSAGE, WELCOME_MESSAGE};
use signalbot::strategy::{ClassificationResult, ConsensusStrategy, Strategy};
use signalbot::synthetic::{MarketScenario, SyntheticPriceGenerator};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "BUY/SELL/HOLD signal from technical indicators")]
struct Cli {
    /// Path to a TOML config file (defaults to ./signalbot.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for signalbot (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch market data once and print the signal
    Signal {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a fresh signal on a fixed interval until Ctrl+C
    Watch {
        /// Minutes between rounds (defaults to watch.interval_minutes)
        #[arg(long)]
        interval_minutes: Option<u64>,
    },

    /// Classify a synthetic price series offline
    Demo {
        #[arg(long, value_enum, default_value = "sideways")]
        scenario: MarketScenario,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of daily samples to generate
        #[arg(long, default_value = "100")]
        samples: usize,

        /// Live price (defaults to the last generated price)
        #[arg(long)]
        live_price: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Describe what the bot looks at
    About,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref());

    let config = AppConfig::load(cli.config.as_deref())?;
    let strategy = ConsensusStrategy::new(config.indicators.clone(), config.classifier.clone())
        .context("Invalid strategy configuration")?;

    match cli.command {
        Commands::Signal { json } => {
            let service = build_service(&config, strategy)?;
            match service.run_once().await {
                Ok(result) => {
                    print_result(&result, json)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    tracing::error!("Error in signal command: {:#}", e);
                    println!("{}", GENERIC_ERROR_MESSAGE);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Watch { interval_minutes } => {
            let minutes = interval_minutes.unwrap_or(config.watch.interval_minutes).max(1);
            let service = build_service(&config, strategy)?;
            watch_loop(&service, minutes).await;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Demo {
            scenario,
            seed,
            samples,
            live_price,
            json,
        } => {
            let series = SyntheticPriceGenerator::new(seed)
                .generate(scenario, samples.max(1), ChronoDuration::days(1))
                .context("Failed to generate synthetic series")?;
            let live_price = live_price.unwrap_or(series.last().price);

            tracing::info!(
                ?scenario,
                seed,
                samples = series.len(),
                live_price,
                "Running demo"
            );

            let result = strategy
                .evaluate(&series, live_price)
                .context("Demo classification failed")?;
            print_result(&result, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::About => {
            println!("{}", WELCOME_MESSAGE);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn setup_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("signalbot={}", level)),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("signalbot=info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_service(
    config: &AppConfig,
    strategy: ConsensusStrategy,
) -> Result<SignalService<ConsensusStrategy>> {
    let client = CoinGeckoClient::new(&config.market)?;
    Ok(SignalService::new(client, config.market.clone(), strategy))
}

fn print_result(result: &ClassificationResult, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(result).context("Failed to serialize result")?
        );
    } else {
        println!("{}", render_message(result));
    }
    Ok(())
}

/// One week; longer periods overflow the timer's deadline arithmetic
const MAX_WATCH_MINUTES: u64 = 7 * 24 * 60;

fn watch_period(interval_minutes: u64) -> Duration {
    Duration::from_secs(interval_minutes.clamp(1, MAX_WATCH_MINUTES).saturating_mul(60))
}

async fn watch_loop(service: &SignalService<ConsensusStrategy>, interval_minutes: u64) {
    tracing::info!(
        "🔄 Watching every {} min using {}. Press Ctrl+C to stop...",
        interval_minutes,
        service.strategy().name()
    );

    let mut ticker = interval(watch_period(interval_minutes));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
            _ = ticker.tick() => {
                match service.run_once().await {
                    Ok(result) => println!("{}\n", render_message(&result)),
                    Err(e) => {
                        tracing::error!("Signal round failed: {:#}", e);
                        println!("{}\n", GENERIC_ERROR_MESSAGE);
                    }
                }
            }
        }
    }

    tracing::info!("👋 signalbot stopped");
}
