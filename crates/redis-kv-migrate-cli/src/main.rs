//! redis-kv-migrate CLI - copy all key/value data between Redis servers.

use clap::Parser;
use redis_kv_migrate::{Config, EndpointConfig, MigrateError, Orchestrator};
use std::process::ExitCode;
use tracing::{info, Level};

/// Exit code when the run finished but at least one key was rejected.
const EXIT_PARTIAL: u8 = 4;

#[derive(Parser)]
#[command(name = "redis-kv-migrate")]
#[command(about = "Migrate all key/value data from one Redis server to another")]
#[command(version)]
struct Cli {
    /// Hostname of the server to transfer data from
    from_hostname: String,

    /// Hostname of the server to transfer data to
    to_hostname: String,

    /// Port of the server to transfer data from
    #[arg(long, default_value = "6379")]
    from_port: u16,

    /// Port of the server to transfer data to
    #[arg(long, default_value = "6379")]
    to_port: u16,

    /// Password of the server to transfer data from
    #[arg(long)]
    from_password: Option<String>,

    /// Password of the server to transfer data to
    #[arg(long)]
    to_password: Option<String>,

    /// Database of the server to transfer data from
    #[arg(long, default_value = "0")]
    from_database: i64,

    /// Database of the server to transfer data to
    #[arg(long, default_value = "0")]
    to_database: i64,

    /// Fetch and report without writing to the destination
    #[arg(long)]
    dry_run: bool,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = Config {
        source: EndpointConfig {
            host: cli.from_hostname,
            port: cli.from_port,
            password: cli.from_password,
            database: cli.from_database,
        },
        target: EndpointConfig {
            host: cli.to_hostname,
            port: cli.to_port,
            password: cli.to_password,
            database: cli.to_database,
        },
    };
    config.validate()?;

    info!(
        "Migrating {}:{}/{} -> {}:{}/{}",
        config.source.host,
        config.source.port,
        config.source.database,
        config.target.host,
        config.target.port,
        config.target.database
    );

    let orchestrator = Orchestrator::connect(&config)
        .await?
        .with_dry_run(cli.dry_run);
    let result = orchestrator.run().await?;

    if cli.output_json {
        println!("{}", result.to_json()?);
    } else {
        let headline = if result.dry_run {
            "Dry run completed!"
        } else {
            "Migration completed!"
        };
        println!("\n{}", headline);
        println!("  Run ID: {}", result.run_id);
        println!("  Duration: {:.2}s", result.duration_seconds);
        println!("  Keys: {}/{}", result.keys_written, result.keys_total);
        if !result.failed_keys.is_empty() {
            println!("  Failed keys: {:?}", result.failed_keys);
        }
    }

    if result.success {
        println!("Successfully copied data!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "One or more keys could not be copied. Please check your database to troubleshoot"
        );
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
