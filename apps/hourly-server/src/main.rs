use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{wait_for_shutdown, DbModule, Lifecycle, RestfulModule};
use modkit_db::{absolutize_sqlite_dsn, ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs};
use shifts::{config::ShiftsConfig, Shifts};
use tokio::net::TcpListener;
use users_info::{config::UsersInfoConfig, UsersInfo};

mod http;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Hourly Server - shift scheduling backend
#[derive(Parser)]
#[command(name = "hourly-server")]
#[command(about = "Hourly Server - shift scheduling backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!("Hourly Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config, &args),
    }
}

/// Typed module sections, so a bad value fails before anything starts.
struct ModuleConfigs {
    users_info: UsersInfoConfig,
    shifts: ShiftsConfig,
}

fn module_configs(config: &AppConfig) -> Result<ModuleConfigs> {
    Ok(ModuleConfigs {
        users_info: config.module_config("users_info")?,
        shifts: config.module_config("shifts")?,
    })
}

/// The DSN to connect to; `--mock` wins over the configured URL.
fn resolve_dsn(config: &AppConfig, args: &CliArgs) -> Result<String> {
    if args.mock {
        return Ok(MEMORY_DSN.to_string());
    }
    let Some(db) = config.database.as_ref() else {
        bail!("Database configuration is required (or pass --mock)");
    };
    let dsn = db.url.trim();
    if dsn.is_empty() {
        bail!("Database URL not configured");
    }
    DbHandle::detect(dsn).with_context(|| format!("Invalid database DSN '{dsn}'"))?;
    Ok(dsn.to_string())
}

async fn connect_db(config: &AppConfig, args: &CliArgs) -> Result<DbHandle> {
    let mut dsn = resolve_dsn(config, args)?;
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, &config.home_dir(), true)?;
    }

    let mut opts = ConnectOpts {
        acquire_timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    };
    if let Some(db) = config.database.as_ref() {
        opts.max_conns = db.max_conns.or(opts.max_conns);
        if let Some(ms) = db.busy_timeout_ms {
            opts.busy_timeout = Duration::from_millis(u64::from(ms));
        }
    }

    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, opts)
        .await
        .context("failed to connect to the database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let cfgs = module_configs(&config)?;
    let db = connect_db(&config, &args).await?;

    let users = UsersInfo::new(db.sea(), &cfgs.users_info);
    let shifts = Shifts::new(db.sea(), &cfgs.shifts, users.client());

    let db_modules: [&dyn DbModule; 2] = [&users, &shifts];
    for module in db_modules {
        module.migrate(&db).await?;
    }

    let timeout = (config.server.timeout_sec > 0)
        .then(|| Duration::from_secs(config.server.timeout_sec));
    let rest_modules: [&dyn RestfulModule; 2] = [&users, &shifts];
    let router = http::build_router(&rest_modules, timeout)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let lifecycle = Lifecycle::new();
    lifecycle.start_with_ready(move |cancel, ready| async move {
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
        tracing::info!("HTTP server listening on {}", addr);
        ready.notify();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .context("HTTP server error")
    })?;

    if !lifecycle.wait_ready().await {
        db.close().await;
        bail!("HTTP server failed to start");
    }

    wait_for_shutdown().await?;
    tracing::info!("Shutdown requested");
    let reason = lifecycle.stop(STOP_TIMEOUT).await;
    tracing::info!(?reason, "HTTP server stopped");

    db.close().await;
    Ok(())
}

fn check_config(config: &AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    module_configs(config)?;
    let dsn = resolve_dsn(config, args)?;
    tracing::debug!(dsn, "database DSN accepted");

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}
