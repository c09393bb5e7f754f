//! agri_hub - Smart Agriculture Sensor Hub Binary
//!
//! Runs the sensor listener and the read-only web API, or acts as a one-shot
//! sensor client for testing a deployment.

use agri_hub::{
    classify, send_reading, start_web_server, IngestConfig, IngestServer, MetricStore, WebConfig,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_REFRESH_INTERVAL_MS, DEFAULT_SENSOR_PORT, DEFAULT_WEB_PORT,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "agri_hub")]
#[command(about = "🌱 agri_hub - Smart Agriculture Sensor Hub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Collects water level, pest and climate readings from sensor clients over TCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Bind address for the sensor listener and web API
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Sensor listener port
    #[arg(short, long, default_value_t = DEFAULT_SENSOR_PORT)]
    port: u16,

    /// Web API port
    #[arg(long, default_value_t = DEFAULT_WEB_PORT)]
    web_port: u16,

    /// Run only the sensor listener
    #[arg(long)]
    no_web: bool,

    /// Maximum entries kept in each metric history
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    capacity: usize,

    /// How long a sensor client may take to send its line
    #[arg(long, default_value_t = 2000)]
    read_timeout_ms: u64,

    /// Dashboard refresh interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL_MS)]
    refresh_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sensor listener and web API (default)
    Serve(ServeArgs),

    /// Classify a line and print the reading as JSON
    Classify {
        /// Raw sensor line, e.g. "Total Pests Detected: 3"
        line: String,
    },

    /// Send one line to a running hub, like a sensor client would
    Send(SendArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Maximum WebSocket connections
    #[arg(long, default_value_t = 100)]
    max_connections: usize,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            no_cors: false,
            max_connections: 100,
        }
    }
}

#[derive(Args)]
struct SendArgs {
    /// Line to send
    line: String,

    /// Hub address (defaults to 127.0.0.1 on the sensor port)
    #[arg(long)]
    to: Option<String>,

    /// Connect and acknowledgement timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => {
            print_banner();
            serve_command(&cli, args).await?;
        }
        Some(Commands::Classify { line }) => {
            println!("{}", serde_json::to_string_pretty(&classify(line))?);
        }
        Some(Commands::Send(args)) => {
            send_command(&cli, args).await?;
        }
        None => {
            // Default to serve command
            print_banner();
            serve_command(&cli, &ServeArgs::default()).await?;
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn print_banner() {
    println!("🌱 agri_hub - Smart Agriculture Sensor Hub");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    info!("Starting agri_hub...");

    let store = Arc::new(MetricStore::with_capacity(cli.capacity));

    let ingest_config = IngestConfig::new(&cli.host, cli.port)
        .with_read_timeout_ms(cli.read_timeout_ms)
        .with_history_capacity(cli.capacity);

    info!("Sensor listener configuration:");
    info!("  - Bind address: {}", ingest_config.bind_address());
    info!("  - Read timeout: {}ms", ingest_config.read_timeout_ms);
    info!("  - History capacity: {}", ingest_config.history_capacity);

    let server = IngestServer::bind(ingest_config, Arc::clone(&store))
        .await
        .context("Failed to start sensor server")?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Ctrl-C received, shutting down");
        let _ = stop_tx.send(true);
    });

    let ingest = server.run_until(wait_for_stop(stop_rx.clone()));

    if cli.no_web {
        info!("Web API disabled");
        ingest.await?;
    } else {
        let web_config = WebConfig::new(&cli.host, cli.web_port)
            .with_cors(!args.no_cors)
            .with_refresh_interval_ms(cli.refresh_ms)
            .with_max_websocket_connections(args.max_connections);

        info!("Web API configuration:");
        info!("  - Bind address: {}", web_config.bind_address());
        info!("  - CORS enabled: {}", web_config.enable_cors);
        info!("  - Refresh interval: {}ms", web_config.refresh_interval_ms);
        info!(
            "  - Max WebSocket connections: {}",
            web_config.max_websocket_connections
        );

        let web = start_web_server(web_config, Arc::clone(&store), wait_for_stop(stop_rx));
        tokio::try_join!(ingest, web)?;
    }

    let view = store.snapshot();
    info!(
        "Stopped with {} water, {} pest and {} climate readings in memory",
        view.water_history.len(),
        view.pest_history.len(),
        view.climate_history.len()
    );
    Ok(())
}

async fn send_command(cli: &Cli, args: &SendArgs) -> anyhow::Result<()> {
    let addr = args
        .to
        .clone()
        .unwrap_or_else(|| format!("127.0.0.1:{}", cli.port));

    let ack = send_reading(&addr, &args.line, Duration::from_millis(args.timeout_ms))
        .await
        .with_context(|| format!("No connection to the hub at {}", addr))?;

    match ack {
        Some(reply) => println!("{}", reply),
        None => println!("Sent, but no acknowledgement from {}", addr),
    }
    Ok(())
}

async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}
