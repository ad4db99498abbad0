use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{load_config, ConfigArgs, Settings};
use std::net::SocketAddr;

/// The main entry point for the Marquee record service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep the guard alive so buffered log lines are flushed on exit.
    let _guard = web_server::telemetry::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::InitDb(args) => handle_init_db(args).await,
        Commands::CheckConfig(args) => handle_check_config(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small REST service exposing configurable record tables over HTTP.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve every configured resource until Ctrl+C or SIGTERM.
    Serve(ServeArgs),
    /// Create the table of every configured resource if it is missing.
    InitDb(ConfigArgs),
    /// Load and validate the configuration, then print the routes it defines.
    CheckConfig(ConfigArgs),
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Address to listen on, overriding server.host and server.port (e.g. 127.0.0.1:8080).
    #[arg(long)]
    bind: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load(args: &ConfigArgs) -> anyhow::Result<Settings> {
    load_config(args.config.as_deref()).context("Failed to load configuration")
}

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut settings = load(&args.config)?;
    if let Some(addr) = args.bind {
        settings.server.host = addr.ip().to_string();
        settings.server.port = addr.port();
    }
    web_server::run_server(settings).await
}

async fn handle_init_db(args: ConfigArgs) -> anyhow::Result<()> {
    let settings = load(&args)?;
    let pool = database::connect(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    database::create_tables(&pool, &settings.resources)
        .await
        .context("Failed to create resource tables")?;
    pool.close().await;
    tracing::info!(count = settings.resources.len(), "Resource tables are in place.");
    Ok(())
}

fn handle_check_config(args: ConfigArgs) -> anyhow::Result<()> {
    let settings = load(&args)?;
    println!("Listening address: {}", settings.server.bind_addr()?);
    println!(
        "Pool: max {} connections, {}s acquire timeout",
        settings.database.max_connections, settings.database.acquire_timeout_secs
    );
    println!("{}", routes_table(&settings));
    Ok(())
}

/// One row per resource: where it is mounted and how it maps onto its table.
fn routes_table(settings: &Settings) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Route", "Table", "Label field (column)", "Flag field (column)", "Ids"]);
    for resource in &settings.resources {
        table.add_row(vec![
            format!("/{0}, /{0}/:id", resource.path),
            resource.table().to_string(),
            format!("{} ({})", resource.label_field, resource.label_column()),
            format!("{} ({})", resource.flag_field, resource.flag_column()),
            if resource.strict_ids { "strict" } else { "lenient" }.to_string(),
        ]);
    }
    table
}
