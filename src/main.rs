//! route-dispatch service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ http::server ──▶ routing::Router ──▶ RouteData
//!                                                               │
//!                                                               ▼
//!                                         dispatch::Dispatcher
//!                                    load → instantiate → auth → invoke → view
//!                                                               │
//!                                          failure? ── once ──▶ error handler
//!                                                               │  fails again?
//!                                                               ▼      │
//!     Client Response                                       Rendered ◀─┘ fallback
//!     ◀──────────────── http::response ◀────────────────────────┘
//! ```
//!
//! `serve` runs the HTTP host; `resolve <path>` resolves and dispatches a
//! single path in-process and prints the result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use route_dispatch::config::{load_config, AppConfig};
use route_dispatch::dispatch::{ControllerRegistry, Identity, RequestInfo};
use route_dispatch::http::HttpServer;
use route_dispatch::lifecycle;
use route_dispatch::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "route-dispatch")]
#[command(about = "Path-based controller dispatch service", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP host (default)
    Serve,
    /// Resolve and dispatch one path, printing the route and the output
    Resolve {
        path: String,
        /// Dispatch as this user
        #[arg(long)]
        user: Option<String>,
        /// Role granted to the user; repeatable
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability.log_level)?;

    tracing::info!(
        config = ?cli.config,
        static_routes = config.routes.len(),
        "route-dispatch v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let components = lifecycle::build(&config, ControllerRegistry::new())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => metrics::init_metrics(addr)?,
                    Err(_) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    ),
                }
            }

            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            tracing::info!(
                address = %listener.local_addr()?,
                request_timeout_secs = config.timeouts.request_secs,
                "Listening for connections"
            );

            HttpServer::new(config, components).run(listener).await?;
            tracing::info!("Shutdown complete");
        }
        Commands::Resolve { path, user, roles } => {
            let mut info = RequestInfo::new();
            if let Some(user) = user {
                let identity = roles
                    .into_iter()
                    .fold(Identity::new(user), |identity, role| identity.with_role(role));
                info = info.with_identity(identity);
            }

            let route = components.router.resolve(&path);
            println!("url:        {}", route.to_url());
            println!("static:     {}", route.is_static_route());
            println!("namespaces: {:?}", route.namespaces());
            println!("controller: {}", route.qualified_controller_name().unwrap_or_default());
            println!("action:     {}", route.method_name().unwrap_or_default());
            println!("parameters: {:?}", route.parameters());
            for (key, value) in route.named_parameters() {
                println!("  {} = {}", key, value);
            }

            let rendered = components.dispatcher.dispatch(&route, &info);
            println!();
            match rendered.failure {
                Some(kind) => {
                    let note = if rendered.fallback { ", fallback" } else { "" };
                    println!("status {} ({}{})", rendered.status, kind, note);
                }
                None => println!("status {}", rendered.status),
            }
            println!("{}", rendered.body);
        }
    }

    Ok(())
}
