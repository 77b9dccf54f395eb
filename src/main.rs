use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use binwatch::config::AppConfig;
use binwatch::error::AppError;
use binwatch::reports::{report_router, InMemoryReportRepository, ReportService, SmtpNotificationSink};
use binwatch::telemetry;
use binwatch::zones::{WorkerRegistry, WorkerRoster, ZoneCatalog, ZoneDirectory};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "binwatch",
    about = "Garbage-report intake service with zone-based crew dispatch",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Zone dataset utilities
    Zone {
        #[command(subcommand)]
        command: ZoneCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum ZoneCommand {
    /// Resolve a coordinate pair against the zone dataset
    Resolve(ZoneResolveArgs),
}

#[derive(Args, Debug)]
struct ZoneResolveArgs {
    /// Point longitude (first coordinate of the dataset's vertex order)
    #[arg(long)]
    longitude: f64,
    /// Point latitude
    #[arg(long)]
    latitude: f64,
    /// Zone dataset to resolve against (defaults to the configured path)
    #[arg(long)]
    dataset: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Zone {
            command: ZoneCommand::Resolve(args),
        } => run_zone_resolve(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(ZoneCatalog::load_or_empty(&config.zones.dataset_path));
    let directory = Arc::new(ZoneDirectory::load_or_empty(&config.zones.directory_path));
    let roster = Arc::new(WorkerRoster::load_or_empty(
        &config.zones.roster_path,
        config.zones.zone_count,
    ));
    let repository = Arc::new(InMemoryReportRepository::default());
    let notifier = Arc::new(SmtpNotificationSink::new(config.mail.clone()));

    let service = Arc::new(ReportService::new(
        catalog.clone(),
        directory,
        roster,
        repository,
        notifier,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(report_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, zones = catalog.len(), "garbage-report service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Operator spot check for the dataset's (longitude, latitude) convention:
/// resolves one point and shows the zone, its mailbox, and the assigned crew.
fn run_zone_resolve(args: ZoneResolveArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let dataset = args.dataset.unwrap_or(config.zones.dataset_path);

    let catalog = ZoneCatalog::from_path(&dataset)?;
    let directory = ZoneDirectory::load_or_empty(&config.zones.directory_path);
    let roster = WorkerRoster::load_or_empty(&config.zones.roster_path, config.zones.zone_count);

    let point = binwatch::reports::Coordinates {
        longitude: args.longitude,
        latitude: args.latitude,
    };
    let resolution = catalog.resolve(point);
    let label = resolution.label();

    println!("Point (lon, lat): {}, {}", args.longitude, args.latitude);
    println!("Resolved: {label}");
    println!(
        "Notification address: {}",
        directory.notification_address(&label).unwrap_or("none")
    );
    let worker = resolution
        .zone_number()
        .and_then(|zone_number| roster.active_worker(zone_number));
    match worker {
        Some(worker) => println!("Assigned worker: {}", worker.0),
        None => println!("Assigned worker: none"),
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
