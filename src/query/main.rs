//! Query server for address resolution.
//!
//! Provides HTTP API over the resolver. The dictionary is loaded on startup
//! in the background and, if that fails, again on the next request.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use jusho::config::Config;
use jusho::{AddressResolver, ConfiguredSource, Error, ResolveOptions, ResolvedAddress, MAX_LEVEL};

/// Largest accepted batch
const MAX_BATCH: usize = 10_000;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Japanese address normalization server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Dictionary JSON file, optionally .gz (overrides config)
    #[arg(long, conflicts_with = "dictionary_url")]
    dictionary: Option<PathBuf>,

    /// Dictionary URL (overrides config)
    #[arg(long)]
    dictionary_url: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// File configuration with command-line overrides applied.
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(path) = self.dictionary {
            config.dictionary.path = Some(path);
            config.dictionary.url = None;
        }
        if let Some(url) = self.dictionary_url {
            config.dictionary.url = Some(url);
            config.dictionary.path = None;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Application state shared across handlers
struct AppState {
    resolver: AddressResolver<ConfiguredSource>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.into_config()?;
    let source = config.source()?;

    info!("Jusho Query Server");

    let state = Arc::new(AppState {
        resolver: AddressResolver::new(source),
    });

    // Warm the dictionary so the first request does not pay for the load
    let warm = state.clone();
    tokio::spawn(async move {
        match warm.resolver.dictionary().await {
            Ok(dict) => info!(
                "Dictionary ready: {} cities, {} towns",
                dict.city_count(),
                dict.town_count()
            ),
            Err(e) => warn!("Initial dictionary load failed: {}", e),
        }
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/normalize", get(normalize_handler))
        .route("/v1/normalize/batch", post(batch_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let loaded = state.resolver.is_loaded();

    Json(HealthResponse {
        status: if loaded { "ok" } else { "loading" },
        dictionary_loaded: loaded,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    dictionary_loaded: bool,
}

/// Resolve a single address
async fn normalize_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NormalizeQueryParams>,
) -> Result<Json<ResolvedAddress>, (StatusCode, String)> {
    let options = options_for(params.level)?;

    let resolved = state
        .resolver
        .resolve(&params.address, &options)
        .await
        .map_err(error_response)?;

    Ok(Json(resolved))
}

/// Resolve many addresses in one request
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<Vec<ResolvedAddress>>, (StatusCode, String)> {
    if body.addresses.len() > MAX_BATCH {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("at most {} addresses per batch", MAX_BATCH),
        ));
    }
    let options = options_for(body.level)?;

    let resolved = state
        .resolver
        .resolve_batch(body.addresses, options)
        .await
        .map_err(error_response)?;

    Ok(Json(resolved))
}

fn options_for(level: Option<u8>) -> Result<ResolveOptions, (StatusCode, String)> {
    match level {
        None => Ok(ResolveOptions::default()),
        Some(level) if level <= MAX_LEVEL => Ok(ResolveOptions::with_level(level)),
        Some(level) => Err((
            StatusCode::BAD_REQUEST,
            format!("level must be between 0 and {}, got {}", MAX_LEVEL, level),
        )),
    }
}

fn error_response(e: Error) -> (StatusCode, String) {
    tracing::error!("Resolution failed: {}", e);
    let status = match e {
        Error::DictionaryUnavailable(_) | Error::InvalidDictionary(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        Error::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

#[derive(Deserialize)]
struct NormalizeQueryParams {
    /// Free-form address
    address: String,
    /// Deepest level to attempt (0-8)
    level: Option<u8>,
}

#[derive(Deserialize)]
struct BatchRequest {
    addresses: Vec<String>,
    level: Option<u8>,
}
