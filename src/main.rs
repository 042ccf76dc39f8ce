//! Thumb Proxy - resize remote images on the fly.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thumb_proxy::{
    config::{Cli, Command, ServeConfig, UrlConfig},
    proxy::{ProxyConfig, ThumbProxy},
    request::ThumbUrl,
    server::{create_router, RouterConfig},
    transform::RasterProcessor,
    upstream::HttpFetcher,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Url(config) => run_url(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let cache_headers = match config.cache_header_map() {
        Ok(headers) => headers,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Thumb Proxy v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Upstream timeout: {}s", config.upstream_timeout);
    info!("  JPEG quality: {}", config.jpeg_quality);
    for (name, value) in cache_headers.iter() {
        info!("  Response header: {}: {:?}", name, value);
    }
    match config.temp_dir {
        Some(ref dir) => info!("  Working directory: {}", dir.display()),
        None => info!("  Working directory: system temp"),
    }

    if config.signatures_in_use {
        warn!("  Signatures: expected, but no validator is installed");
        warn!("              Signed and unsigned paths are both served");
    }

    let fetcher = match HttpFetcher::new(config.upstream_timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut proxy_config = ProxyConfig::default()
        .with_cache_headers(cache_headers)
        .with_signatures_in_use(config.signatures_in_use);
    if let Some(ref dir) = config.temp_dir {
        proxy_config = proxy_config.with_temp_dir(dir);
    }

    let proxy = ThumbProxy::new(
        fetcher,
        RasterProcessor::new(config.jpeg_quality),
        proxy_config,
    );
    let router = create_router(proxy, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -o thumb.png http://{}/200x/http://example.com/image.png",
        addr
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "thumb_proxy=debug,tower_http=debug"
    } else {
        "thumb_proxy=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::default();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Url Command
// =============================================================================

fn run_url(config: UrlConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut url = ThumbUrl::new(&config.upstream);
    if let Some(width) = config.width {
        url = url.with_width(width);
    }
    if let Some(height) = config.height {
        url = url.with_height(height);
    }
    if let Some(gravity) = config.gravity() {
        url = url.with_gravity(gravity);
    }

    match config.base_url {
        Some(ref base_url) => println!("{}", url.with_base_url(base_url).to_url()),
        None => {
            println!("{}", url.path());
            eprintln!();
            eprintln!("Tip: Use --base-url to generate a complete URL");
        }
    }

    ExitCode::SUCCESS
}
