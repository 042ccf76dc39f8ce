//! Configuration management for the thumbnail proxy.
//!
//! Configuration comes from:
//! - Command-line arguments via clap
//! - Environment variables with `THUMB_` prefix
//! - Defaults for every optional setting
//!
//! # Environment Variables
//!
//! - `THUMB_HOST` - Server bind address (default: 0.0.0.0)
//! - `THUMB_PORT` - Server port (default: 3000)
//! - `THUMB_CACHE_HEADERS` - `Name: value` pairs separated by `;`
//!   (default: `Cache-Control: max-age=86400, public`)
//! - `THUMB_SIGNATURES_IN_USE` - Expect a signature segment (default: false)
//! - `THUMB_UPSTREAM_TIMEOUT` - Upstream fetch timeout in seconds (default: 30)
//! - `THUMB_JPEG_QUALITY` - JPEG re-encode quality (default: 85)
//! - `THUMB_TEMP_DIR` - Directory for working images (default: system temp)
//! - `THUMB_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::proxy::DEFAULT_CACHE_CONTROL;
use crate::request::{Gravity, GRAVITY_CODES};
use crate::transform::{is_valid_quality, DEFAULT_JPEG_QUALITY};
use crate::upstream::DEFAULT_UPSTREAM_TIMEOUT;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default cache header entry.
pub const DEFAULT_CACHE_HEADER: &str = "Cache-Control: max-age=86400, public";

/// Default upstream timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = DEFAULT_UPSTREAM_TIMEOUT.as_secs();

// =============================================================================
// CLI Structure
// =============================================================================

/// Thumb Proxy - resize remote images on the fly.
///
/// Run without a subcommand to start the server.
#[derive(Parser, Debug)]
#[command(name = "thumb-proxy")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// Resolve the command, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the proxy server (default)
    Serve(ServeConfig),

    /// Print a proxy URL for an upstream image
    Url(UrlConfig),
}

// =============================================================================
// Serve Configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "THUMB_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "THUMB_PORT")]
    pub port: u16,

    /// Headers added to every image response, as `Name: value` entries.
    ///
    /// Multiple entries are separated by `;`.
    #[arg(
        long,
        env = "THUMB_CACHE_HEADERS",
        value_delimiter = ';',
        default_value = DEFAULT_CACHE_HEADER
    )]
    pub cache_headers: Vec<String>,

    /// Expect a signature segment in proxy paths.
    ///
    /// No validator is installed, so signed and unsigned paths are both
    /// served.
    #[arg(long, default_value_t = false, env = "THUMB_SIGNATURES_IN_USE")]
    pub signatures_in_use: bool,

    /// Upstream fetch timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS, env = "THUMB_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    /// JPEG quality for resized output (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "THUMB_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Directory for working images.
    #[arg(long, env = "THUMB_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "THUMB_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.upstream_timeout == 0 {
            return Err("upstream_timeout must be greater than 0".to_string());
        }

        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if let Some(ref dir) = self.temp_dir {
            if !dir.is_dir() {
                return Err(format!("temp_dir {} is not a directory", dir.display()));
            }
        }

        self.cache_header_map().map(|_| ())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    /// Parse the cache header entries.
    ///
    /// Blank entries are skipped. Repeated names keep every value, in order.
    pub fn cache_header_map(&self) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        for entry in &self.cache_headers {
            if entry.trim().is_empty() {
                continue;
            }
            let (name, value) = parse_header_entry(entry)?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

/// Parse a single `Name: value` entry.
fn parse_header_entry(entry: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = entry
        .split_once(':')
        .ok_or_else(|| format!("cache header '{}' is not of the form 'Name: value'", entry))?;

    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| format!("invalid cache header name in '{}'", entry))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|_| format!("invalid cache header value in '{}'", entry))?;

    Ok((name, value))
}

// =============================================================================
// Url Configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct UrlConfig {
    /// Upstream image URL (http or https).
    pub upstream: String,

    /// Target width in pixels.
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Target height in pixels.
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Gravity code: nw, n, ne, w, c, e, sw, s, se.
    #[arg(short, long)]
    pub gravity: Option<String>,

    /// Base URL of the proxy (e.g. http://localhost:3000).
    ///
    /// If omitted, only the path is printed.
    #[arg(long)]
    pub base_url: Option<String>,
}

impl UrlConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.upstream.is_empty() {
            return Err("upstream URL is required".to_string());
        }

        if let Some(ref code) = self.gravity {
            if !GRAVITY_CODES.contains(&code.as_str()) {
                return Err(format!(
                    "unknown gravity '{}', expected one of: {}",
                    code,
                    GRAVITY_CODES.join(", ")
                ));
            }
        }

        Ok(())
    }

    /// The requested gravity, if any.
    pub fn gravity(&self) -> Option<Gravity> {
        self.gravity
            .as_deref()
            .map(|code| Gravity::from_code(Some(code)))
    }
}

// =============================================================================
// Tests
// =============================================================================
