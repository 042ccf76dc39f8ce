//! HTTP server layer for the thumbnail proxy.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │          GET /{signature}?/{resize}{gravity}?/{url}             │
//! │                                                                 │
//! │  ┌─────────────────────────┐  ┌─────────────────────────────┐   │
//! │  │        handlers         │  │           routes            │   │
//! │  │ (proxy, health)         │  │ (router, CORS, tracing)     │   │
//! │  └─────────────────────────┘  └─────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{health_handler, proxy_handler, AppState, HealthResponse};
pub use routes::{create_router, RouterConfig};
