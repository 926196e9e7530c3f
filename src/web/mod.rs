//! Web API module for lorad.
//!
//! Exposes the gateway over HTTP: download into the managed root, list
//! the catalog, stream files back, and serve the embedded UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
