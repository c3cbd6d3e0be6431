//! # HTTP Server Module
//!
//! Binds the REST router to a socket with CORS and request tracing.

pub mod config;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
