//! Shelf - static file server
//!
//! Serves files from one root directory over HTTP/1.1.

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod server;
