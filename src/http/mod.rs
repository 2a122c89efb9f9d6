//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 side of the server, with keep-alive
//! and pipelined requests.
//!
//! # Architecture
//!
//! - **`connection`**: The connection handler implementing the request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and header helpers
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes responses and streams their bodies to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │  Receiving  │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request parsed          (malformed → Responding 400)
//!               ▼
//!        ┌──────────────────┐
//!        │    Resolving     │ ← Map the path to a file
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Write head, stream body
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Finalized     │ ← Response and file handle released
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → Receiving (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shelf::config::StaticFilesConfig;
//! use shelf::files::StaticFiles;
//! use shelf::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let files = StaticFiles::new(&StaticFilesConfig::default())?;
//!     let listener = TcpListener::bind("127.0.0.1:8000").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let files = files.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, files);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
