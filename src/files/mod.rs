//! Static file resolution.
//!
//! - **`path`**: lexical normalization of request targets
//! - **`resolver`**: maps a normalized path to an open file under the root
//! - **`service`**: turns requests into responses using the resolver

pub mod path;
pub mod resolver;
pub mod service;

pub use resolver::{Resolution, ResolvedFile, Resolver};
pub use service::StaticFiles;
