use std::sync::Arc;

use tracing::{debug, error};

use crate::config::StaticFilesConfig;
use crate::error::ServeError;
use crate::files::resolver::{Resolution, Resolver};
use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Turns requests into responses backed by files under one root.
///
/// Cheap to clone; every connection holds its own handle to the same
/// resolver.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    resolver: Arc<Resolver>,
}

impl StaticFiles {
    pub fn new(cfg: &StaticFilesConfig) -> anyhow::Result<Self> {
        Ok(Self {
            resolver: Arc::new(Resolver::new(cfg)?),
        })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Produces the response for `req`. Never fails: every error becomes a
    /// status code.
    pub async fn respond(&self, req: &Request) -> Response {
        if !matches!(req.method, Method::GET | Method::HEAD) {
            return Response::method_not_allowed();
        }

        let response = match self.resolve(&req.path).await {
            Ok(Resolution::File(found)) => {
                debug!(path = %found.path.display(), len = found.len, "serving file");
                let file = tokio::fs::File::from_std(found.file);
                Response::file(file, found.len, &found.content_type)
            }
            Ok(Resolution::Redirect(location)) => Response::redirect(location),
            Err(ServeError::Internal(e)) => {
                error!(path = %req.path, error = %e, "failed to read file");
                Response::internal_error()
            }
            Err(e) => Response::empty(e.status()),
        };

        if req.method == Method::HEAD {
            response.without_body()
        } else {
            response
        }
    }

    /// Runs the resolver on the blocking pool. A panic inside it surfaces as
    /// an internal error.
    async fn resolve(&self, uri: &str) -> Result<Resolution, ServeError> {
        let resolver = Arc::clone(&self.resolver);
        let uri = uri.to_owned();

        tokio::task::spawn_blocking(move || resolver.resolve(&uri))
            .await
            .unwrap_or_else(|join_err| Err(ServeError::Internal(std::io::Error::other(join_err))))
    }
}
