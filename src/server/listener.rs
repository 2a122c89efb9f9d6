use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::files::StaticFiles;
use crate::http::connection::Connection;

/// Accepts connections and serves each one on its own task.
pub struct Listener {
    listener: TcpListener,
    local_addr: SocketAddr,
    files: StaticFiles,
}

impl Listener {
    /// Binds the configured address and prepares the static file service.
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let files = StaticFiles::new(&cfg.static_files)?;

        let listener = TcpListener::bind(&cfg.server.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", cfg.server.listen_addr))?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            files,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the accept loop until the returned future is dropped.
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            root = %self.files.resolver().root().display(),
            "Listening on {}", self.local_addr
        );

        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);

            let files = self.files.clone();
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, files);
                if let Err(e) = conn.run().await {
                    debug!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }
}
