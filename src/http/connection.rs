use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, info, warn};

use crate::error::ServeError;
use crate::files::StaticFiles;
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 4096;

/// One client connection serving requests until it closes.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    files: StaticFiles,
    state: ConnectionState,
}

/// Per-request lifecycle.
///
/// Every request that leaves `Receiving` passes through `Responding` exactly
/// once and ends in `Finalized`; the response, and any file it holds, is
/// gone by then.
pub enum ConnectionState {
    Receiving,
    Resolving(Request),
    Responding {
        response: Response,
        keep_alive: bool,
        request: RequestSummary,
    },
    Finalized {
        keep_alive: bool,
    },
    Closed,
}

/// What gets logged about a request once it has been answered.
pub struct RequestSummary {
    method: &'static str,
    path: String,
}

enum Received {
    Request(Request),
    Malformed(ParseError),
    Eof,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, files: StaticFiles) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            files,
            state: ConnectionState::Receiving,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Receiving => {
                    self.state = match self.read_request().await? {
                        Received::Request(req) => ConnectionState::Resolving(req),
                        Received::Malformed(e) => {
                            debug!(error = %e, "malformed request");
                            let status = ServeError::MalformedRequest(e).status();
                            ConnectionState::Responding {
                                response: Response::empty(status),
                                keep_alive: false,
                                request: RequestSummary {
                                    method: "-",
                                    path: "-".to_string(),
                                },
                            }
                        }
                        Received::Eof => ConnectionState::Closed,
                    };
                }

                ConnectionState::Resolving(req) => {
                    let response = self.files.respond(&req).await;
                    self.state = ConnectionState::Responding {
                        response,
                        keep_alive: req.keep_alive(),
                        request: RequestSummary {
                            method: req.method.as_str(),
                            path: req.path,
                        },
                    };
                }

                ConnectionState::Responding {
                    response,
                    keep_alive,
                    request,
                } => {
                    let response = if keep_alive {
                        response
                    } else {
                        response.close_connection()
                    };
                    let status = response.status.as_u16();

                    let writer = ResponseWriter::new(response);
                    self.state = match writer.write_to_stream(&mut self.stream).await {
                        Ok(sent) => {
                            info!(
                                method = request.method,
                                path = %request.path,
                                status,
                                bytes = sent,
                                "request served"
                            );
                            ConnectionState::Finalized { keep_alive }
                        }
                        Err(e) => {
                            warn!(
                                method = request.method,
                                path = %request.path,
                                status,
                                error = %e,
                                "response aborted"
                            );
                            ConnectionState::Finalized { keep_alive: false }
                        }
                    };
                }

                ConnectionState::Finalized { keep_alive } => {
                    self.state = if keep_alive {
                        ConnectionState::Receiving // go back for next request
                    } else {
                        ConnectionState::Closed
                    };
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<Received> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Received::Request(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Ok(Received::Malformed(e)),
            }

            self.buffer.reserve(READ_CHUNK);
            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Client closed connection
                return Ok(Received::Eof);
            }
        }
    }
}
