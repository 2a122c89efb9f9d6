use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes one response to the client.
///
/// The writer owns the response, so the body (and any open file) is dropped
/// as soon as [`ResponseWriter::write_to_stream`] returns, whether the write
/// succeeded or the client went away halfway through.
pub struct ResponseWriter {
    head: Vec<u8>,
    body: Body,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        let head = serialize_head(&response);
        Self {
            head,
            body: response.body,
        }
    }

    /// Writes the status line, headers and body; returns the body bytes sent.
    pub async fn write_to_stream<W>(self, stream: &mut W) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let Self { head, body } = self;

        stream
            .write_all(&head)
            .await
            .context("failed to write response head")?;

        let sent = match body {
            Body::Empty => 0,
            Body::Bytes(bytes) => {
                stream
                    .write_all(&bytes)
                    .await
                    .context("failed to write response body")?;
                bytes.len() as u64
            }
            Body::File { file, len } => {
                let mut limited = file.take(len);
                let copied = tokio::io::copy(&mut limited, stream)
                    .await
                    .context("failed to stream file body")?;

                if copied < len {
                    anyhow::bail!("file shrank while streaming: sent {copied} of {len} bytes");
                }
                copied
            }
        };

        stream.flush().await.context("failed to flush response")?;

        Ok(sent)
    }
}
