use crate::http::request::{Method, Request};
use std::collections::HashMap;
use thiserror::Error;

/// Largest request (head plus body) a connection will buffer.
pub const MAX_REQUEST_SIZE: usize = 64 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid request line")]
    InvalidRequest,
    #[error("unknown method")]
    InvalidMethod,
    #[error("unsupported HTTP version")]
    InvalidVersion,
    #[error("invalid header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("Transfer-Encoding is not supported on requests")]
    UnsupportedTransferEncoding,
    #[error("request too large")]
    TooLarge,
    #[error("incomplete request")]
    Incomplete,
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// [`ParseError::Incomplete`] when more bytes are needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(end) => end,
        None if buf.len() > MAX_REQUEST_SIZE => return Err(ParseError::TooLarge),
        None => return Err(ParseError::Incomplete),
    };
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split(' ');

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    if parts.next().is_some() || path.is_empty() {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    if version != "HTTP/1.1" && version != "HTTP/1.0" {
        return Err(ParseError::InvalidVersion);
    }

    // Headers, names lowercased; repeats are joined as a list
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut content_length: Option<usize> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;

        if key.is_empty() || key.contains(|c: char| c.is_ascii_whitespace()) {
            return Err(ParseError::InvalidHeader);
        }

        let key = key.to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "transfer-encoding" => return Err(ParseError::UnsupportedTransferEncoding),
            "content-length" => {
                let len = parse_content_length(value)?;
                if content_length.is_some_and(|seen| seen != len) {
                    return Err(ParseError::InvalidContentLength);
                }
                content_length = Some(len);
                headers.insert(key, value.to_string());
            }
            _ => {
                headers
                    .entry(key)
                    .and_modify(|v| {
                        v.push_str(", ");
                        v.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
        }
    }

    // Body
    let content_length = content_length.unwrap_or(0);

    let total_consumed = (headers_end + 4)
        .checked_add(content_length)
        .filter(|&total| total <= MAX_REQUEST_SIZE)
        .ok_or(ParseError::TooLarge)?;

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    Ok((request, total_consumed))
}

/// Content-Length is one or more ASCII digits, nothing else.
fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength);
    }
    // Values too large for usize are certainly too large to buffer.
    value.parse().map_err(|_| ParseError::TooLarge)
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
