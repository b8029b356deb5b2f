//! Request classification: read one HTTP/1.x request head off a fresh client
//! connection and pull out the method and target.

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

pub const CONNECT: &str = "CONNECT";

/// Why a client connection produced no usable request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("client closed before completing the request line")]
    Closed,
    #[error("malformed request line: {0:?}")]
    Malformed(String),
    #[error("request head exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

/// The request line split into method and target, plus the head verbatim.
///
/// `head` holds the request line, every header line and the blank
/// terminator exactly as received, so it can be replayed to an origin.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    method: String,
    target: String,
    head: Bytes,
}

impl ParsedRequest {
    /// Upper-cased method token
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Second token of the request line: an authority for CONNECT, usually a URI otherwise
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn head(&self) -> &[u8] {
        &self.head
    }

    pub fn is_connect(&self) -> bool {
        self.method == CONNECT
    }

    /// Value of the first `Host:` header, matched case-insensitively.
    ///
    /// Returns `None` when the header is missing or its value is blank.
    pub fn host_header(&self) -> Option<String> {
        self.head
            .split(|b| *b == b'\n')
            .skip(1)
            .map(|line| line.trim_ascii())
            .find(|line| line.len() >= 5 && line[..5].eq_ignore_ascii_case(b"host:"))
            .map(|line| String::from_utf8_lossy(&line[5..]).trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Read the request head from `reader`.
///
/// The first CRLF-terminated line must be complete; later lines are collected
/// until a bare CRLF or until reading stops short, in which case the head
/// captured so far is kept. Bytes after the blank line stay buffered in
/// `reader`.
pub async fn read_request<R>(reader: &mut R, max_head: usize) -> Result<ParsedRequest, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut head = BytesMut::with_capacity(1024);
    let mut line = Vec::with_capacity(256);

    if !read_crlf_line(reader, &mut line, max_head).await? {
        return Err(RequestError::Closed);
    }
    head.extend_from_slice(&line);
    let request_line = String::from_utf8_lossy(&line).trim().to_string();

    loop {
        let remaining = max_head.saturating_sub(head.len());
        match read_crlf_line(reader, &mut line, remaining).await {
            Ok(true) => {
                head.extend_from_slice(&line);
                if line == b"\r\n" {
                    break;
                }
            }
            Ok(false) | Err(RequestError::Io(_)) => break,
            Err(e) => return Err(e),
        }
    }

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(RequestError::Malformed(request_line));
    };

    Ok(ParsedRequest {
        method: method.to_ascii_uppercase(),
        target: target.to_string(),
        head: head.freeze(),
    })
}

/// Replace `line` with the next line ending in CRLF.
///
/// Bare LFs inside the line are kept. Returns `false` on EOF before a CRLF,
/// discarding the partial line.
async fn read_crlf_line<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    limit: usize,
) -> Result<bool, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    line.clear();
    loop {
        let budget = limit.saturating_sub(line.len());
        if budget == 0 {
            return Err(RequestError::TooLarge { limit });
        }
        let n = (&mut *reader)
            .take(budget as u64)
            .read_until(b'\n', line)
            .await?;
        if n == 0 {
            return Ok(false);
        }
        if line.ends_with(b"\r\n") {
            return Ok(true);
        }
        if !line.ends_with(b"\n") && line.len() < limit {
            // read_until stopped without a delimiter and under budget: EOF
            return Ok(false);
        }
    }
}
