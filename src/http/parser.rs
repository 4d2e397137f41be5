//! Incremental HTTP/1.1 request parser.
//!
//! Bytes may be split across reads at any position. [`Request::parse`]
//! consumes whatever complete constructs are available and reports how much
//! it used; the caller keeps the rest and retries once more bytes arrive.

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::http::request::{ParseState, Request, RequestLine};

const HTTP_PREFIX: &str = "HTTP/";
const SUPPORTED_VERSION: &str = "1.1";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),

    #[error("invalid method: {0} - must only contain uppercase letters")]
    InvalidMethod(String),

    #[error("unsupported http version: {0} - must be HTTP/1.1")]
    UnsupportedVersion(String),

    #[error("malformed header line: {0}")]
    MalformedHeaderLine(String),

    #[error("invalid characters in header name: {0}")]
    InvalidHeaderName(String),

    #[error("invalid content length: {0}")]
    InvalidContentLength(String),

    #[error("incomplete request")]
    IncompleteRequest,

    #[error("body too short: expected {expected} bytes, received {received}")]
    BodyTooShort { expected: usize, received: usize },

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Whether the peer sent bad framing, as opposed to the transport failing.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ParseError::Io(_))
    }
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

impl Request {
    /// Feeds `data` to the parser and returns the number of bytes consumed.
    ///
    /// Stops when the request is done or when no further progress can be
    /// made with the bytes at hand. A return of 0 means more input is needed.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut total = 0;

        while self.state != ParseState::Done {
            let n = self.parse_single(&data[total..])?;
            total += n;

            // No progress short of Done means more input is needed
            if n == 0 && self.state != ParseState::Done {
                break;
            }
        }

        Ok(total)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::ParsingRequestLine => {
                let Some(end) = find_crlf(data) else {
                    return Ok(0);
                };

                self.request_line = parse_request_line(&data[..end])?;
                self.transition(ParseState::ParsingHeaders);
                Ok(end + 2)
            }

            ParseState::ParsingHeaders => {
                let (n, done) = self.headers.parse(data)?;
                if done {
                    self.transition(ParseState::ParsingBody);
                }
                Ok(n)
            }

            ParseState::ParsingBody => {
                let content_length = match self.content_length()? {
                    None | Some(0) => {
                        self.transition(ParseState::Done);
                        return Ok(0);
                    }
                    Some(len) => len,
                };

                let take = data.len().min(content_length - self.body.len());
                self.body.extend_from_slice(&data[..take]);

                if self.body.len() == content_length {
                    self.transition(ParseState::Done);
                }
                Ok(take)
            }

            ParseState::Done => Ok(0),
        }
    }

    fn transition(&mut self, next: ParseState) {
        trace!(from = ?self.state, to = ?next, "Parser state transition");
        self.state = next;
    }
}

fn parse_request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let line = std::str::from_utf8(line)
        .map_err(|_| ParseError::MalformedRequestLine(String::from_utf8_lossy(line).into_owned()))?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::MalformedRequestLine(line.to_string()));
    };

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::InvalidMethod(method.to_string()));
    }

    match version.strip_prefix(HTTP_PREFIX) {
        Some(SUPPORTED_VERSION) => {}
        _ => return Err(ParseError::UnsupportedVersion(version.to_string())),
    }

    Ok(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        http_version: SUPPORTED_VERSION.to_string(),
    })
}

/// Reads from `reader` until a complete request has been parsed.
///
/// Reads are accumulated in a growable buffer; whatever the parser does not
/// consume stays at the front of the buffer for the next attempt.
pub async fn request_from_reader<R>(reader: &mut R, read_size: usize) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut request = Request::new();
    let mut buf = BytesMut::with_capacity(read_size);

    while !request.is_done() {
        buf.reserve(read_size);
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            break;
        }

        let consumed = request.parse(&buf)?;
        buf.advance(consumed);
    }

    match request.state {
        ParseState::Done => Ok(request),
        ParseState::ParsingBody => Err(ParseError::BodyTooShort {
            expected: request.content_length()?.unwrap_or(0),
            received: request.body.len(),
        }),
        _ => Err(ParseError::IncompleteRequest),
    }
}
