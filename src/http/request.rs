use crate::http::headers::Headers;
use crate::http::parser::ParseError;

/// The start line of a request: `METHOD SP TARGET SP HTTP/1.1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase ASCII letters only (e.g. "GET")
    pub method: String,
    /// The request target as sent (e.g. "/search?q=rust")
    pub target: String,
    /// Version number without the "HTTP/" prefix; always "1.1"
    pub http_version: String,
}

/// Progress of an incremental parse. Transitions only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseState {
    #[default]
    ParsingRequestLine,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// Represents an HTTP request read from a client.
///
/// Starts empty and is filled in by [`Request::parse`] as bytes arrive.
/// Once the state reaches [`ParseState::Done`] the request is complete and
/// handed to the handler read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub(crate) state: ParseState,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn http_version(&self) -> &str {
        &self.request_line.http_version
    }

    /// Case-insensitive header lookup, `""` when absent.
    pub fn header(&self, key: &str) -> &str {
        self.headers.get(key)
    }

    /// The declared body length.
    ///
    /// `Ok(None)` when the header is absent or empty, an error when it is not
    /// a non-negative integer.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        let raw = self.header("Content-Length");
        if raw.is_empty() {
            return Ok(None);
        }

        raw.parse::<usize>()
            .map(Some)
            .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }
}
