use crate::http::headers::Headers;

/// HTTP status code sent on the status line.
///
/// Any numeric code may be sent; only a few carry a reason phrase:
/// - `OK` (200): Request successful
/// - `BAD_REQUEST` (400): Malformed request
/// - `INTERNAL_SERVER_ERROR` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use wireline::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode(418).as_u16(), 418);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase, or `""` for codes without one.
    ///
    /// # Example
    ///
    /// ```
    /// # use wireline::http::response::StatusCode;
    /// assert_eq!(StatusCode::BAD_REQUEST.reason_phrase(), "Bad Request");
    /// assert_eq!(StatusCode(404).reason_phrase(), "");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            400 => "Bad Request",
            500 => "Internal Server Error",
            _ => "",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// Headers sent with every response: `Content-Length`, `Connection: close`
/// and `Content-Type: text/plain`.
pub fn default_headers(body_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", body_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

/// Represents a complete HTTP response ready to be sent to a client.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Header fields, written in the collection's iteration order
    pub headers: Headers,
    /// Response body as bytes
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::with_status(StatusCode::OK, body.into())
    }

    /// Creates an error response whose body is `message`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_status(status, message.into().into_bytes())
    }

    fn with_status(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: default_headers(body.len()),
            body,
        }
    }
}
