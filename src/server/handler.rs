use bytes::BytesMut;

use crate::http::request::Request;
use crate::http::response::StatusCode;

/// Failure reported by a handler; sent to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: impl Into<StatusCode>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Status: {}, {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for HandlerError {}

/// Application callback run once per parsed request.
///
/// Whatever the handler writes into `body` is sent as a 200 response. An
/// `Err` replaces that with the error's status and message.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, body: &mut BytesMut, request: &Request) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&mut BytesMut, &Request) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, body: &mut BytesMut, request: &Request) -> Result<(), HandlerError> {
        self(body, request)
    }
}
