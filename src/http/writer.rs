use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::http::headers::Headers;
use crate::http::response::{Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Appends `HTTP/1.1 <code> <reason>\r\n`.
///
/// Codes without a known reason phrase keep the trailing space.
pub fn write_status_line(buf: &mut Vec<u8>, status: StatusCode) {
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());
}

/// Appends one `Key: Value\r\n` line per field, then the blank line.
pub fn write_headers(buf: &mut Vec<u8>, headers: &Headers) {
    for (k, v) in headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");
}

pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body.len());

    write_status_line(&mut buf, resp.status);
    write_headers(&mut buf, &resp.headers);
    buf.extend_from_slice(&resp.body);

    buf
}

/// Serialized response plus progress through it.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
            trace!(written = self.written, total = self.buffer.len(), "Response bytes written");
        }

        stream.flush().await?;
        Ok(())
    }
}
