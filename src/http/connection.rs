use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::http::parser::request_from_reader;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::handler::Handler;

/// One accepted client: a single request in, a single response out.
pub struct Connection<H> {
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<H>,
    read_buffer_size: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<H: Handler> Connection<H> {
    pub fn new(stream: TcpStream, peer: SocketAddr, handler: Arc<H>, read_buffer_size: usize) -> Self {
        Self {
            stream,
            peer,
            handler,
            read_buffer_size,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Ok(req) => ConnectionState::Processing(req),
                        Err(response) => ConnectionState::Writing(ResponseWriter::new(&response)),
                    };
                }

                ConnectionState::Processing(req) => {
                    let response = Self::handle_request(self.handler.as_ref(), req);
                    debug!(
                        peer = %self.peer,
                        method = req.method(),
                        target = req.target(),
                        headers = req.headers.len(),
                        status = response.status.as_u16(),
                        "Request handled"
                    );

                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "Shutdown of client stream failed");
        }

        Ok(())
    }

    /// Reads one request off the socket.
    ///
    /// Framing errors become a ready-made 400 response in the inner `Err`;
    /// transport failures abandon the connection.
    async fn read_request(&mut self) -> anyhow::Result<Result<Request, Response>> {
        match request_from_reader(&mut self.stream, self.read_buffer_size).await {
            Ok(req) => Ok(Ok(req)),
            Err(e) if !e.is_client_error() => Err(anyhow::Error::new(e).context("reading request")),
            Err(e) => {
                warn!(peer = %self.peer, error = %e, "Rejecting malformed request");
                Ok(Err(Response::error(StatusCode::BAD_REQUEST, e.to_string())))
            }
        }
    }

    fn handle_request(handler: &H, req: &Request) -> Response {
        let mut body = BytesMut::new();

        match handler.handle(&mut body, req) {
            Ok(()) => Response::ok(body.to_vec()),
            Err(e) => Response::error(e.status, e.message),
        }
    }
}
