//! HTTP protocol implementation.
//!
//! This module implements HTTP/1.1 framing directly on top of TCP. Each
//! connection carries exactly one request and one response.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: Per-connection state machine driving read, handle and write
//! - **`headers`**: Case-insensitive header collection and its line parser
//! - **`parser`**: Incremental request parser fed with arbitrary byte chunks
//! - **`request`**: HTTP request representation and parse state
//! - **`response`**: Status codes, default headers and the response value
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Parser State Machine
//!
//! ```text
//!        ┌────────────────────┐
//!        │ ParsingRequestLine │ ← METHOD SP TARGET SP HTTP/1.1 CRLF
//!        └─────────┬──────────┘
//!                  ▼
//!        ┌────────────────────┐
//!        │   ParsingHeaders   │ ← Name: Value CRLF, until blank CRLF
//!        └─────────┬──────────┘
//!                  ▼
//!        ┌────────────────────┐
//!        │    ParsingBody     │ ← exactly Content-Length bytes
//!        └─────────┬──────────┘
//!                  ▼
//!        ┌────────────────────┐
//!        │        Done        │
//!        └────────────────────┘
//! ```
//!
//! # Connection State Machine
//!
//! ```text
//!   Reading ──► Processing ──► Writing ──► Closed
//!      │                          ▲
//!      └── framing error (400) ───┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use wireline::http::parser::request_from_reader;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:42069").await?;
//!     let (mut socket, _addr) = listener.accept().await?;
//!     let request = request_from_reader(&mut socket, 1024).await?;
//!     println!("{} {}", request.method(), request.target());
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
