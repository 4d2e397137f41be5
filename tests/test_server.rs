use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use wireline::config::ServerConfig;
use wireline::http::request::Request;
use wireline::http::response::StatusCode;
use wireline::server::{HandlerError, Server, ServerError};

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        read_buffer_size: 8,
    }
}

fn test_handler(body: &mut BytesMut, req: &Request) -> Result<(), HandlerError> {
    let target = req.target();

    if target.ends_with("/yourproblem") {
        return Err(HandlerError::new(
            StatusCode::BAD_REQUEST,
            "Your problem is not my problem\n",
        ));
    }
    if target.ends_with("/myproblem") {
        return Err(HandlerError::new(StatusCode::INTERNAL_SERVER_ERROR, "Woopsie, my bad\n"));
    }
    if target == "/teapot" {
        return Err(HandlerError::new(StatusCode(418), "short and stout"));
    }
    if target == "/panic" {
        panic!("handler blew up");
    }
    if target == "/echo" {
        body.extend_from_slice(&req.body);
        return Ok(());
    }

    body.extend_from_slice(b"All good, frfr\n");
    Ok(())
}

async fn send(server: &Server, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("response timed out")
        .unwrap();

    String::from_utf8(response).unwrap()
}

fn body_of(response: &str) -> &str {
    response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or("")
}

#[tokio::test]
async fn test_ok_response() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(&server, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);
    assert!(response.contains("Content-Length: 15\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert!(response.contains("Content-Type: text/plain\r\n"));
    assert_eq!(body_of(&response), "All good, frfr\n");

    server.close().unwrap();
}

#[tokio::test]
async fn test_handler_error_400() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(&server, b"GET /yourproblem HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "got: {}", response);
    assert!(response.contains("Content-Length: 31\r\n"));
    assert_eq!(body_of(&response), "Your problem is not my problem\n");

    server.close().unwrap();
}

#[tokio::test]
async fn test_handler_error_500() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(&server, b"GET /myproblem HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert_eq!(body_of(&response), "Woopsie, my bad\n");

    server.close().unwrap();
}

#[tokio::test]
async fn test_handler_error_unknown_status() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(&server, b"GET /teapot HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 418 \r\n"));
    assert_eq!(body_of(&response), "short and stout");

    server.close().unwrap();
}

#[tokio::test]
async fn test_body_is_passed_to_handler() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(
        &server,
        b"POST /echo HTTP/1.1\r\nContent-Length: 23\r\n\r\nfragmented across reads",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body_of(&response), "fragmented across reads");

    server.close().unwrap();
}

#[tokio::test]
async fn test_malformed_request_gets_400() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(&server, b"get / HTTP/1.1\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(body_of(&response).contains("invalid method"));

    server.close().unwrap();
}

#[tokio::test]
async fn test_indented_header_gets_400() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(&server, b"POST /echo HTTP/1.1\r\nHost: a\r\n Content-Length: 3\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "got: {}", response);
    assert!(body_of(&response).contains("malformed header line"));

    server.close().unwrap();
}

#[tokio::test]
async fn test_truncated_body_gets_400() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    stream
        .write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nabc")
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(body_of(&response).contains("body too short"));

    server.close().unwrap();
}

#[tokio::test]
async fn test_panicking_handler_is_isolated() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let response = send(&server, b"GET /panic HTTP/1.1\r\n\r\n").await;
    assert!(response.is_empty());

    let response = send(&server, b"GET / HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    server.close().unwrap();
}

#[tokio::test]
async fn test_concurrent_connections() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    // Holds a connection open mid-request while others complete
    let mut stalled = TcpStream::connect(server.local_addr()).await.unwrap();
    stalled.write_all(b"GET / HTT").await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let addr = server.local_addr();
        tasks.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            response
        }));
    }

    for task in tasks {
        let response = task.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    stalled.write_all(b"P/1.1\r\n\r\n").await.unwrap();
    let mut response = String::new();
    stalled.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    server.close().unwrap();
}

#[tokio::test]
async fn test_close_twice() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    assert!(server.close().is_ok());
    assert!(server.is_closed());
    assert!(matches!(server.close(), Err(ServerError::AlreadyClosed)));

    server.join().await;
}

#[tokio::test]
async fn test_close_stops_accepting() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();
    let addr = server.local_addr();

    server.close().unwrap();
    server.join().await;

    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_close_lets_in_flight_connection_finish() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();

    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
    // Give the accept loop time to hand the socket off
    tokio::time::sleep(Duration::from_millis(50)).await;

    server.close().unwrap();
    server.join().await;

    stream.write_all(b"\r\n").await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_bind_conflict_reports_error() {
    let server = Server::serve(&test_config(), test_handler).await.unwrap();
    let cfg = ServerConfig {
        port: server.local_addr().port(),
        ..test_config()
    };

    let result = Server::serve(&cfg, test_handler).await;

    assert!(matches!(result, Err(ServerError::Bind { .. })));
    server.close().unwrap();
}
