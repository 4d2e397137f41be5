use bytes::BytesMut;
use wireline::config::Config;
use wireline::http::request::Request;
use wireline::http::response::StatusCode;
use wireline::server::{HandlerError, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let server = Server::serve(&cfg.server, demo_handler).await?;
    tracing::info!("Server started on port {}", server.local_addr().port());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    server.close()?;
    server.join().await;
    tracing::info!("Server gracefully stopped");

    Ok(())
}

fn demo_handler(body: &mut BytesMut, req: &Request) -> Result<(), HandlerError> {
    let target = req.target();

    if target.ends_with("/yourproblem") {
        return Err(HandlerError::new(
            StatusCode::BAD_REQUEST,
            "Your problem is not my problem\n",
        ));
    }

    if target.ends_with("/myproblem") {
        return Err(HandlerError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Woopsie, my bad\n",
        ));
    }

    body.extend_from_slice(b"All good, frfr\n");
    Ok(())
}
