//! Demo host process.
//!
//! Binds a server with one cookie-issuing echo route, then serves until
//! Ctrl+C triggers disposal. Address and wiretap come from `FILAMENT_ADDR`
//! and `FILAMENT_WIRETAP`; everything else uses defaults.

use filament::{observability, Cookie, HttpServer, Request, Responder, Router, ServerConfig};
use http::Method;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::logging::init("filament=debug");

    let config = ServerConfig {
        bind_address: std::env::var("FILAMENT_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
        wiretap: std::env::var("FILAMENT_WIRETAP").is_ok(),
        ..ServerConfig::default()
    };

    let mut router = Router::new();
    router.register(Method::GET, "/test", |req: Request, resp: Responder| {
        async move {
            resp.add_cookie(Cookie::new("cookie1", "test_value")?)?;
            resp.send(req.into_body())
        }
    })?;

    let server = HttpServer::with_config(router, config).bind().await?;
    tracing::info!(address = %server.address(), "Serving; Ctrl+C to dispose");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.dispose().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
