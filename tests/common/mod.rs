//! Shared helpers for integration tests.

use filament::{Cookie, DisposableServer, HttpClient, HttpServer, Request, Responder, Router};
use http::Method;

/// Bind a server with the canonical route: `GET /test` issues
/// `cookie1=test_value` and echoes the request body.
pub async fn bind_cookie_echo_server() -> DisposableServer {
    let mut router = Router::new();
    router
        .register(Method::GET, "/test", |req: Request, resp: Responder| {
            async move {
                resp.add_cookie(Cookie::new("cookie1", "test_value")?)?;
                resp.send(req.into_body())
            }
        })
        .unwrap();
    HttpServer::new(router).bind().await.unwrap()
}

/// A client pointed at the given server.
pub fn client_for(server: &DisposableServer) -> HttpClient {
    HttpClient::builder().port(server.address().port()).build()
}
