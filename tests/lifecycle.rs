//! Bind and disposal behavior of the server endpoint.

use std::time::{Duration, Instant};

use filament::{
    EndpointState, Error, HttpClient, HttpServer, Request, Responder, Router, ServerConfig,
};
use http::Method;

mod common;

fn slow_router(delay: Duration) -> Router {
    let mut router = Router::new();
    router
        .register(Method::GET, "/slow", move |_req: Request, resp: Responder| {
            async move {
                tokio::time::sleep(delay).await;
                resp.send_bytes("finally")
            }
        })
        .unwrap();
    router
}

#[tokio::test]
async fn disposing_an_idle_server_completes_immediately() {
    let server = common::bind_cookie_echo_server().await;
    assert_eq!(server.state(), EndpointState::Bound);
    assert_eq!(server.active_exchanges(), 0);

    tokio::time::timeout(Duration::from_secs(1), server.dispose())
        .await
        .expect("idle dispose should be immediate");
    assert_eq!(server.state(), EndpointState::Disposed);

    // Idempotent: a second dispose resolves right away.
    tokio::time::timeout(Duration::from_secs(1), server.dispose())
        .await
        .expect("repeat dispose should be immediate");
}

#[tokio::test]
async fn dispose_waits_for_the_in_flight_exchange() {
    let server = HttpServer::new(slow_router(Duration::from_millis(300)))
        .bind()
        .await
        .unwrap();
    let client = common::client_for(&server);

    let request = tokio::spawn(async move { client.get("/slow").response().await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.active_exchanges(), 1);

    let started = Instant::now();
    server.dispose().await;
    assert!(
        started.elapsed() >= Duration::from_millis(100),
        "dispose returned before the exchange drained"
    );
    assert_eq!(server.state(), EndpointState::Disposed);
    assert_eq!(server.active_exchanges(), 0);

    let (_, body) = request.await.unwrap().expect("in-flight request failed");
    assert_eq!(body, "finally");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dispose_now_blocks_until_drained() {
    let server = HttpServer::new(slow_router(Duration::from_millis(200)))
        .bind()
        .await
        .unwrap();
    let client = common::client_for(&server);

    let request = tokio::spawn(async move { client.get("/slow").response().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let server = std::sync::Arc::new(server);
    let handle = std::sync::Arc::clone(&server);
    let drained = tokio::task::spawn_blocking(move || handle.dispose_now(Duration::from_secs(2)))
        .await
        .unwrap();

    assert!(drained, "exchange should drain within the grace period");
    assert_eq!(server.state(), EndpointState::Disposed);
    assert!(request.await.unwrap().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dispose_now_gives_up_after_the_grace_period() {
    // Server-side drain grace is longer than the dispose_now grace, so the
    // blocking call times out first.
    let config = ServerConfig {
        drain_grace_ms: 1_000,
        ..ServerConfig::default()
    };
    let server = HttpServer::with_config(slow_router(Duration::from_secs(5)), config)
        .bind()
        .await
        .unwrap();
    let client = common::client_for(&server);

    let request = tokio::spawn(async move { client.get("/slow").response().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.active_exchanges(), 1);

    let handle = std::sync::Arc::new(server);
    let server = std::sync::Arc::clone(&handle);
    let drained = tokio::task::spawn_blocking(move || handle.dispose_now(Duration::from_millis(150)))
        .await
        .unwrap();
    assert!(!drained, "a stuck exchange cannot drain in time");

    // The forced close surfaces a failure, never a fabricated success.
    assert!(request.await.unwrap().is_err());
    let _ = server;
}

#[tokio::test]
async fn forced_close_fails_the_awaiting_client() {
    let config = ServerConfig {
        drain_grace_ms: 100,
        ..ServerConfig::default()
    };
    let server = HttpServer::with_config(slow_router(Duration::from_secs(5)), config)
        .bind()
        .await
        .unwrap();
    let client = common::client_for(&server);

    let request = tokio::spawn(async move { client.get("/slow").response().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    server.dispose().await;
    assert_eq!(server.state(), EndpointState::Disposed);

    match request.await.unwrap() {
        Err(
            Error::ConnectionReset | Error::Cancelled | Error::Transport(_),
        ) => {}
        other => panic!("expected a terminal transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn stalled_connect_surfaces_as_connect_timeout() {
    // A listener with a backlog of one and no accept loop: once the backlog
    // is full, further connects hang at the SYN stage until they time out.
    let socket = tokio::net::TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(1).unwrap();
    let addr = listener.local_addr().unwrap();

    let mut backlog = Vec::new();
    for _ in 0..16 {
        match tokio::time::timeout(
            Duration::from_millis(100),
            tokio::net::TcpStream::connect(addr),
        )
        .await
        {
            Ok(Ok(stream)) => backlog.push(stream),
            _ => break,
        }
    }

    let client = HttpClient::builder()
        .authority(addr.to_string())
        .connect_timeout(Duration::from_millis(200))
        .build();
    let err = client.get("/test").response().await.unwrap_err();
    assert!(matches!(err, Error::ConnectTimeout), "got {err:?}");

    drop(backlog);
    drop(listener);
}

#[tokio::test]
async fn binding_a_taken_address_is_a_bind_error() {
    let server = common::bind_cookie_echo_server().await;

    let config = ServerConfig {
        bind_address: server.address().to_string(),
        ..ServerConfig::default()
    };
    let result = HttpServer::with_config(Router::new(), config).bind().await;
    assert!(matches!(result, Err(Error::Bind { .. })));

    server.dispose().await;
}
