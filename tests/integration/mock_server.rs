//! Mock HTTP server setup for integration tests

use fast_requests::{Dispatcher, HttpTransport, HttpTransportConfig};
use mockito::{Mock, Server, ServerGuard};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Transport with a short timeout so failures surface quickly.
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::with_config(test_config()).unwrap()
    }

    pub fn dispatcher(&self, max_workers: usize) -> Dispatcher {
        Dispatcher::builder()
            .transport_config(test_config())
            .max_workers(max_workers)
            .build()
            .unwrap()
    }

    /// `GET path` answering `status` with `body`, expected exactly `hits` times.
    pub async fn mock_get(&self, path: &str, status: usize, body: &str, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Register a custom mock built against the underlying server.
    pub async fn mock_with<F>(&self, build: F) -> Mock
    where
        F: FnOnce(&mut ServerGuard) -> mockito::Mock,
    {
        let mut server = self.server.lock().await;
        build(&mut server).create_async().await
    }
}

pub fn test_config() -> HttpTransportConfig {
    HttpTransportConfig::new()
        .with_timeout(Duration::from_secs(5))
        .with_connect_timeout(Duration::from_secs(2))
}

/// A listener that accepts connections and never answers.
pub async fn silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// Address of a port nothing listens on.
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
