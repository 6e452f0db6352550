//! Integration tests against a mock HTTP server

pub mod http_dispatch;
pub mod http_transport;
pub mod mock_server;
