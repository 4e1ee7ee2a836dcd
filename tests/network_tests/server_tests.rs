//! Server Tests
//!
//! Tests verify:
//! - ServiceClient talks to a running Server over TCP
//! - Error statuses travel back as the matching StoreError
//! - Pagination works across the wire
//! - An unreachable endpoint surfaces BackendUnavailable
//! - Shutdown stops the accept loop
//! - The client reuses one connection and redials only on the next call
//! - Malformed frames come back as protocol errors

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use paramstore::backend::{Backend, RemoteBackend};
use paramstore::network::Server;
use paramstore::protocol::{read_response, Status};
use paramstore::service::{ParameterService, PathQuery, PathStore, PutParameter, ServiceClient};
use paramstore::{Config, NewParameter, ParameterType, ParameterUpdate, RemoteConfig, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

struct RunningServer {
    server: Arc<Server>,
    handle: Option<JoinHandle<paramstore::Result<()>>>,
    endpoint: String,
}

impl RunningServer {
    fn start() -> Self {
        Self::start_on("127.0.0.1:0", 2000)
    }

    /// Start on `listen_addr`, closing connections idle for `idle_ms`
    fn start_on(listen_addr: &str, idle_ms: u64) -> Self {
        let config = Config::builder()
            .listen_addr(listen_addr)
            .worker_threads(4)
            .read_timeout_ms(idle_ms)
            .build();
        let server = Arc::new(Server::bind(config, Arc::new(PathStore::new())).unwrap());
        let endpoint = server.local_addr().unwrap().to_string();

        let runner = Arc::clone(&server);
        let handle = thread::spawn(move || runner.run());

        Self {
            server,
            handle: Some(handle),
            endpoint,
        }
    }

    fn client(&self) -> ServiceClient {
        ServiceClient::new(&RemoteConfig::new(&self.endpoint)).unwrap()
    }

    fn stop(&mut self) -> paramstore::Result<()> {
        self.server.shutdown();
        match self.handle.take() {
            Some(handle) => handle.join().expect("server thread panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.server.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn put(name: &str, value: &str, overwrite: bool) -> PutParameter {
    PutParameter {
        name: name.to_string(),
        value: value.to_string(),
        parameter_type: ParameterType::String,
        overwrite,
        expected_version: None,
    }
}

/// An address nothing listens on
fn unused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

// =============================================================================
// Client/Server Tests
// =============================================================================

#[test]
fn test_ping() {
    let server = RunningServer::start();
    server.client().ping().unwrap();
}

#[test]
fn test_put_get_delete_over_tcp() {
    let server = RunningServer::start();
    let client = server.client();

    assert_eq!(client.put_parameter(&put("/ns/A", "1", false)).unwrap(), 1);
    assert_eq!(client.put_parameter(&put("/ns/A", "2", true)).unwrap(), 2);

    let stored = client.get_parameter("/ns/A").unwrap().unwrap();
    assert_eq!(stored.value, "2");
    assert_eq!(stored.version, 2);

    client.delete_parameter("/ns/A").unwrap();
    assert!(client.get_parameter("/ns/A").unwrap().is_none());

    // The served store saw the same operations
    assert!(server.server.store().is_empty());
}

#[test]
fn test_errors_travel_over_tcp() {
    let server = RunningServer::start();
    let client = server.client();
    client.put_parameter(&put("/ns/A", "1", false)).unwrap();

    assert!(matches!(
        client.put_parameter(&put("/ns/A", "2", false)),
        Err(StoreError::AlreadyExists(_))
    ));
    assert!(matches!(
        client.delete_parameter("/ns/MISSING"),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        client.put_parameter(&put("no-slash", "2", false)),
        Err(StoreError::Validation(_))
    ));

    let mut stale = put("/ns/A", "3", true);
    stale.expected_version = Some(7);
    assert!(matches!(
        client.put_parameter(&stale),
        Err(StoreError::VersionConflict { expected: 7, actual: 1, .. })
    ));
}

#[test]
fn test_paginated_query_over_tcp() {
    let server = RunningServer::start();
    let client = server.client();
    for i in 0..12 {
        client
            .put_parameter(&put(&format!("/ns/K{:02}", i), "v", false))
            .unwrap();
    }

    let first = client
        .get_parameters_by_path(&PathQuery::recursive("/ns").with_max_results(5))
        .unwrap();
    assert_eq!(first.parameters.len(), 5);

    let second = client
        .get_parameters_by_path(
            &PathQuery::recursive("/ns")
                .with_max_results(5)
                .with_next_token(first.next_token),
        )
        .unwrap();
    assert_eq!(second.parameters[0].name, "/ns/K05");
}

#[test]
fn test_remote_backend_over_tcp() {
    let server = RunningServer::start();
    let backend = RemoteBackend::with_page_size(server.client(), 3);

    backend.create("ortelius/dev", NewParameter::plain("PORT", "3001")).unwrap();
    backend
        .create("ortelius/dev", NewParameter::secure("AWS_S3_SECRET_ACCESS_KEY", "supersecret"))
        .unwrap();
    for i in 0..7 {
        backend
            .create("ortelius/prod", NewParameter::plain(format!("K{}", i), "v"))
            .unwrap();
    }

    let updated = backend
        .update("ortelius/dev", "PORT", ParameterUpdate::value("3002"))
        .unwrap();
    assert_eq!(updated.version, 2);

    let all = backend.list().unwrap();
    assert_eq!(all["ortelius/dev"].len(), 2);
    assert_eq!(all["ortelius/prod"].len(), 7);

    let secret = all["ortelius/dev"]
        .iter()
        .find(|p| p.name == "AWS_S3_SECRET_ACCESS_KEY")
        .unwrap();
    assert!(secret.is_secure);
}

#[test]
fn test_many_clients_in_parallel() {
    let server = RunningServer::start();
    let endpoint = server.endpoint.clone();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let endpoint = endpoint.clone();
            thread::spawn(move || {
                let client = ServiceClient::new(&RemoteConfig::new(endpoint)).unwrap();
                for i in 0..10 {
                    client
                        .put_parameter(&put(&format!("/t{}/K{}", t, i), "v", false))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(server.server.store().len(), 80);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_unreachable_endpoint_is_unavailable() {
    let client = ServiceClient::new(&RemoteConfig::new(unused_endpoint()).connect_timeout_ms(500))
        .unwrap();

    let result = client.get_parameters_by_path(&PathQuery::recursive("/"));
    assert!(matches!(result, Err(StoreError::BackendUnavailable(_))));
}

#[test]
fn test_invalid_endpoint_is_config_error() {
    let result = ServiceClient::new(&RemoteConfig::new("not an address"));
    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[test]
fn test_server_stopped_is_unavailable() {
    let mut server = RunningServer::start_on("127.0.0.1:0", 200);
    // Short read timeout: the stopped server's socket stays bound but unserved
    let client =
        ServiceClient::new(&RemoteConfig::new(&server.endpoint).read_timeout_ms(300)).unwrap();
    client.ping().unwrap();

    server.stop().unwrap();

    assert!(client.ping().unwrap_err().is_unavailable());
}

#[test]
fn test_malformed_frame_is_protocol_error() {
    let server = RunningServer::start();
    let mut stream = TcpStream::connect(&server.endpoint).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    stream.write_all(&[0x7f, 0, 0, 0, 0]).unwrap();
    let response = read_response(&mut stream).unwrap();

    assert_eq!(response.status, Status::Malformed);
    let error = response.to_error().unwrap();
    assert!(matches!(error, StoreError::Protocol(_)));
    assert!(!error.is_unavailable());
}

// =============================================================================
// Connection Reuse Tests
// =============================================================================

#[test]
fn test_client_reuses_cached_connection() {
    let server = RunningServer::start();
    let client = server.client();
    assert!(!client.is_connected());

    client.ping().unwrap();
    assert!(client.is_connected());

    for i in 0..5 {
        client
            .put_parameter(&put(&format!("/ns/K{}", i), "v", false))
            .unwrap();
        assert!(client.is_connected());
    }
    assert_eq!(server.server.store().len(), 5);
}

#[test]
fn test_client_redials_on_the_call_after_a_failure() {
    let mut first = RunningServer::start_on("127.0.0.1:0", 200);
    let endpoint = first.endpoint.clone();
    let client =
        ServiceClient::new(&RemoteConfig::new(&endpoint).read_timeout_ms(1000)).unwrap();
    client.put_parameter(&put("/ns/A", "1", false)).unwrap();
    assert!(client.is_connected());

    // Stopping closes the cached connection; dropping frees the port
    first.stop().unwrap();
    drop(first);
    let second = RunningServer::start_on(&endpoint, 2000);

    // A server is reachable again, but the failing call does not redial
    assert!(client.ping().unwrap_err().is_unavailable());
    assert!(!client.is_connected());

    // The next call dials the new server
    client.ping().unwrap();
    assert!(client.is_connected());
    assert!(client.get_parameter("/ns/A").unwrap().is_none());
    assert!(second.server.store().is_empty());
}
