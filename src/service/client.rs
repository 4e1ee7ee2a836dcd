//! Service Client
//!
//! `ParameterService` implementation that talks to a `paramstore-server`
//! over the framed wire protocol.
//!
//! ## Connection handling
//! One connection is cached and reused across calls. Any failure during an
//! exchange drops it, and the next call dials again. The failing call itself
//! is never retried, so a connection the server closed while idle costs
//! exactly one `BackendUnavailable`. Connect failures, I/O errors and
//! timeouts all surface as `BackendUnavailable`.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::config::RemoteConfig;
use crate::error::{Result, StoreError};
use crate::protocol::{
    decode_ok_payload, read_response, write_request, Request, Response, Status,
};

use super::{ParameterPage, ParameterService, PathQuery, PutParameter, RemoteParameter};

struct Channel {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// TCP client bound to one service endpoint
pub struct ServiceClient {
    addr: SocketAddr,
    connect_timeout: Duration,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,

    /// Cached connection; `None` until the first call or after a failure
    channel: Mutex<Option<Channel>>,
}

impl ServiceClient {
    /// Resolve the endpoint in `config`; does not connect yet
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let addr = config
            .endpoint
            .to_socket_addrs()
            .map_err(|e| {
                StoreError::Config(format!("invalid endpoint '{}': {}", config.endpoint, e))
            })?
            .next()
            .ok_or_else(|| {
                StoreError::Config(format!("endpoint '{}' resolved to no address", config.endpoint))
            })?;

        Ok(Self {
            addr,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms.max(1)),
            read_timeout: millis(config.read_timeout_ms),
            write_timeout: millis(config.write_timeout_ms),
            channel: Mutex::new(None),
        })
    }

    /// The resolved service address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether a connection is currently cached
    pub fn is_connected(&self) -> bool {
        self.channel.lock().is_some()
    }

    /// Health check
    pub fn ping(&self) -> Result<()> {
        self.call_unit(&Request::Ping)
    }

    fn connect(&self) -> Result<Channel> {
        let stream = TcpStream::connect_timeout(&self.addr, self.connect_timeout)
            .map_err(|e| self.unavailable("connect", e))?;
        stream
            .set_nodelay(true)
            .and_then(|_| stream.set_read_timeout(self.read_timeout))
            .and_then(|_| stream.set_write_timeout(self.write_timeout))
            .map_err(|e| self.unavailable("configure", e))?;
        let read_stream = stream
            .try_clone()
            .map_err(|e| self.unavailable("clone", e))?;

        tracing::debug!(addr = %self.addr, "Connected to parameter service");
        Ok(Channel {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one request and wait for its response
    ///
    /// Calls on one client are serialized over the cached connection.
    fn call(&self, request: &Request) -> Result<Response> {
        let mut slot = self.channel.lock();
        let mut channel = match slot.take() {
            Some(channel) => channel,
            None => self.connect()?,
        };

        let exchanged = write_request(&mut channel.writer, request)
            .and_then(|_| read_response(&mut channel.reader));

        match exchanged {
            Ok(response) => {
                // The server hangs up after a malformed frame
                if response.status != Status::Malformed {
                    *slot = Some(channel);
                }
                Ok(response)
            }
            // The stream may be mid-frame; `channel` is dropped here
            Err(e) => {
                tracing::warn!(addr = %self.addr, error = %e, "Parameter service call failed");
                Err(match e {
                    StoreError::Io(io) => self.unavailable("exchange", io),
                    other => other,
                })
            }
        }
    }

    /// Call and decode an OK payload, mapping error statuses to `StoreError`
    fn call_value<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
        let response = self.call(request)?;
        match response.to_error() {
            Some(error) => Err(error),
            None => decode_ok_payload(&response),
        }
    }

    /// Call a request whose OK response carries no payload
    fn call_unit(&self, request: &Request) -> Result<()> {
        match self.call(request)?.to_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn unavailable(&self, stage: &str, error: std::io::Error) -> StoreError {
        StoreError::BackendUnavailable(format!("{} {}: {}", stage, self.addr, error))
    }
}

impl ParameterService for ServiceClient {
    fn get_parameters_by_path(&self, query: &PathQuery) -> Result<ParameterPage> {
        self.call_value(&Request::GetParametersByPath(query.clone()))
    }

    fn get_parameter(&self, name: &str) -> Result<Option<RemoteParameter>> {
        self.call_value(&Request::GetParameter {
            name: name.to_string(),
        })
    }

    fn put_parameter(&self, request: &PutParameter) -> Result<u64> {
        self.call_value(&Request::PutParameter(request.clone()))
    }

    fn delete_parameter(&self, name: &str) -> Result<()> {
        self.call_unit(&Request::DeleteParameter {
            name: name.to_string(),
        })
    }
}

fn millis(ms: u64) -> Option<Duration> {
    if ms > 0 {
        Some(Duration::from_millis(ms))
    } else {
        None
    }
}
