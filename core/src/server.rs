// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! HTTP/1 server that runs an `axum::Router` with connection and request timeouts.

use crate::env::get_optional_var;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use log::{info, warn};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

mod stream;
use stream::WriteTimeoutStream;

/// Default port to listen on.
const DEFAULT_PORT: u16 = 8080;

/// Default maximum time to wait for the head of the next request on a connection.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum time a single write to a connection may stay pending.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default maximum time to produce a response once a request has been received.
const DEFAULT_HANDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default maximum size of a request body.
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Indicates that the listening socket could not be set up.
    #[error("Cannot bind to {addr}: {source}")]
    Bind {
        /// The address we tried to bind to.
        addr: SocketAddr,

        /// The underlying error.
        source: io::Error,
    },

    /// Catch-all error type for other I/O failures.
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Result type for this module.
pub type ServerResult<T> = Result<T, ServerError>;

/// Options to configure a `Server`.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerOptions {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Maximum time to wait for the head of the next request on a connection.
    pub read_timeout: Duration,

    /// Maximum time a single write to a connection may stay pending.
    pub write_timeout: Duration,

    /// Maximum time to produce a response once a request has been received.
    pub handle_timeout: Duration,

    /// Maximum size of a request body.
    pub max_body_size: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            handle_timeout: DEFAULT_HANDLE_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerOptions {
    /// Creates a set of options from environment variables whose name is prefixed with the
    /// given `prefix`, using defaults for those that are not set.
    ///
    /// This will use variables such as `<prefix>_BIND_ADDR`, `<prefix>_READ_TIMEOUT`,
    /// `<prefix>_WRITE_TIMEOUT`, `<prefix>_HANDLE_TIMEOUT` and `<prefix>_MAX_BODY_SIZE`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: get_optional_var(prefix, "BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            read_timeout: get_optional_var(prefix, "READ_TIMEOUT")?
                .unwrap_or(defaults.read_timeout),
            write_timeout: get_optional_var(prefix, "WRITE_TIMEOUT")?
                .unwrap_or(defaults.write_timeout),
            handle_timeout: get_optional_var(prefix, "HANDLE_TIMEOUT")?
                .unwrap_or(defaults.handle_timeout),
            max_body_size: get_optional_var(prefix, "MAX_BODY_SIZE")?
                .unwrap_or(defaults.max_body_size),
        })
    }
}

/// A bound HTTP/1 server.
pub struct Server {
    /// The listening socket.
    listener: TcpListener,

    /// Server configuration.
    opts: ServerOptions,
}

impl Server {
    /// Binds to the address given in `opts`.
    pub async fn bind(opts: ServerOptions) -> ServerResult<Self> {
        let listener = TcpListener::bind(opts.bind_addr)
            .await
            .map_err(|source| ServerError::Bind { addr: opts.bind_addr, source })?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self { listener, opts })
    }

    /// Returns the address the server is listening on.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `app` on every accepted connection until the process exits.
    ///
    /// Each connection is served on its own task.  The connection is closed if the head of a
    /// request does not arrive within the read timeout or if a write stays pending for longer
    /// than the write timeout.  Requests that are not answered within the handling timeout get
    /// a 408.
    pub async fn serve(self, app: axum::Router) -> ServerResult<()> {
        let app = app.layer(TimeoutLayer::new(self.opts.handle_timeout));

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new()).header_read_timeout(self.opts.read_timeout);

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let io = TokioIo::new(WriteTimeoutStream::new(stream, self.opts.write_timeout));
            let service = TowerToHyperService::new(app.clone());
            let builder = builder.clone();
            tokio::spawn(async move {
                if let Err(e) = builder.serve_connection(io, service).await {
                    warn!("Connection with {} terminated: {}", peer, e);
                }
            });
        }
    }
}
