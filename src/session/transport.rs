//! Byte transports the session writes APRS-IS lines to.

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::{ServerConfig, ServerEndpoint};

/// An open, writable connection.
pub trait Link: Write + Send {
    /// Tear down the connection. Dropping the link must also release it.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Opens links to an APRS-IS server.
pub trait Connector: Send + Sync {
    type Link: Link;

    fn connect(&self, endpoint: &ServerEndpoint) -> io::Result<Self::Link>;
}

impl Link for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Plain TCP with bounded connect and write times.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            write_timeout,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.connect_timeout(), config.write_timeout())
    }
}

impl Connector for TcpConnector {
    type Link = TcpStream;

    /// Try each resolved address in turn until one accepts.
    fn connect(&self, endpoint: &ServerEndpoint) -> io::Result<TcpStream> {
        let addrs = (endpoint.host.as_str(), endpoint.port).to_socket_addrs()?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(self.write_timeout))?;
                    stream.set_nodelay(true)?;
                    log::debug!("Connected to {} ({})", endpoint, addr);
                    return Ok(stream);
                }
                Err(e) => {
                    log::debug!("Connect to {} ({}) failed: {}", endpoint, addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses for {}", endpoint),
            )
        }))
    }
}

/// Writes every line to standard output instead of the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutConnector;

impl Link for io::Stdout {}

impl Connector for StdoutConnector {
    type Link = io::Stdout;

    fn connect(&self, endpoint: &ServerEndpoint) -> io::Result<io::Stdout> {
        log::info!("Dry run: writing lines for {} to stdout", endpoint);
        Ok(io::stdout())
    }
}
