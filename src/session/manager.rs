//! APRS-IS session lifecycle.
//!
//! A [`SessionManager`] owns at most one live connection. The first `send`
//! opens it and writes the login line; later sends reuse it. A failed write
//! drops the connection and the *next* send reconnects, so a single call
//! never loops on retries.
//!
//! ```text
//!  Disconnected ──connect+login──> LoggedIn
//!       ^   (Connecting while in      |
//!       |    progress)                | write error
//!       +-----------------------------+
//!  any ──close()──> Closed (terminal)
//! ```
//!
//! All operations lock the same mutex, which keeps login-then-write atomic
//! with respect to connection state and makes `close` wait for an in-flight
//! send.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::aprs::{AprsPacket, Login};
use crate::config::ServerEndpoint;
use crate::constants::LINE_DELIMITER;
use crate::error::{Result, TrackerError};
use crate::session::transport::{Connector, Link};

/// Connection state as seen through [`SessionManager::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Held only under the session lock while connecting and logging in.
    /// `state()` waits on that lock, so callers never observe it.
    Connecting,
    LoggedIn,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::LoggedIn => "logged in",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Counters over the life of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Connections that completed login
    pub connections: u64,
    /// Packets written and flushed
    pub packets_sent: u64,
    /// Connect, login or write failures
    pub failures: u64,
}

struct Session<L> {
    state: SessionState,
    link: Option<L>,
    stats: SessionStats,
}

impl<L: Link> Session<L> {
    fn drop_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            if let Err(e) = link.shutdown() {
                log::debug!("Error shutting down link: {}", e);
            }
        }
    }
}

pub struct SessionManager<C: Connector> {
    connector: C,
    endpoint: ServerEndpoint,
    login: Login,
    session: Mutex<Session<C::Link>>,
}

fn write_line<W: Write + ?Sized>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(LINE_DELIMITER.as_bytes())?;
    writer.flush()
}

impl<C: Connector> SessionManager<C> {
    pub fn new(connector: C, endpoint: ServerEndpoint, login: Login) -> Self {
        Self {
            connector,
            endpoint,
            login,
            session: Mutex::new(Session {
                state: SessionState::Disconnected,
                link: None,
                stats: SessionStats::default(),
            }),
        }
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn stats(&self) -> SessionStats {
        self.lock().stats
    }

    /// Open and log in if not already logged in.
    ///
    /// Makes one attempt. On failure the session stays `Disconnected` and the
    /// caller decides when to try again.
    pub fn ensure_connected(&self) -> Result<()> {
        let mut session = self.lock();
        self.connect_locked(&mut session)
    }

    /// Send one packet, connecting and logging in first if needed.
    pub fn send(&self, packet: &AprsPacket) -> Result<()> {
        let mut session = self.lock();
        self.connect_locked(&mut session)?;

        let Some(link) = session.link.as_mut() else {
            // connect_locked only returns Ok with a link in place
            return Err(TrackerError::SendFailed(io::Error::new(
                io::ErrorKind::NotConnected,
                "no link after login",
            )));
        };

        match write_line(link, packet.as_str()) {
            Ok(()) => {
                session.stats.packets_sent += 1;
                log::debug!("Sent: {}", packet);
                Ok(())
            }
            Err(e) => {
                log::warn!("Write to {} failed, dropping connection: {}", self.endpoint, e);
                session.drop_link();
                session.state = SessionState::Disconnected;
                session.stats.failures += 1;
                Err(TrackerError::SendFailed(e))
            }
        }
    }

    /// Close the connection and refuse further operations. Idempotent.
    pub fn close(&self) {
        let mut session = self.lock();
        if session.state == SessionState::Closed {
            return;
        }
        if session.link.is_some() {
            log::info!("Closing APRS-IS connection to {}", self.endpoint);
        }
        session.drop_link();
        session.state = SessionState::Closed;
    }

    fn lock(&self) -> MutexGuard<'_, Session<C::Link>> {
        // State is consistent at every point a panic could unwind through
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connect_locked(&self, session: &mut Session<C::Link>) -> Result<()> {
        match session.state {
            SessionState::Closed => return Err(TrackerError::SessionClosed),
            SessionState::LoggedIn if session.link.is_some() => return Ok(()),
            _ => {}
        }

        session.drop_link();
        session.state = SessionState::Connecting;
        log::info!("Opening APRS-IS connection to {}", self.endpoint);

        let result = self.connector.connect(&self.endpoint).and_then(|mut link| {
            match write_line(&mut link, &self.login.line()) {
                Ok(()) => Ok(link),
                Err(e) => {
                    let _ = link.shutdown();
                    Err(e)
                }
            }
        });

        match result {
            Ok(link) => {
                log::info!("Logged in to {} as {}", self.endpoint, self.login.callsign());
                log::debug!("Login: {}", self.login.redacted());
                session.link = Some(link);
                session.state = SessionState::LoggedIn;
                session.stats.connections += 1;
                Ok(())
            }
            Err(source) => {
                log::warn!("Connection to {} failed: {}", self.endpoint, source);
                session.state = SessionState::Disconnected;
                session.stats.failures += 1;
                Err(TrackerError::ConnectionFailed {
                    endpoint: self.endpoint.to_string(),
                    source,
                })
            }
        }
    }
}

impl<C: Connector> Drop for SessionManager<C> {
    fn drop(&mut self) {
        self.close();
    }
}
