//! In-memory APRS-IS server for session and tracker tests.
//!
//! Records every completed line per connection, tracks how many links are
//! open at once, and can refuse connections or break writes on demand.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use aprs_tracker::aprs::Login;
use aprs_tracker::config::{ServerEndpoint, SoftwareConfig, StationIdentity};
use aprs_tracker::session::{Connector, Link, SessionManager};

#[derive(Default)]
struct Shared {
    connections: Mutex<Vec<Arc<Mutex<Vec<String>>>>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    refuse: AtomicBool,
    fail_next_write: AtomicBool,
    /// Fail every Nth write call (0 = never)
    fail_every: AtomicUsize,
    writes: AtomicUsize,
    connect_delay_ms: AtomicUsize,
    write_delay_ms: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MockServer {
    shared: Arc<Shared>,
}

pub struct MockLink {
    shared: Arc<Shared>,
    lines: Arc<Mutex<Vec<String>>>,
    pending: Vec<u8>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.shared.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn fail_next_write(&self) {
        self.shared.fail_next_write.store(true, Ordering::SeqCst);
    }

    pub fn fail_every_nth_write(&self, n: usize) {
        self.shared.fail_every.store(n, Ordering::SeqCst);
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        self.shared
            .connect_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        self.shared
            .write_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    pub fn connection_count(&self) -> usize {
        self.shared.connections.lock().unwrap().len()
    }

    pub fn active(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.shared.max_active.load(Ordering::SeqCst)
    }

    /// Completed lines received on connection `index`, in order.
    pub fn lines(&self, index: usize) -> Vec<String> {
        let connections = self.shared.connections.lock().unwrap();
        connections[index].lock().unwrap().clone()
    }

    /// Completed lines per connection.
    pub fn all_connections(&self) -> Vec<Vec<String>> {
        let connections = self.shared.connections.lock().unwrap();
        connections
            .iter()
            .map(|lines| lines.lock().unwrap().clone())
            .collect()
    }

    /// Every non-login line across all connections, in connection order.
    pub fn packets(&self) -> Vec<String> {
        self.all_connections()
            .into_iter()
            .flatten()
            .filter(|line| !line.starts_with("user "))
            .collect()
    }
}

impl Connector for MockServer {
    type Link = MockLink;

    fn connect(&self, _endpoint: &ServerEndpoint) -> io::Result<MockLink> {
        let delay = self.shared.connect_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay as u64));
        }
        if self.shared.refuse.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        }

        let now_active = self.shared.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_active.fetch_max(now_active, Ordering::SeqCst);

        let lines = Arc::new(Mutex::new(Vec::new()));
        self.shared
            .connections
            .lock()
            .unwrap()
            .push(Arc::clone(&lines));

        Ok(MockLink {
            shared: Arc::clone(&self.shared),
            lines,
            pending: Vec::new(),
        })
    }
}

impl Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let delay = self.shared.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay as u64));
        }

        let count = self.shared.writes.fetch_add(1, Ordering::SeqCst) + 1;
        let every = self.shared.fail_every.load(Ordering::SeqCst);
        if self.shared.fail_next_write.swap(false, Ordering::SeqCst)
            || (every > 0 && count % every == 0)
        {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }

        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.windows(2).position(|w| w == b"\r\n") {
            let line: Vec<u8> = self.pending.drain(..pos + 2).collect();
            let text = String::from_utf8_lossy(&line[..pos]).into_owned();
            self.lines.lock().unwrap().push(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Link for MockLink {}

impl Drop for MockLink {
    fn drop(&mut self) {
        self.shared.active.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn test_identity() -> StationIdentity {
    StationIdentity::new("KR4BYQ-9", "12345")
}

pub fn test_session(server: &MockServer) -> SessionManager<MockServer> {
    let login = Login::new(&test_identity(), &SoftwareConfig::default());
    SessionManager::new(
        server.clone(),
        ServerEndpoint::new("mock.aprs2.net", 14580),
        login,
    )
}
