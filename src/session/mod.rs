pub mod manager;
pub mod transport;

pub use manager::{SessionManager, SessionState, SessionStats};
pub use transport::{Connector, Link, StdoutConnector, TcpConnector};
