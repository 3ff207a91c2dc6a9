use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Connection to {endpoint} failed: {source}")]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Packet send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
