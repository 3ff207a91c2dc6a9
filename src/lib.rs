pub mod aprs;
pub mod config;
pub mod constants;
pub mod error;
pub mod position;
pub mod session;
pub mod tracking;

pub use aprs::{AprsPacket, EncodingMode, PacketEncoder};
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use position::{DestinationTarget, GeoFix};
pub use session::SessionManager;
pub use tracking::TrackingController;
