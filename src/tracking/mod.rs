pub mod controller;
pub mod source;

pub use controller::{ReportReason, TrackerHandle, TrackingController};
pub use source::{LocationSource, ReplaySource, spawn_feed};
