//! APRS position report encoding.
//!
//! Two wire layouts are produced:
//!
//! - Timestamped, no messaging (`@`):
//!   `CALL>APRS,TCPIP*:@HHMMSSZDDMM.mmN/DDDMM.mmW>comment`
//! - Realtime, no timestamp, no messaging (`!`) with a `CSE/SPD` extension:
//!   `CALL>APRS,TCPIP*:!DDMM.mmN/DDDMM.mmW>ccc/ssscomment`
//!
//! In the timestamped layouts the comment is either the configured station
//! tag or, when a destination is set, the remaining distance in miles.
//! Realtime packets always carry the station tag.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::StationIdentity;
use crate::constants::{DEFAULT_COMMENT, MAX_COMMENT_LEN, SYMBOL_CODE, SYMBOL_TABLE, TOCALL_PATH};
use crate::position::{Axis, DestinationTarget, GeoFix, distance_miles, encode_coordinate};

/// Packet layout selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingMode {
    /// `!` packet without timestamp, course/speed in the data extension
    Realtime,
    /// `@` packet with UTC timestamp and the station comment
    #[default]
    TimestampedDefault,
    /// `@` packet with UTC timestamp and the distance-to-destination comment
    TimestampedDestination,
}

impl EncodingMode {
    /// Layout actually used for one packet.
    ///
    /// The timestamped modes switch on whether a destination is set for this
    /// packet. Realtime ignores the destination.
    pub fn resolve(self, has_destination: bool) -> EncodingMode {
        match (self, has_destination) {
            (EncodingMode::Realtime, _) => EncodingMode::Realtime,
            (_, true) => EncodingMode::TimestampedDestination,
            (_, false) => EncodingMode::TimestampedDefault,
        }
    }
}

/// One line of APRS-IS text, without the line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AprsPacket(String);

impl AprsPacket {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AprsPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AprsPacket {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Comment text for a packet reporting distance to a destination.
pub fn destination_comment(fix: &GeoFix, destination: &DestinationTarget) -> String {
    let miles = distance_miles(
        fix.latitude,
        fix.longitude,
        destination.latitude,
        destination.longitude,
    );
    format!("{:.1} miles from destination.", miles)
}

/// Printable ASCII only, truncated to the comment field limit.
///
/// Falls back to the default tag when nothing printable remains.
fn sanitize_comment(comment: &str) -> String {
    let sanitized: String = comment
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(MAX_COMMENT_LEN)
        .collect();
    if sanitized.trim().is_empty() {
        DEFAULT_COMMENT.to_string()
    } else {
        sanitized
    }
}

/// Builds position report lines.
#[derive(Debug, Clone)]
pub struct PacketEncoder {
    mode: EncodingMode,
    comment: String,
}

impl PacketEncoder {
    pub fn new(mode: EncodingMode) -> Self {
        Self {
            mode,
            comment: DEFAULT_COMMENT.to_string(),
        }
    }

    /// Replace the station comment used when no destination is set.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = sanitize_comment(comment);
        self
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Encode a report stamped with the current UTC time.
    pub fn format(
        &self,
        fix: &GeoFix,
        identity: &StationIdentity,
        destination: Option<&DestinationTarget>,
    ) -> AprsPacket {
        self.format_at(fix, identity, destination, Utc::now())
    }

    /// Encode a report stamped with `now`.
    ///
    /// Never fails: out-of-range inputs are clamped.
    pub fn format_at(
        &self,
        fix: &GeoFix,
        identity: &StationIdentity,
        destination: Option<&DestinationTarget>,
        now: DateTime<Utc>,
    ) -> AprsPacket {
        let latitude = encode_coordinate(fix.latitude, Axis::Latitude);
        let longitude = encode_coordinate(fix.longitude, Axis::Longitude);

        let header = format!("{}>{}:", identity.callsign, TOCALL_PATH);
        let line = match (self.mode.resolve(destination.is_some()), destination) {
            (EncodingMode::Realtime, _) => format!(
                "{header}!{latitude}{SYMBOL_TABLE}{longitude}{SYMBOL_CODE}{:03}/{:03}{}",
                fix.course(),
                fix.speed_knots(),
                self.comment,
            ),
            (EncodingMode::TimestampedDestination, Some(target)) => format!(
                "{header}@{}{latitude}{SYMBOL_TABLE}{longitude}{SYMBOL_CODE}{}",
                now.format("%H%M%SZ"),
                destination_comment(fix, target),
            ),
            _ => format!(
                "{header}@{}{latitude}{SYMBOL_TABLE}{longitude}{SYMBOL_CODE}{}",
                now.format("%H%M%SZ"),
                self.comment,
            ),
        };

        AprsPacket(line)
    }
}

impl Default for PacketEncoder {
    fn default() -> Self {
        Self::new(EncodingMode::default())
    }
}
