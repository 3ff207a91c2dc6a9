//! Protocol and unit-conversion constants
//!
//! Values here are fixed by the APRS wire format or by the physical units the
//! location provider reports in.

/// Knots per metre-per-second.
pub const KNOTS_PER_MPS: f64 = 1.94384;

/// Mean Earth radius used by the haversine estimate, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Lowest speed ever emitted. Analog trackers cannot represent "stopped", so
/// a zero reading is reported as the minimum.
pub const MIN_SPEED_KNOTS: u16 = 1;

/// Largest speed representable in the three-digit SPD field.
pub const MAX_SPEED_KNOTS: u16 = 999;

/// Course emitted in place of a zero reading (360 is north, 0 means unknown).
pub const NORTH_COURSE_DEGREES: u16 = 360;

/// Comment used when no destination is set.
pub const DEFAULT_COMMENT: &str = "Sent from my Android";

/// Path and destination call for an internet-originated packet.
pub const TOCALL_PATH: &str = "APRS,TCPIP*";

/// Primary-table symbol code placed after the longitude (car).
pub const SYMBOL_CODE: char = '>';

/// Symbol table identifier placed between latitude and longitude.
pub const SYMBOL_TABLE: char = '/';

/// APRS-IS line terminator.
pub const LINE_DELIMITER: &str = "\r\n";

/// Server-side filter requested at login: traffic within 200 km of the station.
pub const DEFAULT_FILTER: &str = "m/200";

/// Standard APRS-IS client port with user-defined filters.
pub const DEFAULT_APRS_IS_PORT: u16 = 14580;

/// Round-robin APRS-IS tier-2 host pool.
pub const DEFAULT_APRS_IS_HOST: &str = "rotate.aprs2.net";

/// Longest comment carried in a position report.
pub const MAX_COMMENT_LEN: usize = 43;
