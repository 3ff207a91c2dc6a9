//! Decimal degrees to APRS `DDMM.mm` / `DDDMM.mm` text.

/// Which axis a coordinate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn degree_digits(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    fn hemisphere(self, negative: bool) -> char {
        match (self, negative) {
            (Axis::Latitude, false) => 'N',
            (Axis::Latitude, true) => 'S',
            (Axis::Longitude, false) => 'E',
            (Axis::Longitude, true) => 'W',
        }
    }
}

/// Encode a coordinate in decimal degrees as APRS degrees and decimal minutes.
///
/// The value is rounded once to hundredths of a minute before being split, so
/// a minute field that would round to `60.00` carries into the degrees
/// instead. Values beyond ±90 (latitude) or ±180 (longitude) are clamped.
///
/// # Example
/// ```
/// use aprs_tracker::position::{Axis, encode_coordinate};
///
/// assert_eq!(encode_coordinate(-82.136217, Axis::Longitude), "08208.17W");
/// assert_eq!(encode_coordinate(0.0, Axis::Latitude), "0000.00N");
/// ```
pub fn encode_coordinate(coordinate: f64, axis: Axis) -> String {
    let limit = axis.limit();
    let magnitude = coordinate.abs().min(limit);

    // Hundredths of a minute: 6000 per degree
    let hundredths = (magnitude * 6000.0).round() as u64;
    let degrees = hundredths / 6000;
    let minute_hundredths = hundredths % 6000;

    format!(
        "{:0width$}{:02}.{:02}{}",
        degrees,
        minute_hundredths / 100,
        minute_hundredths % 100,
        axis.hemisphere(coordinate < 0.0),
        width = axis.degree_digits()
    )
}
