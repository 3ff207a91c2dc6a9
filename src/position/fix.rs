use serde::Deserialize;

use crate::constants::{KNOTS_PER_MPS, MAX_SPEED_KNOTS, MIN_SPEED_KNOTS, NORTH_COURSE_DEGREES};

/// A single GPS fix as delivered by the location provider.
///
/// Speed is in metres per second and course in degrees clockwise from true
/// north, the units most providers (including gpsd TPV reports) use.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(alias = "speed", default)]
    pub speed_mps: f32,
    #[serde(alias = "course", alias = "track", default)]
    pub course_degrees: f32,
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64, speed_mps: f32, course_degrees: f32) -> Self {
        Self {
            latitude,
            longitude,
            speed_mps,
            course_degrees,
        }
    }

    /// Speed rounded to whole knots and clamped to `[1, 999]`.
    ///
    /// Zero (and anything that rounds to zero, or NaN) is reported as 1 knot.
    pub fn speed_knots(&self) -> u16 {
        let knots = (self.speed_mps as f64 * KNOTS_PER_MPS).round();
        let clamped = knots.clamp(MIN_SPEED_KNOTS as f64, MAX_SPEED_KNOTS as f64) as u16;
        clamped.max(MIN_SPEED_KNOTS)
    }

    /// Course rounded to whole degrees in `[1, 360]`.
    ///
    /// A course that rounds to 0 is reported as 360 so it is never read as
    /// "unknown" downstream.
    pub fn course(&self) -> u16 {
        let course = self.course_degrees.round().clamp(0.0, 360.0) as u16;
        if course == 0 {
            NORTH_COURSE_DEGREES
        } else {
            course
        }
    }

    /// 16-point compass name for the course, e.g. `"NNE"`.
    pub fn cardinal_direction(&self) -> &'static str {
        let normalized = self.course_degrees.rem_euclid(360.0);
        let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
        COMPASS_POINTS[index]
    }
}
