use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Coordinate the station is travelling towards.
///
/// When set, position reports carry the remaining great-circle distance as
/// their comment.
///
/// # Parsing formats
/// - `29.186302, -82.136217`
/// - `(29.186302, -82.136217)`
///
/// # Example
/// ```
/// use aprs_tracker::position::DestinationTarget;
///
/// let target: DestinationTarget = "(28.5383, -81.3792)".parse().unwrap();
/// assert_eq!(target.latitude, 28.5383);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct DestinationTarget {
    pub latitude: f64,
    pub longitude: f64,
}

impl DestinationTarget {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude out of range: {}", latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude out of range: {}", longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for DestinationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl FromStr for DestinationTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Parentheses are optional but must be balanced
        let inner = match (trimmed.strip_prefix('('), trimmed.ends_with(')')) {
            (Some(rest), true) => &rest[..rest.len() - 1],
            (None, false) => trimmed,
            _ => return Err(format!("unbalanced parentheses: {}", s)),
        };

        let (lat, lon) = inner
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat, lon\": {}", s))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude: {}", lat.trim()))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude: {}", lon.trim()))?;

        Self::new(latitude, longitude)
    }
}

impl TryFrom<String> for DestinationTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
