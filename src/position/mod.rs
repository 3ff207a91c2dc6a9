pub mod coordinate;
pub mod distance;
pub mod fix;
pub mod target;

pub use coordinate::{Axis, encode_coordinate};
pub use distance::{distance_meters, distance_miles};
pub use fix::GeoFix;
pub use target::DestinationTarget;
