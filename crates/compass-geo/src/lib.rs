pub mod bearing;
pub mod point;

pub use bearing::{rhumb_bearing, BearingTracker};
pub use point::{CoordinateError, GeoPoint};
