//! Domain types for station wait-time lookup.
//!
//! Everything here is pure: parsing, estimation and distance arithmetic
//! with no I/O. Remote collaborators live in their own modules.

mod category;
mod distance;
mod filename;
mod station;
mod wait;

pub use category::{Category, InvalidCategory};
pub use distance::{Coordinates, Distance};
pub use filename::{DEFAULT_VEHICLE_COUNT, ImageName};
pub use station::{LatestImage, Station};
pub use wait::{NOT_AVAILABLE, WaitTime, estimate, estimate_named};
