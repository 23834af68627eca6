//! Station refresh.
//!
//! Turns the image folders in object storage into station lists with
//! estimated wait times and road distances, and keeps the latest list of
//! each category on the [`StationBoard`].

mod board;
mod config;
mod error;
mod refresher;

#[cfg(test)]
mod refresher_tests;

pub use board::{Published, RefreshToken, StationBoard};
pub use config::{DEFAULT_MAX_FILES_PER_STATION, DistanceFallback, RefreshConfig};
pub use error::RefreshError;
pub use refresher::{Newest, StationRefresher};
