//! Road distance lookup.
//!
//! Distances come from the OpenRouteService driving directions API. The
//! [`DistanceProvider`] trait lets the refresher run against a fake.

mod client;
mod error;

use std::future::Future;

use crate::domain::Coordinates;

pub use client::{DirectionsConfig, OpenRouteService};
pub use error::DirectionsError;

/// Something that can measure road distance between two points.
pub trait DistanceProvider: Send + Sync {
    /// Driving distance from `origin` to `destination`, in metres.
    fn road_distance_meters(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> impl Future<Output = Result<f64, DirectionsError>> + Send;
}
