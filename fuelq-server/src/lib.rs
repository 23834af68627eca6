//! FuelQ station wait-time server.
//!
//! A local web application that answers: "How long will I queue at the
//! nearby EV, CNG or petrol stations?" Wait times come from the latest
//! vehicle-count photo uploaded for each station.

pub mod account;
pub mod auth;
pub mod cache;
pub mod config;
pub mod directions;
pub mod domain;
pub mod listing;
pub mod realtime;
pub mod refresh;
pub mod session;
pub mod storage;
pub mod web;
