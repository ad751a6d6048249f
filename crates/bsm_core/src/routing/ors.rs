//! OpenRouteService directions adapter.
//!
//! Requests a driving route with the `waytype` extra, then translates the
//! GeoJSON response into a [`RouteResponse`]: geometry, turn-by-turn steps
//! and road-category segment metadata expressed in the crate's own code
//! table (see [`crate::road::RoadCategory::from_code`]).

mod client;
mod parser;
mod response;


pub use client::OrsRouteProvider;
