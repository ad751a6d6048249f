//! Test helpers for building routes with exactly known leg lengths.

use crate::geo::{GeoPoint, EARTH_RADIUS_KM};
use crate::road::RoadCategory;
use crate::route::Route;
use crate::segment::RouteSegment;

/// Latitude and longitude of the first point of every helper route
/// (Coimbatore).
pub const ORIGIN: (f64, f64) = (11.0168, 76.9558);

/// `count` points due north of [`ORIGIN`], `spacing_km` apart along the
/// meridian, so haversine legs equal `spacing_km`.
pub fn meridian_points(count: usize, spacing_km: f64) -> Vec<GeoPoint> {
    let step_deg = (spacing_km / EARTH_RADIUS_KM).to_degrees();
    (0..count)
        .map(|i| GeoPoint {
            lat: ORIGIN.0 + step_deg * i as f64,
            lng: ORIGIN.1,
        })
        .collect()
}

/// Straight route along the meridian, one segment per `(end_index, category)`
/// pair, each starting where the previous one ended.
pub fn meridian_route(
    count: usize,
    spacing_km: f64,
    categories: &[(usize, RoadCategory)],
) -> Route {
    let mut start_index = 0;
    let segments = categories
        .iter()
        .map(|&(end_index, road_category)| {
            let segment = RouteSegment {
                start_index,
                end_index,
                road_category,
            };
            start_index = end_index;
            segment
        })
        .collect();
    Route::new(meridian_points(count, spacing_km), segments, Vec::new())
        .expect("helper routes have at least one point")
}
