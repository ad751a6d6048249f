//! Immutable route built once from a provider response: geometry, segment
//! table and turn-by-turn steps.

use crate::error::RouteError;
use crate::geo::{haversine_km, GeoPoint};
use crate::road::RoadCategory;
use crate::routing::{RouteResponse, RouteStep};
use crate::segment::{RouteSegment, SegmentTable};

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    geometry: Vec<GeoPoint>,
    segments: SegmentTable,
    steps: Vec<RouteStep>,
}

impl Route {
    /// Build a route. Fails on empty geometry or an out-of-range point;
    /// missing segment metadata becomes a single default segment.
    pub fn new(
        geometry: Vec<GeoPoint>,
        segments: Vec<RouteSegment>,
        steps: Vec<RouteStep>,
    ) -> Result<Self, RouteError> {
        if geometry.is_empty() {
            return Err(RouteError::EmptyGeometry);
        }
        for point in &geometry {
            point.validated()?;
        }
        let segments = SegmentTable::new(segments, geometry.len());
        Ok(Self {
            geometry,
            segments,
            steps,
        })
    }

    /// Translate provider metadata codes into categories and build the route.
    pub fn from_response(response: RouteResponse) -> Result<Self, RouteError> {
        let segments = response
            .segments
            .iter()
            .map(|meta| RouteSegment {
                start_index: meta.start_index,
                end_index: meta.end_index,
                road_category: RoadCategory::from_code(meta.code),
            })
            .collect();
        Self::new(response.geometry, segments, response.steps)
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    pub fn last_index(&self) -> usize {
        self.geometry.len() - 1
    }

    pub fn geometry(&self) -> &[GeoPoint] {
        &self.geometry
    }

    pub fn point(&self, index: usize) -> Option<GeoPoint> {
        self.geometry.get(index).copied()
    }

    pub fn segments(&self) -> &SegmentTable {
        &self.segments
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    pub fn segment_for(&self, index: usize) -> &RouteSegment {
        self.segments.segment_for(index)
    }

    /// Step whose way point range covers `index`. Where two steps share a
    /// boundary point, the later one wins, since the vehicle is about to
    /// execute it.
    pub fn step_for(&self, index: usize) -> Option<&RouteStep> {
        self.steps
            .iter()
            .rev()
            .find(|step| step.start_index <= index && index <= step.end_index)
    }

    /// Distance from point `index` to point `index + 1`, `None` past the end.
    pub fn leg_distance_km(&self, index: usize) -> Option<f64> {
        let a = self.geometry.get(index)?;
        let b = self.geometry.get(index + 1)?;
        Some(haversine_km(*a, *b))
    }

    pub fn total_distance_km(&self) -> f64 {
        self.geometry
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            .sum()
    }
}
