//! Segment classification: which road segment a geometry index falls in.
//!
//! Routing metadata is not guaranteed to cover the geometry without gaps, so
//! lookup never fails. An index no range contains resolves to the last
//! segment.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::road::{RoadCategory, DEFAULT_ROAD_CATEGORY};

/// Half-open range `[start_index, end_index)` of geometry indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub start_index: usize,
    pub end_index: usize,
    pub road_category: RoadCategory,
}

impl RouteSegment {
    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..self.end_index).contains(&index)
    }
}

/// First segment containing `index`, else the last segment. `None` only when
/// `segments` is empty.
pub fn segment_for(index: usize, segments: &[RouteSegment]) -> Option<&RouteSegment> {
    segments
        .iter()
        .find(|segment| segment.contains(index))
        .or_else(|| segments.last())
}

const EMPTY_TABLE_FALLBACK: RouteSegment = RouteSegment {
    start_index: 0,
    end_index: 0,
    road_category: DEFAULT_ROAD_CATEGORY,
};

/// Non-empty list of segments ordered by `start_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    segments: Vec<RouteSegment>,
}

impl SegmentTable {
    /// Order the segments and guarantee at least one. With no metadata the
    /// whole geometry (`point_count` points) becomes one segment of
    /// [`DEFAULT_ROAD_CATEGORY`].
    pub fn new(mut segments: Vec<RouteSegment>, point_count: usize) -> Self {
        if segments.is_empty() {
            segments.push(RouteSegment {
                start_index: 0,
                end_index: point_count,
                road_category: DEFAULT_ROAD_CATEGORY,
            });
        }
        segments.sort_by_key(|segment| segment.start_index);
        Self { segments }
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segment_for(&self, index: usize) -> &RouteSegment {
        let segment = segment_for(index, &self.segments).unwrap_or(&EMPTY_TABLE_FALLBACK);
        if !segment.contains(index) {
            debug!(
                "index {} not covered by route metadata, using {} segment",
                index, segment.road_category
            );
        }
        segment
    }
}
