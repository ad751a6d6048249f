//! Blind Spot Monitoring advisory: decides whether to prompt the driver to
//! enable BSM from a snapshot of the current driving conditions.
//!
//! The decision is an ordered guard chain. The first failing guard decides
//! the outcome and its reason, so when several conditions fail at once the
//! reason always names the earliest one in this order:
//!
//! 1. speed below [`MIN_SPEED_KMPH`]
//! 2. road type not in [`SUITABLE_ROAD_TYPES`]
//! 3. fewer than [`MIN_LANE_COUNT`] lanes
//! 4. no adjacent lane
//! 5. none of [`REQUIRED_ADAS_FEATURES`] active

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::road::RoadCategory;

pub const MIN_SPEED_KMPH: f64 = 20.0;
pub const MIN_LANE_COUNT: u32 = 2;
pub const SUITABLE_ROAD_TYPES: [&str; 4] = ["motorway", "highway", "primary", "secondary"];
pub const REQUIRED_ADAS_FEATURES: [&str; 2] = ["LKA", "ACC"];

/// Why the advisory did or did not fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BsmReason {
    SpeedBelowThreshold,
    UnsuitableRoadType(String),
    InsufficientLanes,
    NoAdjacentLane,
    NoCompatibleAdasFeature,
    ConditionsSatisfied,
}

impl fmt::Display for BsmReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BsmReason::SpeedBelowThreshold => {
                write!(f, "Speed below {MIN_SPEED_KMPH} km/h threshold")
            }
            BsmReason::UnsuitableRoadType(road) => write!(f, "Unsuitable road type ({road})"),
            BsmReason::InsufficientLanes => f.write_str("Not enough lanes for BSM"),
            BsmReason::NoAdjacentLane => f.write_str("No adjacent lane detected"),
            BsmReason::NoCompatibleAdasFeature => {
                f.write_str("No compatible ADAS feature active (LKA or ACC)")
            }
            BsmReason::ConditionsSatisfied => f.write_str("Conditions satisfied"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BsmDecision {
    pub should_prompt: bool,
    pub reason: BsmReason,
}

impl BsmDecision {
    fn skip(reason: BsmReason) -> Self {
        Self {
            should_prompt: false,
            reason,
        }
    }

    /// One-line advisory text for display.
    pub fn message(&self) -> String {
        if self.should_prompt {
            "Prompt Driver: Enable Blind Spot Monitoring?".to_string()
        } else {
            format!("Do Not Prompt: {}.", self.reason)
        }
    }
}

/// Everything the evaluator looks at, rebuilt from scratch on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivingSnapshot {
    pub speed_kmph: f64,
    pub road_type: RoadCategory,
    pub lane_count: u32,
    pub adjacent_lanes_present: bool,
    pub active_adas_features: BTreeSet<String>,
}

pub fn evaluate_snapshot(snapshot: &DrivingSnapshot) -> BsmDecision {
    evaluate(
        snapshot.speed_kmph,
        snapshot.road_type.as_str(),
        snapshot.lane_count,
        snapshot.adjacent_lanes_present,
        &snapshot.active_adas_features,
    )
}

/// Evaluate the BSM advisory. Total over its inputs: a road type outside the
/// known categories or a nonsensical speed is a do-not-prompt outcome, not
/// an error.
pub fn evaluate(
    speed_kmph: f64,
    road_type: &str,
    lane_count: u32,
    adjacent_lanes_present: bool,
    active_adas_features: &BTreeSet<String>,
) -> BsmDecision {
    // NaN compares false, so it has to be rejected explicitly.
    if speed_kmph.is_nan() || speed_kmph < MIN_SPEED_KMPH {
        return BsmDecision::skip(BsmReason::SpeedBelowThreshold);
    }
    if !SUITABLE_ROAD_TYPES.contains(&road_type) {
        return BsmDecision::skip(BsmReason::UnsuitableRoadType(road_type.to_string()));
    }
    if lane_count < MIN_LANE_COUNT {
        return BsmDecision::skip(BsmReason::InsufficientLanes);
    }
    if !adjacent_lanes_present {
        return BsmDecision::skip(BsmReason::NoAdjacentLane);
    }
    let compatible = REQUIRED_ADAS_FEATURES
        .iter()
        .any(|feature| active_adas_features.contains(*feature));
    if !compatible {
        return BsmDecision::skip(BsmReason::NoCompatibleAdasFeature);
    }
    BsmDecision {
        should_prompt: true,
        reason: BsmReason::ConditionsSatisfied,
    }
}
