//! Route simulator: moves a single vehicle point-by-point along a route and
//! re-evaluates the BSM advisory on every tick.
//!
//! The vehicle stays at geometry index `i` until enough time has passed to
//! cover the leg to `i + 1` at the current speed:
//!
//! ```text
//! dwell_secs = haversine_km(p[i], p[i + 1]) / speed_kmph * 3600
//! ```
//!
//! At most one point is advanced per tick. Once the last point is reached the
//! simulator is `Arrived` and further ticks leave the state alone until
//! [`RouteSimulator::reset`].

use std::collections::BTreeSet;

use log::{debug, info};

use crate::bsm::{evaluate_snapshot, BsmDecision, DrivingSnapshot};
use crate::clock::{Clock, SystemClock, ONE_SEC_MS};
use crate::geo::GeoPoint;
use crate::road::{LaneProfile, RoadCategory};
use crate::route::Route;
use crate::speed::Speed;

/// The only mutable state of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationState {
    pub current_index: usize,
    pub last_update_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Arrived,
}

/// Inputs supplied by the driver loop on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverInputs {
    pub speed: Speed,
    pub active_adas_features: BTreeSet<String>,
}

impl DriverInputs {
    pub fn new<I, S>(speed: Speed, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            speed,
            active_adas_features: features.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything presentation needs to render one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub position: GeoPoint,
    pub current_index: usize,
    pub total_points: usize,
    pub road_category: RoadCategory,
    pub lane_count: u32,
    pub adjacent_lanes_present: bool,
    pub speed_kmph: f64,
    pub decision: BsmDecision,
    /// Whether this tick moved the vehicle to the next point.
    pub advanced: bool,
    pub arrived: bool,
    /// Time still needed at the current speed before the next advance.
    pub secs_to_next_point: Option<f64>,
    pub instruction: Option<String>,
}

impl TickReport {
    /// One-based position counter, `(current, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index + 1, self.total_points)
    }
}

pub struct RouteSimulator<C: Clock = SystemClock> {
    route: Route,
    lanes: LaneProfile,
    clock: C,
    state: SimulationState,
}

impl RouteSimulator<SystemClock> {
    pub fn with_system_clock(route: Route, lanes: LaneProfile) -> Self {
        Self::new(route, lanes, SystemClock::new())
    }
}

impl<C: Clock> RouteSimulator<C> {
    pub fn new(route: Route, lanes: LaneProfile, clock: C) -> Self {
        let state = SimulationState {
            current_index: 0,
            last_update_ms: clock.now_ms(),
        };
        Self {
            route,
            lanes,
            clock,
            state,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        if self.state.current_index >= self.route.last_index() {
            Phase::Arrived
        } else {
            Phase::Running
        }
    }

    pub fn is_arrived(&self) -> bool {
        self.phase() == Phase::Arrived
    }

    pub fn position(&self) -> GeoPoint {
        self.route.geometry()[self.state.current_index]
    }

    /// Move to the next point if the dwell time for the current leg has
    /// elapsed. Returns whether the vehicle moved.
    pub fn advance(&mut self, speed: Speed) -> bool {
        let Some(distance_km) = self.leg_distance_km() else {
            return false;
        };
        let now = self.clock.now_ms();
        let elapsed_secs = self.elapsed_secs(now);
        if elapsed_secs < speed.dwell_secs(distance_km) {
            return false;
        }

        self.state.current_index += 1;
        self.state.last_update_ms = now;
        debug!(
            "advanced to point {}/{} after {:.1}s",
            self.state.current_index + 1,
            self.route.len(),
            elapsed_secs
        );
        if self.is_arrived() {
            info!("destination reached after {} points", self.route.len());
        }
        true
    }

    /// Back to the first point with a fresh timestamp, from any state.
    pub fn reset(&mut self) {
        self.state = SimulationState {
            current_index: 0,
            last_update_ms: self.clock.now_ms(),
        };
        info!("simulation reset");
    }

    /// Driving conditions at the current position.
    pub fn snapshot(&self, inputs: &DriverInputs) -> DrivingSnapshot {
        let segment = self.route.segment_for(self.state.current_index);
        let (lane_count, adjacent_lanes_present) = self.lanes.lane_profile_for(segment.road_category);
        DrivingSnapshot {
            speed_kmph: inputs.speed.kmph(),
            road_type: segment.road_category,
            lane_count,
            adjacent_lanes_present,
            active_adas_features: inputs.active_adas_features.clone(),
        }
    }

    /// Advance if due, then classify the current segment and evaluate the
    /// advisory from scratch.
    pub fn tick(&mut self, inputs: &DriverInputs) -> TickReport {
        let advanced = self.advance(inputs.speed);
        let snapshot = self.snapshot(inputs);
        let decision = evaluate_snapshot(&snapshot);
        let secs_to_next_point = self.leg_distance_km().map(|distance_km| {
            let remaining =
                inputs.speed.dwell_secs(distance_km) - self.elapsed_secs(self.clock.now_ms());
            remaining.max(0.0)
        });

        TickReport {
            position: self.position(),
            current_index: self.state.current_index,
            total_points: self.route.len(),
            road_category: snapshot.road_type,
            lane_count: snapshot.lane_count,
            adjacent_lanes_present: snapshot.adjacent_lanes_present,
            speed_kmph: snapshot.speed_kmph,
            decision,
            advanced,
            arrived: self.is_arrived(),
            secs_to_next_point,
            instruction: self
                .route
                .step_for(self.state.current_index)
                .map(|step| step.instruction.clone()),
        }
    }

    /// Length of the leg ahead, `None` once arrived.
    fn leg_distance_km(&self) -> Option<f64> {
        if self.is_arrived() {
            return None;
        }
        self.route.leg_distance_km(self.state.current_index)
    }

    fn elapsed_secs(&self, now_ms: u64) -> f64 {
        now_ms.saturating_sub(self.state.last_update_ms) as f64 / ONE_SEC_MS as f64
    }
}
