//! Pluggable route providers: trait abstraction for routing backends.
//!
//! Three implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`StraightLineRouteProvider`**: great-circle line sampled every `step_km`, one
//!   segment of a fixed category. No external calls.
//! - **`OrsRouteProvider`** (feature `ors`): calls an OpenRouteService directions endpoint.
//! - **`PrecomputedRouteProvider`** (feature `precomputed`): loads a JSON route table from disk.
//!
//! Remote and table providers are wrapped in a [`CachedRouteProvider`] so repeated
//! requests for the same source/destination pair never leave the process.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use log::{debug, info, warn};
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::geo::{haversine_km, interpolate, GeoPoint};
use crate::road::RoadCategory;

#[cfg(feature = "ors")]
pub mod ors;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Road-category metadata for geometry indices `[start_index, end_index)`,
/// with the provider's integer category code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    pub start_index: usize,
    pub end_index: usize,
    pub code: i64,
}

/// One turn-by-turn instruction covering geometry indices
/// `start_index..=end_index`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance_km: f64,
    pub duration_secs: f64,
    pub start_index: usize,
    pub end_index: usize,
}

/// Result of a route query between two coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub geometry: Vec<GeoPoint>,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
    #[serde(default)]
    pub segments: Vec<SegmentMetadata>,
    /// Road-network distance in kilometres.
    pub distance_km: f64,
    /// Free-flow travel time in seconds.
    pub duration_secs: f64,
}

/// Which routing backend to use.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RouteProviderKind {
    StraightLine {
        step_km: f64,
        road_category: RoadCategory,
    },
    /// OpenRouteService base URL (e.g. `"https://api.openrouteservice.org"`).
    #[cfg(feature = "ors")]
    Ors {
        endpoint: String,
        api_key: Option<String>,
    },
    /// JSON route table written by [`precomputed::PrecomputedRouteProvider::save_to_file`].
    #[cfg(feature = "precomputed")]
    Precomputed { path: String },
}

impl Default for RouteProviderKind {
    fn default() -> Self {
        RouteProviderKind::StraightLine {
            step_km: DEFAULT_STRAIGHT_LINE_STEP_KM,
            road_category: RoadCategory::Motorway,
        }
    }
}

/// Routing backends are blocking and must return the same route for the
/// same input pair, which is what makes memoization valid.
pub trait RouteProvider: Send + Sync {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteResponse, RouteError>;
}

// ---------------------------------------------------------------------------
// Straight-line provider (always available)
// ---------------------------------------------------------------------------

pub const DEFAULT_STRAIGHT_LINE_STEP_KM: f64 = 1.0;

/// Smaller steps are raised to this spacing.
pub const MIN_STRAIGHT_LINE_STEP_KM: f64 = 0.01;

/// Upper bound on interpolated legs in one straight-line route.
pub const MAX_STRAIGHT_LINE_LEGS: usize = 100_000;

/// Assumed average speed for the straight-line duration estimate.
const STRAIGHT_LINE_SPEED_KMH: f64 = 60.0;

pub struct StraightLineRouteProvider {
    step_km: f64,
    road_category: RoadCategory,
}

impl StraightLineRouteProvider {
    /// Non-positive or non-finite steps fall back to
    /// [`DEFAULT_STRAIGHT_LINE_STEP_KM`]; positive steps are raised to at
    /// least [`MIN_STRAIGHT_LINE_STEP_KM`].
    pub fn new(step_km: f64, road_category: RoadCategory) -> Self {
        let step_km = if step_km.is_finite() && step_km > 0.0 {
            step_km.max(MIN_STRAIGHT_LINE_STEP_KM)
        } else {
            DEFAULT_STRAIGHT_LINE_STEP_KM
        };
        Self {
            step_km,
            road_category,
        }
    }
}

impl RouteProvider for StraightLineRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteResponse, RouteError> {
        let distance_km = haversine_km(from, to);
        let legs = (distance_km / self.step_km).ceil().max(1.0);
        if legs > MAX_STRAIGHT_LINE_LEGS as f64 {
            return Err(RouteError::GeometryTooLarge {
                legs,
                limit: MAX_STRAIGHT_LINE_LEGS,
            });
        }
        let legs = legs as usize;
        let geometry: Vec<GeoPoint> = (0..=legs)
            .map(|i| interpolate(from, to, i as f64 / legs as f64))
            .collect();
        let last = geometry.len() - 1;

        Ok(RouteResponse {
            steps: vec![
                RouteStep {
                    instruction: "Head towards destination".to_string(),
                    distance_km,
                    duration_secs: distance_km / STRAIGHT_LINE_SPEED_KMH * 3600.0,
                    start_index: 0,
                    end_index: last,
                },
                RouteStep {
                    instruction: "Arrive at destination".to_string(),
                    distance_km: 0.0,
                    duration_secs: 0.0,
                    start_index: last,
                    end_index: last,
                },
            ],
            segments: vec![SegmentMetadata {
                start_index: 0,
                end_index: geometry.len(),
                code: i64::from(self.road_category.code()),
            }],
            geometry,
            distance_km,
            duration_secs: distance_km / STRAIGHT_LINE_SPEED_KMH * 3600.0,
        })
    }
}

// ---------------------------------------------------------------------------
// Pre-computed provider (behind `precomputed` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "precomputed")]
pub mod precomputed {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[derive(Serialize, Deserialize)]
    struct TableEntry {
        from: GeoPoint,
        to: GeoPoint,
        route: RouteResponse,
    }

    /// Route table keyed on the exact coordinate pair.
    pub struct PrecomputedRouteProvider {
        table: HashMap<RouteKey, RouteResponse>,
    }

    impl PrecomputedRouteProvider {
        pub fn from_file(path: &str) -> Result<Self, RouteError> {
            let data = fs::read_to_string(path).map_err(|err| RouteError::Table {
                path: path.to_string(),
                message: err.to_string(),
            })?;
            let entries: Vec<TableEntry> =
                serde_json::from_str(&data).map_err(|err| RouteError::Table {
                    path: path.to_string(),
                    message: err.to_string(),
                })?;
            let table = entries
                .into_iter()
                .map(|entry| (RouteKey::new(entry.from, entry.to), entry.route))
                .collect();
            Ok(Self { table })
        }

        /// Create from in-memory routes (useful for tests).
        pub fn from_routes(routes: Vec<(GeoPoint, GeoPoint, RouteResponse)>) -> Self {
            let table = routes
                .into_iter()
                .map(|(from, to, route)| (RouteKey::new(from, to), route))
                .collect();
            Self { table }
        }

        pub fn save_to_file(
            routes: &[(GeoPoint, GeoPoint, RouteResponse)],
            path: &str,
        ) -> Result<(), RouteError> {
            let entries: Vec<TableEntry> = routes
                .iter()
                .map(|(from, to, route)| TableEntry {
                    from: *from,
                    to: *to,
                    route: route.clone(),
                })
                .collect();
            let table_error = |message: String| RouteError::Table {
                path: path.to_string(),
                message,
            };
            let data = serde_json::to_string_pretty(&entries)
                .map_err(|err| table_error(err.to_string()))?;
            fs::write(path, data).map_err(|err| table_error(err.to_string()))
        }
    }

    impl RouteProvider for PrecomputedRouteProvider {
        fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteResponse, RouteError> {
            self.table
                .get(&RouteKey::new(from, to))
                .cloned()
                .ok_or(RouteError::NoRoute { from, to })
        }
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

/// Directional cache key: exact bit patterns of both endpoints, with signed
/// zero folded to `0.0`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct RouteKey((u64, u64), (u64, u64));

impl RouteKey {
    pub fn new(from: GeoPoint, to: GeoPoint) -> Self {
        Self(from.bits(), to.bits())
    }
}

/// LRU-cached wrapper around any [`RouteProvider`]. Only successful routes
/// are cached; a failed request is retried next time.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<RouteKey, RouteResponse>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteResponse, RouteError> {
        let key = RouteKey::new(from, to);

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                debug!("route cache hit for {:?} -> {:?}", from, to);
                return Ok(cached.clone());
            }
        }

        info!("fetching route {:?} -> {:?}", from, to);
        let result = self.inner.route(from, to);
        match &result {
            Ok(route) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.put(key, route.clone());
                }
            }
            Err(err) => warn!("route request failed: {}", err),
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from RouteProviderKind
// ---------------------------------------------------------------------------

pub const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 64;

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`].
///
/// The straight-line provider is cheap and returned uncached. Other providers
/// are wrapped in a [`CachedRouteProvider`] of `cache_capacity` entries.
#[cfg_attr(
    not(any(feature = "ors", feature = "precomputed")),
    allow(unused_variables)
)]
pub fn build_route_provider(
    kind: &RouteProviderKind,
    cache_capacity: usize,
) -> Result<Box<dyn RouteProvider>, RouteError> {
    match kind {
        RouteProviderKind::StraightLine {
            step_km,
            road_category,
        } => Ok(Box::new(StraightLineRouteProvider::new(
            *step_km,
            *road_category,
        ))),

        #[cfg(feature = "ors")]
        RouteProviderKind::Ors { endpoint, api_key } => {
            let inner = Box::new(ors::OrsRouteProvider::new(endpoint, api_key.clone())?);
            Ok(Box::new(CachedRouteProvider::new(inner, cache_capacity)))
        }

        #[cfg(feature = "precomputed")]
        RouteProviderKind::Precomputed { path } => {
            let inner = Box::new(precomputed::PrecomputedRouteProvider::from_file(path)?);
            Ok(Box::new(CachedRouteProvider::new(inner, cache_capacity)))
        }
    }
}
