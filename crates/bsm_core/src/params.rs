//! Session configuration: which route to drive, how to fetch it, and the
//! driver inputs fed to every tick. Serializes to a JSON file so a demo
//! setup can be saved and replayed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParamsError, SimError};
use crate::road::LaneProfile;
use crate::routing::{RouteProviderKind, DEFAULT_ROUTE_CACHE_CAPACITY};
use crate::simulator::DriverInputs;
use crate::speed::{Speed, SpeedModel};

/// ADAS features a driver can switch on.
pub const ADAS_CATALOG: [&str; 5] = ["LKA", "ACC", "AEB", "FCW", "BSM"];

const DEFAULT_SOURCE: &str = "Coimbatore";
const DEFAULT_DESTINATION: &str = "Chennai";
const DEFAULT_SPEED_KMPH: f64 = 60.0;
const DEFAULT_TICK_DELAY_MS: u64 = 200;

/// Uniform speed variation between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedVariation {
    pub min_kmph: f64,
    pub max_kmph: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParams {
    pub source: String,
    pub destination: String,
    pub provider: RouteProviderKind,
    pub route_cache_capacity: usize,
    pub lane_profile: LaneProfile,
    pub speed_kmph: f64,
    pub speed_variation: Option<SpeedVariation>,
    pub active_adas_features: Vec<String>,
    /// Wall-clock pause between ticks.
    pub tick_delay_ms: u64,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
    /// Stop after this many ticks even if the destination was not reached.
    pub max_ticks: Option<usize>,
    /// Extra drives of the same route, each started with a reset.
    pub laps: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            provider: RouteProviderKind::default(),
            route_cache_capacity: DEFAULT_ROUTE_CACHE_CAPACITY,
            lane_profile: LaneProfile::default(),
            speed_kmph: DEFAULT_SPEED_KMPH,
            speed_variation: None,
            active_adas_features: vec!["LKA".to_string()],
            tick_delay_ms: DEFAULT_TICK_DELAY_MS,
            time_scale: 1.0,
            max_ticks: None,
            laps: 0,
        }
    }
}

impl SimulationParams {
    pub fn with_route(mut self, source: &str, destination: &str) -> Self {
        self.source = source.to_string();
        self.destination = destination.to_string();
        self
    }

    pub fn with_provider(mut self, provider: RouteProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_speed(mut self, speed_kmph: f64) -> Self {
        self.speed_kmph = speed_kmph;
        self
    }

    pub fn with_speed_variation(mut self, min_kmph: f64, max_kmph: f64, seed: Option<u64>) -> Self {
        self.speed_variation = Some(SpeedVariation {
            min_kmph,
            max_kmph,
            seed,
        });
        self
    }

    pub fn with_adas_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_adas_features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tick_delay_ms(mut self, tick_delay_ms: u64) -> Self {
        self.tick_delay_ms = tick_delay_ms;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = laps;
        self
    }

    /// ADAS names outside [`ADAS_CATALOG`].
    pub fn unknown_adas_features(&self) -> Vec<&str> {
        self.active_adas_features
            .iter()
            .map(String::as_str)
            .filter(|name| !ADAS_CATALOG.contains(name))
            .collect()
    }

    /// Build the per-tick input source. Speed is validated here, before it
    /// can reach any dwell-time calculation.
    pub fn driver_inputs(&self) -> Result<DriverInputSource, SimError> {
        let speed = Speed::from_kmph(self.speed_kmph)?;
        let model = self
            .speed_variation
            .map(|v| SpeedModel::with_range(v.seed, v.min_kmph, v.max_kmph))
            .transpose()?;
        Ok(DriverInputSource {
            base: DriverInputs::new(speed, self.active_adas_features.iter().cloned()),
            model,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ParamsError> {
        let contents = fs::read_to_string(path).map_err(|error| {
            ParamsError::Io(format!("failed to read {}: {error}", path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|error| {
            ParamsError::InvalidFormat(format!(
                "failed to parse {}: {error}",
                path.display()
            ))
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ParamsError> {
        let serialized = serde_json::to_string_pretty(self).map_err(|error| {
            ParamsError::Io(format!("failed to serialize params to json: {error}"))
        })?;
        fs::write(path, serialized).map_err(|error| {
            ParamsError::Io(format!("failed to write {}: {error}", path.display()))
        })
    }
}

/// Produces the [`DriverInputs`] for each tick: fixed, or with a sampled
/// speed when a variation range is configured.
pub struct DriverInputSource {
    base: DriverInputs,
    model: Option<SpeedModel>,
}

impl DriverInputSource {
    pub fn next_inputs(&mut self) -> DriverInputs {
        match self.model.as_mut() {
            Some(model) => DriverInputs {
                speed: model.sample(),
                ..self.base.clone()
            },
            None => self.base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::RoadCategory;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let params = SimulationParams::default()
            .with_route("Salem", "Erode")
            .with_speed(80.0)
            .with_speed_variation(15.0, 90.0, Some(9))
            .with_adas_features(["ACC", "AEB"])
            .with_time_scale(30.0)
            .with_max_ticks(500)
            .with_laps(2);

        params.save(&path).expect("save");
        assert_eq!(SimulationParams::load(&path).expect("load"), params);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("partial.json");
        fs::write(
            &path,
            r#"{
                "destination": "Madurai",
                "provider": {"straight_line": {"step_km": 0.5, "road_category": "secondary"}},
                "lane_profile": {"lanes": {"secondary": 1}, "default_lanes": 2}
            }"#,
        )
        .expect("write");

        let params = SimulationParams::load(&path).expect("load");
        assert_eq!(params.source, DEFAULT_SOURCE);
        assert_eq!(params.destination, "Madurai");
        assert_eq!(
            params.provider,
            RouteProviderKind::StraightLine {
                step_km: 0.5,
                road_category: RoadCategory::Secondary
            }
        );
        assert_eq!(
            params.lane_profile.lane_profile_for(RoadCategory::Secondary),
            (1, false)
        );
        assert_eq!(
            params.lane_profile.lane_profile_for(RoadCategory::Motorway),
            (2, true)
        );
    }

    #[test]
    fn unknown_fields_and_bad_json_are_format_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"speed": 50}"#).expect("write");
        assert!(matches!(
            SimulationParams::load(&path),
            Err(ParamsError::InvalidFormat(_))
        ));
        assert!(matches!(
            SimulationParams::load(&dir.path().join("missing.json")),
            Err(ParamsError::Io(_))
        ));
    }

    #[test]
    fn zero_speed_is_rejected_before_simulation() {
        let params = SimulationParams::default().with_speed(0.0);
        assert!(matches!(
            params.driver_inputs(),
            Err(SimError::InvalidSpeed(_))
        ));
        let params = SimulationParams::default().with_speed_variation(0.0, 10.0, None);
        assert!(matches!(
            params.driver_inputs(),
            Err(SimError::InvalidSpeedRange { .. })
        ));
    }

    #[test]
    fn input_source_samples_speed_when_varied() {
        let fixed = SimulationParams::default().with_speed(42.0);
        let mut source = fixed.driver_inputs().expect("inputs");
        assert_eq!(source.next_inputs().speed.kmph(), 42.0);

        let varied = SimulationParams::default().with_speed_variation(10.0, 30.0, Some(1));
        let mut source = varied.driver_inputs().expect("inputs");
        for _ in 0..20 {
            let inputs = source.next_inputs();
            assert!((10.0..=30.0).contains(&inputs.speed.kmph()));
            assert!(inputs.active_adas_features.contains("LKA"));
        }
    }

    #[test]
    fn flags_features_outside_catalog() {
        let params = SimulationParams::default().with_adas_features(["LKA", "XYZ"]);
        assert_eq!(params.unknown_adas_features(), vec!["XYZ"]);
    }
}
