//! Vehicle speed input: a validated speed value and a seeded speed model for
//! demo drives whose speed wanders over a range.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SimError;

const SECS_PER_HOUR: f64 = 3600.0;

/// Speed in km/h, guaranteed finite and above zero so the dwell-time
/// division is always defined.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Speed(f64);

impl Speed {
    pub fn from_kmph(kmph: f64) -> Result<Self, SimError> {
        if kmph.is_finite() && kmph > 0.0 {
            Ok(Self(kmph))
        } else {
            Err(SimError::InvalidSpeed(kmph))
        }
    }

    pub fn kmph(self) -> f64 {
        self.0
    }

    /// Seconds needed to cover `distance_km` at this speed.
    pub fn dwell_secs(self, distance_km: f64) -> f64 {
        distance_km / self.0 * SECS_PER_HOUR
    }
}

impl TryFrom<f64> for Speed {
    type Error = SimError;

    fn try_from(kmph: f64) -> Result<Self, Self::Error> {
        Self::from_kmph(kmph)
    }
}

/// Uniform speed sampling over `[min_kmh, max_kmh]`.
pub struct SpeedModel {
    rng: StdRng,
    min_kmh: f64,
    max_kmh: f64,
}

impl SpeedModel {
    pub fn with_range(seed: Option<u64>, min_kmh: f64, max_kmh: f64) -> Result<Self, SimError> {
        let valid = min_kmh.is_finite() && max_kmh.is_finite() && min_kmh > 0.0 && min_kmh <= max_kmh;
        if !valid {
            return Err(SimError::InvalidSpeedRange {
                min: min_kmh,
                max: max_kmh,
            });
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            min_kmh,
            max_kmh,
        })
    }

    pub fn sample(&mut self) -> Speed {
        Speed(self.rng.gen_range(self.min_kmh..=self.max_kmh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_negative_and_non_finite() {
        assert_eq!(Speed::from_kmph(0.0), Err(SimError::InvalidSpeed(0.0)));
        assert_eq!(Speed::from_kmph(-5.0), Err(SimError::InvalidSpeed(-5.0)));
        assert!(Speed::from_kmph(f64::NAN).is_err());
        assert!(Speed::try_from(f64::INFINITY).is_err());
        assert_eq!(Speed::from_kmph(36.0).map(Speed::kmph), Ok(36.0));
    }

    #[test]
    fn dwell_scales_with_distance() {
        let speed = Speed::from_kmph(36.0).expect("speed");
        assert!((speed.dwell_secs(1.0) - 100.0).abs() < 1e-9);
        assert!((speed.dwell_secs(2.5) - 250.0).abs() < 1e-9);
        assert_eq!(speed.dwell_secs(0.0), 0.0);
    }

    #[test]
    fn model_samples_stay_in_range_and_are_seeded() {
        let mut a = SpeedModel::with_range(Some(3), 10.0, 90.0).expect("model");
        let mut b = SpeedModel::with_range(Some(3), 10.0, 90.0).expect("model");
        for _ in 0..100 {
            let sample = a.sample();
            assert!((10.0..=90.0).contains(&sample.kmph()));
            assert_eq!(sample, b.sample());
        }
    }

    #[test]
    fn model_rejects_bad_range() {
        assert!(SpeedModel::with_range(None, 0.0, 50.0).is_err());
        assert!(SpeedModel::with_range(None, 60.0, 50.0).is_err());
    }
}
