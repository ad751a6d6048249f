pub mod bsm;
pub mod clock;
pub mod error;
pub mod geo;
pub mod params;
pub mod places;
pub mod road;
pub mod route;
pub mod routing;
pub mod runner;
pub mod segment;
pub mod simulator;
pub mod speed;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
