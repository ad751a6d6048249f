//! Cooperative tick loop: tick the simulator, hand the report to the
//! caller, sleep, repeat. Stops on arrival, on the tick cap, or when the
//! caller breaks out.

use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use crate::clock::Clock;
use crate::simulator::{DriverInputs, RouteSimulator, TickReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: usize,
    pub advances: usize,
    /// Ticks on which the advisory said to prompt the driver.
    pub prompt_ticks: usize,
    pub arrived: bool,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.advanced {
            self.advances += 1;
        }
        if report.decision.should_prompt {
            self.prompt_ticks += 1;
        }
        self.arrived = report.arrived;
    }
}

/// Drive `sim` until it arrives or `max_ticks` ticks have run.
///
/// `inputs` is asked for fresh driver inputs before every tick; `on_tick`
/// sees every report, including the one for the arrival tick, and may
/// return `ControlFlow::Break` to stop early.
pub fn run_until_arrived<C, I, R>(
    sim: &mut RouteSimulator<C>,
    mut inputs: I,
    max_ticks: Option<usize>,
    delay: Duration,
    mut on_tick: R,
) -> RunSummary
where
    C: Clock,
    I: FnMut() -> DriverInputs,
    R: FnMut(&TickReport) -> ControlFlow<()>,
{
    let mut summary = RunSummary::default();
    loop {
        if max_ticks.is_some_and(|max| summary.ticks >= max) {
            break;
        }
        let report = sim.tick(&inputs());
        summary.record(&report);
        if on_tick(&report).is_break() || report.arrived {
            break;
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::road::{LaneProfile, RoadCategory};
    use crate::speed::Speed;
    use crate::test_helpers::meridian_route;

    fn sim(clock: &ManualClock) -> RouteSimulator<ManualClock> {
        RouteSimulator::new(
            meridian_route(5, 1.0, &[(5, RoadCategory::Motorway)]),
            LaneProfile::default(),
            clock.clone(),
        )
    }

    #[test]
    fn runs_to_arrival_with_advancing_time() {
        let clock = ManualClock::new(0);
        let mut sim = sim(&clock);
        let speed = Speed::from_kmph(36.0).expect("speed");
        let mut reports = Vec::new();

        let summary = run_until_arrived(
            &mut sim,
            || {
                clock.advance_secs(51);
                DriverInputs::new(speed, ["ACC"])
            },
            None,
            Duration::ZERO,
            |report| {
                reports.push(report.clone());
                ControlFlow::Continue(())
            },
        );

        assert!(summary.arrived);
        assert_eq!(summary.advances, 4);
        // 100 s per leg with 51 s per tick: two ticks per point.
        assert_eq!(summary.ticks, 8);
        assert_eq!(summary.prompt_ticks, 8);
        assert_eq!(reports.last().map(|r| r.progress()), Some((5, 5)));
    }

    #[test]
    fn stops_at_tick_cap() {
        let clock = ManualClock::new(0);
        let mut sim = sim(&clock);
        let speed = Speed::from_kmph(36.0).expect("speed");
        let summary = run_until_arrived(
            &mut sim,
            || DriverInputs::new(speed, ["LKA"]),
            Some(3),
            Duration::ZERO,
            |_| ControlFlow::Continue(()),
        );
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.advances, 0);
        assert!(!summary.arrived);
    }

    #[test]
    fn caller_can_break_out() {
        let clock = ManualClock::new(0);
        let mut sim = sim(&clock);
        let speed = Speed::from_kmph(10.0).expect("speed");
        let summary = run_until_arrived(
            &mut sim,
            || DriverInputs::new(speed, ["LKA"]),
            None,
            Duration::ZERO,
            |report| {
                if report.decision.should_prompt {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            },
        );
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.prompt_ticks, 0);
    }
}
