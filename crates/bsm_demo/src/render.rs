//! Plain-text rendering of tick reports: the map position, progress and
//! sidebar facts for each tick, plus a run summary.

use bsm_core::runner::RunSummary;
use bsm_core::simulator::TickReport;

const PROGRESS_BAR_WIDTH: usize = 24;

pub fn progress_bar(current: usize, total: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (current * PROGRESS_BAR_WIDTH) / total
    };
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

pub fn render_tick(report: &TickReport) -> String {
    let (current, total) = report.progress();
    let adjacency = if report.adjacent_lanes_present { "yes" } else { "no" };
    let mut out = format!(
        "{} {}/{}  ({:.5}, {:.5})\n  road: {}  lanes: {}  adjacent lane: {}  speed: {:.1} km/h\n  {}",
        progress_bar(current, total),
        current,
        total,
        report.position.lat,
        report.position.lng,
        report.road_category,
        report.lane_count,
        adjacency,
        report.speed_kmph,
        report.decision.message(),
    );
    if let Some(instruction) = &report.instruction {
        out.push_str(&format!("\n  next: {instruction}"));
    }
    match (report.arrived, report.secs_to_next_point) {
        (true, _) => out.push_str("\n  Destination reached."),
        (false, Some(secs)) => out.push_str(&format!("\n  next point in {secs:.1}s")),
        (false, None) => {}
    }
    out
}

pub fn render_summary(lap: u32, summary: &RunSummary) -> String {
    format!(
        "lap {}: {} ticks, {} advances, prompted on {} ticks{}",
        lap + 1,
        summary.ticks,
        summary.advances,
        summary.prompt_ticks,
        if summary.arrived { ", arrived" } else { ", stopped early" }
    )
}
