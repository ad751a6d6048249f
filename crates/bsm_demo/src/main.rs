//! Terminal front end for the BSM route advisor: resolves two places, fetches
//! a route, then drives the simulator tick by tick and prints the advisory.
//!
//! Run with: cargo run -p bsm_demo -- --from Coimbatore --to Chennai --time-scale 60

mod render;

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::info;

use bsm_core::clock::ScaledClock;
use bsm_core::params::{SimulationParams, ADAS_CATALOG};
use bsm_core::places::{CatalogGeocoder, ChainGeocoder, Geocoder};
use bsm_core::road::RoadCategory;
use bsm_core::route::Route;
use bsm_core::routing::{build_route_provider, RouteProviderKind, DEFAULT_STRAIGHT_LINE_STEP_KM};
use bsm_core::runner::run_until_arrived;
use bsm_core::simulator::{RouteSimulator, TickReport};

use crate::render::{render_summary, render_tick};

#[derive(Parser)]
#[command(
    name = "bsm_demo",
    about = "Simulate a drive along a route and show when to prompt for Blind Spot Monitoring",
    long_about = "Resolves a source and destination, fetches a route, and moves a simulated\n\
                  vehicle along it. Every tick the current road segment is classified and\n\
                  the Blind Spot Monitoring advisory is re-evaluated."
)]
struct Cli {
    /// JSON session file; flags given on the command line override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the merged session to this file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,
    /// Source place (catalog name, or free text with --geocode)
    #[arg(long)]
    from: Option<String>,
    /// Destination place
    #[arg(long)]
    to: Option<String>,
    /// Vehicle speed in km/h
    #[arg(long)]
    speed: Option<f64>,
    /// Sample speed uniformly from MIN..=MAX each tick
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    speed_range: Option<Vec<f64>>,
    /// Seed for --speed-range sampling
    #[arg(long)]
    seed: Option<u64>,
    /// Active ADAS features, comma separated
    #[arg(long, value_delimiter = ',')]
    adas: Option<Vec<String>>,
    /// Pause between ticks in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Simulated seconds per wall-clock second
    #[arg(long)]
    time_scale: Option<f64>,
    /// Stop each lap after this many ticks
    #[arg(long)]
    max_ticks: Option<usize>,
    /// Drive the route again this many times, resetting after each arrival
    #[arg(long)]
    laps: Option<u32>,
    /// Routing backend
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,
    /// Road category for the straight-line provider
    #[arg(long, default_value = "motorway")]
    road: RoadCategory,
    /// OpenRouteService base URL
    #[arg(long, default_value = "https://api.openrouteservice.org")]
    ors_endpoint: String,
    /// OpenRouteService API key
    #[arg(long, env = "ORS_API_KEY")]
    ors_api_key: Option<String>,
    /// Route table file for the precomputed provider
    #[arg(long)]
    route_table: Option<String>,
    /// Geocode places missing from the catalog with Nominatim
    #[arg(long)]
    geocode: bool,
    /// Print every tick instead of only ticks where something changed
    #[arg(long)]
    all_ticks: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    StraightLine,
    Ors,
    Precomputed,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let params = merge_params(&cli)?;

    if let Some(path) = &cli.save_config {
        params.save(path).map_err(|err| err.to_string())?;
        println!("Saved session to {}", path.display());
        return Ok(());
    }

    let unknown = params.unknown_adas_features();
    if !unknown.is_empty() {
        return Err(format!(
            "unknown ADAS feature(s) {}; choose from {}",
            unknown.join(", "),
            ADAS_CATALOG.join(", ")
        ));
    }
    let mut input_source = params.driver_inputs().map_err(|err| err.to_string())?;

    let geocoder = build_geocoder(cli.geocode)?;
    let source = geocoder
        .geocode(&params.source)
        .map_err(|err| err.to_string())?;
    let destination = geocoder
        .geocode(&params.destination)
        .map_err(|err| err.to_string())?;

    // A failed fetch stops here; no simulator is built without a route.
    let provider = build_route_provider(&params.provider, params.route_cache_capacity)
        .map_err(|err| err.to_string())?;
    let response = provider
        .route(source, destination)
        .map_err(|err| err.to_string())?;
    let route = Route::from_response(response).map_err(|err| err.to_string())?;
    info!(
        "route {} -> {}: {} points, {:.1} km",
        params.source,
        params.destination,
        route.len(),
        route.total_distance_km()
    );
    println!(
        "{} -> {}: {} points, {:.1} km, {} segment(s)",
        params.source,
        params.destination,
        route.len(),
        route.total_distance_km(),
        route.segments().len()
    );

    let clock = ScaledClock::new(params.time_scale);
    let mut sim = RouteSimulator::new(route, params.lane_profile.clone(), clock);
    let delay = Duration::from_millis(params.tick_delay_ms);

    for lap in 0..=params.laps {
        if lap > 0 {
            sim.reset();
        }
        let mut last_printed: Option<TickReport> = None;
        let summary = run_until_arrived(
            &mut sim,
            || input_source.next_inputs(),
            params.max_ticks,
            delay,
            |report| {
                if cli.all_ticks || worth_printing(last_printed.as_ref(), report) {
                    println!("{}\n", render_tick(report));
                    last_printed = Some(report.clone());
                }
                ControlFlow::Continue(())
            },
        );
        println!("{}", render_summary(lap, &summary));
        if !summary.arrived {
            break;
        }
    }
    Ok(())
}

/// Print on the first tick, on movement, on arrival and when the advisory
/// changes.
fn worth_printing(previous: Option<&TickReport>, report: &TickReport) -> bool {
    match previous {
        None => true,
        Some(previous) => {
            report.advanced || report.arrived || previous.decision != report.decision
        }
    }
}

fn merge_params(cli: &Cli) -> Result<SimulationParams, String> {
    let mut params = match &cli.config {
        Some(path) => SimulationParams::load(path).map_err(|err| err.to_string())?,
        None => SimulationParams::default(),
    };

    if let Some(from) = &cli.from {
        params.source = from.clone();
    }
    if let Some(to) = &cli.to {
        params.destination = to.clone();
    }
    if let Some(speed) = cli.speed {
        params = params.with_speed(speed);
    }
    if let Some(range) = &cli.speed_range {
        params = params.with_speed_variation(range[0], range[1], cli.seed);
    }
    if let Some(adas) = &cli.adas {
        params = params.with_adas_features(adas.iter().map(|name| name.trim().to_uppercase()));
    }
    if let Some(tick_ms) = cli.tick_ms {
        params = params.with_tick_delay_ms(tick_ms);
    }
    if let Some(time_scale) = cli.time_scale {
        params = params.with_time_scale(time_scale);
    }
    if let Some(max_ticks) = cli.max_ticks {
        params = params.with_max_ticks(max_ticks);
    }
    if let Some(laps) = cli.laps {
        params = params.with_laps(laps);
    }
    if let Some(provider) = cli.provider {
        params = params.with_provider(provider_kind(cli, provider)?);
    }
    Ok(params)
}

fn provider_kind(cli: &Cli, provider: ProviderArg) -> Result<RouteProviderKind, String> {
    match provider {
        ProviderArg::StraightLine => Ok(RouteProviderKind::StraightLine {
            step_km: DEFAULT_STRAIGHT_LINE_STEP_KM,
            road_category: cli.road,
        }),
        #[cfg(feature = "ors")]
        ProviderArg::Ors => Ok(RouteProviderKind::Ors {
            endpoint: cli.ors_endpoint.clone(),
            api_key: cli.ors_api_key.clone(),
        }),
        #[cfg(not(feature = "ors"))]
        ProviderArg::Ors => Err("built without the `ors` feature".to_string()),
        #[cfg(feature = "precomputed")]
        ProviderArg::Precomputed => cli
            .route_table
            .clone()
            .map(|path| RouteProviderKind::Precomputed { path })
            .ok_or_else(|| "--route-table is required for the precomputed provider".to_string()),
        #[cfg(not(feature = "precomputed"))]
        ProviderArg::Precomputed => Err("built without the `precomputed` feature".to_string()),
    }
}

fn build_geocoder(free_text: bool) -> Result<Box<dyn Geocoder>, String> {
    let mut geocoders: Vec<Box<dyn Geocoder>> = vec![Box::new(CatalogGeocoder)];
    if free_text {
        #[cfg(feature = "nominatim")]
        {
            use bsm_core::places::nominatim::{NominatimGeocoder, DEFAULT_ENDPOINT};
            let nominatim = NominatimGeocoder::new(DEFAULT_ENDPOINT).map_err(|err| err.to_string())?;
            geocoders.push(Box::new(nominatim));
        }
        #[cfg(not(feature = "nominatim"))]
        return Err("built without the `nominatim` feature".to_string());
    }
    Ok(Box::new(ChainGeocoder::new(geocoders)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["bsm_demo"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn flags_override_defaults() {
        let params = merge_params(&cli(&[
            "--from", "Salem", "--to", "Erode", "--speed", "75", "--adas", "lka, acc",
            "--laps", "1",
        ]))
        .expect("params");
        assert_eq!(params.source, "Salem");
        assert_eq!(params.destination, "Erode");
        assert_eq!(params.speed_kmph, 75.0);
        assert_eq!(params.active_adas_features, vec!["LKA", "ACC"]);
        assert_eq!(params.laps, 1);
    }

    #[test]
    fn straight_line_provider_uses_road_flag() {
        let params = merge_params(&cli(&["--provider", "straight-line", "--road", "residential"]))
            .expect("params");
        assert_eq!(
            params.provider,
            RouteProviderKind::StraightLine {
                step_km: DEFAULT_STRAIGHT_LINE_STEP_KM,
                road_category: RoadCategory::Residential,
            }
        );
    }

    #[test]
    fn speed_range_takes_two_values() {
        let params = merge_params(&cli(&["--speed-range", "10", "90", "--seed", "4"]))
            .expect("params");
        let variation = params.speed_variation.expect("variation");
        assert_eq!((variation.min_kmph, variation.max_kmph, variation.seed), (10.0, 90.0, Some(4)));
    }

    #[test]
    fn prints_only_on_change() {
        let geocoder = build_geocoder(false).expect("catalog geocoder");
        let from = geocoder.geocode("Coimbatore").expect("catalog");
        let to = geocoder.geocode("Tiruppur").expect("catalog");
        let route = Route::from_response(
            build_route_provider(&RouteProviderKind::default(), 1)
                .expect("provider")
                .route(from, to)
                .expect("route"),
        )
        .expect("route");
        let mut sim = RouteSimulator::with_system_clock(route, Default::default());
        let inputs = SimulationParams::default()
            .driver_inputs()
            .expect("inputs")
            .next_inputs();

        let first = sim.tick(&inputs);
        let second = sim.tick(&inputs);
        assert!(worth_printing(None, &first));
        assert!(!worth_printing(Some(&first), &second));
    }

    #[test]
    fn zero_speed_stops_before_any_route_fetch() {
        let result = run(cli(&["--speed", "0"]));
        assert!(result.is_err());
    }

    #[cfg(feature = "precomputed")]
    #[test]
    fn missing_route_table_stops_the_run() {
        let result = run(cli(&[
            "--provider",
            "precomputed",
            "--route-table",
            "/nonexistent/routes.json",
        ]));
        let message = result.expect_err("run without a route table");
        assert!(message.contains("failed to load route table"), "{message}");
    }

    #[cfg(feature = "precomputed")]
    #[test]
    fn route_missing_from_table_stops_the_run() {
        use bsm_core::routing::precomputed::PrecomputedRouteProvider;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("routes.json");
        let path = path.to_str().expect("utf-8 path");
        PrecomputedRouteProvider::save_to_file(&[], path).expect("save empty table");

        let result = run(cli(&[
            "--provider",
            "precomputed",
            "--route-table",
            path,
            "--from",
            "Coimbatore",
            "--to",
            "Chennai",
        ]));
        let message = result.expect_err("run without a matching route");
        assert!(message.contains("no route found"), "{message}");
    }
}
