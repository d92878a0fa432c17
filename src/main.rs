use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;

use swath_o_mat::config::{Config, OrbitConfig};
use swath_o_mat::geo::normalize_heading;
use swath_o_mat::orbit::{ground_track, propagate, OrbitSample};
use swath_o_mat::swath::{compute_corners, SwathGeometry};
use swath_o_mat::tracker::Tracker;
use swath_o_mat::web::{self, server::log_events};

#[derive(Parser)]
#[command(name = "swath-o-mat")]
#[command(about = "SAR swath geometry and realtime tracking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and print the derived swath range
    Validate { config: String },
    /// Print the propagated position, or a ground track
    Propagate {
        config: String,
        /// Seconds after the epoch (Kepler) or after now (TLE)
        #[arg(long, default_value_t = 0.0)]
        elapsed: f64,
        /// Ground track length, e.g. "90min"
        #[arg(long)]
        track: Option<String>,
        /// Ground track sample spacing
        #[arg(long, default_value = "60s")]
        step: String,
    },
    /// Print the swath footprint at a point
    Footprint {
        config: String,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
        #[arg(long, default_value_t = 0.0)]
        heading: f64,
    },
    /// Run a tracking session, then hand off the remaining pulses
    Track {
        config: String,
        #[arg(long, default_value = "10s")]
        duration: String,
    },
    /// Start the HTTP API
    Serve { config: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Propagate {
            config,
            elapsed,
            track,
            step,
        } => propagate_cmd(&config, elapsed, track.as_deref(), &step),
        Commands::Footprint {
            config,
            lat,
            lon,
            heading,
        } => footprint(&config, lat, lon, heading),
        Commands::Track { config, duration } => track(&config, &duration).await,
        Commands::Serve { config } => serve(&config).await,
    }
}

fn load(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Config error: {}", e);
            None
        }
    }
}

fn parse_duration(s: &str) -> Option<Duration> {
    match humantime::parse_duration(s.trim()) {
        Ok(d) => Some(d),
        Err(e) => {
            eprintln!("Invalid duration '{}': {}", s, e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    match config.swath_range() {
        Ok(range) => {
            println!("Config is valid");
            println!("  near range:     {:.1} m", range.near_range);
            println!("  far range:      {:.1} m", range.far_range);
            println!("  swath width:    {:.1} m", range.swath_width);
            println!("  azimuth length: {:.1} m", range.azimuth_length);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn propagate_cmd(path: &str, elapsed: f64, track: Option<&str>, step: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };

    let OrbitConfig::Kepler { elements, .. } = &config.orbit else {
        if track.is_some() {
            eprintln!("Ground tracks need a kepler orbit source");
            return ExitCode::FAILURE;
        }
        let source = match config.position_source() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Orbit error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        let t = chrono::Utc::now() + chrono::Duration::milliseconds((elapsed * 1000.0) as i64);
        return match source.position_at(t) {
            Some(p) => {
                println!(
                    "{}  lat {:.4}  lon {:.4}  alt {:.1} km",
                    t,
                    p.latitude_deg,
                    p.longitude_deg,
                    p.altitude_m / 1000.0
                );
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Propagation failed at {}", t);
                ExitCode::FAILURE
            }
        };
    };

    let samples = match track {
        None => vec![propagate(elements, elapsed)],
        Some(duration) => {
            let (Some(duration), Some(step)) = (parse_duration(duration), parse_duration(step))
            else {
                return ExitCode::FAILURE;
            };
            ground_track(elements, duration.as_secs_f64(), step.as_secs_f64())
        }
    };
    for sample in &samples {
        print_sample(sample);
    }
    ExitCode::SUCCESS
}

fn print_sample(sample: &OrbitSample) {
    let flag = if sample.converged { "" } else { "  (not converged)" };
    println!(
        "t={:>8.1}s  lat {:>9.4}  lon {:>9.4}  alt {:>8.1} km  nu {:>7.2}{}",
        sample.elapsed_seconds,
        sample.geodetic.latitude_deg,
        sample.geodetic.longitude_deg,
        sample.geodetic.altitude_m / 1000.0,
        sample.true_anomaly_deg,
        flag
    );
}

fn footprint(path: &str, lat: f64, lon: f64, heading: f64) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    let range = match config.swath_range() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let geometry = SwathGeometry {
        center_lat: lat,
        center_lon: lon,
        heading: normalize_heading(heading),
        near_range: range.near_range,
        far_range: range.far_range,
        swath_width: range.swath_width,
        azimuth_length: range.azimuth_length,
        satellite_altitude: None,
        look_angle: None,
    };

    match compute_corners(&geometry) {
        Ok(corners) => {
            println!(
                "near {:.1} m  far {:.1} m  width {:.1} m  azimuth {:.1} m",
                range.near_range, range.far_range, range.swath_width, range.azimuth_length
            );
            for (name, [lon, lat]) in ["top_left", "top_right", "bottom_right", "bottom_left"]
                .iter()
                .zip(corners.as_array())
            {
                println!("  {:<12} lat {:>9.4}  lon {:>9.4}", name, lat, lon);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Footprint error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn track(path: &str, duration: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    let Some(duration) = parse_duration(duration) else {
        return ExitCode::FAILURE;
    };
    let (source, range) = match (config.position_source(), config.swath_range()) {
        (Ok(s), Ok(r)) => (s, r),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (mut tracker, events) = Tracker::new(config.tracking.max_swaths, config.echo_backend());
    let logger = tokio::spawn(log_events(events));

    if let Err(e) = tracker
        .start(source, config.sar.clone(), range, config.tracking_options())
        .await
    {
        eprintln!("Tracking error: {}", e);
        return ExitCode::FAILURE;
    }
    tokio::time::sleep(duration).await;

    let status = tracker.status();
    let report = tracker.stop(true).await;
    println!(
        "Tracked {} swaths, {} batches processed, {} failed",
        status.swath_count, status.batches_processed, status.batches_failed
    );
    println!(
        "Final batch: {} pulses handed off, {} dropped",
        report.pulses_handed_off, report.pulses_dropped
    );

    drop(tracker);
    let _ = logger.await;

    match report.error {
        Some(e) => {
            eprintln!("Final batch failed: {}", e);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
