//! Location acquisition CLI command.
//!
//! `geofix locate` runs one acquisition session against the simulated
//! platform and prints every presentation event. Flags choose which
//! sources are switched on, how the permission prompt is answered, an
//! optional cached last-known fix and how many live samples to emit.

use std::time::Duration;

use clap::{Args, ValueEnum};
use geofix::config::ConfigFile;
use geofix::location::{
    CoordinatorConfig, CoordinatorHandle, CoordinatorState, LocationCoordinator, LocationEvent,
    PermissionResponse, PositionSample, PositionSource, SettingsLauncher, SimulatedPlatform,
    StartOutcome,
};
use geofix::logging::init_logging;
use tokio::sync::mpsc;

use crate::error::CliError;

/// Approximate length of one degree of latitude.
const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;

const GPS_ACCURACY_METERS: f64 = 5.0;
const NETWORK_ACCURACY_METERS: f64 = 150.0;

/// How the simulated user handles location permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PermissionMode {
    /// Permission already held, no prompt is shown
    Granted,
    /// Prompt is shown and both capabilities are granted
    Grant,
    /// Prompt is shown and denied
    Deny,
    /// Prompt is dismissed without an answer
    Dismiss,
}

impl PermissionMode {
    /// Answer given to the prompt, if one is expected.
    fn prompt_response(self) -> Option<PermissionResponse> {
        match self {
            PermissionMode::Granted => None,
            PermissionMode::Grant => Some(PermissionResponse::granted()),
            PermissionMode::Deny => Some(PermissionResponse::denied()),
            PermissionMode::Dismiss => Some(PermissionResponse::Dismissed),
        }
    }
}

/// Source selection for CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Satellite positioning (precise)
    Gps,
    /// Network positioning (approximate)
    Network,
}

impl From<SourceArg> for PositionSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Gps => PositionSource::Precise,
            SourceArg::Network => PositionSource::Approximate,
        }
    }
}

/// Arguments for `geofix locate`.
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Switch off the GPS source
    #[arg(long)]
    pub no_gps: bool,

    /// Switch off the network source
    #[arg(long)]
    pub no_network: bool,

    /// How location permission is handled
    #[arg(long, value_enum, default_value = "granted")]
    pub permission: PermissionMode,

    /// Latitude of a cached last-known fix
    #[arg(long, requires = "last_lon", allow_hyphen_values = true)]
    pub last_lat: Option<f64>,

    /// Longitude of a cached last-known fix
    #[arg(long, requires = "last_lat", allow_hyphen_values = true)]
    pub last_lon: Option<f64>,

    /// Source that produced the cached fix
    #[arg(long, value_enum, default_value = "network")]
    pub last_source: SourceArg,

    /// Accuracy of the cached fix, in meters
    #[arg(long, default_value = "100")]
    pub last_accuracy: f64,

    /// Number of live samples to emit (alternating GPS and network)
    #[arg(long, default_value = "3")]
    pub samples: usize,

    /// Starting latitude of the live samples
    #[arg(long, default_value = "53.6303", allow_hyphen_values = true)]
    pub lat: f64,

    /// Starting longitude of the live samples
    #[arg(long, default_value = "9.9883", allow_hyphen_values = true)]
    pub lon: f64,

    /// Distance walked north between live samples, in meters
    #[arg(long, default_value = "25")]
    pub step: f64,

    /// Pause between live samples, in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,

    /// Open location settings when every source is disabled
    #[arg(long)]
    pub open_settings: bool,

    /// Mirror log output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Prints instead of opening a real settings screen.
struct ConsoleSettingsLauncher;

impl SettingsLauncher for ConsoleSettingsLauncher {
    fn open_location_settings(&mut self) {
        println!("Opening location settings...");
        println!("(simulated platform: rerun without --no-gps/--no-network)");
        println!();
    }
}

/// Run `geofix locate`.
pub fn run(args: LocateArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let logging = init_logging(&config.logging.directory, &config.logging.file, args.verbose)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    tracing::info!(
        version = geofix::VERSION,
        log_file = %logging.log_path().display(),
        "geofix locate starting"
    );

    let platform = build_platform(&args);
    let coordinator_config = CoordinatorConfig::from(&config);

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    runtime.block_on(run_session(&args, platform, coordinator_config))
}

/// Configure the simulated platform from the command line.
fn build_platform(args: &LocateArgs) -> SimulatedPlatform {
    let platform = SimulatedPlatform::new();
    platform.set_enabled(PositionSource::Precise, !args.no_gps);
    platform.set_enabled(PositionSource::Approximate, !args.no_network);

    if args.permission == PermissionMode::Granted {
        platform.grant_all();
    }

    if let (Some(lat), Some(lon)) = (args.last_lat, args.last_lon) {
        platform.set_last_known(PositionSample::observed_now(
            args.last_source.into(),
            lat,
            lon,
            args.last_accuracy,
        ));
    }

    platform
}

/// The `index`-th live sample: alternating sources, walking north.
fn live_sample(args: &LocateArgs, index: usize) -> PositionSample {
    let (source, accuracy) = if index % 2 == 0 {
        (PositionSource::Precise, GPS_ACCURACY_METERS)
    } else {
        (PositionSource::Approximate, NETWORK_ACCURACY_METERS)
    };
    let latitude = args.lat + (index as f64 * args.step) / METERS_PER_DEGREE_LATITUDE;
    PositionSample::observed_now(source, latitude, args.lon, accuracy)
}

async fn run_session(
    args: &LocateArgs,
    platform: SimulatedPlatform,
    config: CoordinatorConfig,
) -> Result<(), CliError> {
    let (tx, mut events) = mpsc::unbounded_channel();
    let (coordinator, platform_events) = LocationCoordinator::new(platform.clone(), tx, config);
    let coordinator = coordinator.with_settings_launcher(Box::new(ConsoleSettingsLauncher));
    let (handle, task) = coordinator.spawn(platform_events);

    let result = drive(args, &platform, &handle, &mut events).await;

    handle.shutdown();
    if let Err(error) = task.await {
        tracing::warn!(%error, "Coordinator task failed");
    }
    print_events(&mut events);

    result
}

async fn drive(
    args: &LocateArgs,
    platform: &SimulatedPlatform,
    handle: &CoordinatorHandle,
    events: &mut mpsc::UnboundedReceiver<LocationEvent>,
) -> Result<(), CliError> {
    let outcome = handle.start().await?;
    tracing::info!(?outcome, "Acquisition started");
    flush(handle, events).await?;

    match outcome {
        StartOutcome::AllSourcesDisabled => {
            if args.open_settings {
                handle.open_location_settings().await?;
            }
            return Ok(());
        }
        StartOutcome::AuthorizationDenied | StartOutcome::SubscriptionFailed => return Ok(()),
        StartOutcome::AwaitingAuthorization => {
            if let Some(response) = args.permission.prompt_response() {
                platform.respond_to_prompt(response);
            }
            flush(handle, events).await?;
        }
        StartOutcome::Acquiring => {}
    }

    if handle.status().await?.state != CoordinatorState::Acquiring {
        return Ok(());
    }

    for index in 0..args.samples {
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }
        let delivered = platform.emit(live_sample(args, index));
        tracing::debug!(index, delivered, "Emitted live sample");
        flush(handle, events).await?;
    }

    let status = handle.status().await?;
    match status.current.sample() {
        Some(sample) => println!(
            "Final fix from {} observed at {}",
            sample.source().provider_name(),
            sample.observed_at().format("%H:%M:%S%.3f")
        ),
        None => println!("No location acquired."),
    }

    handle.stop().await?;
    Ok(())
}

/// Wait for the coordinator to catch up, then print what it presented.
async fn flush(
    handle: &CoordinatorHandle,
    events: &mut mpsc::UnboundedReceiver<LocationEvent>,
) -> Result<(), CliError> {
    handle.status().await?;
    print_events(events);
    Ok(())
}

fn print_events(events: &mut mpsc::UnboundedReceiver<LocationEvent>) {
    while let Ok(event) = events.try_recv() {
        println!("{}", event);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use geofix::location::LocationPlatform;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: LocateArgs,
    }

    fn parse(argv: &[&str]) -> LocateArgs {
        let mut full = vec!["locate"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert!(!args.no_gps);
        assert!(!args.no_network);
        assert_eq!(args.permission, PermissionMode::Granted);
        assert_eq!(args.samples, 3);
        assert!(args.last_lat.is_none());
    }

    #[test]
    fn test_last_known_requires_both_coordinates() {
        let mut argv = vec!["locate", "--last-lat", "10.0"];
        assert!(TestCli::try_parse_from(&argv).is_err());

        argv.extend_from_slice(&["--last-lon", "-20.5"]);
        let args = TestCli::try_parse_from(&argv).unwrap().args;
        assert_eq!(args.last_lon, Some(-20.5));
    }

    #[test]
    fn test_build_platform() {
        let args = parse(&[
            "--no-gps",
            "--permission",
            "deny",
            "--last-lat",
            "43.6",
            "--last-lon",
            "1.4",
        ]);
        let platform = build_platform(&args);

        assert!(!platform.is_enabled(PositionSource::Precise));
        assert!(platform.is_enabled(PositionSource::Approximate));
        assert!(platform
            .last_known(PositionSource::Approximate)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_permission_responses() {
        assert_eq!(PermissionMode::Granted.prompt_response(), None);
        assert_eq!(
            PermissionMode::Grant.prompt_response(),
            Some(PermissionResponse::granted())
        );
        assert_eq!(
            PermissionMode::Dismiss.prompt_response(),
            Some(PermissionResponse::Dismissed)
        );
    }

    #[test]
    fn test_live_samples_alternate_and_walk_north() {
        let args = parse(&["--lat", "0", "--lon", "0", "--step", "111320"]);

        let first = live_sample(&args, 0);
        let second = live_sample(&args, 1);

        assert_eq!(first.source(), PositionSource::Precise);
        assert_eq!(second.source(), PositionSource::Approximate);
        assert!((second.latitude() - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_session_runs_to_completion() {
        let args = parse(&["--samples", "2", "--interval-ms", "0"]);
        let platform = build_platform(&args);

        run_session(&args, platform.clone(), CoordinatorConfig::default())
            .await
            .unwrap();

        assert_eq!(platform.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_session_with_prompt() {
        let args = parse(&["--permission", "grant", "--samples", "1"]);
        let platform = build_platform(&args);

        run_session(&args, platform.clone(), CoordinatorConfig::default())
            .await
            .unwrap();

        assert_eq!(platform.prompt_count(), 1);
    }
}
