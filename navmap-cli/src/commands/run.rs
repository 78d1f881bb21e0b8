//! Run command - follow the sentence stream and keep the map image current.

use std::path::PathBuf;
use std::time::Duration;

use navmap::config::{config_directory, ConfigFile};
use navmap::fetch::{MapFetcher, ReqwestImageClient};
use navmap::nmea::NmeaDecoder;
use navmap::position::{FixedLocationSensor, SensorFix, SensorSession};
use navmap::session::{
    spawn_status_logger, FileImageSink, NavSession, NavSnapshot, SessionConfig, SessionEvent,
    EVENT_QUEUE_SIZE,
};
use navmap::transport::{endpoint_url, spawn_transport, TransportHandle};
use navmap::view::{DisplayGeometry, ResolutionMode, ViewParameters};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::console::{parse_line, ConsoleCommand, HELP};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Default file name of the displayed map image.
pub const DEFAULT_IMAGE_FILE_NAME: &str = "map.png";

/// Arguments for the run command.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub start: Option<bool>,
    pub debug: bool,
    pub output: Option<PathBuf>,
    pub sensor_lat: Option<f64>,
    pub sensor_lon: Option<f64>,
    pub sensor_heading: Option<f64>,
}

impl RunArgs {
    /// Reference fix for the location sensor, if coordinates were given.
    pub fn sensor_fix(&self) -> Result<Option<SensorFix>, CliError> {
        let (lat, lon) = match (self.sensor_lat, self.sensor_lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            (None, None) => return Ok(None),
            _ => {
                return Err(CliError::InvalidArgument(
                    "--sensor-lat and --sensor-lon must be given together".to_string(),
                ))
            }
        };
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(CliError::InvalidArgument(format!(
                "sensor coordinates out of range: {}, {}",
                lat, lon
            )));
        }

        let fix = SensorFix::new(lat, lon);
        Ok(Some(match self.sensor_heading {
            Some(heading) if !heading.is_finite() => {
                return Err(CliError::InvalidArgument(format!(
                    "invalid sensor heading: {}",
                    heading
                )))
            }
            Some(heading) => fix.with_heading(heading),
            None => fix,
        }))
    }

    fn has_connection_overrides(&self) -> bool {
        self.ip.is_some() || self.port.is_some() || self.start.is_some()
    }
}

/// Apply `--ip`, `--port` and `--start` to the loaded settings.
///
/// Returns true when anything was overridden.
pub fn apply_connection_overrides(config: &mut ConfigFile, args: &RunArgs) -> bool {
    if let Some(ip) = &args.ip {
        config.connection.ip = ip.trim().to_string();
    }
    if let Some(port) = args.port {
        config.connection.port = port;
    }
    if let Some(start) = args.start {
        config.connection.start = start;
    }
    args.has_connection_overrides()
}

/// Session tuning derived from the config file.
pub fn session_config(config: &ConfigFile) -> SessionConfig {
    SessionConfig {
        stale_guard: config.session.stale_guard,
        view: ViewParameters::new(
            config.map.zoom,
            config.map.map_type,
            config.map.image_type,
            config.map.resolution,
            config.map.flip,
        ),
        display: display_geometry(config),
        ..SessionConfig::default()
    }
}

/// The host display, with the window defaulting to the full screen.
fn display_geometry(config: &ConfigFile) -> DisplayGeometry {
    let display = &config.display;
    DisplayGeometry::new(display.width, display.height, display.pixel_ratio).with_inner(
        display.inner_width.unwrap_or(display.width),
        display.inner_height.unwrap_or(display.height),
    )
}

/// Copy the view the operator ended up with back into the settings.
///
/// Returns true when the map section changed.
pub fn persist_view(config: &mut ConfigFile, snapshot: &NavSnapshot) -> bool {
    let before = config.map.clone();

    config.map.zoom = snapshot.zoom;
    config.map.map_type = snapshot.map_type;
    config.map.image_type = snapshot.image_type;
    config.map.resolution = snapshot.resolution;
    // Auto mode forces the flip, so only a fixed resolution keeps the operator's choice
    if let (ResolutionMode::Fixed { .. }, Some(viewport)) = (snapshot.resolution, snapshot.viewport) {
        config.map.flip = viewport.flipped;
    }

    config.map != before
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let sensor_fix = args.sensor_fix()?;

    let mut runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("run");

    if apply_connection_overrides(runner.config_mut(), &args) {
        runner.config().save()?;
        info!(
            ip = %runner.config().connection.ip,
            port = runner.config().connection.port,
            start = runner.config().connection.start,
            "Connection overrides saved"
        );
    }
    // Validate before anything starts
    endpoint_url(&runner.config().connection.ip, runner.config().connection.port)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config_directory().join(DEFAULT_IMAGE_FILE_NAME));
    let fetcher = runner.create_fetcher()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Session(format!("failed to start runtime: {}", e)))?;

    let config = runner.config().clone();
    let outcome = runtime.block_on(run_session(config, fetcher, output, sensor_fix));

    // A pending stdin read would otherwise hold the runtime open
    runtime.shutdown_timeout(Duration::from_secs(1));

    let (mut config, snapshot) = outcome?;
    if persist_view(&mut config, &snapshot) {
        config.save()?;
        info!("Map view saved");
    }

    println!("{}", snapshot);
    info!("NavMap stopped");
    Ok(())
}

/// Drive a session until the operator stops it.
///
/// Returns the settings as changed from the console and the final snapshot.
async fn run_session(
    config: ConfigFile,
    fetcher: MapFetcher<ReqwestImageClient>,
    output: PathBuf,
    sensor_fix: Option<SensorFix>,
) -> Result<(ConfigFile, NavSnapshot), CliError> {
    let (events, receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
    let session = NavSession::new(
        session_config(&config),
        fetcher,
        FileImageSink::new(output.clone()),
        events.clone(),
    );
    let snapshots = session.subscribe();
    let cancellation = CancellationToken::new();

    println!("Map image: {}", output.display());
    info!(output = %output.display(), "Writing map images");

    let session_task = tokio::spawn(session.run(receiver, cancellation.clone()));
    let status_logger = spawn_status_logger(
        snapshots.clone(),
        cancellation.clone(),
        Duration::from_secs(config.session.status_interval_secs),
    );
    let transport = spawn_transport(NmeaDecoder, events.clone(), cancellation.child_token());

    let mut console = Console {
        config,
        events,
        transport,
        sensor: None,
        default_fix: sensor_fix,
        snapshots,
    };
    console.start().await?;
    console.serve().await;

    let Console {
        config,
        transport,
        sensor,
        snapshots,
        ..
    } = console;
    if let Some(sensor) = sensor {
        sensor.stop().await;
    }
    transport.shutdown().await;
    cancellation.cancel();
    if let Err(e) = status_logger.await {
        warn!(error = %e, "Status logger ended abnormally");
    }
    session_task
        .await
        .map_err(|e| CliError::Session(e.to_string()))?;

    let snapshot = snapshots.borrow().clone();
    Ok((config, snapshot))
}

/// Operator side of a running session.
struct Console {
    config: ConfigFile,
    events: mpsc::Sender<SessionEvent>,
    transport: TransportHandle,
    sensor: Option<SensorSession<SessionEvent>>,
    default_fix: Option<SensorFix>,
    snapshots: watch::Receiver<NavSnapshot>,
}

impl Console {
    /// Auto-connect and sensor activation from the startup settings.
    async fn start(&mut self) -> Result<(), CliError> {
        if self.config.connection.start {
            self.connect(None).await?;
        } else {
            println!("Not connected. Type 'connect' to open the sentence stream.");
        }
        if let Some(fix) = self.default_fix {
            self.sensor_on(fix);
        }
        Ok(())
    }

    /// Read console commands until quit, end of input or Ctrl+C.
    async fn serve(&mut self) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        println!("Type 'help' for commands, Ctrl+C to stop.");

        loop {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        warn!(error = %e, "Failed to listen for Ctrl+C");
                    }
                    info!("Shutdown requested");
                    break;
                }

                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => match parse_line(&line) {
                        Ok(Some(ConsoleCommand::Quit)) => break,
                        Ok(Some(command)) => self.execute(command).await,
                        Ok(None) => {}
                        Err(message) => println!("{}", message),
                    },
                    Ok(None) => {
                        info!("Console input closed; press Ctrl+C to stop");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read console input");
                        stdin_open = false;
                    }
                },
            }
        }
    }

    async fn execute(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::View(view) => {
                if self.events.send(view.into()).await.is_err() {
                    warn!("Session is no longer running");
                }
            }
            ConsoleCommand::Connect { endpoint } => {
                if let Err(e) = self.connect(endpoint).await {
                    println!("{}", e);
                }
            }
            ConsoleCommand::Disconnect => {
                if let Err(e) = self.transport.disconnect().await {
                    println!("{}", e);
                }
            }
            ConsoleCommand::SensorOn { fix } => match fix.or(self.default_fix) {
                Some(fix) => {
                    self.default_fix = Some(fix);
                    self.sensor_on(fix);
                }
                None => println!("No sensor position. Use 'sensor on LAT LON [HDG]'."),
            },
            ConsoleCommand::SensorOff => {
                if let Some(sensor) = self.sensor.take() {
                    sensor.stop().await;
                }
            }
            ConsoleCommand::Status => println!("{}", *self.snapshots.borrow()),
            ConsoleCommand::Log => {
                for line in &self.snapshots.borrow().raw_log {
                    println!("{}", line);
                }
            }
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => {}
        }
    }

    /// Connect to `endpoint`, or the configured one. A new endpoint is saved.
    async fn connect(&mut self, endpoint: Option<(String, u16)>) -> Result<(), CliError> {
        let (ip, port) = endpoint.unwrap_or_else(|| {
            (self.config.connection.ip.clone(), self.config.connection.port)
        });
        let url = endpoint_url(&ip, port)?;

        if ip != self.config.connection.ip || port != self.config.connection.port {
            self.config.connection.ip = ip;
            self.config.connection.port = port;
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save connection settings");
            }
        }

        self.transport.connect(url).await?;
        Ok(())
    }

    fn sensor_on(&mut self, fix: SensorFix) {
        if self.sensor.as_ref().is_some_and(|s| !s.is_finished()) {
            println!("Location sensor already active");
            return;
        }
        self.sensor = Some(SensorSession::start(
            FixedLocationSensor::new(fix),
            self.events.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navmap::view::{MapType, Viewport};

    #[test]
    fn test_overrides_apply_only_when_present() {
        let mut config = ConfigFile::default();
        assert!(!apply_connection_overrides(&mut config, &RunArgs::default()));
        assert_eq!(config, ConfigFile::default());

        let args = RunArgs {
            ip: Some(" 10.0.0.5 ".to_string()),
            start: Some(true),
            ..RunArgs::default()
        };
        assert!(apply_connection_overrides(&mut config, &args));
        assert_eq!(config.connection.ip, "10.0.0.5");
        assert_eq!(config.connection.port, 8080);
        assert!(config.connection.start);
    }

    #[test]
    fn test_sensor_fix_requires_both_coordinates() {
        let args = RunArgs {
            sensor_lat: Some(54.0),
            ..RunArgs::default()
        };
        assert!(matches!(args.sensor_fix(), Err(CliError::InvalidArgument(_))));

        let args = RunArgs {
            sensor_lat: Some(54.32),
            sensor_lon: Some(10.13),
            sensor_heading: Some(45.0),
            ..RunArgs::default()
        };
        assert_eq!(
            args.sensor_fix().unwrap(),
            Some(SensorFix::new(54.32, 10.13).with_heading(45.0))
        );
        assert_eq!(RunArgs::default().sensor_fix().unwrap(), None);

        let args = RunArgs {
            sensor_lat: Some(54.32),
            sensor_lon: Some(10.13),
            sensor_heading: Some(f64::NAN),
            ..RunArgs::default()
        };
        assert!(matches!(args.sensor_fix(), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_session_config_from_settings() {
        let mut config = ConfigFile::default();
        config.map.zoom = 13;
        config.map.flip = true;
        config.session.stale_guard = false;

        let session = session_config(&config);
        assert_eq!(session.view.zoom(), 13);
        assert!(session.view.flipped());
        assert!(!session.stale_guard);
        assert_eq!(session.display.width, config.display.width);
        assert_eq!(session.display.inner_height, config.display.height);
    }

    #[test]
    fn test_session_config_uses_window_size() {
        let mut config = ConfigFile::default();
        config.display.width = 1920;
        config.display.height = 1080;
        config.display.inner_width = Some(600);
        config.display.inner_height = Some(1000);

        let display = session_config(&config).display;
        assert_eq!((display.width, display.height), (1920, 1080));
        assert_eq!((display.inner_width, display.inner_height), (600, 1000));
        assert_eq!(display.orientation(), navmap::view::Orientation::Portrait);
    }

    #[test]
    fn test_persist_view_keeps_flip_in_auto_mode() {
        let mut config = ConfigFile::default();
        config.map.flip = false;

        let snapshot = NavSnapshot {
            zoom: 16,
            map_type: MapType::default(),
            resolution: ResolutionMode::Auto,
            viewport: Some(Viewport {
                width: 560,
                height: 1120,
                flipped: true,
                flip_locked: true,
            }),
            ..NavSnapshot::default()
        };

        assert!(persist_view(&mut config, &snapshot));
        assert_eq!(config.map.zoom, 16);
        assert_eq!(config.map.resolution, ResolutionMode::Auto);
        assert!(!config.map.flip);
        assert!(!persist_view(&mut config, &snapshot));
    }
}
