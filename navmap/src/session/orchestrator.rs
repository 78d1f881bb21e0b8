//! The navigation session.
//!
//! [`NavSession`] is the single owner of position, refresh and view state.
//! All inputs arrive as [`SessionEvent`]s on one queue and are handled one at
//! a time, so no state is shared between tasks. Image fetches run on their
//! own tasks and report back through the same queue.
//!
//! # Refresh paths
//!
//! - **Gated**: a position or heading change is checked against the
//!   [`RefreshGate`] by the [`RefreshPolicy`]
//! - **Direct**: view changes and the max-age timeout re-request the last
//!   displayed position and heading without consulting the policy
//!
//! The gate is only written when a fetched image is actually displayed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::event::{SessionEvent, ViewCommand};
use super::sink::ImageSink;
use super::snapshot::NavSnapshot;
use crate::fetch::{FetchError, ImageClient, MapFetcher, MapImage, MapRequest};
use crate::geo::Position;
use crate::position::{PositionState, ProvenanceSource, RefreshTrigger, SensorEvent};
use crate::refresh::{RefreshGate, RefreshPolicy, DEFAULT_POLL_INTERVAL};
use crate::traffic::TrafficMeter;
use crate::transport::{RawLineLog, TransportEvent};
use crate::view::{DisplayGeometry, ViewParameters};

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub policy: RefreshPolicy,
    /// How often the max-age timeout is checked
    pub poll_interval: Duration,
    /// Discard responses older than the newest displayed one
    pub stale_guard: bool,
    pub view: ViewParameters,
    pub display: DisplayGeometry,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: RefreshPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            stale_guard: true,
            view: ViewParameters::default(),
            display: DisplayGeometry::default(),
        }
    }
}

/// Single-task owner of the navigation state.
pub struct NavSession<C, S> {
    state: PositionState,
    gate: RefreshGate,
    policy: RefreshPolicy,
    view: ViewParameters,
    display: DisplayGeometry,
    traffic: TrafficMeter,
    raw_log: RawLineLog,
    connected: bool,
    fetcher: Arc<MapFetcher<C>>,
    sink: S,
    events: mpsc::Sender<SessionEvent>,
    poll_interval: Duration,
    stale_guard: bool,
    next_generation: u64,
    latest_applied: Option<u64>,
    in_flight: usize,
    images_shown: u64,
    fetch_failures: u64,
    snapshots: watch::Sender<NavSnapshot>,
}

impl<C, S> NavSession<C, S>
where
    C: ImageClient + 'static,
    S: ImageSink,
{
    /// Create a session whose fetch tasks report into `events`.
    ///
    /// `events` must feed the receiver later passed to [`NavSession::run`].
    pub fn new(
        config: SessionConfig,
        fetcher: MapFetcher<C>,
        sink: S,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let (snapshots, _) = watch::channel(NavSnapshot::default());
        let mut session = Self {
            state: PositionState::new(),
            gate: RefreshGate::new(),
            policy: config.policy,
            view: config.view,
            display: config.display,
            traffic: TrafficMeter::new(),
            raw_log: RawLineLog::new(),
            connected: false,
            fetcher: Arc::new(fetcher),
            sink,
            events,
            poll_interval: config.poll_interval,
            stale_guard: config.stale_guard,
            next_generation: 0,
            latest_applied: None,
            in_flight: 0,
            images_shown: 0,
            fetch_failures: 0,
            snapshots,
        };
        session.view.resolve(&session.display);
        session.publish();
        session
    }

    /// Receive a new [`NavSnapshot`] after every handled event.
    pub fn subscribe(&self) -> watch::Receiver<NavSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> NavSnapshot {
        let viewport = crate::view::resolve_viewport(
            self.view.resolution(),
            self.view.flipped(),
            &self.display,
        );
        NavSnapshot {
            position: self.state.snapshot(),
            connected: self.connected,
            traffic: self.traffic.summary(),
            zoom: self.view.zoom(),
            map_type: self.view.map_type(),
            image_type: self.view.image_type(),
            resolution: self.view.resolution(),
            viewport: Some(viewport),
            images_shown: self.images_shown,
            fetch_failures: self.fetch_failures,
            raw_log: self.raw_log.expanded(),
        }
    }

    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Fetches started but not yet reported back.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Process events until `cancellation` fires or every sender is gone.
    ///
    /// Returns the session so callers can inspect its final state.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        cancellation: CancellationToken,
    ) -> Self {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            zoom = self.view.zoom(),
            map_type = %self.view.map_type(),
            resolution = %self.view.resolution(),
            "Navigation session started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancellation.cancelled() => break,

                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },

                _ = ticker.tick() => self.handle(SessionEvent::RefreshTick).await,
            }
        }

        info!(
            images = self.images_shown,
            failures = self.fetch_failures,
            traffic = %self.traffic.summary(),
            "Navigation session stopped"
        );
        self
    }

    /// Handle one event now.
    pub async fn handle(&mut self, event: SessionEvent) {
        self.handle_at(event, Instant::now()).await;
    }

    /// Handle one event as if it arrived at `now`.
    ///
    /// Only a displayed image is awaited; every other event is handled
    /// without suspending.
    pub async fn handle_at(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::Transport(event) => self.on_transport(event),
            SessionEvent::Sensor(event) => self.on_sensor(event),
            SessionEvent::View(command) => self.on_view(command),
            SessionEvent::RefreshTick => {
                if self.policy.is_stale(&self.gate, now) {
                    debug!("Displayed map is outdated, refreshing");
                    self.refresh_direct();
                }
            }
            SessionEvent::FetchHeaders { bytes } => {
                let summary = self.traffic.record_at(bytes, now);
                debug!(bytes, traffic = %summary, "Map response size recorded");
            }
            SessionEvent::FetchFinished {
                generation,
                request,
                result,
            } => self.on_fetch_finished(generation, request, result, now).await,
        }
        self.publish();
    }

    fn on_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Sentence { raw, packet } => {
                self.raw_log.push(raw);
                if let Some(packet) = packet {
                    let outcome = self.state.update(ProvenanceSource::Stream, &packet);
                    if let Some(trigger) = outcome.trigger() {
                        self.refresh_gated(trigger);
                    }
                }
            }
            TransportEvent::Status { connected } => self.connected = connected,
            TransportEvent::Log(line) => self.raw_log.push(line),
        }
    }

    fn on_sensor(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Fix(fix) => {
                if let Some(trigger) = self.state.apply_sensor_fix(&fix).trigger() {
                    self.refresh_gated(trigger);
                }
            }
            SensorEvent::Failed(e) => {
                warn!(error = %e, "Location sensor unavailable, using sentence stream");
                self.state.sensor_failed();
            }
            SensorEvent::Deactivated => {
                info!("Location sensor off, using sentence stream");
                self.state.deactivate_sensor();
            }
        }
    }

    fn on_view(&mut self, command: ViewCommand) {
        let changed = match command {
            ViewCommand::ZoomIn => self.view.zoom_in(),
            ViewCommand::ZoomOut => self.view.zoom_out(),
            ViewCommand::SetMapType(map_type) => self.view.set_map_type(map_type),
            ViewCommand::SetImageType(image_type) => self.view.set_image_type(image_type),
            ViewCommand::SetResolution(resolution) => {
                let changed = self.view.set_resolution(resolution);
                self.view.resolve(&self.display);
                changed
            }
            ViewCommand::SetFlip(flipped) => self.view.set_flipped(flipped),
            ViewCommand::Resize(display) => {
                self.display = display;
                self.view.resolve(&self.display);
                self.view.resolution().is_auto()
            }
        };

        debug!(command = ?command, changed, "View command");
        if changed {
            self.refresh_direct();
        }
    }

    async fn on_fetch_finished(
        &mut self,
        generation: u64,
        request: MapRequest,
        result: Result<MapImage, FetchError>,
        now: Instant,
    ) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                self.fetch_failures += 1;
                warn!(
                    error = %e,
                    lat = request.position.latitude,
                    lon = request.position.longitude,
                    "Map image request failed, keeping current image"
                );
                return;
            }
        };

        if self.stale_guard && self.latest_applied.is_some_and(|latest| generation < latest) {
            debug!(generation, "Discarding response older than the displayed image");
            return;
        }

        if let Err(e) = self.sink.show(&image).await {
            self.fetch_failures += 1;
            warn!(error = %e, "Failed to display map image");
            return;
        }

        self.gate
            .record(image.request.position, image.request.heading, now);
        self.latest_applied = Some(generation);
        self.images_shown += 1;
    }

    fn refresh_gated(&mut self, trigger: RefreshTrigger) {
        let (position, heading) = self.gate.complete(&trigger);
        let decision = self
            .policy
            .evaluate(&self.gate, position, heading, self.view.zoom());
        if decision.should_fetch {
            self.start_fetch(decision.position, decision.heading);
        }
    }

    /// Re-request the last displayed position and heading.
    fn refresh_direct(&mut self) {
        let (Some(position), Some(heading)) = (self.gate.position(), self.gate.heading()) else {
            return;
        };
        self.start_fetch(position, heading);
    }

    fn start_fetch(&mut self, position: Position, heading: f64) {
        let viewport = self.view.resolve(&self.display);
        let request = MapRequest::new(
            position,
            heading,
            self.view.zoom(),
            self.view.map_type(),
            self.view.image_type(),
            &viewport,
        );

        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight += 1;

        let fetcher = Arc::clone(&self.fetcher);
        let events = self.events.clone();

        tokio::spawn(async move {
            let header_events = events.clone();
            // Queued ahead of FetchFinished: the body is read only after this send
            let result = fetcher
                .fetch(&request, move |bytes| async move {
                    let event = SessionEvent::FetchHeaders { bytes };
                    if header_events.send(event).await.is_err() {
                        debug!(generation, "Session gone before response size was recorded");
                    }
                })
                .await;

            let finished = SessionEvent::FetchFinished {
                generation,
                request,
                result,
            };
            if events.send(finished).await.is_err() {
                debug!(generation, "Session gone before fetch completed");
            }
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
