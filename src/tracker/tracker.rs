use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use super::error::TrackerError;
use super::types::{
    BatchTrigger, SessionId, StopReport, TrackerEvent, TrackerMode, TrackerStatus,
    TrackingOptions, AUTO_PROCESS_THRESHOLD,
};
use crate::backend::{EchoBackend, EchoRequest, EchoSatelliteState};
use crate::geo::normalize_heading;
use crate::orbit::PositionSource;
use crate::pulse::{
    targets_for, Pulse, PulseBatch, PulseBatchAccumulator, SatelliteState, TargetGridOptions,
};
use crate::radar::{SarConfig, SwathRange};
use crate::swath::{
    GroupId, SwathCatalog, SwathGeometry, SwathId, SwathInstance, SwathListener,
};

struct Session {
    id: SessionId,
    group: GroupId,
    sar: SarConfig,
    grid: TargetGridOptions,
    /// Oldest pulses owned by the outstanding hand-off.
    in_flight: Option<usize>,
}

struct Shared {
    catalog: SwathCatalog,
    pulses: PulseBatchAccumulator,
    mode: TrackerMode,
    session: Option<Session>,
    batches_processed: u64,
    batches_failed: u64,
    last_state: Option<SatelliteState>,
}

struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Everything a tracking worker needs besides the shared state.
#[derive(Clone)]
struct SessionContext {
    id: SessionId,
    source: Arc<dyn PositionSource>,
    sar: SarConfig,
    range: SwathRange,
    options: TrackingOptions,
    clock: SessionClock,
    shared: Arc<StdMutex<Shared>>,
    backend: Option<Arc<dyn EchoBackend>>,
    events: mpsc::UnboundedSender<TrackerEvent>,
}

/// Wall-clock start plus runtime-measured elapsed time.
#[derive(Debug, Clone, Copy)]
struct SessionClock {
    wall: DateTime<Utc>,
    instant: Instant,
}

impl SessionClock {
    fn start() -> Self {
        Self {
            wall: Utc::now(),
            instant: Instant::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.instant.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall + elapsed
    }
}

/// A batch that has been peeked from the queue and marked in flight.
struct HandOff {
    session: SessionId,
    count: usize,
    request: EchoRequest,
}

enum TickOutcome {
    Continue,
    HandOff(HandOff),
    AutoStop(Option<HandOff>),
    Stop,
}

/// Forwards registry changes onto the tracker's event channel.
struct ChannelListener(mpsc::UnboundedSender<TrackerEvent>);

impl SwathListener for ChannelListener {
    fn swath_added(&self, swath: &SwathInstance) {
        let _ = self.0.send(TrackerEvent::SwathAdded(swath.clone()));
    }

    fn swaths_removed(&self, ids: &[SwathId]) {
        let _ = self.0.send(TrackerEvent::SwathsRemoved(ids.to_vec()));
    }
}

pub struct Tracker {
    shared: Arc<StdMutex<Shared>>,
    backend: Option<Arc<dyn EchoBackend>>,
    events: mpsc::UnboundedSender<TrackerEvent>,
    worker: Option<WorkerHandle>,
}

impl Tracker {
    pub fn new(
        max_swaths: usize,
        backend: Option<Arc<dyn EchoBackend>>,
    ) -> (Self, mpsc::UnboundedReceiver<TrackerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let catalog = SwathCatalog::new(max_swaths, Box::new(ChannelListener(events.clone())));
        let tracker = Self {
            shared: Arc::new(StdMutex::new(Shared {
                catalog,
                pulses: PulseBatchAccumulator::new(),
                mode: TrackerMode::Idle,
                session: None,
                batches_processed: 0,
                batches_failed: 0,
                last_state: None,
            })),
            backend,
            events,
            worker: None,
        };
        (tracker, rx)
    }

    pub fn status(&self) -> TrackerStatus {
        let locked = lock(&self.shared);
        TrackerStatus {
            mode: locked.mode.clone(),
            pulse_count: locked.pulses.len(),
            swath_count: locked.catalog.registry().count(),
            batches_processed: locked.batches_processed,
            batches_failed: locked.batches_failed,
            hand_off_in_flight: locked
                .session
                .as_ref()
                .is_some_and(|s| s.in_flight.is_some()),
            last_state: locked.last_state,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(lock(&self.shared).mode, TrackerMode::Tracking { .. })
    }

    /// Runs `f` against the swath catalog under the tracker lock.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&mut SwathCatalog) -> R) -> R {
        f(&mut lock(&self.shared).catalog)
    }

    /// Starts a tracking session, stopping any running one first.
    pub async fn start(
        &mut self,
        source: Arc<dyn PositionSource>,
        sar: SarConfig,
        range: SwathRange,
        options: TrackingOptions,
    ) -> Result<TrackerMode, TrackerError> {
        range.validate()?;
        validate_options(&options, &sar, self.backend.is_some())?;

        if self.worker.is_some() || self.is_tracking() {
            log::info!("tracking already running, restarting");
            self.stop(false).await;
        }

        let clock = SessionClock::start();
        let session_id = Uuid::new_v4();
        let mode = {
            let mut locked = lock(&self.shared);
            let group = locked.catalog.groups_mut().start_realtime_group(clock.now());
            locked.session = Some(Session {
                id: session_id,
                group: group.clone(),
                sar: sar.clone(),
                grid: options.target_grid,
                in_flight: None,
            });
            locked.mode = TrackerMode::Tracking {
                session: session_id,
                group,
                started: clock.wall,
            };
            locked.mode.clone()
        };

        let ctx = SessionContext {
            id: session_id,
            source,
            sar,
            range,
            options,
            clock,
            shared: self.shared.clone(),
            backend: self.backend.clone(),
            events: self.events.clone(),
        };
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_session(ctx, stop_rx));
        self.worker = Some(WorkerHandle { stop_tx, join });

        log::info!("tracking session {} started", session_id);
        Ok(mode)
    }

    /// Stops ticking and tears the session down. With `process_remaining`
    /// the queued pulses not already in flight go out as one final batch.
    pub async fn stop(&mut self, process_remaining: bool) -> StopReport {
        self.halt(process_remaining).await.submit().await
    }

    /// Ends the session without waiting on the backend. The returned
    /// final batch is submitted separately, so callers can release any
    /// outer lock first.
    pub async fn halt(&mut self, process_remaining: bool) -> FinalBatch {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
        }

        let mut locked = lock(&self.shared);
        let Some(session) = locked.session.take() else {
            return FinalBatch::empty();
        };

        // The outstanding hand-off owns its prefix; its result is discarded.
        if let Some(n) = session.in_flight {
            locked.pulses.clear_batch(n);
        }
        let remaining = locked.pulses.len();
        let batch = if process_remaining {
            locked.pulses.take_batch(remaining)
        } else {
            PulseBatch::default()
        };

        locked.catalog.groups_mut().end_realtime_group(Utc::now());
        locked.pulses.clear_pulses();
        locked.mode = TrackerMode::Idle;
        log::info!("tracking session {} stopped", session.id);

        let mut report = StopReport {
            pulses_dropped: remaining,
            ..StopReport::default()
        };
        let (Some(backend), Some(merged)) = (self.backend.clone(), batch.merged) else {
            if !batch.is_empty() {
                log::warn!("no echo backend configured, dropping {} pulses", batch.len());
            }
            return FinalBatch {
                report,
                job: None,
            };
        };

        report.pulses_handed_off = batch.len();
        report.pulses_dropped = remaining - batch.len();
        FinalBatch {
            report,
            job: Some(FinalJob {
                session: session.id,
                pulses: batch.len(),
                request: build_request(&batch.pulses, &merged, &session.sar, &session.grid),
                backend,
                shared: self.shared.clone(),
                events: self.events.clone(),
            }),
        }
    }
}

/// Leftover pulses of a stopped session, not yet sent.
pub struct FinalBatch {
    report: StopReport,
    job: Option<FinalJob>,
}

struct FinalJob {
    session: SessionId,
    pulses: usize,
    request: EchoRequest,
    backend: Arc<dyn EchoBackend>,
    shared: Arc<StdMutex<Shared>>,
    events: mpsc::UnboundedSender<TrackerEvent>,
}

impl FinalBatch {
    fn empty() -> Self {
        Self {
            report: StopReport::default(),
            job: None,
        }
    }

    pub async fn submit(self) -> StopReport {
        let mut report = self.report;
        let Some(job) = self.job else {
            return report;
        };
        match job.backend.simulate(job.request).await {
            Ok(response) => {
                lock(&job.shared).batches_processed += 1;
                let _ = job.events.send(TrackerEvent::BatchProcessed {
                    session: job.session,
                    pulses: job.pulses,
                    response: response.clone(),
                });
                report.response = Some(response);
            }
            Err(err) => {
                log::error!("final batch hand-off failed: {}", err);
                lock(&job.shared).batches_failed += 1;
                let _ = job.events.send(TrackerEvent::BatchFailed {
                    session: job.session,
                    pulses: job.pulses,
                    error: err.to_string(),
                });
                report.error = Some(err.to_string());
            }
        }
        report
    }
}

fn lock(shared: &StdMutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validate_options(
    options: &TrackingOptions,
    sar: &SarConfig,
    has_backend: bool,
) -> Result<(), TrackerError> {
    if options.update_interval.is_zero() {
        return Err(TrackerError::InvalidInterval);
    }
    if let Some(trigger) = options.batch {
        if trigger.batch_size(sar.prf) == 0 {
            return Err(TrackerError::InvalidBatch(format!(
                "{:?} yields an empty batch at prf {}",
                trigger, sar.prf
            )));
        }
    }
    if (options.auto_process || options.batch.is_some()) && !has_backend {
        return Err(TrackerError::BackendRequired);
    }
    Ok(())
}

async fn run_session(ctx: SessionContext, mut stop_rx: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(ctx.options.update_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            return;
        }

        match tick(&ctx, ctx.clock.now()) {
            TickOutcome::Continue => {}
            TickOutcome::HandOff(job) => {
                tokio::spawn(hand_off(ctx.clone(), job));
            }
            TickOutcome::AutoStop(job) => {
                if let Some(job) = job {
                    hand_off(ctx.clone(), job).await;
                }
                finish_auto_stop(&ctx);
                return;
            }
            TickOutcome::Stop => return,
        }
    }
}

fn tick(ctx: &SessionContext, now: DateTime<Utc>) -> TickOutcome {
    // Source queries stay outside the lock.
    let (Some(position), Some(raw_heading), Some(velocity)) = (
        ctx.source.position_at(now),
        ctx.source.heading_at(now),
        ctx.source.velocity_at(now),
    ) else {
        log::debug!("no satellite state at {}, skipping tick", now);
        return TickOutcome::Continue;
    };
    let heading = normalize_heading(raw_heading + ctx.options.heading_offset_deg);
    let state = SatelliteState {
        geodetic: position,
        position: position.to_ecef(),
        velocity,
        heading,
        timestamp: now,
    };
    let geometry = SwathGeometry::at(&position, heading, &ctx.range);

    let mut locked = lock(&ctx.shared);
    let group = match &locked.session {
        Some(session) if session.id == ctx.id => session.group.clone(),
        _ => return TickOutcome::Stop,
    };

    let swath = match locked.catalog.add_tracked(&group, geometry, now) {
        Ok(swath) => swath,
        Err(err) => {
            log::warn!("dropping tick at {}: {}", now, err);
            return TickOutcome::Continue;
        }
    };
    let pulse_id = locked.pulses.add_pulse(swath.id.clone(), geometry, state);
    locked.last_state = Some(state);
    let _ = ctx.events.send(TrackerEvent::PulseAdded {
        pulse_id,
        swath_id: swath.id,
    });

    if locked
        .session
        .as_ref()
        .is_some_and(|s| s.in_flight.is_some())
    {
        return TickOutcome::Continue;
    }

    if ctx.options.auto_process && locked.pulses.len() >= AUTO_PROCESS_THRESHOLD {
        let count = locked.pulses.len();
        log::info!("{} pulses queued, handing off and stopping", count);
        return TickOutcome::AutoStop(prepare_hand_off(&mut locked, ctx, count));
    }

    if let Some(trigger) = ctx.options.batch {
        if batch_ready(&locked.pulses, trigger, ctx.sar.prf) {
            let count = trigger.batch_size(ctx.sar.prf);
            if let Some(job) = prepare_hand_off(&mut locked, ctx, count) {
                return TickOutcome::HandOff(job);
            }
        }
    }

    TickOutcome::Continue
}

fn batch_ready(pulses: &PulseBatchAccumulator, trigger: BatchTrigger, prf: f64) -> bool {
    match trigger {
        BatchTrigger::Count(n) => pulses.is_batch_ready(n),
        BatchTrigger::Time(seconds) => pulses.is_batch_ready_by_time(prf, seconds),
    }
}

/// Peeks the oldest `count` pulses and marks them in flight.
fn prepare_hand_off(locked: &mut Shared, ctx: &SessionContext, count: usize) -> Option<HandOff> {
    let merged = locked.pulses.merged_geometry(count)?;
    let pulses = locked.pulses.get_pulse_batch(count);
    let session = locked.session.as_mut()?;
    session.in_flight = Some(pulses.len());

    Some(HandOff {
        session: ctx.id,
        count: pulses.len(),
        request: build_request(&pulses, &merged, &ctx.sar, &ctx.options.target_grid),
    })
}

fn build_request(
    pulses: &[Pulse],
    merged: &SwathGeometry,
    sar: &SarConfig,
    grid: &TargetGridOptions,
) -> EchoRequest {
    let window = pulses.first().map(|p| (p.state.position, sar));
    EchoRequest {
        targets: targets_for(merged, grid, window),
        satellite_states: pulses
            .iter()
            .map(|p| EchoSatelliteState::from(&p.state))
            .collect(),
        config: sar.clone(),
    }
}

async fn hand_off(ctx: SessionContext, job: HandOff) {
    let Some(backend) = ctx.backend.clone() else {
        return;
    };
    let result = backend.simulate(job.request).await;

    let mut locked = lock(&ctx.shared);
    let current = locked.session.as_ref().is_some_and(|s| s.id == job.session);
    if !current {
        log::info!(
            "discarding late result for session {} ({} pulses)",
            job.session,
            job.count
        );
        return;
    }
    if let Some(session) = locked.session.as_mut() {
        session.in_flight = None;
    }

    match result {
        Ok(response) => {
            locked.pulses.clear_batch(job.count);
            locked.batches_processed += 1;
            let _ = ctx.events.send(TrackerEvent::BatchProcessed {
                session: job.session,
                pulses: job.count,
                response,
            });
        }
        Err(err) => {
            log::error!("batch hand-off of {} pulses failed: {}", job.count, err);
            locked.batches_failed += 1;
            let _ = ctx.events.send(TrackerEvent::BatchFailed {
                session: job.session,
                pulses: job.count,
                error: err.to_string(),
            });
        }
    }
}

fn finish_auto_stop(ctx: &SessionContext) {
    let mut locked = lock(&ctx.shared);
    if !locked.session.as_ref().is_some_and(|s| s.id == ctx.id) {
        return;
    }
    locked.session = None;
    locked.catalog.groups_mut().end_realtime_group(ctx.clock.now());
    locked.pulses.clear_pulses();
    locked.mode = TrackerMode::Idle;
    let _ = ctx.events.send(TrackerEvent::AutoStopped { session: ctx.id });
    log::info!("tracking session {} auto-stopped", ctx.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, BackendFuture, EchoResponse};
    use crate::geo::GeodeticPosition;
    use crate::orbit::{Anomaly, KeplerSource, OrbitalElements};
    use crate::radar::{compute_swath_range, RadarError, RangeModel};
    use crate::swath::SwathError;
    use std::time::Duration;

    /// Records every request; optionally slow or failing.
    #[derive(Default)]
    struct MockBackend {
        delay: Option<Duration>,
        fail: bool,
        requests: StdMutex<Vec<EchoRequest>>,
    }

    impl MockBackend {
        fn requests(&self) -> Vec<EchoRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl EchoBackend for MockBackend {
        fn simulate(&self, request: EchoRequest) -> BackendFuture<'_> {
            Box::pin(async move {
                let pulses = request.satellite_states.len() as u64;
                self.requests.lock().unwrap().push(request);
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                if self.fail {
                    return Err(BackendError::Rejected("simulator offline".into()));
                }
                Ok(EchoResponse {
                    num_samples: 4096,
                    shape: vec![pulses, 4096],
                    extra: Default::default(),
                })
            })
        }
    }

    struct Nowhere;

    impl PositionSource for Nowhere {
        fn position_at(&self, _t: DateTime<Utc>) -> Option<GeodeticPosition> {
            None
        }
    }

    /// Position and heading known, velocity not.
    struct Frozen;

    impl PositionSource for Frozen {
        fn position_at(&self, _t: DateTime<Utc>) -> Option<GeodeticPosition> {
            Some(GeodeticPosition {
                longitude_deg: 20.0,
                latitude_deg: 10.0,
                altitude_m: 561_000.0,
            })
        }

        fn heading_at(&self, _t: DateTime<Utc>) -> Option<f64> {
            Some(0.0)
        }

        fn velocity_at(&self, _t: DateTime<Utc>) -> Option<[f64; 3]> {
            None
        }
    }

    fn orbit() -> Arc<dyn PositionSource> {
        let elements =
            OrbitalElements::new(6970.1, 0.0001, 97.74, 0.0, 0.0, Anomaly::Mean(0.0)).unwrap();
        Arc::new(KeplerSource::new(elements, Utc::now()))
    }

    fn sar() -> SarConfig {
        SarConfig::c5()
    }

    fn range() -> SwathRange {
        compute_swath_range(&sar(), RangeModel::default()).unwrap()
    }

    fn batched(n: usize) -> TrackingOptions {
        TrackingOptions {
            batch: Some(BatchTrigger::Count(n)),
            ..TrackingOptions::default()
        }
    }

    fn tracker_with(backend: Option<Arc<MockBackend>>) -> Tracker {
        let backend = backend.map(|b| b as Arc<dyn EchoBackend>);
        Tracker::new(50, backend).0
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn one_swath_and_pulse_per_tick() {
        let mut tracker = tracker_with(None);
        let mode = tracker
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        let TrackerMode::Tracking { group, .. } = mode else {
            panic!("expected tracking mode");
        };

        // Ticks at 0, 200, ..., 1000 ms.
        advance(1100).await;
        let status = tracker.status();
        assert_eq!(status.pulse_count, 6);
        assert_eq!(status.swath_count, 6);
        assert!(status.last_state.is_some());

        let members = tracker.with_catalog(|c| c.groups().get(&group).unwrap().swath_ids.len());
        assert_eq!(members, 6);

        tracker.stop(false).await;
        assert!(tracker.with_catalog(|c| !c.groups().get(&group).unwrap().is_open()));
    }

    #[tokio::test(start_paused = true)]
    async fn heading_offset_is_applied() {
        let mut plain = tracker_with(None);
        plain
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        let mut offset = tracker_with(None);
        let options = TrackingOptions {
            heading_offset_deg: 90.0,
            ..TrackingOptions::default()
        };
        offset.start(orbit(), sar(), range(), options).await.unwrap();

        advance(100).await;
        let a = plain.status().last_state.unwrap().heading;
        let b = offset.status().last_state.unwrap().heading;
        let diff = (b - a).rem_euclid(360.0);
        assert!((diff - 90.0).abs() < 1e-3, "{a} -> {b}");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_position_skips_tick() {
        let mut tracker = tracker_with(None);
        tracker
            .start(Arc::new(Nowhere), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        advance(1100).await;

        let status = tracker.status();
        assert_eq!(status.pulse_count, 0);
        assert_eq!(status.swath_count, 0);
        assert!(tracker.is_tracking());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_velocity_skips_tick() {
        let mut tracker = tracker_with(None);
        tracker
            .start(Arc::new(Frozen), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        advance(1100).await;

        let status = tracker.status();
        assert_eq!(status.pulse_count, 0);
        assert_eq!(status.swath_count, 0);
        assert!(status.last_state.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_group_survives_removal_attempt() {
        let mut tracker = tracker_with(None);
        let mode = tracker
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        let TrackerMode::Tracking { group, .. } = mode else {
            panic!("expected tracking mode");
        };
        advance(500).await;

        assert!(matches!(
            tracker.with_catalog(|catalog| catalog.remove_group(&group)),
            Err(SwathError::GroupInUse(_))
        ));
        let before = tracker.status().pulse_count;
        advance(1000).await;
        assert!(tracker.status().pulse_count > before);

        tracker.stop(false).await;
        assert!(tracker
            .with_catalog(|catalog| catalog.remove_group(&group))
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn auto_process_hands_off_and_stops() {
        let backend = Arc::new(MockBackend::default());
        let (mut tracker, mut events) =
            Tracker::new(50, Some(backend.clone() as Arc<dyn EchoBackend>));
        let options = TrackingOptions {
            auto_process: true,
            ..TrackingOptions::default()
        };
        let mode = tracker.start(orbit(), sar(), range(), options).await.unwrap();
        let TrackerMode::Tracking { session, .. } = mode else {
            panic!("expected tracking mode");
        };

        advance(25_000).await;
        let status = tracker.status();
        assert_eq!(status.mode, TrackerMode::Idle);
        assert_eq!(status.pulse_count, 0);
        assert_eq!(status.batches_processed, 1);
        assert!(tracker.with_catalog(|c| c.groups().current_realtime_group().is_none()));

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].satellite_states.len(), AUTO_PROCESS_THRESHOLD);
        assert!(!requests[0].targets.is_empty());

        let mut auto_stopped = false;
        while let Ok(event) = events.try_recv() {
            if let TrackerEvent::AutoStopped { session: s } = event {
                assert_eq!(s, session);
                auto_stopped = true;
            }
        }
        assert!(auto_stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_batch_clears_only_handed_off_pulses() {
        let backend = Arc::new(MockBackend::default());
        let mut tracker = tracker_with(Some(backend.clone()));
        tracker.start(orbit(), sar(), range(), batched(5)).await.unwrap();

        // Fifth tick at 800 ms triggers the hand-off.
        advance(900).await;
        let status = tracker.status();
        assert_eq!(status.batches_processed, 1);
        assert_eq!(status.pulse_count, 0);
        assert!(!status.hand_off_in_flight);
        assert_eq!(backend.requests()[0].satellite_states.len(), 5);

        advance(400).await;
        assert_eq!(tracker.status().pulse_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_hand_off_keeps_pulses_for_retry() {
        let backend = Arc::new(MockBackend {
            fail: true,
            ..MockBackend::default()
        });
        let mut tracker = tracker_with(Some(backend.clone()));
        tracker.start(orbit(), sar(), range(), batched(5)).await.unwrap();

        advance(1100).await;
        let status = tracker.status();
        assert_eq!(status.pulse_count, 6);
        assert_eq!(status.batches_processed, 0);
        assert!(status.batches_failed >= 2);

        // The retry re-sends the same oldest pulses.
        let requests = backend.requests();
        assert!(requests.len() >= 2);
        assert_eq!(requests[0].satellite_states[0], requests[1].satellite_states[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_hand_off_blocks_another() {
        let backend = Arc::new(MockBackend {
            delay: Some(Duration::from_secs(10)),
            ..MockBackend::default()
        });
        let mut tracker = tracker_with(Some(backend.clone()));
        tracker.start(orbit(), sar(), range(), batched(5)).await.unwrap();

        advance(2100).await;
        assert_eq!(backend.requests().len(), 1);
        let status = tracker.status();
        assert!(status.hand_off_in_flight);
        assert_eq!(status.pulse_count, 11);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_processes_remaining_pulses() {
        let backend = Arc::new(MockBackend::default());
        let mut tracker = tracker_with(Some(backend.clone()));
        tracker
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        advance(1100).await;

        let report = tracker.stop(true).await;
        assert_eq!(report.pulses_handed_off, 6);
        assert_eq!(report.pulses_dropped, 0);
        assert_eq!(report.response.unwrap().shape, vec![6, 4096]);
        assert_eq!(backend.requests()[0].satellite_states.len(), 6);

        let status = tracker.status();
        assert_eq!(status.mode, TrackerMode::Idle);
        assert_eq!(status.pulse_count, 0);
        assert_eq!(status.batches_processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn halt_returns_before_final_batch_is_sent() {
        let backend = Arc::new(MockBackend {
            delay: Some(Duration::from_secs(5)),
            ..MockBackend::default()
        });
        let mut tracker = tracker_with(Some(backend.clone()));
        tracker
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        advance(500).await;

        let final_batch = tracker.halt(true).await;
        let status = tracker.status();
        assert_eq!(status.mode, TrackerMode::Idle);
        assert_eq!(status.pulse_count, 0);
        assert!(backend.requests().is_empty());

        let report = final_batch.submit().await;
        assert_eq!(report.pulses_handed_off, 3);
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(tracker.status().batches_processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_processing_drops_pulses() {
        let backend = Arc::new(MockBackend::default());
        let mut tracker = tracker_with(Some(backend.clone()));
        tracker
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        advance(500).await;

        let report = tracker.stop(false).await;
        assert_eq!(report.pulses_handed_off, 0);
        assert_eq!(report.pulses_dropped, 3);
        assert!(backend.requests().is_empty());

        // Ticking has ceased.
        advance(1000).await;
        assert_eq!(tracker.status().pulse_count, 0);
        assert_eq!(tracker.stop(true).await.pulses_dropped, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_session() {
        let mut tracker = tracker_with(None);
        let first = tracker
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        advance(500).await;
        let second = tracker
            .start(orbit(), sar(), range(), TrackingOptions::default())
            .await
            .unwrap();
        assert_ne!(first, second);

        // Only one worker ticks after the restart.
        advance(1100).await;
        assert_eq!(tracker.status().pulse_count, 6);
        let (groups, open) = tracker.with_catalog(|c| {
            let groups = c.groups().groups();
            (groups.len(), groups.iter().filter(|g| g.is_open()).count())
        });
        assert_eq!(groups, 2);
        assert_eq!(open, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_result_from_old_session_is_discarded() {
        let backend = Arc::new(MockBackend {
            delay: Some(Duration::from_secs(5)),
            ..MockBackend::default()
        });
        let mut tracker = tracker_with(Some(backend.clone()));
        tracker.start(orbit(), sar(), range(), batched(5)).await.unwrap();
        advance(1000).await;
        assert!(tracker.status().hand_off_in_flight);

        tracker.start(orbit(), sar(), range(), batched(5)).await.unwrap();
        // The first session's result lands at 5.8 s; the second's at 6.8 s.
        advance(5000).await;

        let status = tracker.status();
        assert_eq!(status.batches_processed, 0);
        assert!(status.hand_off_in_flight);
        assert!(status.pulse_count > 20, "{}", status.pulse_count);
    }

    #[tokio::test]
    async fn rejects_invalid_options() {
        let mut tracker = tracker_with(None);
        let zero = TrackingOptions {
            update_interval: Duration::ZERO,
            ..TrackingOptions::default()
        };
        assert!(matches!(
            tracker.start(orbit(), sar(), range(), zero).await,
            Err(TrackerError::InvalidInterval)
        ));
        assert!(matches!(
            tracker.start(orbit(), sar(), range(), batched(5)).await,
            Err(TrackerError::BackendRequired)
        ));

        let mut with_backend = tracker_with(Some(Arc::new(MockBackend::default())));
        assert!(matches!(
            with_backend.start(orbit(), sar(), range(), batched(0)).await,
            Err(TrackerError::InvalidBatch(_))
        ));
        assert!(!with_backend.is_tracking());

        let mut inverted = range();
        std::mem::swap(&mut inverted.near_range, &mut inverted.far_range);
        assert!(matches!(
            tracker
                .start(orbit(), sar(), inverted, TrackingOptions::default())
                .await,
            Err(TrackerError::Range(RadarError::InvalidRange { .. }))
        ));
        assert!(!tracker.is_tracking());
    }
}
