//! Scan session controller.
//!
//! Owns the scan mode and status, the camera session and the single-flight
//! latch, and orchestrates verification of detected codes:
//!
//! ```text
//! Idle --start_camera--> CameraActive --detection--> Scanning --ok--> Success --(delay)--> hand-off
//!   ^                                                     |
//!   |                                                     +--err--> Error
//!   +------------------------ reset / set_mode / drop ----------------+
//! ```
//!
//! Manual entry and demo runs go straight from any settled state to
//! `Scanning`. At most one verification is in flight per session; triggers
//! arriving while the latch is held are dropped, not queued. Every
//! verification is tagged with the session generation current when it
//! started, and a result whose generation is stale (the user reset, switched
//! mode or tore the session down meanwhile) is discarded.
//!
//! State changes are published as [`ScanSnapshot`]s on a watch channel; the
//! verified record is handed to the caller on an mpsc channel once the
//! success delay has elapsed.
//!
//! All operations that start background work must be called from within a
//! tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::capture::{CameraSession, CaptureConstraints, CaptureDevice};
use crate::error::{AlertTrack, CameraError, ExtractError, FailureKind, VerifyError};
use crate::fixtures::{DemoFixtures, DemoOutcome};
use crate::identifier::{extract_identifier, ProductId};
use crate::lookup::ProductLookup;
use crate::product::VerificationRecord;

/// Delay between entering `Success` and handing the record to the caller.
pub const HANDOFF_DELAY: Duration = Duration::from_millis(1500);

/// Receives verified records from the session.
pub type HandoffReceiver = mpsc::UnboundedReceiver<VerificationRecord>;

/// Input channel selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Camera,
    QrManual,
    BarcodeManual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    #[default]
    Idle,
    CameraActive,
    Scanning,
    Success,
    Error,
}

/// A failed scan attempt, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ScanFailure {
    pub fn alert(&self) -> AlertTrack {
        self.kind.alert()
    }
}

impl From<&VerifyError> for ScanFailure {
    fn from(err: &VerifyError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<&ExtractError> for ScanFailure {
    fn from(err: &ExtractError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Everything a renderer needs to draw the scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSnapshot {
    pub mode: ScanMode,
    pub status: ScanStatus,
    pub identifier: Option<ProductId>,
    pub failure: Option<ScanFailure>,
    /// Set when the camera could not be started; the status stays `Idle`.
    pub camera_error: Option<String>,
    /// The verified record while in `Success`.
    pub record: Option<VerificationRecord>,
    /// Single-flight latch.
    pub verifying: bool,
}

/// What happened to a scan trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Verification of this identifier started.
    Started(ProductId),
    /// A verification is already in flight; the trigger was dropped.
    Busy,
    /// Not applicable in the current state, or nothing usable was scanned.
    Ignored,
    /// Manual input held no identifier; the session moved to `Error`.
    Rejected,
}

/// Session tuning and injected fixtures.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub handoff_delay: Duration,
    pub demo: DemoFixtures,
    pub constraints: CaptureConstraints,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handoff_delay: HANDOFF_DELAY,
            demo: DemoFixtures::default(),
            constraints: CaptureConstraints::default(),
        }
    }
}

struct Inner {
    snapshot: ScanSnapshot,
    camera: Option<CameraSession>,
    /// A device open is pending. Survives `clear()` so at most one open is
    /// ever outstanding.
    starting: bool,
    generation: u64,
}

impl Inner {
    fn release_camera(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.release();
        }
    }

    /// Back to `Idle` with everything but the mode cleared.
    fn clear(&mut self) {
        self.release_camera();
        self.generation += 1;
        self.snapshot = ScanSnapshot {
            mode: self.snapshot.mode,
            ..ScanSnapshot::default()
        };
    }

    /// Take the latch and enter `Scanning`. Returns the generation to tag the
    /// verification with.
    fn begin(&mut self, id: ProductId) -> u64 {
        self.release_camera();
        self.snapshot.status = ScanStatus::Scanning;
        self.snapshot.identifier = Some(id);
        self.snapshot.failure = None;
        self.snapshot.record = None;
        self.snapshot.verifying = true;
        self.generation
    }
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ScanSnapshot>,
    handoff_tx: mpsc::UnboundedSender<VerificationRecord>,
    lookup: Arc<dyn ProductLookup>,
    config: SessionConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.snapshot.clone());
    }

    fn handle_detection(self: &Arc<Self>, text: &str) -> Trigger {
        let mut inner = self.lock();

        if inner.snapshot.verifying {
            debug!("Verification in flight, dropping detection");
            return Trigger::Busy;
        }
        if inner.snapshot.status != ScanStatus::CameraActive {
            debug!(status = ?inner.snapshot.status, "Camera not active, dropping detection");
            return Trigger::Ignored;
        }

        let id = match extract_identifier(text) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Unrecognized code, still scanning");
                return Trigger::Ignored;
            }
        };

        info!(id = %id, "Code detected");
        let generation = inner.begin(id);
        self.publish(&inner);
        drop(inner);

        self.spawn_lookup(generation, id);
        Trigger::Started(id)
    }

    fn spawn_lookup(self: &Arc<Self>, generation: u64, id: ProductId) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let result = shared.lookup.lookup(&id).await;
            shared.complete(generation, result).await;
        });
    }

    fn spawn_demo(self: &Arc<Self>, generation: u64, outcome: DemoOutcome) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(shared.config.demo.latency).await;
            let result = shared.config.demo.resolve(outcome);
            shared.complete(generation, result).await;
        });
    }

    /// The device stopped producing frames while the camera was still active.
    fn feed_ended(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation || inner.snapshot.status != ScanStatus::CameraActive {
            return;
        }
        let err = CameraError::Unavailable("capture feed ended".into());
        warn!(error = %err, "Camera stopped");
        inner.release_camera();
        inner.snapshot.status = ScanStatus::Idle;
        inner.snapshot.camera_error = Some(err.to_string());
        self.publish(&inner);
    }

    /// Apply a verification result, then hand the record off after the delay.
    async fn complete(&self, generation: u64, result: Result<VerificationRecord, VerifyError>) {
        let Some(record) = self.settle(generation, result) else {
            return;
        };

        tokio::time::sleep(self.config.handoff_delay).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!("Session moved on before hand-off, discarding record");
            return;
        }
        inner.snapshot.verifying = false;
        self.publish(&inner);
        drop(inner);

        info!(product = %record.pharmacy.name, "Handing off verified record");
        if self.handoff_tx.send(record).is_err() {
            debug!("Hand-off receiver dropped");
        }
    }

    /// Apply a result to the session. Returns the record if a hand-off is due.
    fn settle(
        &self,
        generation: u64,
        result: Result<VerificationRecord, VerifyError>,
    ) -> Option<VerificationRecord> {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(
                stale = generation,
                current = inner.generation,
                "Discarding stale verification result"
            );
            return None;
        }

        inner.release_camera();
        match result {
            Ok(record) => {
                info!(product = %record.pharmacy.name, "Verification succeeded");
                inner.snapshot.status = ScanStatus::Success;
                inner.snapshot.failure = None;
                inner.snapshot.record = Some(record.clone());
                self.publish(&inner);
                Some(record)
            }
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "Verification failed");
                inner.snapshot.status = ScanStatus::Error;
                inner.snapshot.failure = Some(ScanFailure::from(&e));
                inner.snapshot.record = None;
                inner.snapshot.verifying = false;
                self.publish(&inner);
                None
            }
        }
    }
}

/// Clears the pending-open marker, also when `start_camera` is cancelled.
struct StartingGuard<'a>(&'a Shared);

impl Drop for StartingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().starting = false;
    }
}

/// Forward detections from the capture feed until cancelled or exhausted.
async fn pump_detections(
    shared: Arc<Shared>,
    generation: u64,
    mut detections: mpsc::Receiver<String>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = detections.recv() => match next {
                Some(text) => {
                    shared.handle_detection(&text);
                }
                None => {
                    debug!("Capture feed ended");
                    shared.feed_ended(generation);
                    break;
                }
            },
        }
    }
}

/// The scan session controller. Dropping it tears the session down.
pub struct ScanSession {
    shared: Arc<Shared>,
    device: Arc<dyn CaptureDevice>,
}

impl ScanSession {
    /// Create an idle session in camera mode.
    pub fn new(
        lookup: Arc<dyn ProductLookup>,
        device: Arc<dyn CaptureDevice>,
        config: SessionConfig,
    ) -> (Self, HandoffReceiver) {
        let (state_tx, _) = watch::channel(ScanSnapshot::default());
        let (handoff_tx, handoff_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                snapshot: ScanSnapshot::default(),
                camera: None,
                starting: false,
                generation: 0,
            }),
            state_tx,
            handoff_tx,
            lookup,
            config,
        });

        (Self { shared, device }, handoff_rx)
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.shared.lock().snapshot.clone()
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.shared.state_tx.subscribe()
    }

    pub fn camera_active(&self) -> bool {
        self.shared.lock().camera.is_some()
    }

    /// Switch input channel. Always resets the session.
    #[instrument(level = "debug", skip(self))]
    pub fn set_mode(&self, mode: ScanMode) {
        let mut inner = self.shared.lock();
        inner.clear();
        inner.snapshot.mode = mode;
        self.shared.publish(&inner);
        info!(mode = ?mode, "Scan mode switched");
    }

    /// Acquire the camera and start listening for detections.
    ///
    /// Only applies in camera mode from `Idle`. A failure keeps the session
    /// `Idle` and records the camera error so the user can try again.
    #[instrument(level = "info", skip(self))]
    pub async fn start_camera(&self) -> Result<(), CameraError> {
        let generation = {
            let mut inner = self.shared.lock();
            if inner.starting {
                debug!("Camera start already in progress");
                return Ok(());
            }
            if inner.snapshot.mode != ScanMode::Camera
                || inner.snapshot.status != ScanStatus::Idle
                || inner.camera.is_some()
            {
                debug!(status = ?inner.snapshot.status, "Camera start not applicable");
                return Ok(());
            }
            inner.starting = true;
            inner.snapshot.camera_error = None;
            self.shared.publish(&inner);
            inner.generation
        };

        let starting = StartingGuard(&self.shared);
        let opened = self.device.open(&self.shared.config.constraints).await;
        drop(starting);

        let mut inner = self.shared.lock();
        match opened {
            Ok(feed) => {
                let cancel = CancellationToken::new();
                let mut camera = CameraSession::new(feed.tracks, cancel.clone());
                if inner.generation != generation || inner.snapshot.status != ScanStatus::Idle {
                    debug!("Session moved on while the camera started, releasing it");
                    camera.release();
                    return Ok(());
                }

                inner.camera = Some(camera);
                inner.snapshot.status = ScanStatus::CameraActive;
                self.shared.publish(&inner);
                drop(inner);

                info!("Camera active");
                tokio::spawn(pump_detections(
                    Arc::clone(&self.shared),
                    generation,
                    feed.detections,
                    cancel,
                ));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Camera could not be started");
                if inner.generation == generation {
                    inner.snapshot.camera_error = Some(e.to_string());
                    self.shared.publish(&inner);
                }
                Err(e)
            }
        }
    }

    /// Close the camera without resetting anything else.
    pub fn stop_camera(&self) {
        let mut inner = self.shared.lock();
        inner.release_camera();
        if inner.snapshot.status == ScanStatus::CameraActive {
            inner.snapshot.status = ScanStatus::Idle;
        }
        self.shared.publish(&inner);
    }

    /// Feed one detection, as the capture pipeline does.
    pub fn handle_detection(&self, text: &str) -> Trigger {
        self.shared.handle_detection(text)
    }

    /// Verify typed or pasted text, bypassing the camera.
    #[instrument(level = "info", skip(self))]
    pub fn submit_manual(&self, text: &str) -> Trigger {
        if text.trim().is_empty() {
            return Trigger::Ignored;
        }

        let mut inner = self.shared.lock();
        if inner.snapshot.verifying {
            debug!("Verification in flight, dropping manual submission");
            return Trigger::Busy;
        }

        match extract_identifier(text) {
            Ok(id) => {
                let generation = inner.begin(id);
                self.shared.publish(&inner);
                drop(inner);

                self.shared.spawn_lookup(generation, id);
                Trigger::Started(id)
            }
            Err(e) => {
                warn!(error = %e, "Manual input rejected");
                inner.release_camera();
                inner.snapshot.status = ScanStatus::Error;
                inner.snapshot.identifier = None;
                inner.snapshot.record = None;
                inner.snapshot.failure = Some(ScanFailure::from(&e));
                self.shared.publish(&inner);
                Trigger::Rejected
            }
        }
    }

    /// Simulate a verification outcome from the demo fixtures.
    #[instrument(level = "info", skip(self))]
    pub fn run_demo(&self, outcome: DemoOutcome) -> Trigger {
        let mut inner = self.shared.lock();
        if inner.snapshot.verifying {
            return Trigger::Busy;
        }
        if inner.snapshot.status == ScanStatus::CameraActive {
            return Trigger::Ignored;
        }

        let id = self.shared.config.demo.identifier(outcome);
        let generation = inner.begin(id);
        self.shared.publish(&inner);
        drop(inner);

        self.shared.spawn_demo(generation, outcome);
        Trigger::Started(id)
    }

    /// "Scan another": back to `Idle`, camera released, fields cleared. An
    /// outstanding verification keeps running but its result is ignored.
    #[instrument(level = "info", skip(self))]
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.clear();
        self.shared.publish(&inner);
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        inner.clear();
        self.shared.publish(&inner);
        debug!("Scan session torn down");
    }
}
