//! Capture devices and camera sessions.
//!
//! Opening a device yields a [`CaptureFeed`]: a stream of raw detections
//! (decoded QR/barcode text, zero or more over time) plus the device tracks
//! that must be stopped when the feed is no longer wanted. The session
//! controller wraps the feed's tracks in a [`CameraSession`], which releases
//! the device exactly once, at the latest when dropped.
//!
//! ## Devices
//!
//! - [`LineCapture`] - detections read line by line from any async reader
//! - [`NoCapture`] - no camera attached, for manual-only sessions
//! - [`MockCapture`] - scripted device for tests (NOT a real camera!)

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CameraError;

/// Buffered detections per feed before the producer waits.
const DETECTION_BUFFER: usize = 16;

/// Preferred camera direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    User,
    Environment,
}

/// Requested capture settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            width: 1280,
            height: 720,
        }
    }
}

/// Handle on the running capture tracks.
pub trait CaptureTracks: Send {
    /// Stop every track. Called exactly once per feed.
    fn stop_all(&mut self);
}

/// An opened capture device.
pub struct CaptureFeed {
    pub detections: mpsc::Receiver<String>,
    pub tracks: Box<dyn CaptureTracks>,
}

/// A source of scanned codes.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device and start decoding frames.
    async fn open(&self, constraints: &CaptureConstraints) -> Result<CaptureFeed, CameraError>;
}

/// Exclusive ownership of an opened device.
///
/// Releasing cancels the detection pump and stops all tracks. Release is
/// idempotent and also runs on drop.
pub struct CameraSession {
    tracks: Option<Box<dyn CaptureTracks>>,
    cancel: CancellationToken,
}

impl CameraSession {
    pub fn new(tracks: Box<dyn CaptureTracks>, cancel: CancellationToken) -> Self {
        Self {
            tracks: Some(tracks),
            cancel,
        }
    }

    pub fn is_active(&self) -> bool {
        self.tracks.is_some()
    }

    pub fn release(&mut self) {
        self.cancel.cancel();
        if let Some(mut tracks) = self.tracks.take() {
            tracks.stop_all();
            info!("Camera released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Line-oriented capture
// =============================================================================

/// Capture device fed by text lines, e.g. a hardware scanner in keyboard
/// mode piped to stdin. The reader can be opened once.
pub struct LineCapture<R> {
    reader: Mutex<Option<R>>,
}

impl<R> LineCapture<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
        }
    }
}

struct LineTracks {
    reader_task: JoinHandle<()>,
}

impl CaptureTracks for LineTracks {
    fn stop_all(&mut self) {
        self.reader_task.abort();
    }
}

#[async_trait]
impl<R> CaptureDevice for LineCapture<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn open(&self, _constraints: &CaptureConstraints) -> Result<CaptureFeed, CameraError> {
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| CameraError::Unavailable("input already consumed".into()))?;

        let (tx, rx) = mpsc::channel(DETECTION_BUFFER);
        let reader_task = tokio::spawn(async move {
            let mut reader = reader;
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Line capture read failed");
                        break;
                    }
                }
                // Garbled bytes still make a detection; the extractor rejects it.
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if tx.send(line.to_string()).await.is_err() {
                    break;
                }
            }
            debug!("Line capture input exhausted");
        });

        Ok(CaptureFeed {
            detections: rx,
            tracks: Box::new(LineTracks { reader_task }),
        })
    }
}

// =============================================================================
// No capture
// =============================================================================

/// Device for sessions that only take typed or pasted codes. Every open fails
/// with [`CameraError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

#[async_trait]
impl CaptureDevice for NoCapture {
    async fn open(&self, _constraints: &CaptureConstraints) -> Result<CaptureFeed, CameraError> {
        Err(CameraError::Unavailable("no camera attached".into()))
    }
}

// =============================================================================
// Mock capture (testing only)
// =============================================================================

/// Scripted capture device for tests.
/// WARNING: not a camera - detections are pushed with [`MockCapture::emit`].
#[derive(Clone, Default)]
pub struct MockCapture {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    deny: AtomicBool,
    opened: AtomicUsize,
    stopped: AtomicUsize,
    sender: Mutex<Option<mpsc::Sender<String>>>,
}

struct MockTracks {
    inner: Arc<MockInner>,
}

impl CaptureTracks for MockTracks {
    fn stop_all(&mut self) {
        self.inner.stopped.fetch_add(1, Ordering::SeqCst);
        self.inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl MockCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device that refuses permission on every open.
    pub fn denied() -> Self {
        let mock = Self::default();
        mock.inner.deny.store(true, Ordering::SeqCst);
        mock
    }

    pub fn set_denied(&self, deny: bool) {
        self.inner.deny.store(deny, Ordering::SeqCst);
    }

    /// Push a detection into the open feed. Returns `false` if no feed is open
    /// or the controller stopped listening.
    pub async fn emit(&self, text: &str) -> bool {
        let sender = self
            .inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match sender {
            Some(tx) => tx.send(text.to_string()).await.is_ok(),
            None => false,
        }
    }

    pub fn open_count(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Whether a feed is currently open (opened and not yet stopped).
    pub fn is_streaming(&self) -> bool {
        self.inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[async_trait]
impl CaptureDevice for MockCapture {
    async fn open(&self, _constraints: &CaptureConstraints) -> Result<CaptureFeed, CameraError> {
        if self.inner.deny.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }

        let (tx, rx) = mpsc::channel(DETECTION_BUFFER);
        *self
            .inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx);
        self.inner.opened.fetch_add(1, Ordering::SeqCst);

        Ok(CaptureFeed {
            detections: rx,
            tracks: Box::new(MockTracks {
                inner: Arc::clone(&self.inner),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints_prefer_back_camera() {
        let constraints = CaptureConstraints::default();
        assert_eq!(constraints.facing, Facing::Environment);
        assert_eq!((constraints.width, constraints.height), (1280, 720));
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let device = MockCapture::new();
        let feed = device.open(&CaptureConstraints::default()).await.unwrap();
        let cancel = CancellationToken::new();
        let mut session = CameraSession::new(feed.tracks, cancel.clone());

        session.release();
        session.release();
        drop(session);

        assert!(cancel.is_cancelled());
        assert_eq!(device.stop_count(), 1);
        assert!(!device.is_streaming());
    }

    #[tokio::test]
    async fn test_drop_releases() {
        let device = MockCapture::new();
        let feed = device.open(&CaptureConstraints::default()).await.unwrap();
        drop(CameraSession::new(feed.tracks, CancellationToken::new()));
        assert_eq!(device.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_denied_device() {
        let device = MockCapture::denied();
        let result = device.open(&CaptureConstraints::default()).await;
        assert!(matches!(result, Err(CameraError::PermissionDenied)));
        assert_eq!(device.open_count(), 0);
    }

    #[tokio::test]
    async fn test_line_capture_yields_trimmed_lines() {
        let input: &[u8] = b"first\n\n  second  \n";
        let device = LineCapture::new(tokio::io::BufReader::new(input));
        let mut feed = device.open(&CaptureConstraints::default()).await.unwrap();

        assert_eq!(feed.detections.recv().await.as_deref(), Some("first"));
        assert_eq!(feed.detections.recv().await.as_deref(), Some("second"));
        assert_eq!(feed.detections.recv().await, None);

        // Second open fails: the reader is gone.
        assert!(device.open(&CaptureConstraints::default()).await.is_err());
        feed.tracks.stop_all();
    }

    #[tokio::test]
    async fn test_line_capture_survives_invalid_utf8() {
        let input: &[u8] = b"\xff\xfe garbage\r\n4a43bbb0-68b1-413a-bcf8-b50fd0174d05\n";
        let device = LineCapture::new(tokio::io::BufReader::new(input));
        let mut feed = device.open(&CaptureConstraints::default()).await.unwrap();

        let garbled = feed.detections.recv().await.unwrap();
        assert!(garbled.ends_with("garbage"));
        assert_eq!(
            feed.detections.recv().await.as_deref(),
            Some("4a43bbb0-68b1-413a-bcf8-b50fd0174d05")
        );
        assert_eq!(feed.detections.recv().await, None);
        feed.tracks.stop_all();
    }

    #[tokio::test]
    async fn test_no_capture_is_unavailable() {
        let err = NoCapture
            .open(&CaptureConstraints::default())
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Camera unavailable: no camera attached");
    }
}
