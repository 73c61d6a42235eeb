//! Mock scanner device for testing.

use crate::scanner::ScannerDevice;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Mock scanner device.
///
/// Reports a fixed camera availability and counts start/stop calls. Clones
/// share their counters.
#[derive(Debug, Clone)]
pub struct MockScanner {
    camera: bool,
    running: Arc<AtomicBool>,
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl MockScanner {
    /// A device with a working camera
    #[must_use]
    pub fn with_camera() -> Self {
        Self {
            camera: true,
            running: Arc::new(AtomicBool::new(false)),
            starts: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A device whose setup fails
    #[must_use]
    pub fn without_camera() -> Self {
        Self {
            camera: false,
            ..Self::with_camera()
        }
    }

    /// Whether the capture session is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of `start_scanning` calls
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Number of `stop_scanning` calls
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl ScannerDevice for MockScanner {
    fn setup(&self) -> bool {
        self.camera
    }

    fn start_scanning(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    fn stop_scanning(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }
}
