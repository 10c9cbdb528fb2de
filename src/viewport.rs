//! Resize-aware tracking of the video element's rendered box.
//!
//! The tracker is fed raw measurements (video bounding rectangle plus the
//! shared ancestor container's rectangle) on mount and on every layout
//! change, and publishes the overlay placement derived from them. The
//! video's box is often zero-sized on first paint; instead of a fixed
//! settling delay, readiness is an explicit signal resolved by the first
//! positive measurement.

use tokio::sync::watch;

use crate::core::{Rect, ViewportBox};

/// Overlay placement rule: the video element's bounding rectangle minus the
/// container's offset gives the overlay position; the rectangle's own size
/// gives the overlay size.
pub fn overlay_placement(video: Rect, container: Rect) -> ViewportBox {
    ViewportBox::new(
        video.x0 - container.x0,
        video.y0 - container.y0,
        video.width(),
        video.height(),
    )
}

/// Owns the current viewport measurement and fans it out to consumers.
///
/// If the underlying element is never mounted the tracker simply never
/// reports a ready box; that is permanent "not ready", not an error.
#[derive(Debug)]
pub struct ViewportTracker {
    tx: watch::Sender<Option<ViewportBox>>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Record a measurement of the video element relative to the overlay's
    /// parent container. A degenerate (zero or negative size) box is
    /// published as "not ready" rather than as a zero-size placement.
    pub fn measure(&self, video: Rect, container: Rect) {
        self.update(overlay_placement(video, container));
    }

    /// Record an already-placed box.
    pub fn update(&self, placed: ViewportBox) {
        if placed.is_ready() {
            self.tx.send_replace(Some(placed));
        } else {
            tracing::debug!(
                width = placed.width,
                height = placed.height,
                "viewport measurement not ready yet"
            );
            self.tx.send_replace(None);
        }
    }

    /// Back to "not ready" (element unmounted, layout in flux).
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<ViewportBox> {
        *self.tx.borrow()
    }

    pub fn watch(&self) -> ViewportWatch {
        ViewportWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the tracked box for the capture and overlay pipelines.
#[derive(Clone, Debug)]
pub struct ViewportWatch {
    rx: watch::Receiver<Option<ViewportBox>>,
}

impl ViewportWatch {
    pub fn current(&self) -> Option<ViewportBox> {
        *self.rx.borrow()
    }

    /// Resolves with the first positive measurement. Returns `None` only if
    /// the tracker was dropped before one ever arrived.
    pub async fn ready(&mut self) -> Option<ViewportBox> {
        loop {
            if let Some(placed) = *self.rx.borrow_and_update() {
                return Some(placed);
            }
            if self.rx.changed().await.is_err() {
                return *self.rx.borrow();
            }
        }
    }

    /// Waits for the next published measurement (ready or not). Returns
    /// `None` once the tracker is gone.
    pub async fn changed(&mut self) -> Option<Option<ViewportBox>> {
        match self.rx.changed().await {
            Ok(()) => Some(*self.rx.borrow_and_update()),
            Err(_) => None,
        }
    }
}
