#![forbid(unsafe_code)]

//! Coordinate normalization and overlay rendering for frame-accurate video
//! annotations.
//!
//! Annotations are drawn over a video at whatever size the viewer's layout
//! gives it, persisted in a fixed 1280x720 reference space, and redisplayed
//! over any other display size. The crate covers the pure coordinate
//! transform, the resize-aware viewport tracker, the capture pipeline, and
//! the read-only overlay pipeline.

pub mod capture;
pub mod core;
pub mod error;
pub mod model;
pub mod overlay;
pub mod store;
pub mod style;
pub mod transform;
pub mod viewport;

pub use capture::{CaptureOpts, capture, capture_and_submit};
pub use core::{REFERENCE_HEIGHT, REFERENCE_WIDTH, Position, Scale, ScaleFactor, Size, ViewportBox};
pub use error::{FramemarkError, FramemarkResult};
pub use model::{AnnotationDraft, AnnotationRecord, CanvasData, Shape, ShapeKind};
pub use overlay::{OverlayPipeline, OverlayScene, OverlayState, OverlayStyle, StandardRenderer};
pub use store::{AnnotationStore, InMemoryStore};
pub use style::{StyleHandle, StyleRegistry};
pub use transform::{denormalize, from_reference, normalize, to_reference};
pub use viewport::{ViewportTracker, ViewportWatch, overlay_placement};
