//! Overlay rendering pipeline: reconstruct a persisted annotation into a
//! read-only visual layer positioned exactly over the video.
//!
//! The pipeline is a small state machine (Idle / Waiting / Loaded) driven by
//! two inputs, the selected record and the tracked viewport box. Every input
//! change fully discards the current scene; partial updates are not
//! supported, which keeps geometry from going stale when the video box
//! changes shape mid-display. Rebuilds are serialized by "latest input
//! wins": each rebuild snapshots an input generation up front and only
//! commits if the generation is still current when instantiation finishes.

use std::sync::{Arc, Mutex};

use kurbo::Shape as _;

use crate::{
    core::{Rect, ViewportBox},
    error::{FramemarkError, FramemarkResult},
    model::{AnnotationRecord, Shape, ShapeKind},
    style::{StyleHandle, StyleRegistry},
    transform::from_reference,
};

/// Side of the square info/close affordance, in display pixels.
const INFO_AFFORDANCE_SIZE: f64 = 28.0;

/// Gap between the affordance and the overlay's top-right corner.
const INFO_AFFORDANCE_MARGIN: f64 = 8.0;

/// The fixed display style forced onto every reconstructed object,
/// regardless of how the shape was originally authored. The stored record
/// keeps its authored style untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayStyle {
    pub stroke: String,
    pub stroke_width: f64,
    /// Applied to closed shapes only; pure-stroke paths get no fill.
    pub fill: String,
    pub opacity: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke: "#FF4444".to_owned(),
            stroke_width: 3.0,
            fill: "rgba(255, 68, 68, 0.2)".to_owned(),
            opacity: 1.0,
        }
    }
}

/// One reconstructed visual object, in the viewer's display space.
///
/// Always non-interactive: annotation marks are read-only evidence of what
/// the author drew, never editable objects in the viewer's context.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayObject {
    /// Converted shape geometry (current space).
    pub shape: Shape,
    pub stroke: String,
    pub stroke_width: f64,
    pub fill: Option<String>,
    pub opacity: f64,
    pub visible: bool,
    pub selectable: bool,
    pub evented: bool,
    /// On-canvas bounding box; recomputed after any style change.
    pub bounds: Rect,
}

impl OverlayObject {
    fn from_shape(shape: Shape) -> Self {
        let bounds = display_bounds(&shape);
        Self {
            stroke: shape.stroke.clone().unwrap_or_default(),
            stroke_width: shape.stroke_width.unwrap_or(1.0),
            fill: shape.fill.clone(),
            opacity: 1.0,
            visible: true,
            selectable: false,
            evented: false,
            shape,
            bounds,
        }
    }

    /// Recompute the on-canvas box from the current geometry. Must be called
    /// after forcing the display style, mirroring the drawing surface's rule
    /// that style changes invalidate cached coordinates.
    pub fn set_coords(&mut self) {
        self.bounds = display_bounds(&self.shape);
    }
}

fn display_bounds(shape: &Shape) -> Rect {
    let p = shape.position();
    let s = shape.scale();
    let (w, h) = match shape.size() {
        Some(size) => (size.width, size.height),
        None => match &shape.path {
            Some(path) => {
                let bbox = path.bounding_box();
                (bbox.width(), bbox.height())
            }
            None => (0.0, 0.0),
        },
    };
    Rect::new(p.left, p.top, p.left + w * s.x, p.top + h * s.y)
}

/// Asynchronous reconstruction of a visual object from a converted shape.
///
/// Instantiation may involve decoding or constructing graphical primitives,
/// so it is an awaited step; the pipeline discards results that arrive for
/// outdated inputs.
// Pipelines are single-threaded and cooperative; implementations are not
// required to be Send.
#[allow(async_fn_in_trait)]
pub trait ShapeRenderer {
    async fn instantiate(&self, shape: &Shape) -> FramemarkResult<OverlayObject>;
}

/// Default renderer: handles the built-in shape kinds and rejects unknown
/// tags so the pipeline can skip them with a diagnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRenderer;

impl ShapeRenderer for StandardRenderer {
    async fn instantiate(&self, shape: &Shape) -> FramemarkResult<OverlayObject> {
        match &shape.kind {
            ShapeKind::Path | ShapeKind::Rect | ShapeKind::Circle | ShapeKind::Text => {
                Ok(OverlayObject::from_shape(shape.clone()))
            }
            ShapeKind::Other(tag) => Err(FramemarkError::instantiation(format!(
                "unknown shape kind '{tag}'"
            ))),
        }
    }
}

/// The optional interactive element on an otherwise click-transparent
/// overlay: a small info/close affordance positioned independently of the
/// annotation marks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfoAffordance {
    pub frame: ViewportBox,
    pub interactive: bool,
}

/// A committed overlay: the composited objects plus the frame they were
/// built for.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayScene {
    pub frame: ViewportBox,
    pub objects: Vec<OverlayObject>,
    /// The overlay surface never intercepts pointer input.
    pub pointer_events: bool,
    /// Present when the record carries a comment worth surfacing.
    pub info: Option<InfoAffordance>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum OverlayState {
    /// No annotation selected; nothing rendered.
    #[default]
    Idle,
    /// Annotation selected but the box is not ready, or the record has
    /// nothing displayable. Render nothing and wait.
    Waiting,
    Loaded(OverlayScene),
}

#[derive(Debug, Default)]
struct PipelineInner {
    generation: u64,
    selection: Option<AnnotationRecord>,
    viewport: Option<ViewportBox>,
    state: OverlayState,
}

/// Owner of the single overlay surface. The capture pipeline draws on an
/// independent interactive surface; the two are never the same value.
#[derive(Debug)]
pub struct OverlayPipeline<R> {
    renderer: R,
    style: OverlayStyle,
    inner: Arc<Mutex<PipelineInner>>,
    _chrome: StyleHandle,
}

impl<R: ShapeRenderer> OverlayPipeline<R> {
    /// Mounting an overlay acquires the shared chrome stylesheet; it is
    /// released when the pipeline drops.
    pub fn new(renderer: R, styles: &StyleRegistry) -> Self {
        Self {
            renderer,
            style: OverlayStyle::default(),
            inner: Arc::new(Mutex::new(PipelineInner::default())),
            _chrome: styles.acquire(),
        }
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Change the displayed annotation. Discards the current scene; call
    /// [`rebuild`](Self::rebuild) to reconstruct for the new selection.
    pub fn select(&self, record: Option<AnnotationRecord>) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = if record.is_some() {
            OverlayState::Waiting
        } else {
            OverlayState::Idle
        };
        tracing::debug!(
            selected = record.as_ref().map(|r| r.id.to_string()),
            "overlay selection changed"
        );
        inner.selection = record;
    }

    /// Feed the latest tracked box. A not-ready box demotes a loaded scene
    /// back to Waiting; the stale geometry must not survive a reshape.
    pub fn set_viewport(&self, viewport: Option<ViewportBox>) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.viewport = viewport.filter(|b| b.is_ready());
        if !matches!(inner.state, OverlayState::Idle) {
            inner.state = OverlayState::Waiting;
        }
    }

    pub fn state(&self) -> OverlayState {
        self.lock().state.clone()
    }

    /// Reconstruct the overlay for the current inputs.
    ///
    /// Re-entrant safe: overlapping rebuilds may complete in any order, but
    /// only the one matching the latest inputs is committed; stale results
    /// are dropped, and the previous scene is fully torn down before the new
    /// one is installed.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild(&self) -> FramemarkResult<OverlayState> {
        // Snapshot inputs; the lock is never held across an await.
        let (generation, record, viewport) = {
            let inner = self.lock();
            (inner.generation, inner.selection.clone(), inner.viewport)
        };

        let Some(record) = record else {
            return Ok(self.commit(generation, OverlayState::Idle));
        };
        let Some(viewport) = viewport.filter(|b| b.is_ready()) else {
            return Ok(self.commit(generation, OverlayState::Waiting));
        };
        if let Err(e) = record.canvas_data.validate() {
            tracing::warn!(record = %record.id, error = %e, "not rendering malformed record");
            return Ok(self.commit(generation, OverlayState::Waiting));
        }
        if record.canvas_data.objects.is_empty() {
            return Ok(self.commit(generation, OverlayState::Waiting));
        }

        let shapes = from_reference(&record.canvas_data.objects, viewport.width, viewport.height)?;

        let mut objects = Vec::with_capacity(shapes.len());
        for shape in &shapes {
            match self.renderer.instantiate(shape).await {
                Ok(mut object) => {
                    self.force_style(&mut object);
                    object.set_coords();
                    objects.push(object);
                }
                // Partial overlays are acceptable; total failure is not.
                Err(e) => tracing::warn!(
                    record = %record.id,
                    kind = shape.kind.as_str(),
                    error = %e,
                    "skipping shape that failed to reconstruct"
                ),
            }
        }

        let scene = OverlayScene {
            frame: viewport,
            info: record.comment.as_ref().map(|_| InfoAffordance {
                frame: info_placement(viewport),
                interactive: true,
            }),
            objects,
            pointer_events: false,
        };
        Ok(self.commit(generation, OverlayState::Loaded(scene)))
    }

    /// Force the fixed high-visibility display style. The converted shape's
    /// authored fields stay as stored; only the displayed object changes.
    fn force_style(&self, object: &mut OverlayObject) {
        object.stroke = self.style.stroke.clone();
        object.stroke_width = self.style.stroke_width;
        object.fill = match object.shape.kind {
            ShapeKind::Path => None,
            _ => Some(self.style.fill.clone()),
        };
        object.opacity = self.style.opacity;
        object.visible = true;
        object.selectable = false;
        object.evented = false;
    }

    /// Install `next` only if the inputs have not moved since the rebuild
    /// snapshot. Returns the state that is current after the attempt.
    fn commit(&self, generation: u64, next: OverlayState) -> OverlayState {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!("discarding overlay rebuilt for outdated inputs");
            return inner.state.clone();
        }
        let previous = std::mem::replace(&mut inner.state, next);
        drop(previous); // previous scene torn down before the new one shows
        inner.state.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PipelineInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn info_placement(frame: ViewportBox) -> ViewportBox {
    ViewportBox::new(
        frame.left + frame.width - INFO_AFFORDANCE_SIZE - INFO_AFFORDANCE_MARGIN,
        frame.top + INFO_AFFORDANCE_MARGIN,
        INFO_AFFORDANCE_SIZE,
        INFO_AFFORDANCE_SIZE,
    )
}
