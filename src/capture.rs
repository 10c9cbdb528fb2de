//! Capture pipeline: snapshot the live drawing surface, normalize into
//! reference space, and emit a persistable draft.
//!
//! Capture fails fast when the live box is not ready. Normalizing against a
//! degenerate divisor would corrupt the persisted geometry permanently, so
//! this guard sits in front of the transform, not behind it.

use uuid::Uuid;

use crate::{
    core::ViewportBox,
    error::{FramemarkError, FramemarkResult},
    model::{AnnotationDraft, AnnotationRecord, MAX_OBJECTS_PER_RECORD, Shape},
    store::AnnotationStore,
    transform::normalize,
};

/// Capture-time metadata supplied by the review surface.
#[derive(Clone, Debug)]
pub struct CaptureOpts {
    pub project_id: Uuid,
    /// Millisecond offset into the source video at capture time.
    pub timestamp_ms: i64,
    /// Optional reviewer comment; whitespace-only comments are dropped.
    pub comment: Option<String>,
}

/// Normalize a snapshot of the live drawing surface into a persistable
/// draft.
///
/// Errors:
/// - [`FramemarkError::NotReady`] when the live box has no positive size —
///   the caller should block the save action and explain, not persist.
/// - [`FramemarkError::EmptyCapture`] when nothing was drawn.
/// - [`FramemarkError::Validation`] when a shape violates record limits.
pub fn capture(
    shapes: &[Shape],
    viewport: Option<ViewportBox>,
    opts: &CaptureOpts,
) -> FramemarkResult<AnnotationDraft> {
    let Some(live) = viewport.filter(|b| b.is_ready()) else {
        return Err(FramemarkError::not_ready(
            "live display box has no positive size; refusing to normalize",
        ));
    };

    if shapes.is_empty() {
        return Err(FramemarkError::empty_capture(
            "no shapes drawn; nothing to save",
        ));
    }
    if shapes.len() > MAX_OBJECTS_PER_RECORD {
        return Err(FramemarkError::validation(format!(
            "capture has {} shapes, maximum is {MAX_OBJECTS_PER_RECORD}",
            shapes.len()
        )));
    }
    if opts.timestamp_ms < 0 {
        return Err(FramemarkError::validation(format!(
            "timestamp_ms must be >= 0, got {}",
            opts.timestamp_ms
        )));
    }
    for shape in shapes {
        shape.validate()?;
    }

    let canvas_data = normalize(shapes, live.width, live.height)?;

    let comment = opts
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned);

    Ok(AnnotationDraft {
        project_id: opts.project_id,
        timestamp_ms: opts.timestamp_ms,
        canvas_data,
        comment,
    })
}

/// Capture and hand the draft to the persistence collaborator.
pub async fn capture_and_submit<S: AnnotationStore>(
    store: &S,
    shapes: &[Shape],
    viewport: Option<ViewportBox>,
    opts: &CaptureOpts,
) -> FramemarkResult<AnnotationRecord> {
    let draft = capture(shapes, viewport, opts)?;
    tracing::debug!(
        project_id = %draft.project_id,
        timestamp_ms = draft.timestamp_ms,
        shapes = draft.canvas_data.objects.len(),
        "submitting captured annotation"
    );
    store.create(draft).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, REFERENCE_HEIGHT, REFERENCE_WIDTH, Scale};
    use crate::model::ShapeKind;

    fn opts() -> CaptureOpts {
        CaptureOpts {
            project_id: Uuid::new_v4(),
            timestamp_ms: 4200,
            comment: None,
        }
    }

    fn drawn_rect() -> Shape {
        let mut s = Shape::new(ShapeKind::Rect);
        s.set_position(Position::new(960.0, 540.0));
        s.set_scale(Scale::IDENTITY);
        s.width = Some(100.0);
        s.height = Some(100.0);
        s
    }

    fn live_box() -> ViewportBox {
        ViewportBox::new(0.0, 0.0, 1920.0, 1080.0)
    }

    #[test]
    fn capture_fails_fast_without_a_ready_box() {
        let shapes = vec![drawn_rect()];
        let err = capture(&shapes, None, &opts()).unwrap_err();
        assert!(matches!(err, FramemarkError::NotReady(_)));

        let zero = ViewportBox::new(0.0, 0.0, 0.0, 0.0);
        let err = capture(&shapes, Some(zero), &opts()).unwrap_err();
        assert!(matches!(err, FramemarkError::NotReady(_)));
    }

    #[test]
    fn empty_canvas_is_nothing_to_save() {
        let err = capture(&[], Some(live_box()), &opts()).unwrap_err();
        assert!(matches!(err, FramemarkError::EmptyCapture(_)));
    }

    #[test]
    fn capture_normalizes_and_records_original_size() {
        let draft = capture(&[drawn_rect()], Some(live_box()), &opts()).unwrap();
        assert_eq!(draft.canvas_data.width, REFERENCE_WIDTH);
        assert_eq!(draft.canvas_data.height, REFERENCE_HEIGHT);
        assert_eq!(draft.canvas_data.original_width, 1920.0);
        assert_eq!(draft.canvas_data.original_height, 1080.0);
        assert_eq!(draft.timestamp_ms, 4200);

        let s = &draft.canvas_data.objects[0];
        assert!((s.left.unwrap() - 640.0).abs() < 1e-9);
        assert!((s.top.unwrap() - 360.0).abs() < 1e-9);
        assert_eq!(s.width, Some(100.0));
    }

    #[test]
    fn whitespace_comment_is_dropped() {
        let mut o = opts();
        o.comment = Some("   ".to_owned());
        let draft = capture(&[drawn_rect()], Some(live_box()), &o).unwrap();
        assert_eq!(draft.comment, None);

        o.comment = Some("  logo too small  ".to_owned());
        let draft = capture(&[drawn_rect()], Some(live_box()), &o).unwrap();
        assert_eq!(draft.comment.as_deref(), Some("logo too small"));
    }

    #[test]
    fn capture_enforces_record_limits() {
        let shapes = vec![drawn_rect(); MAX_OBJECTS_PER_RECORD + 1];
        assert!(matches!(
            capture(&shapes, Some(live_box()), &opts()),
            Err(FramemarkError::Validation(_))
        ));

        let mut o = opts();
        o.timestamp_ms = -1;
        assert!(capture(&[drawn_rect()], Some(live_box()), &o).is_err());

        let mut bad = drawn_rect();
        bad.stroke_width = Some(99.0);
        assert!(capture(&[bad], Some(live_box()), &opts()).is_err());
    }
}
