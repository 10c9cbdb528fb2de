//! Pure conversions between the reference coordinate space and an arbitrary
//! display space.
//!
//! Both directions rescale `position` and `scale` together with the same
//! per-axis factor and leave intrinsic geometry (`width`/`height`, `path`)
//! and authored style untouched. `from_reference(to_reference(S, w, h), w, h)`
//! reproduces `S` within floating-point tolerance for any positive box.

use crate::{
    core::{REFERENCE_HEIGHT, REFERENCE_WIDTH, ScaleFactor},
    error::{FramemarkError, FramemarkResult},
    model::{CanvasData, Shape},
};

/// Per-axis factor that maps current-space geometry into reference space.
///
/// Rejects degenerate display dimensions up front: a divide by a zero-size
/// box would produce non-finite geometry, and reference-space data persisted
/// with a bad divisor cannot be un-corrupted afterwards.
pub fn scale_factor(current_width: f64, current_height: f64) -> FramemarkResult<ScaleFactor> {
    require_positive(current_width, current_height)?;
    ScaleFactor::new(
        REFERENCE_WIDTH / current_width,
        REFERENCE_HEIGHT / current_height,
    )
}

/// Convert shapes drawn at `current_width`x`current_height` into reference
/// space. `size` and `path` geometry are copied unchanged; missing
/// `position`/`scale` default to `(0,0)`/`(1,1)` before scaling.
pub fn to_reference(
    shapes: &[Shape],
    current_width: f64,
    current_height: f64,
) -> FramemarkResult<Vec<Shape>> {
    let factor = scale_factor(current_width, current_height)?;
    Ok(convert(shapes, factor))
}

/// Convert reference-space shapes into the current display space. Exact
/// inverse of [`to_reference`] for the same width/height pair.
pub fn from_reference(
    shapes: &[Shape],
    current_width: f64,
    current_height: f64,
) -> FramemarkResult<Vec<Shape>> {
    let factor = scale_factor(current_width, current_height)?.invert();
    Ok(convert(shapes, factor))
}

/// Capture-side wrapper: normalize live shapes and build the persisted
/// envelope. The envelope always carries the reference dimensions; the
/// capture-time display size is recorded for diagnostics only.
pub fn normalize(
    objects: &[Shape],
    current_width: f64,
    current_height: f64,
) -> FramemarkResult<CanvasData> {
    let objects = to_reference(objects, current_width, current_height)?;
    Ok(CanvasData {
        objects,
        width: REFERENCE_WIDTH,
        height: REFERENCE_HEIGHT,
        original_width: current_width,
        original_height: current_height,
    })
}

/// Display-side wrapper: validate a stored envelope and convert its shapes
/// into the current viewer's box. Note the inverse targets the viewer's box,
/// never the envelope's `originalWidth`/`originalHeight`.
pub fn denormalize(
    canvas: &CanvasData,
    current_width: f64,
    current_height: f64,
) -> FramemarkResult<Vec<Shape>> {
    canvas.validate()?;
    from_reference(&canvas.objects, current_width, current_height)
}

fn require_positive(width: f64, height: f64) -> FramemarkResult<()> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(FramemarkError::validation(format!(
            "display dimensions must be positive and finite, got {width}x{height}"
        )));
    }
    Ok(())
}

fn convert(shapes: &[Shape], factor: ScaleFactor) -> Vec<Shape> {
    shapes.iter().map(|s| convert_shape(s, factor)).collect()
}

fn convert_shape(shape: &Shape, factor: ScaleFactor) -> Shape {
    let mut out = shape.clone();
    out.set_position(factor.apply_position(shape.position()));
    out.set_scale(factor.apply_scale(shape.scale()));
    out
}
