use crate::error::{FramemarkError, FramemarkResult};

pub use kurbo::{BezPath, Rect};

/// Width of the reference coordinate space. All persisted annotation
/// geometry is expressed relative to this resolution, regardless of the
/// display size it was drawn at.
pub const REFERENCE_WIDTH: f64 = 1280.0;

/// Height of the reference coordinate space.
pub const REFERENCE_HEIGHT: f64 = 720.0;

/// Top-left anchor of a shape in its containing coordinate space.
///
/// Resolution-dependent: converting a shape between spaces rescales this
/// together with [`Scale`], using the same per-axis factor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

impl Position {
    pub const ORIGIN: Self = Self {
        left: 0.0,
        top: 0.0,
    };

    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Multiplicative size factors relative to a shape's intrinsic geometry.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Intrinsic, unscaled bounding box of a shape. Resolution-invariant: never
/// rescaled when converting between spaces.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-axis multiplicative factor mapping geometry from one display space
/// into another. Both `position` and `scale` must be converted with the same
/// factor or the shape's absolute size and placement drift apart.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleFactor {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactor {
    pub fn new(x: f64, y: f64) -> FramemarkResult<Self> {
        if !(x.is_finite() && y.is_finite()) || x <= 0.0 || y <= 0.0 {
            return Err(FramemarkError::validation(format!(
                "scale factor must be positive and finite, got ({x}, {y})"
            )));
        }
        Ok(Self { x, y })
    }

    pub fn invert(self) -> Self {
        Self {
            x: 1.0 / self.x,
            y: 1.0 / self.y,
        }
    }

    pub fn apply_position(self, p: Position) -> Position {
        Position::new(p.left * self.x, p.top * self.y)
    }

    pub fn apply_scale(self, s: Scale) -> Scale {
        Scale::new(s.x * self.x, s.y * self.y)
    }
}

/// Snapshot of the video element's on-screen box, in the coordinate frame of
/// the overlay's parent container. Ephemeral: derived per layout change,
/// never persisted.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A box is usable once it has a positive, finite size. The video's
    /// rendered box is often zero-sized on first paint; consumers must treat
    /// that as "not ready" and decline to transform or render.
    pub fn is_ready(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}
