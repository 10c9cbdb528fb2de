use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    core::{BezPath, Position, REFERENCE_HEIGHT, REFERENCE_WIDTH, Scale, Size},
    error::{FramemarkError, FramemarkResult},
};

/// Maximum number of shapes in a single annotation record.
pub const MAX_OBJECTS_PER_RECORD: usize = 50;

/// Minimum authored stroke width in pixels.
pub const MIN_STROKE_WIDTH: f64 = 0.5;

/// Maximum authored stroke width in pixels.
pub const MAX_STROKE_WIDTH: f64 = 20.0;

/// Maximum length of a text shape's content.
pub const MAX_TEXT_LENGTH: usize = 500;

/// Variant tag of a drawn primitive. Unknown tags deserialize into
/// [`ShapeKind::Other`] so a record written by a newer serializer still
/// loads; reconstruction decides per shape whether it can display them.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Path,
    Rect,
    Circle,
    Text,
    #[serde(untagged)]
    Other(String),
}

impl ShapeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Path => "path",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Text => "text",
            Self::Other(tag) => tag,
        }
    }
}

/// One drawn primitive, using the persisted JSON field names.
///
/// Only `left`/`top` and `scaleX`/`scaleY` are resolution-dependent.
/// `width`/`height` are the intrinsic bounding box and `path` is the
/// intrinsic stroke geometry; both stay untouched across space conversions,
/// as do the authored style fields. Serializer fields this model does not
/// know about are carried through `extra` verbatim.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: ShapeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,

    #[serde(default, rename = "scaleX", skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, rename = "scaleY", skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(
        default,
        rename = "strokeWidth",
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    /// Freehand stroke geometry, in the shape's local space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<BezPath>,

    /// Content of a text shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            left: None,
            top: None,
            scale_x: None,
            scale_y: None,
            width: None,
            height: None,
            stroke: None,
            stroke_width: None,
            fill: None,
            path: None,
            text: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Anchor with the "undrawn" default `(0, 0)` applied. The default is
    /// space-independent, so it is applied before any scaling.
    pub fn position(&self) -> Position {
        Position::new(self.left.unwrap_or(0.0), self.top.unwrap_or(0.0))
    }

    /// Size factors with the default `(1, 1)` applied.
    pub fn scale(&self) -> Scale {
        Scale::new(self.scale_x.unwrap_or(1.0), self.scale_y.unwrap_or(1.0))
    }

    pub fn size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Size::new(w, h)),
            _ => None,
        }
    }

    pub fn set_position(&mut self, p: Position) {
        self.left = Some(p.left);
        self.top = Some(p.top);
    }

    pub fn set_scale(&mut self, s: Scale) {
        self.scale_x = Some(s.x);
        self.scale_y = Some(s.y);
    }

    pub fn validate(&self) -> FramemarkResult<()> {
        for (name, v) in [
            ("left", self.left),
            ("top", self.top),
            ("scaleX", self.scale_x),
            ("scaleY", self.scale_y),
            ("width", self.width),
            ("height", self.height),
        ] {
            if let Some(v) = v
                && !v.is_finite()
            {
                return Err(FramemarkError::validation(format!(
                    "shape '{}' has non-finite {name} ({v})",
                    self.kind.as_str()
                )));
            }
        }

        if let Some(w) = self.stroke_width {
            if !w.is_finite() || !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&w) {
                return Err(FramemarkError::validation(format!(
                    "stroke width must be between {MIN_STROKE_WIDTH} and {MAX_STROKE_WIDTH}, got {w}"
                )));
            }
        }

        if let Some(text) = &self.text
            && text.chars().count() > MAX_TEXT_LENGTH
        {
            return Err(FramemarkError::validation(format!(
                "text content exceeds {MAX_TEXT_LENGTH} characters"
            )));
        }

        if let Some(stroke) = &self.stroke {
            validate_color(stroke)?;
        }
        if let Some(fill) = &self.fill {
            validate_color(fill)?;
        }

        Ok(())
    }
}

/// Accepts `#RRGGBB` / `#RRGGBBAA`; non-hash color strings (named colors,
/// `rgba(...)`, `transparent`) pass through untouched.
fn validate_color(color: &str) -> FramemarkResult<()> {
    if !color.starts_with('#') {
        return Ok(());
    }
    let hex = &color[1..];
    if (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(());
    }
    Err(FramemarkError::validation(format!(
        "invalid color '{color}', expected #RRGGBB or #RRGGBBAA"
    )))
}

/// The persisted canvas envelope. `width`/`height` are always the reference
/// constants; `originalWidth`/`originalHeight` record the capture-time
/// display size for diagnostics only and are never consulted when
/// denormalizing (the inverse transform always targets the current viewer's
/// box, which may differ again from capture time).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasData {
    pub objects: Vec<Shape>,
    pub width: f64,
    pub height: f64,
    pub original_width: f64,
    pub original_height: f64,
}

impl CanvasData {
    pub fn validate(&self) -> FramemarkResult<()> {
        if self.width != REFERENCE_WIDTH || self.height != REFERENCE_HEIGHT {
            return Err(FramemarkError::malformed_record(format!(
                "envelope dimensions {}x{} are not the reference space {REFERENCE_WIDTH}x{REFERENCE_HEIGHT}",
                self.width, self.height
            )));
        }
        if self.objects.len() > MAX_OBJECTS_PER_RECORD {
            return Err(FramemarkError::malformed_record(format!(
                "envelope has {} objects, maximum is {MAX_OBJECTS_PER_RECORD}",
                self.objects.len()
            )));
        }
        Ok(())
    }

    /// Parse an envelope out of a raw stored value. A value missing
    /// `objects` or the reference dimensions is a malformed record.
    pub fn from_value(value: serde_json::Value) -> FramemarkResult<Self> {
        let data: Self = serde_json::from_value(value)
            .map_err(|e| FramemarkError::malformed_record(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }
}

/// A capture-side annotation, ready to hand to the persistence collaborator.
/// The store assigns `id` and `created_at`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotationDraft {
    pub project_id: Uuid,
    pub timestamp_ms: i64,
    pub canvas_data: CanvasData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A persisted annotation. Immutable after creation in this core's scope;
/// read many times by the overlay pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotationRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Millisecond offset into the source video; the annotation's temporal
    /// identity. Near-duplicate timestamps are a product concern, not
    /// enforced here.
    pub timestamp_ms: i64,
    pub canvas_data: CanvasData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
