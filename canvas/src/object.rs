//! Object model: drawable kinds, identity, and the plain record form.
//!
//! A [`DrawableObject`] pairs an immutable [`ObjectId`] with a kind-specific
//! [`Shape`]. The record form used on the wire and in exports is
//!
//! ```json
//! { "id": "…", "kind": "rectangle", "props": { "left": 0, "top": 0, … } }
//! ```
//!
//! Geometry fields inside `props` are required; style fields fall back to
//! defaults. Nothing here touches the network or a renderer.

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::consts::{
    DEFAULT_ORIGIN, ELLIPSE_FILL, RECT_FILL, SHAPE_STROKE, SHAPE_STROKE_WIDTH, TEXT_FONT_FAMILY,
    TEXT_FONT_SIZE, TEXT_PLACEHOLDER,
};
use crate::error::CanvasError;
use crate::input::Pen;

/// Plain structured record for one object (`{id, kind, props}`).
pub type Record = Value;

/// Opaque, stable identity of a drawable object.
///
/// Generated once at creation and carried verbatim across the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Fresh identity backed by a v4 UUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of a drawable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Freehand polyline.
    Stroke,
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse inscribed within its bounds.
    Ellipse,
    /// Single block of text.
    Text,
}

impl ObjectKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stroke => "stroke",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Text => "text",
        }
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stroke" => Ok(Self::Stroke),
            "rectangle" | "rect" => Ok(Self::Rectangle),
            "ellipse" | "circle" => Ok(Self::Ellipse),
            "text" => Ok(Self::Text),
            other => Err(CanvasError::malformed(format!("unknown kind: {other}"))),
        }
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn default_stroke_color() -> String {
    SHAPE_STROKE.to_owned()
}

fn default_stroke_width() -> f64 {
    SHAPE_STROKE_WIDTH
}

fn default_fill() -> String {
    "transparent".to_owned()
}

fn default_font_family() -> String {
    TEXT_FONT_FAMILY.to_owned()
}

fn default_font_size() -> f64 {
    TEXT_FONT_SIZE
}

/// Freehand stroke payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeShape {
    pub points: Vec<Point>,
    #[serde(default = "default_stroke_color")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

/// Bounded shape payload shared by rectangles and ellipses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default = "default_stroke_color")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

/// Text payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShape {
    pub left: f64,
    pub top: f64,
    pub content: String,
    #[serde(default = "default_stroke_color")]
    pub fill: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

/// Kind-specific geometry and style.
///
/// Every variant holds owned data only, so `clone` is a total structural
/// copy; history snapshots rely on that.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Stroke(StrokeShape),
    Rectangle(BoxShape),
    Ellipse(BoxShape),
    Text(TextShape),
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Stroke(_) => ObjectKind::Stroke,
            Self::Rectangle(_) => ObjectKind::Rectangle,
            Self::Ellipse(_) => ObjectKind::Ellipse,
            Self::Text(_) => ObjectKind::Text,
        }
    }

    /// Parse a `props` value for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::MalformedObject`] when required geometry is
    /// absent or mistyped, or a stroke has no points.
    pub fn from_props(kind: ObjectKind, props: Value) -> Result<Self, CanvasError> {
        let malformed = |e: serde_json::Error| CanvasError::malformed(format!("{}: {e}", kind.as_str()));
        let shape = match kind {
            ObjectKind::Stroke => Self::Stroke(serde_json::from_value(props).map_err(malformed)?),
            ObjectKind::Rectangle => Self::Rectangle(serde_json::from_value(props).map_err(malformed)?),
            ObjectKind::Ellipse => Self::Ellipse(serde_json::from_value(props).map_err(malformed)?),
            ObjectKind::Text => Self::Text(serde_json::from_value(props).map_err(malformed)?),
        };
        if let Self::Stroke(stroke) = &shape {
            if stroke.points.is_empty() {
                return Err(CanvasError::malformed("stroke: no points"));
            }
        }
        Ok(shape)
    }

    /// The `props` value for this shape.
    #[must_use]
    pub fn props(&self) -> Value {
        let props = match self {
            Self::Stroke(s) => serde_json::to_value(s),
            Self::Rectangle(b) | Self::Ellipse(b) => serde_json::to_value(b),
            Self::Text(t) => serde_json::to_value(t),
        };
        props.unwrap_or_default()
    }
}

/// A drawable entity with a first-class identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableObject {
    id: ObjectId,
    shape: Shape,
}

impl DrawableObject {
    /// Assemble an object from an existing identity and shape.
    #[must_use]
    pub fn new(id: ObjectId, shape: Shape) -> Self {
        Self { id, shape }
    }

    #[must_use]
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mutable access to geometry and style. Identity stays fixed.
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }
}

/// Build a new object of `kind` with a fresh identity.
///
/// Default style comes from the kind (strokes and text take the pen color);
/// any field present in `initial` overrides the default.
///
/// # Errors
///
/// Returns [`CanvasError::MalformedObject`] when `initial` is not an object
/// or the merged props lack required geometry (a stroke without points).
pub fn create(kind: ObjectKind, initial: &Value, pen: &Pen) -> Result<DrawableObject, CanvasError> {
    let mut props = default_props(kind, pen);
    match initial {
        Value::Null => {}
        Value::Object(fields) => {
            for (key, value) in fields {
                props.insert(key.clone(), value.clone());
            }
        }
        _ => return Err(CanvasError::malformed("initial props must be an object")),
    }
    let shape = Shape::from_props(kind, Value::Object(props))?;
    Ok(DrawableObject::new(ObjectId::generate(), shape))
}

fn default_props(kind: ObjectKind, pen: &Pen) -> Map<String, Value> {
    let value = match kind {
        ObjectKind::Stroke => serde_json::json!({
            "stroke": pen.stroke_color(),
            "stroke_width": pen.stroke_width(),
        }),
        ObjectKind::Rectangle => serde_json::json!({
            "left": DEFAULT_ORIGIN,
            "top": DEFAULT_ORIGIN,
            "width": 100.0,
            "height": 100.0,
            "fill": RECT_FILL,
            "stroke": SHAPE_STROKE,
            "stroke_width": SHAPE_STROKE_WIDTH,
        }),
        ObjectKind::Ellipse => serde_json::json!({
            "left": DEFAULT_ORIGIN,
            "top": DEFAULT_ORIGIN,
            "width": 100.0,
            "height": 80.0,
            "fill": ELLIPSE_FILL,
            "stroke": SHAPE_STROKE,
            "stroke_width": SHAPE_STROKE_WIDTH,
        }),
        ObjectKind::Text => serde_json::json!({
            "left": DEFAULT_ORIGIN,
            "top": DEFAULT_ORIGIN,
            "content": TEXT_PLACEHOLDER,
            "fill": pen.color(),
            "font_family": TEXT_FONT_FAMILY,
            "font_size": TEXT_FONT_SIZE,
        }),
    };
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Record form of `obj`. Always carries the identity.
#[must_use]
pub fn serialize(obj: &DrawableObject) -> Record {
    serde_json::json!({
        "id": obj.id.as_str(),
        "kind": obj.kind().as_str(),
        "props": obj.shape.props(),
    })
}

/// Parse a record back into an object, preserving its identity verbatim.
///
/// # Errors
///
/// Returns [`CanvasError::MalformedObject`] when the identity is missing or
/// empty, the kind is unknown, or the props lack required geometry.
pub fn deserialize(record: &Record) -> Result<DrawableObject, CanvasError> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CanvasError::malformed("missing identity"))?;
    let kind: ObjectKind = record
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| CanvasError::malformed("missing kind"))?
        .parse()?;
    let props = record
        .get("props")
        .cloned()
        .ok_or_else(|| CanvasError::malformed("missing props"))?;
    let shape = Shape::from_props(kind, props)?;
    Ok(DrawableObject::new(ObjectId::from(id), shape))
}
