//! Shared constants for the canvas crate.

// ── Pen ─────────────────────────────────────────────────────────

/// Pen color at session start.
pub const DEFAULT_PEN_COLOR: &str = "#000000";

/// Pen width at session start, in canvas units.
pub const DEFAULT_PEN_WIDTH: f64 = 2.0;

/// Canvas background; the eraser paints with it.
pub const BACKGROUND_COLOR: &str = "#FFFFFF";

/// Eraser stroke width, in canvas units.
pub const ERASER_WIDTH: f64 = 20.0;

// ── Shape defaults ──────────────────────────────────────────────

/// Default top-left corner for toolbar-created shapes and text.
pub const DEFAULT_ORIGIN: f64 = 100.0;

/// Default rectangle fill.
pub const RECT_FILL: &str = "#ADD8E6";

/// Default ellipse fill.
pub const ELLIPSE_FILL: &str = "#FFC0CB";

/// Outline color for rectangles and ellipses.
pub const SHAPE_STROKE: &str = "#000000";

/// Outline width for rectangles and ellipses.
pub const SHAPE_STROKE_WIDTH: f64 = 1.0;

/// Placeholder content for new text objects.
pub const TEXT_PLACEHOLDER: &str = "Type here";

/// Default text font family.
pub const TEXT_FONT_FAMILY: &str = "Arial";

/// Default text font size.
pub const TEXT_FONT_SIZE: f64 = 20.0;
