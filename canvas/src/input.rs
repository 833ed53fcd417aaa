//! Input model: the active freehand tool and pen settings.
//!
//! `Pen` captures the user's drawing intent at the moment a stroke or text
//! object is created. The eraser is a pen that paints with the background
//! color at a wider width.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{BACKGROUND_COLOR, DEFAULT_PEN_COLOR, DEFAULT_PEN_WIDTH, ERASER_WIDTH};

/// Which freehand tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Draw with the pen color (default).
    #[default]
    Pen,
    /// Paint over with the background color.
    Eraser,
}

impl std::str::FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pen" => Ok(Self::Pen),
            "eraser" => Ok(Self::Eraser),
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

/// Current tool, color and width.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    tool: Tool,
    color: String,
    width: f64,
}

impl Default for Pen {
    fn default() -> Self {
        Self { tool: Tool::Pen, color: DEFAULT_PEN_COLOR.to_owned(), width: DEFAULT_PEN_WIDTH }
    }
}

impl Pen {
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// The user-selected color, regardless of tool.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    /// Non-positive or non-finite widths are ignored.
    pub fn set_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.width = width;
        }
    }

    /// Color a freehand stroke is drawn with under the active tool.
    #[must_use]
    pub fn stroke_color(&self) -> &str {
        match self.tool {
            Tool::Pen => &self.color,
            Tool::Eraser => BACKGROUND_COLOR,
        }
    }

    /// Width a freehand stroke is drawn with under the active tool.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        match self.tool {
            Tool::Pen => self.width,
            Tool::Eraser => ERASER_WIDTH,
        }
    }
}
