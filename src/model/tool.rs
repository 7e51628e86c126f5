//! Drawing tools a renderer can switch between.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;

/// Shape a renderer draws when the user starts a new selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingTool {
    /// Axis-aligned rectangle, stored as a media fragment
    #[default]
    Rect,
    /// Free polygon
    Polygon,
}

impl DrawingTool {
    /// Get the identifier used by hosts to pick this tool.
    pub fn name(&self) -> &'static str {
        match self {
            DrawingTool::Rect => "rect",
            DrawingTool::Polygon => "polygon",
        }
    }

    /// Get all available drawing tools.
    pub fn all() -> &'static [DrawingTool] {
        &[DrawingTool::Rect, DrawingTool::Polygon]
    }
}

impl FromStr for DrawingTool {
    type Err = AnnotatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrawingTool::all()
            .iter()
            .copied()
            .find(|tool| tool.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnnotatorError::unknown_drawing_tool(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_names() {
        assert_eq!("rect".parse::<DrawingTool>().unwrap(), DrawingTool::Rect);
        assert_eq!(" Polygon ".parse::<DrawingTool>().unwrap(), DrawingTool::Polygon);
    }

    #[test]
    fn test_unknown_tool() {
        let err = "ellipse".parse::<DrawingTool>().unwrap_err();
        assert!(matches!(err, AnnotatorError::UnknownDrawingTool { ref name } if name == "ellipse"));
    }

    #[test]
    fn test_names_roundtrip() {
        for tool in DrawingTool::all() {
            assert_eq!(tool.name().parse::<DrawingTool>().unwrap(), *tool);
        }
    }
}
