//! Error types for the annotator.
//!
//! The selection state machine and the selector codec never fail: lookups
//! return `Option`, malformed numbers surface as NaN and stale references
//! degrade to no-ops. Errors only come from loading external JSON.

use thiserror::Error;

/// Errors that can occur while loading configuration or annotation JSON.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Drawing tool name not recognized
    #[error("Unknown drawing tool: {name}")]
    UnknownDrawingTool {
        /// The name that failed to parse
        name: String,
    },
}

impl AnnotatorError {
    /// Create an unknown drawing tool error.
    pub fn unknown_drawing_tool(name: impl Into<String>) -> Self {
        Self::UnknownDrawingTool { name: name.into() }
    }
}
