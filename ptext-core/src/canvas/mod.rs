//! Content stream interpretation
//!
//! A [`CanvasStreamProcessor`] reads a content stream, pushes operands, and
//! dispatches every operator token to the [`CanvasOperator`] registered for
//! it. Operators update the [`Canvas`] (graphics state, its save/restore
//! stack, open marked-content sequences) and emit [`Event`]s to listeners.
//!
//! # Example
//!
//! ```rust
//! use ptext::canvas::{CanvasStreamProcessor, Event, EventCollector};
//! use ptext::Document;
//!
//! let doc = Document::new();
//! let mut events = EventCollector::new();
//! let mut processor = CanvasStreamProcessor::new(&doc).with_listener(&mut events);
//! processor.process_content(b"BT /F1 12 Tf (Hi) Tj ET").unwrap();
//! drop(processor);
//!
//! assert_eq!(events.events().first(), Some(&Event::BeginText));
//! assert_eq!(events.text(), b"Hi");
//! ```

pub mod color;
pub mod event;
pub mod operator;
mod processor;
pub mod state;

pub use color::{Color, ColorSpace, ColorSpaceFamily};
pub use event::{Event, EventCollector, EventListener, Glyph, TextChunk};
pub use operator::{CanvasOperator, OperatorRegistry};
pub use processor::{CanvasStreamProcessor, ProcessorOptions};
pub use state::{CanvasGraphicsState, Path};

use crate::error::{PdfError, Result};

/// Interpreter state that outlives single operators: the current graphics
/// state, saved states, open marked-content tags and the compatibility
/// section nesting.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    pub graphics_state: CanvasGraphicsState,
    graphics_state_stack: Vec<CanvasGraphicsState>,
    marked_content_stack: Vec<String>,
    compatibility_depth: usize,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a copy of the current graphics state (`q`).
    pub fn save_state(&mut self) {
        self.graphics_state_stack.push(self.graphics_state.clone());
    }

    /// Restores the most recently saved graphics state (`Q`).
    pub fn restore_state(&mut self) -> Result<()> {
        self.graphics_state = self
            .graphics_state_stack
            .pop()
            .ok_or(PdfError::GraphicsStateUnderflow)?;
        Ok(())
    }

    pub fn graphics_state_depth(&self) -> usize {
        self.graphics_state_stack.len()
    }

    pub fn begin_marked_content(&mut self, tag: impl Into<String>) {
        self.marked_content_stack.push(tag.into());
    }

    /// Closes the innermost marked-content sequence and returns its tag.
    pub fn end_marked_content(&mut self) -> Result<String> {
        self.marked_content_stack
            .pop()
            .ok_or(PdfError::MarkedContentUnderflow)
    }

    /// Tags of the open marked-content sequences, outermost first.
    pub fn marked_content(&self) -> &[String] {
        &self.marked_content_stack
    }

    pub fn begin_compatibility_section(&mut self) {
        self.compatibility_depth += 1;
    }

    /// Returns `false` when no section was open.
    pub fn end_compatibility_section(&mut self) -> bool {
        if self.compatibility_depth == 0 {
            return false;
        }
        self.compatibility_depth -= 1;
        true
    }

    pub fn in_compatibility_section(&self) -> bool {
        self.compatibility_depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_save_restore_round_trip() {
        let mut canvas = Canvas::new();
        let original = canvas.graphics_state.clone();

        for i in 0..3 {
            canvas.save_state();
            canvas.graphics_state.line_width = Decimal::from(i + 2);
        }
        assert_eq!(canvas.graphics_state_depth(), 3);
        for _ in 0..3 {
            canvas.restore_state().unwrap();
        }
        assert_eq!(canvas.graphics_state, original);
        assert!(matches!(
            canvas.restore_state(),
            Err(PdfError::GraphicsStateUnderflow)
        ));
    }

    #[test]
    fn test_marked_content_stack() {
        let mut canvas = Canvas::new();
        canvas.begin_marked_content("Span");
        canvas.begin_marked_content("Artifact");
        assert_eq!(canvas.marked_content(), &["Span".to_string(), "Artifact".to_string()]);

        assert_eq!(canvas.end_marked_content().unwrap(), "Artifact");
        assert_eq!(canvas.end_marked_content().unwrap(), "Span");
        assert!(matches!(
            canvas.end_marked_content(),
            Err(PdfError::MarkedContentUnderflow)
        ));
    }

    #[test]
    fn test_compatibility_nesting() {
        let mut canvas = Canvas::new();
        assert!(!canvas.in_compatibility_section());
        canvas.begin_compatibility_section();
        canvas.begin_compatibility_section();
        assert!(canvas.end_compatibility_section());
        assert!(canvas.in_compatibility_section());
        assert!(canvas.end_compatibility_section());
        assert!(!canvas.in_compatibility_section());
        assert!(!canvas.end_compatibility_section());
    }
}
