//! Render events emitted while a content stream is interpreted.
//!
//! Events are delivered synchronously, in emission order, to every listener
//! before the interpreter moves on to the next instruction.

use crate::canvas::color::Color;
use crate::canvas::state::CanvasGraphicsState;
use crate::geometry::{LineSegment, Point};
use crate::objects::{Dictionary, ObjectHandle};
use rust_decimal::Decimal;

/// One glyph of a shown string.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Character code as it appears in the string
    pub code: u32,
    /// Width in glyph space (thousandths of text space)
    pub width: Decimal,
}

/// A string shown by `Tj`, `TJ`, `'` or `"`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Start of the baseline in user space
    pub position: Point,
    /// Raw string bytes
    pub text: Vec<u8>,
    pub glyphs: Vec<Glyph>,
    /// Horizontal advance of the whole chunk in text space
    pub width: Decimal,
    /// Resource name of the font
    pub font: Option<String>,
    pub font_size: Decimal,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    BeginPage(ObjectHandle),
    EndPage(ObjectHandle),
    BeginText,
    EndText,
    /// A stroked segment, with the graphics state it was painted in
    LineRender {
        graphics_state: Box<CanvasGraphicsState>,
        segment: LineSegment,
    },
    ChunkOfTextRender(TextChunk),
    BeginMarkedContent {
        tag: String,
        properties: Option<Dictionary>,
    },
    EndMarkedContent {
        tag: String,
    },
}

pub trait EventListener {
    fn on_event(&mut self, event: &Event);
}

/// Listener that keeps every event it receives, in order.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Text of every chunk, concatenated in emission order.
    pub fn text(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::ChunkOfTextRender(chunk) => Some(chunk.text.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }
}

impl EventListener for EventCollector {
    fn on_event(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

impl<F: FnMut(&Event)> EventListener for F {
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}
