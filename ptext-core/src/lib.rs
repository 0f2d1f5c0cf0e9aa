//! # ptext
//!
//! The core of a PDF toolkit: a polymorphic object serializer and a
//! content-stream interpreter.
//!
//! ## Features
//!
//! - **Object model**: PDF values held in a [`Document`] arena, linked by
//!   non-owning handles so shared and cyclic graphs are representable
//! - **Serialization**: a registry of [`WriteTransformer`]s turns the graph
//!   into a PDF file body, numbering each shared object exactly once
//! - **Content interpretation**: graphics-state tracking, marked content and
//!   `BX`/`EX` compatibility sections, with render events delivered to
//!   listeners
//! - **Font metrics**: glyph widths from `/Widths` and CID `/W` tables
//!
//! ## Quick Start
//!
//! ### Writing a document
//!
//! ```rust
//! use ptext::{Dictionary, Document, Object, PdfWriter, Result};
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::new();
//! doc.set_title("Hello");
//!
//! let mut page = Dictionary::new();
//! page.set(
//!     "MediaBox",
//!     vec![Object::from(0), Object::from(0), Object::from(612), Object::from(792)],
//! );
//! doc.add_page(page)?;
//!
//! let mut writer = PdfWriter::new_with_writer(Vec::new());
//! writer.write_document(&doc)?;
//! let bytes = writer.into_inner();
//! assert!(bytes.starts_with(b"%PDF-1.7\n"));
//! assert!(bytes.ends_with(b"%%EOF\n"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Listening to a content stream
//!
//! ```rust
//! use ptext::canvas::{CanvasStreamProcessor, Event};
//! use ptext::{Document, Result};
//!
//! # fn main() -> Result<()> {
//! let doc = Document::new();
//! let mut strokes = 0;
//! let mut listener = |event: &Event| {
//!     if let Event::LineRender { .. } = event {
//!         strokes += 1;
//!     }
//! };
//! CanvasStreamProcessor::new(&doc)
//!     .with_listener(&mut listener)
//!     .process_content(b"q 0 0 m 100 0 l 100 100 l S Q")?;
//! assert_eq!(strokes, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`objects`] - PDF values and object handles
//! - [`document`] - The object arena and document structure
//! - [`writer`] - Write transformers and the file writer
//! - [`parser`] - Content stream tokenizer
//! - [`canvas`] - Content stream interpretation and render events
//! - [`fonts`] - Glyph width lookup
//! - [`geometry`] - Points, segments and matrices

pub mod canvas;
pub mod document;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod objects;
pub mod parser;
pub mod writer;

pub use canvas::{CanvasStreamProcessor, Event, EventListener};
pub use document::Document;
pub use error::{ErrorCategory, PdfError, Result};
pub use objects::{Array, Dictionary, Object, ObjectHandle, ObjectId, Stream};
pub use writer::{
    serialize, PdfWriter, TransformerRegistry, WriteTransformer, WriteTransformerContext,
    WriterOptions,
};

/// Current version of ptext
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Versions accepted in the `%PDF-` header
pub mod pdf_version {
    pub const SUPPORTED_VERSIONS: &[&str] =
        &["1.0", "1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "2.0"];
}
