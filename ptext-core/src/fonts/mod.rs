//! Glyph width lookup for fonts referenced from content streams
//!
//! Only the metrics needed to advance the text position are read: the
//! `/Widths` array of simple fonts and the `/W` table of CID-keyed fonts.

mod cid_widths;

pub use cid_widths::{CidWidths, DEFAULT_CID_WIDTH};

use crate::document::Document;
use crate::objects::{Dictionary, Object};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
enum Metrics {
    /// One byte per character code
    Simple {
        first_char: u32,
        widths: Vec<Decimal>,
        missing_width: Decimal,
    },
    /// Two bytes per character code, mapped to CIDs by identity
    Composite(CidWidths),
}

/// A font resource, reduced to what text positioning needs.
///
/// Cloning a font copies its width cache.
#[derive(Debug, Clone)]
pub struct Font {
    base_font: Option<String>,
    metrics: Metrics,
}

impl Font {
    /// Reads a font dictionary. Missing or malformed entries fall back to
    /// their defaults, so this never fails.
    pub fn from_dictionary(dict: &Dictionary, document: &Document) -> Self {
        let base_font = document
            .resolve_key(dict, "BaseFont")
            .and_then(Object::as_name)
            .map(str::to_string);

        if document.resolve_key(dict, "Subtype").and_then(Object::as_name) == Some("Type0") {
            let descendant = document
                .resolve_key(dict, "DescendantFonts")
                .and_then(Object::as_array)
                .and_then(|fonts| fonts.first())
                .and_then(|font| document.resolve(font))
                .and_then(Object::as_dict);
            let widths = match descendant {
                Some(descendant) => CidWidths::from_font_dictionary(descendant, document),
                None => CidWidths::new(Vec::new(), None),
            };
            return Self {
                base_font,
                metrics: Metrics::Composite(widths),
            };
        }

        let first_char = document
            .resolve_key(dict, "FirstChar")
            .and_then(Object::as_integer)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);
        let missing_width = document
            .resolve_key(dict, "FontDescriptor")
            .and_then(Object::as_dict)
            .and_then(|descriptor| document.resolve_key(descriptor, "MissingWidth"))
            .and_then(Object::as_number)
            .unwrap_or(Decimal::ZERO);
        let widths = document
            .resolve_key(dict, "Widths")
            .and_then(Object::as_array)
            .map(|widths| {
                widths
                    .iter()
                    .map(|width| {
                        document
                            .resolve(width)
                            .and_then(Object::as_number)
                            .unwrap_or(missing_width)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            base_font,
            metrics: Metrics::Simple {
                first_char,
                widths,
                missing_width,
            },
        }
    }

    /// Font used when the current font cannot be found in the resources.
    /// Every glyph has width 0.
    pub fn fallback() -> Self {
        Self {
            base_font: None,
            metrics: Metrics::Simple {
                first_char: 0,
                widths: Vec::new(),
                missing_width: Decimal::ZERO,
            },
        }
    }

    pub fn base_font(&self) -> Option<&str> {
        self.base_font.as_deref()
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.metrics, Metrics::Composite(_))
    }

    pub fn bytes_per_code(&self) -> usize {
        match self.metrics {
            Metrics::Simple { .. } => 1,
            Metrics::Composite(_) => 2,
        }
    }

    /// Splits string bytes into character codes. A trailing odd byte of a
    /// two-byte font is taken as a code on its own.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks(self.bytes_per_code())
            .map(|chunk| chunk.iter().fold(0u32, |code, &b| (code << 8) | u32::from(b)))
            .collect()
    }

    /// Width of `code` in thousandths of text space.
    pub fn width(&self, code: u32) -> Decimal {
        match &self.metrics {
            Metrics::Simple {
                first_char,
                widths,
                missing_width,
            } => code
                .checked_sub(*first_char)
                .and_then(|index| widths.get(index as usize))
                .copied()
                .unwrap_or(*missing_width),
            Metrics::Composite(widths) => widths.width(code),
        }
    }
}
