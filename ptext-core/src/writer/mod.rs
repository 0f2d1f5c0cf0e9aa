//! PDF writing functionality
//!
//! Values are written by [`WriteTransformer`]s chosen from a
//! [`TransformerRegistry`]; a [`WriteTransformerContext`] carries the
//! destination and the object-number table through one session.

mod context;
pub mod format;
mod registry;
pub mod transformers;

pub use context::WriteTransformerContext;
pub use registry::{TransformerRegistry, WriteTransformer};

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Options for [`PdfWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Version written in the `%PDF-` header.
    pub version: String,
    /// Write the binary comment line after the header.
    pub binary_marker: bool,
    /// Flate-encode streams that carry no filter yet.
    pub compress_streams: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            binary_marker: true,
            compress_streams: false,
        }
    }
}

impl WriterOptions {
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_binary_marker(mut self, binary_marker: bool) -> Self {
        self.binary_marker = binary_marker;
        self
    }

    pub fn with_compression(mut self, compress_streams: bool) -> Self {
        self.compress_streams = compress_streams;
        self
    }
}

/// Writes a whole [`Document`] as a PDF file.
///
/// Object numbers are assigned on first encounter while walking from the
/// trailer, and objects are written in that order, followed by the
/// cross-reference table and the trailer.
///
/// # Example
///
/// ```rust
/// use ptext::{Dictionary, Document, PdfWriter};
///
/// let mut doc = Document::new();
/// doc.add_page(Dictionary::new()).unwrap();
///
/// let mut buffer = Vec::new();
/// PdfWriter::new_with_writer(&mut buffer).write_document(&doc).unwrap();
/// assert!(buffer.starts_with(b"%PDF-1.7"));
/// ```
pub struct PdfWriter<W: Write> {
    writer: W,
    options: WriterOptions,
    registry: TransformerRegistry,
    xref_positions: BTreeMap<u32, u64>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self::with_options(writer, WriterOptions::default())
    }

    pub fn with_options(writer: W, options: WriterOptions) -> Self {
        Self {
            writer,
            options,
            registry: TransformerRegistry::new(),
            xref_positions: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Adds a transformer consulted before the built-in ones.
    pub fn register(&mut self, transformer: impl WriteTransformer + 'static) {
        self.registry.register(transformer);
    }

    pub fn registry_mut(&mut self) -> &mut TransformerRegistry {
        &mut self.registry
    }

    /// Byte offset of every object written by the last call to
    /// [`PdfWriter::write_document`], keyed by object number.
    pub fn xref_positions(&self) -> &BTreeMap<u32, u64> {
        &self.xref_positions
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_document(&mut self, document: &Document) -> Result<()> {
        let mut ctx = WriteTransformerContext::new(&mut self.writer, document, &self.registry)
            .with_compression(self.options.compress_streams);

        write_header(&mut ctx, &self.options)?;

        for value in document.trailer().values() {
            ctx.collect_references(value)?;
        }
        while let Some(handle) = ctx.next_pending() {
            ctx.write_indirect(handle)?;
        }

        let xref_position = ctx.position();
        write_xref(&mut ctx)?;
        write_trailer(&mut ctx, document.trailer(), xref_position)?;
        if ctx.has_pending() {
            return Err(PdfError::InvalidStructure(
                "trailer links to an object that was not written".to_string(),
            ));
        }

        debug!(
            objects = ctx.object_count(),
            bytes = ctx.position(),
            "document written"
        );
        self.xref_positions = ctx.into_offsets();
        self.writer.flush()?;
        Ok(())
    }
}

impl PdfWriter<BufWriter<std::fs::File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new_with_writer(BufWriter::new(file)))
    }
}

fn write_header(ctx: &mut WriteTransformerContext<'_>, options: &WriterOptions) -> Result<()> {
    if !crate::pdf_version::SUPPORTED_VERSIONS.contains(&options.version.as_str()) {
        warn!(version = options.version.as_str(), "writing an unsupported PDF version");
    }
    ctx.write_str(&format!("%PDF-{}\n", options.version))?;
    if options.binary_marker {
        // Binary comment to ensure file is treated as binary
        ctx.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
    }
    Ok(())
}

fn write_xref(ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
    let size = ctx.object_count() as u32 + 1;
    ctx.write_str(&format!("xref\n0 {size}\n"))?;
    ctx.write_bytes(b"0000000000 65535 f \n")?;

    for number in 1..size {
        match ctx.offsets().get(&number).copied() {
            Some(position) => ctx.write_str(&format!("{position:010} 00000 n \n"))?,
            None => ctx.write_bytes(b"0000000000 00000 f \n")?,
        }
    }
    Ok(())
}

fn write_trailer(
    ctx: &mut WriteTransformerContext<'_>,
    entries: &Dictionary,
    xref_position: u64,
) -> Result<()> {
    let mut trailer = Dictionary::with_capacity(entries.len() + 1);
    trailer.set("Size", ctx.object_count() + 1);
    for (key, value) in entries.iter() {
        if key != "Size" {
            trailer.set(key.clone(), value.clone());
        }
    }

    ctx.write_bytes(b"trailer\n")?;
    ctx.write_value(&Object::Dictionary(trailer))?;
    ctx.write_str(&format!("\nstartxref\n{xref_position}\n%%EOF\n"))
}

/// Writes a single value as it would appear inline, using the built-in
/// transformers. Links to referenceable values are numbered from 1 but the
/// values themselves are not written.
pub fn serialize(object: &Object, document: &Document) -> Result<Vec<u8>> {
    let registry = TransformerRegistry::new();
    let mut buffer = Vec::new();
    let mut ctx = WriteTransformerContext::new(&mut buffer, document, &registry);
    ctx.write_value(object)?;
    drop(ctx);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Array, Stream};
    use pretty_assertions::assert_eq;

    fn write(doc: &Document, options: WriterOptions) -> (String, BTreeMap<u32, u64>) {
        let mut writer = PdfWriter::with_options(Vec::new(), options);
        writer.write_document(doc).unwrap();
        let positions = writer.xref_positions().clone();
        (
            String::from_utf8_lossy(&writer.into_inner()).into_owned(),
            positions,
        )
    }

    #[test]
    fn test_write_header() {
        let doc = Document::new();
        let (output, _) = write(&doc, WriterOptions::default().with_version("2.0"));
        assert!(output.starts_with("%PDF-2.0\n%"));

        let (output, _) = write(&doc, WriterOptions::default().with_binary_marker(false));
        assert!(output.starts_with("%PDF-1.7\n1 0 obj\n"));
    }

    #[test]
    fn test_write_empty_document() {
        let doc = Document::new();
        let (output, positions) = write(&doc, WriterOptions::default().with_binary_marker(false));

        assert_eq!(
            output,
            "%PDF-1.7\n\
             1 0 obj\n<<\n/Type /Catalog\n/Pages 2 0 R\n>>\nendobj\n\
             2 0 obj\n<<\n/Type /Pages\n/Kids []\n/Count 0\n>>\nendobj\n\
             xref\n0 3\n\
             0000000000 65535 f \n\
             0000000009 00000 n \n\
             0000000058 00000 n \n\
             trailer\n<<\n/Size 3\n/Root 1 0 R\n>>\n\
             startxref\n110\n%%EOF\n"
        );
        assert_eq!(positions.get(&1), Some(&9));
        assert_eq!(positions.get(&2), Some(&58));
    }

    #[test]
    fn test_shared_dictionary_written_once() {
        let mut doc = Document::new();
        let mut font = Dictionary::new();
        font.set("Type", Object::name("Font"));
        let font = doc.add(font);

        for _ in 0..2 {
            let mut fonts = Dictionary::new();
            fonts.set("F1", font);
            let mut resources = Dictionary::new();
            resources.set("Font", fonts);
            let mut page = Dictionary::new();
            page.set("Resources", resources);
            doc.add_page(page).unwrap();
        }

        let (output, _) = write(&doc, WriterOptions::default());
        assert_eq!(output.matches("/Type /Font").count(), 1);
        // catalog 1, pages 2, pages' kids 3 and 4, then the font
        assert_eq!(output.matches("/F1 5 0 R").count(), 2);
        assert_eq!(output.matches("/Parent 2 0 R").count(), 2);
        assert!(output.contains("/Kids [3 0 R 4 0 R]"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut doc = Document::new();
        doc.set_title("Offsets");
        let content = doc.add(Stream::new(b"BT ET".to_vec()));
        let mut page = Dictionary::new();
        page.set("Contents", content);
        doc.add_page(page).unwrap();

        let mut writer = PdfWriter::new_with_writer(Vec::new());
        writer.write_document(&doc).unwrap();
        let positions = writer.xref_positions().clone();
        let bytes = writer.into_inner();

        for (number, offset) in positions {
            let expected = format!("{number} 0 obj\n");
            let offset = offset as usize;
            assert_eq!(&bytes[offset..offset + expected.len()], expected.as_bytes());
        }
    }

    #[test]
    fn test_trailer_lists_size_first() {
        let mut doc = Document::new();
        doc.set_author("Tester");
        let (output, _) = write(&doc, WriterOptions::default());

        let trailer = &output[output.find("trailer\n").unwrap()..];
        assert!(trailer.starts_with("trailer\n<<\n/Size 4\n/Root 1 0 R\n/Info 2 0 R\n>>"));
        assert!(output.contains("2 0 obj\n<<\n/Author (Tester)\n>>\nendobj"));
    }

    #[test]
    fn test_referenceable_self_cycle() {
        let mut doc = Document::new();
        let node = doc.add(Dictionary::new());
        if let Some(Object::Dictionary(dict)) = doc.get_mut(node) {
            dict.set("Self", node);
        }
        doc.trailer_mut().set("Extra", node);

        let (output, _) = write(&doc, WriterOptions::default());
        assert!(output.contains("2 0 obj\n<<\n/Self 2 0 R\n>>\nendobj"));
    }

    #[test]
    fn test_inline_stream_in_trailer_fails() {
        let mut doc = Document::new();
        let stream = doc.add_inline(Stream::new(Vec::new()));
        let mut holder = Array::new();
        holder.push(stream);
        doc.trailer_mut().set("Holder", holder);

        let mut writer = PdfWriter::new_with_writer(Vec::new());
        let result = writer.write_document(&doc);
        assert!(matches!(result, Err(PdfError::ContractViolation(_))));
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_compress_streams_option() {
        let mut doc = Document::new();
        let content = b"0 0 m 100 100 l S ".repeat(20);
        let stream = doc.add(Stream::new(content));
        doc.trailer_mut().set("Probe", stream);

        let (output, _) = write(&doc, WriterOptions::default().with_compression(true));
        assert!(output.contains("/Filter /FlateDecode"));
        assert!(!output.contains("100 100 l"));
    }

    #[test]
    fn test_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");

        let mut doc = Document::new();
        doc.add_page(Dictionary::new()).unwrap();
        let mut writer = PdfWriter::create(&path).unwrap();
        writer.write_document(&doc).unwrap();
        drop(writer);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }
}
