//! End-to-end tests for the object serializer

use pretty_assertions::assert_eq;
use ptext::writer::transformers::DictionaryTransformer;
use ptext::{
    serialize, Dictionary, Document, Object, PdfError, PdfWriter, Stream, WriteTransformer,
    WriteTransformerContext, WriterOptions,
};
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write(doc: &Document) -> String {
    let mut writer = PdfWriter::with_options(Vec::new(), WriterOptions::default().with_binary_marker(false));
    writer.write_document(doc).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

fn media_box() -> Object {
    vec![Object::from(0), Object::from(0), Object::from(612), Object::from(792)].into()
}

#[test]
fn test_shared_dictionary_is_written_once() {
    init_tracing();
    let mut doc = Document::new();
    let mut font = Dictionary::new();
    font.set("Type", Object::name("Font"));
    font.set("BaseFont", Object::name("Helvetica"));
    let font = doc.add(font);

    let mut first = Dictionary::new();
    first.set("Font", font);
    let mut second = Dictionary::new();
    second.set("Font", font);
    let mut root = Dictionary::new();
    root.set("A", doc.add(first));
    root.set("B", doc.add(second));
    let root = doc.add(root);
    doc.trailer_mut().set("Extra", root);

    let output = write(&doc);
    assert_eq!(output.matches("/BaseFont /Helvetica").count(), 1);

    let font_ref = output
        .lines()
        .find(|line| line.starts_with("/Font "))
        .unwrap()
        .trim_start_matches("/Font ")
        .to_string();
    assert_eq!(output.matches(&format!("/Font {font_ref}")).count(), 2);
    let number = font_ref.trim_end_matches(" 0 R");
    assert_eq!(output.matches(&format!("\n{number} 0 obj\n")).count(), 1);
}

#[test]
fn test_page_gains_parent_and_inlines_media_box() {
    let mut doc = Document::new();
    // MediaBox stored as a referenceable value still writes inline
    let media_box = doc.add(media_box());
    let mut page = Dictionary::new();
    page.set("MediaBox", media_box);
    doc.add_page(page).unwrap();

    let output = write(&doc);
    assert!(output.contains("/MediaBox [0 0 612 792]"));
    assert!(output.contains("/Parent 2 0 R"));
    assert!(output.contains("/Type /Page\n"));
}

#[test]
fn test_page_parent_is_added_when_missing() {
    let mut doc = Document::new();
    let page = doc.add_page(Dictionary::new()).unwrap();
    if let Some(Object::Dictionary(page)) = doc.get_mut(page) {
        page.remove("Parent");
    }

    let output = write(&doc);
    assert!(output.contains("/Parent 2 0 R"));
    assert!(output.contains("2 0 obj\n<<\n/Type /Pages\n/Kids [3 0 R]\n/Count 1\n>>"));
}

#[test]
fn test_cross_reference_offsets_match_objects() {
    let mut doc = Document::new();
    doc.set_title("Offsets");
    let content = doc.add(Stream::new(b"BT /F1 12 Tf (Hello) Tj ET".to_vec()));
    let mut page = Dictionary::new();
    page.set("MediaBox", media_box());
    page.set("Contents", content);
    doc.add_page(page).unwrap();

    let mut writer = PdfWriter::new_with_writer(Vec::new());
    writer.write_document(&doc).unwrap();
    let positions = writer.xref_positions().clone();
    let bytes = writer.into_inner();

    assert_eq!(positions.len(), 5);
    for (number, offset) in &positions {
        let header = format!("{number} 0 obj\n");
        assert!(bytes[*offset as usize..].starts_with(header.as_bytes()));
    }

    let text = String::from_utf8_lossy(&bytes);
    let startxref: usize = text
        .rsplit("startxref\n")
        .next()
        .and_then(|tail| tail.lines().next())
        .unwrap()
        .parse()
        .unwrap();
    assert!(bytes[startxref..].starts_with(b"xref\n0 6\n"));
    assert!(text.contains("trailer\n<<\n/Size 6\n"));
    assert!(text.contains("/Length 26"));
}

#[test]
fn test_stream_nested_inline_is_rejected() {
    let mut doc = Document::new();
    let stream = doc.add_inline(Stream::new(b"data".to_vec()));
    let mut holder = Dictionary::new();
    holder.set("Data", stream);
    let holder = doc.add(holder);
    doc.trailer_mut().set("Holder", holder);

    let mut writer = PdfWriter::new_with_writer(Vec::new());
    let err = writer.write_document(&doc).unwrap_err();
    assert!(matches!(err, PdfError::ContractViolation(_)));
}

#[test]
fn test_inline_cycle_is_reported() {
    let mut doc = Document::new();
    let a = doc.add_inline(Dictionary::new());
    let b = doc.add_inline(Dictionary::new());
    if let Some(Object::Dictionary(dict)) = doc.get_mut(a) {
        dict.set("Next", b);
    }
    if let Some(Object::Dictionary(dict)) = doc.get_mut(b) {
        dict.set("Next", a);
    }

    let err = serialize(&Object::Reference(a), &doc).unwrap_err();
    assert!(matches!(err, PdfError::CircularReference(_)));
}

/// Writes every dictionary with its keys sorted.
struct SortedDictionaryTransformer;

impl WriteTransformer for SortedDictionaryTransformer {
    fn name(&self) -> &'static str {
        "sorted-dictionary"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Dictionary(dict) if !dict.is_type("Page"))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> ptext::Result<()> {
        let Object::Dictionary(dict) = object else {
            return Err(PdfError::ContractViolation("expected a dictionary".to_string()));
        };
        let mut keys: Vec<_> = dict.keys().cloned().collect();
        keys.sort();
        let sorted: Dictionary = keys
            .into_iter()
            .filter_map(|key| dict.get(&key).cloned().map(|value| (key, value)))
            .collect();
        DictionaryTransformer.transform(&Object::Dictionary(sorted), ctx)
    }
}

#[test]
fn test_specialized_transformer_takes_precedence() {
    let mut dict = Dictionary::new();
    dict.set("Zeta", 1);
    dict.set("Alpha", 2);
    let doc = Document::new();

    assert_eq!(
        serialize(&Object::Dictionary(dict.clone()), &doc).unwrap(),
        b"<<\n/Zeta 1\n/Alpha 2\n>>"
    );

    let mut buffer = Vec::new();
    let mut writer = PdfWriter::new_with_writer(&mut buffer);
    writer.register(SortedDictionaryTransformer);
    let mut doc = Document::new();
    let custom = doc.add(dict);
    doc.trailer_mut().set("Custom", custom);
    writer.write_document(&doc).unwrap();
    drop(writer);

    let output = String::from_utf8_lossy(&buffer);
    assert!(output.contains("<<\n/Alpha 2\n/Zeta 1\n>>"));
}

#[test]
fn test_write_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");

    let mut doc = Document::new();
    doc.add_page(Dictionary::new()).unwrap();
    let mut writer = PdfWriter::create(&path).unwrap();
    writer.write_document(&doc).unwrap();
    drop(writer);

    let mut bytes = Vec::new();
    std::fs::File::open(&path)
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7\n%"));
    assert!(bytes.ends_with(b"%%EOF\n"));
}

#[cfg(feature = "compression")]
#[test]
fn test_compressed_stream_decodes_back() {
    use ptext::parser::ContentParser;

    let mut doc = Document::new();
    let data = b"0 0 m 100 100 l S ".repeat(20);
    let content = doc.add(Stream::new(data));
    let mut page = Dictionary::new();
    page.set("Contents", content);
    doc.add_page(page).unwrap();

    let mut writer =
        PdfWriter::with_options(Vec::new(), WriterOptions::default().with_compression(true));
    writer.write_document(&doc).unwrap();
    let output = writer.into_inner();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("/Filter /FlateDecode"));

    // the source document is untouched
    let stream = doc.get(content).and_then(Object::as_stream).unwrap();
    assert!(stream.filters().is_empty());
    assert_eq!(ContentParser::parse(stream.data()).unwrap().len(), 140);
}
