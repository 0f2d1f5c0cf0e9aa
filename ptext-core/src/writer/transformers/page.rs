use super::DictionaryTransformer;
use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::Object;
use crate::writer::context::WriteTransformerContext;
use crate::writer::registry::WriteTransformer;

/// Page boundary boxes, always written inline.
const BOX_KEYS: [&str; 5] = ["MediaBox", "CropBox", "BleedBox", "TrimBox", "ArtBox"];

/// Writes `/Type /Page` dictionaries: `/Parent` points to the document's
/// `/Pages` node (replacing any existing value in place, appended otherwise)
/// and the page boxes are inlined.
pub struct PageTransformer;

impl WriteTransformer for PageTransformer {
    fn name(&self) -> &'static str {
        "page"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Dictionary(dict) if dict.is_type("Page"))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let page = match object {
            Object::Dictionary(dict) if dict.is_type("Page") => dict,
            other => {
                return Err(PdfError::ContractViolation(format!(
                    "page transformer requires a /Type /Page dictionary, got a {}",
                    other.type_name()
                )))
            }
        };
        let pages = ctx.document().pages().ok_or_else(|| {
            PdfError::InvalidStructure("document has no /Pages node".to_string())
        })?;
        let parent = Object::Reference(pages);

        ctx.write_bytes(b"<<")?;
        for (key, value) in page.iter() {
            if key == "Parent" {
                DictionaryTransformer::write_entry(key, &parent, false, ctx)?;
            } else {
                let force_inline = BOX_KEYS.contains(&key.as_str());
                DictionaryTransformer::write_entry(key, value, force_inline, ctx)?;
            }
        }
        if !page.contains_key("Parent") {
            DictionaryTransformer::write_entry("Parent", &parent, false, ctx)?;
        }
        ctx.write_bytes(b"\n>>")
    }
}
