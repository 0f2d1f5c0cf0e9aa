use super::wrong_kind;
use crate::document::Document;
use crate::error::Result;
use crate::objects::Object;
use crate::writer::context::WriteTransformerContext;
use crate::writer::registry::WriteTransformer;

/// Writes a link to an arena value: `n 0 R` when the value is referenceable,
/// the value itself otherwise.
pub struct ReferenceTransformer;

impl WriteTransformer for ReferenceTransformer {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Reference(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let Object::Reference(handle) = object else {
            return Err(wrong_kind(self.name(), object));
        };

        if ctx.document().is_referenceable(*handle) {
            let id = ctx.reference(*handle)?;
            ctx.write_str(&id.to_string())
        } else {
            ctx.write_inline(*handle)
        }
    }
}
