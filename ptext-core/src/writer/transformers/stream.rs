use super::wrong_kind;
use super::DictionaryTransformer;
use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::{Object, Stream};
use crate::writer::context::WriteTransformerContext;
use crate::writer::registry::WriteTransformer;

/// Writes the stream dictionary with `/Length` set to the data length,
/// followed by `stream`, the raw data and `endstream`.
///
/// Streams can only be the top value of an indirect object.
pub struct StreamTransformer;

impl StreamTransformer {
    fn write_stream(stream: &Stream, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let mut dict = stream.dictionary().clone();
        dict.set("Length", stream.data().len());

        DictionaryTransformer::write_dictionary(&dict, ctx)?;
        ctx.write_bytes(b"\nstream\n")?;
        ctx.write_bytes(stream.data())?;
        ctx.write_bytes(b"\nendstream")
    }
}

impl WriteTransformer for StreamTransformer {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Stream(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let Object::Stream(stream) = object else {
            return Err(wrong_kind(self.name(), object));
        };
        if ctx.depth() > 1 {
            return Err(PdfError::ContractViolation(
                "a stream can only be written as an indirect object".to_string(),
            ));
        }

        #[cfg(feature = "compression")]
        if ctx.compress_streams() && stream.filters().is_empty() {
            let mut compressed = stream.clone();
            compressed.compress_flate()?;
            return Self::write_stream(&compressed, ctx);
        }

        Self::write_stream(stream, ctx)
    }
}
