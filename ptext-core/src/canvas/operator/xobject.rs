//! External objects, shading and inline images
//!
//! These operators consume their operands but produce no events. The
//! tokenizer turns inline image data into a single string operand, which
//! `EI` takes.

use super::{name, OperatorRegistry};
use crate::canvas::processor::CanvasStreamProcessor;
use crate::error::Result;
use crate::objects::Object;
use tracing::trace;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register_fixed("Do", 1, paint_xobject);
    registry.register_fixed("sh", 1, paint_shading);
    registry.register_fixed("BI", 0, skip);
    registry.register_fixed("ID", 0, skip);
    registry.register_fixed("EI", 1, end_inline_image);
}

fn paint_xobject(_: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    trace!(xobject = name("Do", operands, 0)?, "skipping external object");
    Ok(())
}

fn paint_shading(_: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    trace!(shading = name("sh", operands, 0)?, "skipping shading");
    Ok(())
}

fn end_inline_image(_: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let bytes = operands.first().and_then(Object::as_string).map_or(0, <[u8]>::len);
    trace!(bytes, "skipping inline image");
    Ok(())
}

fn skip(_: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::canvas::{CanvasStreamProcessor, EventCollector};
    use crate::document::Document;

    #[test]
    fn test_inline_image_is_skipped() {
        let doc = Document::new();
        let mut collector = EventCollector::new();
        CanvasStreamProcessor::new(&doc)
            .with_listener(&mut collector)
            .process_content(b"q BI /W 2 /H 1 /BPC 8 /CS /G ID \x00\xff EI Q /Im1 Do /Sh1 sh")
            .unwrap();
        assert!(collector.events().is_empty());
    }
}
