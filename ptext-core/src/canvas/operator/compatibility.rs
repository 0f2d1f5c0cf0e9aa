//! `BX`/`EX`: inside a compatibility section unknown operators are skipped
//! instead of failing the stream.

use super::OperatorRegistry;
use crate::canvas::processor::CanvasStreamProcessor;
use crate::error::Result;
use crate::objects::Object;
use tracing::warn;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register_fixed("BX", 0, begin_compatibility_section);
    registry.register_fixed("EX", 0, end_compatibility_section);
}

fn begin_compatibility_section(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    processor.canvas_mut().begin_compatibility_section();
    Ok(())
}

fn end_compatibility_section(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    if !processor.canvas_mut().end_compatibility_section() {
        warn!("EX without a matching BX");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::canvas::CanvasStreamProcessor;
    use crate::document::Document;

    #[test]
    fn test_unmatched_ex_is_ignored() {
        let doc = Document::new();
        let mut processor = CanvasStreamProcessor::new(&doc);
        processor.process_content(b"EX BX").unwrap();
        assert!(processor.canvas().in_compatibility_section());
        processor.process_content(b"EX EX").unwrap();
        assert!(!processor.canvas().in_compatibility_section());
    }
}
