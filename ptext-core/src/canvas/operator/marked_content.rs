//! Marked content operators

use super::{name, properties, OperatorRegistry};
use crate::canvas::event::Event;
use crate::canvas::processor::CanvasStreamProcessor;
use crate::error::Result;
use crate::objects::Object;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register_fixed("BMC", 1, begin_marked_content);
    registry.register_fixed("BDC", 2, begin_marked_content_with_properties);
    registry.register_fixed("EMC", 0, end_marked_content);
    registry.register_fixed("MP", 1, marked_content_point);
    registry.register_fixed("DP", 2, marked_content_point_with_properties);
}

fn begin_marked_content(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let tag = name("BMC", operands, 0)?.to_string();
    processor.canvas_mut().begin_marked_content(tag.clone());
    processor.emit(Event::BeginMarkedContent {
        tag,
        properties: None,
    });
    Ok(())
}

fn begin_marked_content_with_properties(
    processor: &mut CanvasStreamProcessor<'_>,
    operands: &[Object],
) -> Result<()> {
    let tag = name("BDC", operands, 0)?.to_string();
    let properties = properties(processor, "BDC", operands, 1)?;
    processor.canvas_mut().begin_marked_content(tag.clone());
    processor.emit(Event::BeginMarkedContent { tag, properties });
    Ok(())
}

fn end_marked_content(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    let tag = processor.canvas_mut().end_marked_content()?;
    processor.emit(Event::EndMarkedContent { tag });
    Ok(())
}

// Marked-content points do not open a sequence; only their operands are checked.

fn marked_content_point(_: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    name("MP", operands, 0)?;
    Ok(())
}

fn marked_content_point_with_properties(
    processor: &mut CanvasStreamProcessor<'_>,
    operands: &[Object],
) -> Result<()> {
    name("DP", operands, 0)?;
    properties(processor, "DP", operands, 1)?;
    Ok(())
}
