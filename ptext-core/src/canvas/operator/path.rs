//! Path construction and painting operators
//!
//! Paths are built in the coordinates given to the construction operators.
//! Stroking emits one [`Event::LineRender`] per drawn segment, carrying a
//! copy of the graphics state so listeners can map it through the CTM.

use super::{numbers, OperatorRegistry};
use crate::canvas::event::Event;
use crate::canvas::processor::CanvasStreamProcessor;
use crate::error::{PdfError, Result};
use crate::geometry::Point;
use crate::objects::Object;
use rust_decimal::Decimal;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register_fixed("m", 2, move_to);
    registry.register_fixed("l", 2, line_to);
    registry.register_fixed("c", 6, curve_to);
    registry.register_fixed("v", 4, curve_to_initial_control);
    registry.register_fixed("y", 4, curve_to_final_control);
    registry.register_fixed("h", 0, close_subpath);
    registry.register_fixed("re", 4, rectangle);

    registry.register_fixed("S", 0, stroke);
    registry.register_fixed("s", 0, close_and_stroke);
    registry.register_fixed("f", 0, end_path);
    registry.register_fixed("F", 0, end_path);
    registry.register_fixed("f*", 0, end_path);
    registry.register_fixed("B", 0, stroke);
    registry.register_fixed("B*", 0, stroke);
    registry.register_fixed("b", 0, close_and_stroke);
    registry.register_fixed("b*", 0, close_and_stroke);
    registry.register_fixed("n", 0, end_path);

    // Clipping takes effect at the next painting operator and is not tracked.
    registry.register_fixed("W", 0, no_op);
    registry.register_fixed("W*", 0, no_op);
}

fn point(x: Decimal, y: Decimal) -> Point {
    Point::new(x, y)
}

fn no_current_point(operator: &str) -> PdfError {
    PdfError::InvalidStructure(format!("{operator} operator used without a current point"))
}

fn move_to(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [x, y] = numbers("m", operands)?;
    processor.graphics_state_mut().path.move_to(point(x, y));
    Ok(())
}

fn line_to(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [x, y] = numbers("l", operands)?;
    if !processor.graphics_state_mut().path.line_to(point(x, y)) {
        return Err(no_current_point("l"));
    }
    Ok(())
}

fn curve_to(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [x1, y1, x2, y2, x3, y3] = numbers("c", operands)?;
    let path = &mut processor.graphics_state_mut().path;
    if !path.curve_to(point(x1, y1), point(x2, y2), point(x3, y3))? {
        return Err(no_current_point("c"));
    }
    Ok(())
}

/// `v`: the current point doubles as the first control point.
fn curve_to_initial_control(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [x2, y2, x3, y3] = numbers("v", operands)?;
    let path = &mut processor.graphics_state_mut().path;
    let current = path.current_point().ok_or_else(|| no_current_point("v"))?;
    path.curve_to(current, point(x2, y2), point(x3, y3))?;
    Ok(())
}

/// `y`: the end point doubles as the second control point.
fn curve_to_final_control(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [x1, y1, x3, y3] = numbers("y", operands)?;
    let end = point(x3, y3);
    if !processor
        .graphics_state_mut()
        .path
        .curve_to(point(x1, y1), end, end)?
    {
        return Err(no_current_point("y"));
    }
    Ok(())
}

fn close_subpath(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    processor.graphics_state_mut().path.close();
    Ok(())
}

fn rectangle(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [x, y, width, height] = numbers("re", operands)?;
    processor
        .graphics_state_mut()
        .path
        .rectangle(x, y, width, height)
}

fn stroke(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    let state = processor.graphics_state().clone();
    for segment in state.path.segments() {
        if segment.is_degenerate() {
            continue;
        }
        processor.emit(Event::LineRender {
            graphics_state: Box::new(state.clone()),
            segment: *segment,
        });
    }
    processor.graphics_state_mut().path.clear();
    Ok(())
}

fn close_and_stroke(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().path.close();
    stroke(processor, operands)
}

fn end_path(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    processor.graphics_state_mut().path.clear();
    Ok(())
}

fn no_op(_: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    Ok(())
}
