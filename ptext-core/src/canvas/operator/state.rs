//! General graphics state operators

use super::{array, integer, name, number, numbers, OperatorRegistry};
use crate::canvas::processor::CanvasStreamProcessor;
use crate::error::{PdfError, Result};
use crate::geometry::Matrix;
use crate::objects::Object;
use rust_decimal::Decimal;
use tracing::warn;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register_fixed("q", 0, save_state);
    registry.register_fixed("Q", 0, restore_state);
    registry.register_fixed("cm", 6, concat_matrix);
    registry.register_fixed("w", 1, set_line_width);
    registry.register_fixed("J", 1, set_line_cap);
    registry.register_fixed("j", 1, set_line_join);
    registry.register_fixed("M", 1, set_miter_limit);
    registry.register_fixed("d", 2, set_dash);
    registry.register_fixed("ri", 1, set_rendering_intent);
    registry.register_fixed("i", 1, set_flatness);
    registry.register_fixed("gs", 1, set_ext_graphics_state);
}

fn save_state(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    processor.canvas_mut().save_state();
    Ok(())
}

fn restore_state(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    processor.canvas_mut().restore_state()
}

fn concat_matrix(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let matrix = Matrix(numbers::<6>("cm", operands)?);
    let state = processor.graphics_state_mut();
    state.ctm = matrix.multiply(&state.ctm)?;
    Ok(())
}

fn set_line_width(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().line_width = number("w", operands, 0)?;
    Ok(())
}

fn set_line_cap(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().line_cap = integer("J", operands, 0)?;
    Ok(())
}

fn set_line_join(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().line_join = integer("j", operands, 0)?;
    Ok(())
}

fn set_miter_limit(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().miter_limit = number("M", operands, 0)?;
    Ok(())
}

fn set_dash(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let dashes = array("d", operands, 0)?
        .iter()
        .map(|dash| {
            dash.as_number()
                .ok_or_else(|| PdfError::invalid_operand("d", 0, "an array of numbers"))
        })
        .collect::<Result<Vec<_>>>()?;
    let phase = number("d", operands, 1)?;

    let state = processor.graphics_state_mut();
    state.dash_array = dashes;
    state.dash_phase = phase;
    Ok(())
}

fn set_rendering_intent(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().rendering_intent = Some(name("ri", operands, 0)?.to_string());
    Ok(())
}

fn set_flatness(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().flatness = number("i", operands, 0)?;
    Ok(())
}

/// Applies the line and rendering parameters of an `/ExtGState` resource.
/// Other parameters are not tracked.
fn set_ext_graphics_state(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let resource = name("gs", operands, 0)?;
    let document = processor.document();
    let Some(params) = processor.resource("ExtGState", resource).and_then(Object::as_dict) else {
        warn!(name = resource, "graphics state parameter dictionary not found");
        return Ok(());
    };

    let get = |key: &str| document.resolve_key(params, key);
    let state = processor.graphics_state_mut();
    if let Some(width) = get("LW").and_then(Object::as_number) {
        state.line_width = width;
    }
    if let Some(cap) = get("LC").and_then(Object::as_integer) {
        state.line_cap = cap;
    }
    if let Some(join) = get("LJ").and_then(Object::as_integer) {
        state.line_join = join;
    }
    if let Some(limit) = get("ML").and_then(Object::as_number) {
        state.miter_limit = limit;
    }
    if let Some(intent) = get("RI").and_then(Object::as_name) {
        state.rendering_intent = Some(intent.to_string());
    }
    if let Some(flatness) = get("FL").and_then(Object::as_number) {
        state.flatness = flatness;
    }
    if let Some((dashes, phase)) = get("D")
        .and_then(Object::as_array)
        .and_then(|dash| dash_pattern(dash.as_slice()))
    {
        state.dash_array = dashes;
        state.dash_phase = phase;
    }
    Ok(())
}

fn dash_pattern(entry: &[Object]) -> Option<(Vec<Decimal>, Decimal)> {
    let [dashes, phase] = entry else {
        return None;
    };
    let dashes = dashes
        .as_array()?
        .iter()
        .map(Object::as_number)
        .collect::<Option<Vec<_>>>()?;
    Some((dashes, phase.as_number()?))
}
