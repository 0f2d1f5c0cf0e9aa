//! Colour operators
//!
//! `SC`, `SCN`, `sc` and `scn` take as many operands as the current colour
//! space has components, so their arity is read from the live graphics state.

use super::{name, numbers, CanvasOperator, OperatorRegistry};
use crate::canvas::color::{Color, ColorSpace};
use crate::canvas::processor::CanvasStreamProcessor;
use crate::canvas::state::CanvasGraphicsState;
use crate::error::Result;
use crate::objects::Object;
use tracing::debug;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register_fixed("CS", 1, set_stroke_color_space);
    registry.register_fixed("cs", 1, set_non_stroke_color_space);

    for (text, stroking) in [("SC", true), ("SCN", true), ("sc", false), ("scn", false)] {
        registry.register(SetColor { text, stroking });
    }

    registry.register_fixed("G", 1, set_stroke_gray);
    registry.register_fixed("g", 1, set_non_stroke_gray);
    registry.register_fixed("RG", 3, set_stroke_rgb);
    registry.register_fixed("rg", 3, set_non_stroke_rgb);
    registry.register_fixed("K", 4, set_stroke_cmyk);
    registry.register_fixed("k", 4, set_non_stroke_cmyk);
}

fn select_color_space(
    processor: &mut CanvasStreamProcessor<'_>,
    operator: &str,
    operands: &[Object],
    stroking: bool,
) -> Result<()> {
    let space = ColorSpace::resolve(name(operator, operands, 0)?, processor.resources(), processor.document());
    let initial = space.initial_color();

    let state = processor.graphics_state_mut();
    let (color, color_space) = if stroking {
        (&mut state.stroke_color, &mut state.stroke_color_space)
    } else {
        (&mut state.non_stroke_color, &mut state.non_stroke_color_space)
    };
    if let Some(initial) = initial {
        *color = initial;
    }
    *color_space = space;
    Ok(())
}

fn set_stroke_color_space(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    select_color_space(processor, "CS", operands, true)
}

fn set_non_stroke_color_space(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    select_color_space(processor, "cs", operands, false)
}

/// `SC`/`SCN` (stroking) and `sc`/`scn` (non-stroking).
struct SetColor {
    text: &'static str,
    stroking: bool,
}

impl SetColor {
    fn space<'s>(&self, state: &'s CanvasGraphicsState) -> &'s ColorSpace {
        if self.stroking {
            &state.stroke_color_space
        } else {
            &state.non_stroke_color_space
        }
    }
}

impl CanvasOperator for SetColor {
    fn text(&self) -> &'static str {
        self.text
    }

    fn operand_count(&self, state: &CanvasGraphicsState) -> usize {
        self.space(state).components()
    }

    fn invoke(&self, processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
        let space = self.space(processor.graphics_state());
        let Some(color) = space.color_from_operands(self.text, operands)? else {
            debug!(
                operator = self.text,
                color_space = space.family().name(),
                "colour left unchanged"
            );
            return Ok(());
        };

        let state = processor.graphics_state_mut();
        if self.stroking {
            state.stroke_color = color;
        } else {
            state.non_stroke_color = color;
        }
        Ok(())
    }
}

fn set_device_color(
    processor: &mut CanvasStreamProcessor<'_>,
    stroking: bool,
    space: ColorSpace,
    color: Color,
) -> Result<()> {
    let state = processor.graphics_state_mut();
    if stroking {
        state.stroke_color_space = space;
        state.stroke_color = color;
    } else {
        state.non_stroke_color_space = space;
        state.non_stroke_color = color;
    }
    Ok(())
}

fn set_stroke_gray(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [gray] = numbers("G", operands)?;
    set_device_color(processor, true, ColorSpace::device_gray(), Color::Gray(gray))
}

fn set_non_stroke_gray(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [gray] = numbers("g", operands)?;
    set_device_color(processor, false, ColorSpace::device_gray(), Color::Gray(gray))
}

fn set_stroke_rgb(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [r, g, b] = numbers("RG", operands)?;
    set_device_color(processor, true, ColorSpace::device_rgb(), Color::Rgb(r, g, b))
}

fn set_non_stroke_rgb(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [r, g, b] = numbers("rg", operands)?;
    set_device_color(processor, false, ColorSpace::device_rgb(), Color::Rgb(r, g, b))
}

fn set_stroke_cmyk(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [c, m, y, k] = numbers("K", operands)?;
    set_device_color(processor, true, ColorSpace::device_cmyk(), Color::Cmyk(c, m, y, k))
}

fn set_non_stroke_cmyk(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [c, m, y, k] = numbers("k", operands)?;
    set_device_color(processor, false, ColorSpace::device_cmyk(), Color::Cmyk(c, m, y, k))
}
