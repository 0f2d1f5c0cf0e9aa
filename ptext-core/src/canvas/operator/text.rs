//! Text object, text state, positioning and showing operators
//!
//! `TD`, `T*`, `'` and `"` are defined in terms of other operators and run
//! them through [`CanvasStreamProcessor::invoke_operator`].

use super::{array, integer, name, number, numbers, string, OperatorRegistry};
use crate::canvas::event::{Event, Glyph, TextChunk};
use crate::canvas::processor::CanvasStreamProcessor;
use crate::error::{PdfError, Result};
use crate::fonts::Font;
use crate::geometry::{checked_add, checked_mul, Matrix, Point};
use crate::objects::Object;
use rust_decimal::Decimal;
use tracing::warn;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register_fixed("BT", 0, begin_text);
    registry.register_fixed("ET", 0, end_text);

    registry.register_fixed("Tc", 1, set_character_spacing);
    registry.register_fixed("Tw", 1, set_word_spacing);
    registry.register_fixed("Tz", 1, set_horizontal_scaling);
    registry.register_fixed("TL", 1, set_leading);
    registry.register_fixed("Tf", 2, set_font);
    registry.register_fixed("Tr", 1, set_rendering_mode);
    registry.register_fixed("Ts", 1, set_rise);

    registry.register_fixed("Td", 2, move_text_position);
    registry.register_fixed("TD", 2, move_text_position_set_leading);
    registry.register_fixed("Tm", 6, set_text_matrix);
    registry.register_fixed("T*", 0, move_to_next_line);

    registry.register_fixed("Tj", 1, show_text);
    registry.register_fixed("TJ", 1, show_text_with_positioning);
    registry.register_fixed("'", 1, move_and_show_text);
    registry.register_fixed("\"", 3, set_spacing_move_and_show_text);

    // Type 3 glyph metrics only matter when rendering glyph procedures.
    registry.register_fixed("d0", 2, ignore_glyph_metrics);
    registry.register_fixed("d1", 6, ignore_glyph_metrics);
}

fn begin_text(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    let state = processor.graphics_state_mut();
    state.text_matrix = Matrix::identity();
    state.text_line_matrix = Matrix::identity();
    processor.emit(Event::BeginText);
    Ok(())
}

fn end_text(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    processor.emit(Event::EndText);
    Ok(())
}

fn set_character_spacing(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().character_spacing = number("Tc", operands, 0)?;
    Ok(())
}

fn set_word_spacing(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().word_spacing = number("Tw", operands, 0)?;
    Ok(())
}

fn set_horizontal_scaling(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().horizontal_scaling = number("Tz", operands, 0)?;
    Ok(())
}

fn set_leading(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().leading = number("TL", operands, 0)?;
    Ok(())
}

fn set_font(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let font = name("Tf", operands, 0)?.to_string();
    let size = number("Tf", operands, 1)?;
    let state = processor.graphics_state_mut();
    state.font = Some(font);
    state.font_size = size;
    Ok(())
}

fn set_rendering_mode(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().text_rendering_mode = integer("Tr", operands, 0)?;
    Ok(())
}

fn set_rise(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.graphics_state_mut().text_rise = number("Ts", operands, 0)?;
    Ok(())
}

fn move_text_position(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [tx, ty] = numbers("Td", operands)?;
    let state = processor.graphics_state_mut();
    state.text_line_matrix = Matrix::translation(tx, ty).multiply(&state.text_line_matrix)?;
    state.text_matrix = state.text_line_matrix;
    Ok(())
}

fn move_text_position_set_leading(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let ty = number("TD", operands, 1)?;
    processor.graphics_state_mut().leading = -ty;
    processor.invoke_operator("Td", operands)
}

fn set_text_matrix(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let matrix = Matrix(numbers::<6>("Tm", operands)?);
    let state = processor.graphics_state_mut();
    state.text_matrix = matrix;
    state.text_line_matrix = matrix;
    Ok(())
}

fn move_to_next_line(processor: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    let leading = processor.graphics_state().leading;
    processor.invoke_operator("Td", &[Object::from(Decimal::ZERO), Object::from(-leading)])
}

fn show_text(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    render_string(processor, string("Tj", operands, 0)?)
}

fn show_text_with_positioning(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    for element in array("TJ", operands, 0)? {
        match element {
            Object::String(bytes) | Object::HexString(bytes) => render_string(processor, bytes)?,
            Object::Number(adjustment) => {
                let state = processor.graphics_state_mut();
                let tx = checked_mul(
                    checked_mul(-*adjustment / Decimal::ONE_THOUSAND, state.font_size)?,
                    state.horizontal_scaling / Decimal::ONE_HUNDRED,
                )?;
                state.text_matrix = Matrix::translation(tx, Decimal::ZERO).multiply(&state.text_matrix)?;
            }
            _ => {
                return Err(PdfError::invalid_operand(
                    "TJ",
                    0,
                    "an array of strings and numbers",
                ))
            }
        }
    }
    Ok(())
}

fn move_and_show_text(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    processor.invoke_operator("T*", &[])?;
    processor.invoke_operator("Tj", operands)
}

fn set_spacing_move_and_show_text(processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
    let [word_spacing, character_spacing] = numbers("\"", operands)?;
    let text = string("\"", operands, 2)?;

    let state = processor.graphics_state_mut();
    state.word_spacing = word_spacing;
    state.character_spacing = character_spacing;
    processor.invoke_operator("'", &[Object::String(text.to_vec())])
}

fn ignore_glyph_metrics(_: &mut CanvasStreamProcessor<'_>, _: &[Object]) -> Result<()> {
    Ok(())
}

/// Emits a text chunk for `bytes` at the current text position, then
/// advances the text matrix past it.
fn render_string(processor: &mut CanvasStreamProcessor<'_>, bytes: &[u8]) -> Result<()> {
    let (glyphs, single_byte) = match processor.graphics_state().font.clone() {
        Some(font) => {
            let font = processor.font(&font);
            (glyphs(font, bytes), font.bytes_per_code() == 1)
        }
        None => {
            warn!("text shown without a font, glyph widths default to 0");
            (glyphs(&Font::fallback(), bytes), true)
        }
    };

    let state = processor.graphics_state();
    let scaling = state.horizontal_scaling / Decimal::ONE_HUNDRED;
    let width = glyphs.iter().try_fold(Decimal::ZERO, |width, glyph| {
        let mut advance = checked_add(
            checked_mul(glyph.width / Decimal::ONE_THOUSAND, state.font_size)?,
            state.character_spacing,
        )?;
        if single_byte && glyph.code == 32 {
            advance = checked_add(advance, state.word_spacing)?;
        }
        checked_add(width, checked_mul(advance, scaling)?)
    })?;

    let position = state
        .text_matrix
        .multiply(&state.ctm)?
        .transform_point(Point::new(Decimal::ZERO, state.text_rise))?;
    let chunk = TextChunk {
        position,
        text: bytes.to_vec(),
        glyphs,
        width,
        font: state.font.clone(),
        font_size: state.font_size,
        color: state.non_stroke_color.clone(),
    };
    processor.emit(Event::ChunkOfTextRender(chunk));

    let state = processor.graphics_state_mut();
    state.text_matrix = Matrix::translation(width, Decimal::ZERO).multiply(&state.text_matrix)?;
    Ok(())
}

fn glyphs(font: &Font, bytes: &[u8]) -> Vec<Glyph> {
    font.codes(bytes)
        .into_iter()
        .map(|code| Glyph {
            code,
            width: font.width(code),
        })
        .collect()
}
