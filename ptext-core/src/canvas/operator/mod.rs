//! Content stream operators
//!
//! Every operator token maps to one [`CanvasOperator`]. Most operators take a
//! fixed number of operands and are plain functions wrapped in a
//! [`FixedOperator`]; the colour operators `SC`, `SCN`, `sc` and `scn` ask
//! the current colour space how many operands they need.

mod color;
mod compatibility;
mod marked_content;
mod path;
mod state;
mod text;
mod xobject;

use crate::canvas::processor::CanvasStreamProcessor;
use crate::canvas::state::CanvasGraphicsState;
use crate::error::{PdfError, Result};
use crate::objects::{Array, Dictionary, Object};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub trait CanvasOperator: Send + Sync {
    /// The operator token, such as `"Tj"`.
    fn text(&self) -> &'static str;

    /// Number of operands consumed from the operand stack. May depend on the
    /// current graphics state.
    fn operand_count(&self, state: &CanvasGraphicsState) -> usize;

    /// Runs the operator. `operands` holds exactly
    /// [`operand_count`](Self::operand_count) objects, in stream order.
    fn invoke(&self, processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()>;
}

pub type OperatorFn = fn(&mut CanvasStreamProcessor<'_>, &[Object]) -> Result<()>;

/// An operator with a constant operand count.
pub struct FixedOperator {
    text: &'static str,
    operand_count: usize,
    handler: OperatorFn,
}

impl FixedOperator {
    pub const fn new(text: &'static str, operand_count: usize, handler: OperatorFn) -> Self {
        Self {
            text,
            operand_count,
            handler,
        }
    }
}

impl CanvasOperator for FixedOperator {
    fn text(&self) -> &'static str {
        self.text
    }

    fn operand_count(&self, _state: &CanvasGraphicsState) -> usize {
        self.operand_count
    }

    fn invoke(&self, processor: &mut CanvasStreamProcessor<'_>, operands: &[Object]) -> Result<()> {
        (self.handler)(processor, operands)
    }
}

/// Operator lookup table, keyed by operator token.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    operators: HashMap<&'static str, Arc<dyn CanvasOperator>>,
}

lazy_static::lazy_static! {
    static ref DEFAULT_REGISTRY: Arc<OperatorRegistry> = Arc::new(OperatorRegistry::with_defaults());
}

impl OperatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every standard operator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        state::register(&mut registry);
        path::register(&mut registry);
        color::register(&mut registry);
        text::register(&mut registry);
        marked_content::register(&mut registry);
        compatibility::register(&mut registry);
        xobject::register(&mut registry);
        registry
    }

    /// The shared default registry.
    pub fn shared() -> Arc<OperatorRegistry> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    /// Adds `operator`, replacing any operator with the same token.
    pub fn register(&mut self, operator: impl CanvasOperator + 'static) {
        self.operators.insert(operator.text(), Arc::new(operator));
    }

    pub(crate) fn register_fixed(&mut self, text: &'static str, operand_count: usize, handler: OperatorFn) {
        self.register(FixedOperator::new(text, operand_count, handler));
    }

    pub fn get(&self, text: &str) -> Option<Arc<dyn CanvasOperator>> {
        self.operators.get(text).cloned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.operators.contains_key(text)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operators: Vec<_> = self.operators.keys().collect();
        operators.sort();
        f.debug_struct("OperatorRegistry")
            .field("operators", &operators)
            .finish()
    }
}

// Operand accessors shared by the operator modules

pub(crate) fn number(operator: &str, operands: &[Object], index: usize) -> Result<Decimal> {
    operands
        .get(index)
        .and_then(Object::as_number)
        .ok_or_else(|| PdfError::invalid_operand(operator, index, "a number"))
}

pub(crate) fn numbers<const N: usize>(operator: &str, operands: &[Object]) -> Result<[Decimal; N]> {
    let mut values = [Decimal::ZERO; N];
    for (index, value) in values.iter_mut().enumerate() {
        *value = number(operator, operands, index)?;
    }
    Ok(values)
}

pub(crate) fn integer(operator: &str, operands: &[Object], index: usize) -> Result<i64> {
    operands
        .get(index)
        .and_then(Object::as_integer)
        .ok_or_else(|| PdfError::invalid_operand(operator, index, "an integer"))
}

pub(crate) fn name<'o>(operator: &str, operands: &'o [Object], index: usize) -> Result<&'o str> {
    operands
        .get(index)
        .and_then(Object::as_name)
        .ok_or_else(|| PdfError::invalid_operand(operator, index, "a name"))
}

pub(crate) fn string<'o>(operator: &str, operands: &'o [Object], index: usize) -> Result<&'o [u8]> {
    operands
        .get(index)
        .and_then(Object::as_string)
        .ok_or_else(|| PdfError::invalid_operand(operator, index, "a string"))
}

pub(crate) fn array<'o>(operator: &str, operands: &'o [Object], index: usize) -> Result<&'o Array> {
    operands
        .get(index)
        .and_then(Object::as_array)
        .ok_or_else(|| PdfError::invalid_operand(operator, index, "an array"))
}

/// A property list operand: an inline dictionary, or the name of an entry
/// in the resources' `/Properties` dictionary.
pub(crate) fn properties(
    processor: &CanvasStreamProcessor<'_>,
    operator: &str,
    operands: &[Object],
    index: usize,
) -> Result<Option<Dictionary>> {
    match operands.get(index) {
        Some(Object::Dictionary(dict)) => Ok(Some(dict.clone())),
        Some(Object::Name(name)) => Ok(processor
            .resource("Properties", name)
            .and_then(Object::as_dict)
            .cloned()),
        _ => Err(PdfError::invalid_operand(operator, index, "a dictionary or name")),
    }
}
