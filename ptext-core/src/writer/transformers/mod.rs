//! Built-in write transformers, one per value kind.

mod container;
mod page;
mod primitive;
mod reference;
mod stream;

pub use container::{ArrayTransformer, DictionaryTransformer};
pub use page::PageTransformer;
pub use primitive::{
    BooleanTransformer, NameTransformer, NullTransformer, NumberTransformer, StringTransformer,
};
pub use reference::ReferenceTransformer;
pub use stream::StreamTransformer;

use crate::error::PdfError;
use crate::objects::Object;

/// Error for a transformer handed a value it does not write.
pub(crate) fn wrong_kind(transformer: &str, object: &Object) -> PdfError {
    PdfError::ContractViolation(format!(
        "{transformer} transformer cannot write a {} object",
        object.type_name()
    ))
}
