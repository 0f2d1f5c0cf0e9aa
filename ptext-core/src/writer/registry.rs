use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::Object;
use crate::writer::context::WriteTransformerContext;
use crate::writer::transformers::{
    ArrayTransformer, BooleanTransformer, DictionaryTransformer, NameTransformer, NullTransformer,
    NumberTransformer, PageTransformer, ReferenceTransformer, StreamTransformer,
    StringTransformer,
};

/// Serializer for one kind of value.
pub trait WriteTransformer: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Whether this transformer knows how to write `object`.
    fn can_handle(&self, object: &Object, document: &Document) -> bool;

    /// Writes `object` to the context's destination, dispatching nested
    /// values back through the context.
    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()>;
}

/// Ordered list of write transformers; the first one whose `can_handle`
/// accepts a value writes it.
///
/// Transformers added with [`TransformerRegistry::register`] are consulted
/// before the built-in ones, in registration order.
pub struct TransformerRegistry {
    specialized: Vec<Box<dyn WriteTransformer>>,
    builtins: Vec<Box<dyn WriteTransformer>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self {
            specialized: Vec::new(),
            builtins: vec![
                Box::new(PageTransformer),
                Box::new(StreamTransformer),
                Box::new(DictionaryTransformer),
                Box::new(ArrayTransformer),
                Box::new(ReferenceTransformer),
                Box::new(BooleanTransformer),
                Box::new(NumberTransformer),
                Box::new(StringTransformer),
                Box::new(NameTransformer),
                Box::new(NullTransformer),
            ],
        }
    }

    pub fn register(&mut self, transformer: impl WriteTransformer + 'static) {
        self.specialized.push(Box::new(transformer));
    }

    pub fn transformers(&self) -> impl Iterator<Item = &dyn WriteTransformer> {
        self.specialized
            .iter()
            .chain(self.builtins.iter())
            .map(|transformer| transformer.as_ref())
    }

    pub fn find(&self, object: &Object, document: &Document) -> Result<&dyn WriteTransformer> {
        self.transformers()
            .find(|transformer| transformer.can_handle(object, document))
            .ok_or(PdfError::NoTransformer(object.type_name()))
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
