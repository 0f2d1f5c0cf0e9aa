use super::wrong_kind;
use crate::document::Document;
use crate::error::Result;
use crate::objects::{Dictionary, Object};
use crate::writer::context::WriteTransformerContext;
use crate::writer::format::escape_name;
use crate::writer::registry::WriteTransformer;

/// Writes `[a b c]`.
pub struct ArrayTransformer;

impl WriteTransformer for ArrayTransformer {
    fn name(&self) -> &'static str {
        "array"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Array(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let Object::Array(array) = object else {
            return Err(wrong_kind(self.name(), object));
        };

        ctx.write_bytes(b"[")?;
        for (i, value) in array.iter().enumerate() {
            if i > 0 {
                ctx.write_bytes(b" ")?;
            }
            ctx.write_child(value, false)?;
        }
        ctx.write_bytes(b"]")
    }
}

/// Writes `<<`, one `/Key value` line per entry in insertion order, `>>`.
pub struct DictionaryTransformer;

impl DictionaryTransformer {
    pub fn write_entry(
        key: &str,
        value: &Object,
        force_inline: bool,
        ctx: &mut WriteTransformerContext<'_>,
    ) -> Result<()> {
        ctx.write_bytes(b"\n/")?;
        ctx.write_str(&escape_name(key))?;
        ctx.write_bytes(b" ")?;
        ctx.write_child(value, force_inline)
    }

    pub fn write_dictionary(dict: &Dictionary, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        ctx.write_bytes(b"<<")?;
        for (key, value) in dict.iter() {
            Self::write_entry(key, value, false, ctx)?;
        }
        ctx.write_bytes(b"\n>>")
    }
}

impl WriteTransformer for DictionaryTransformer {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Dictionary(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let Object::Dictionary(dict) = object else {
            return Err(wrong_kind(self.name(), object));
        };
        Self::write_dictionary(dict, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::objects::Array;
    use crate::writer::serialize;
    use pretty_assertions::assert_eq;

    fn written(object: &Object, doc: &Document) -> String {
        String::from_utf8(serialize(object, doc).unwrap()).unwrap()
    }

    #[test]
    fn test_array() {
        let doc = Document::new();
        let array: Array = vec![Object::from(1), Object::name("A"), Object::from("x")].into();
        assert_eq!(written(&array.into(), &doc), "[1 /A (x)]");
        assert_eq!(written(&Array::new().into(), &doc), "[]");
    }

    #[test]
    fn test_dictionary_keeps_insertion_order() {
        let doc = Document::new();
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Font"));
        dict.set("Subtype", Object::name("Type1"));
        dict.set("BaseFont", Object::name("Helvetica"));

        assert_eq!(
            written(&dict.into(), &doc),
            "<<\n/Type /Font\n/Subtype /Type1\n/BaseFont /Helvetica\n>>"
        );
    }

    #[test]
    fn test_nested_containers() {
        let doc = Document::new();
        let mut inner = Dictionary::new();
        inner.set("N", 3);
        let mut outer = Dictionary::new();
        outer.set("Inner", inner);
        outer.set("List", vec![Object::from(true), Object::Null]);

        assert_eq!(
            written(&outer.into(), &doc),
            "<<\n/Inner <<\n/N 3\n>>\n/List [true null]\n>>"
        );
    }

    #[test]
    fn test_shared_value_is_referenced() {
        let mut doc = Document::new();
        let shared = doc.add(Dictionary::new());
        let array: Array = vec![Object::from(shared), Object::from(shared)].into();

        assert_eq!(written(&array.into(), &doc), "[1 0 R 1 0 R]");
    }

    #[test]
    fn test_inline_arena_value() {
        let mut doc = Document::new();
        let inline = doc.add_inline(vec![Object::from(0), Object::from(1)]);
        let mut dict = Dictionary::new();
        dict.set("Range", inline);

        assert_eq!(written(&dict.into(), &doc), "<<\n/Range [0 1]\n>>");
    }

    #[test]
    fn test_inline_cycle_is_rejected() {
        let mut doc = Document::new();
        let a = doc.add_inline(Dictionary::new());
        let b = doc.add_inline(Dictionary::new());
        if let Some(Object::Dictionary(dict)) = doc.get_mut(a) {
            dict.set("Next", b);
        }
        if let Some(Object::Dictionary(dict)) = doc.get_mut(b) {
            dict.set("Next", a);
        }

        let result = serialize(&Object::from(a), &doc);
        assert!(matches!(result, Err(PdfError::CircularReference(_))));
    }
}
