use super::wrong_kind;
use crate::document::Document;
use crate::error::Result;
use crate::objects::Object;
use crate::writer::context::WriteTransformerContext;
use crate::writer::format::{encode_hex, escape_literal_string, escape_name, format_number};
use crate::writer::registry::WriteTransformer;

pub struct BooleanTransformer;

impl WriteTransformer for BooleanTransformer {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Boolean(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        match object {
            Object::Boolean(true) => ctx.write_bytes(b"true"),
            Object::Boolean(false) => ctx.write_bytes(b"false"),
            other => Err(wrong_kind(self.name(), other)),
        }
    }
}

pub struct NumberTransformer;

impl WriteTransformer for NumberTransformer {
    fn name(&self) -> &'static str {
        "number"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Number(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let Object::Number(value) = object else {
            return Err(wrong_kind(self.name(), object));
        };
        ctx.write_str(&format_number(*value))
    }
}

/// Writes literal strings as `(...)` and hex strings as `<...>`.
pub struct StringTransformer;

impl WriteTransformer for StringTransformer {
    fn name(&self) -> &'static str {
        "string"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::String(_) | Object::HexString(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        match object {
            Object::String(bytes) => {
                ctx.write_bytes(b"(")?;
                ctx.write_bytes(&escape_literal_string(bytes))?;
                ctx.write_bytes(b")")
            }
            Object::HexString(bytes) => {
                ctx.write_bytes(b"<")?;
                ctx.write_str(&encode_hex(bytes))?;
                ctx.write_bytes(b">")
            }
            other => Err(wrong_kind(self.name(), other)),
        }
    }
}

pub struct NameTransformer;

impl WriteTransformer for NameTransformer {
    fn name(&self) -> &'static str {
        "name"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        matches!(object, Object::Name(_))
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        let Object::Name(name) = object else {
            return Err(wrong_kind(self.name(), object));
        };
        ctx.write_bytes(b"/")?;
        ctx.write_str(&escape_name(name))
    }
}

pub struct NullTransformer;

impl WriteTransformer for NullTransformer {
    fn name(&self) -> &'static str {
        "null"
    }

    fn can_handle(&self, object: &Object, _document: &Document) -> bool {
        object.is_null()
    }

    fn transform(&self, object: &Object, ctx: &mut WriteTransformerContext<'_>) -> Result<()> {
        if !object.is_null() {
            return Err(wrong_kind(self.name(), object));
        }
        ctx.write_bytes(b"null")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::writer::{serialize, TransformerRegistry};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn written(object: Object) -> String {
        let doc = Document::new();
        String::from_utf8(serialize(&object, &doc).unwrap()).unwrap()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(written(Object::from(3)), "3");
        assert_eq!(written(Object::from(Decimal::from_str("3.5").unwrap())), "3.50");
        assert_eq!(
            written(Object::from(Decimal::from_str("3.14159").unwrap())),
            "3.14"
        );
        assert_eq!(written(Object::from(-17)), "-17");
    }

    #[test]
    fn test_booleans_and_null() {
        assert_eq!(written(Object::from(true)), "true");
        assert_eq!(written(Object::from(false)), "false");
        assert_eq!(written(Object::Null), "null");
    }

    #[test]
    fn test_strings() {
        assert_eq!(written(Object::from("Hello (World)")), "(Hello \\(World\\))");
        assert_eq!(written(Object::hex_string(b"Hi".to_vec())), "<4869>");
        assert_eq!(written(Object::from("")), "()");
    }

    #[test]
    fn test_names() {
        assert_eq!(written(Object::name("Type")), "/Type");
        assert_eq!(written(Object::name("Two Words")), "/Two#20Words");
    }

    #[test]
    fn test_wrong_kind_is_contract_violation() {
        let doc = Document::new();
        let registry = TransformerRegistry::new();
        let mut sink = Vec::new();
        let mut ctx = WriteTransformerContext::new(&mut sink, &doc, &registry);

        let result = NumberTransformer.transform(&Object::from(true), &mut ctx);
        assert!(matches!(result, Err(PdfError::ContractViolation(_))));
        let result = NullTransformer.transform(&Object::from(1), &mut ctx);
        assert!(matches!(result, Err(PdfError::ContractViolation(_))));
    }
}
