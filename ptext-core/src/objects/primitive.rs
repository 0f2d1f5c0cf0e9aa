use crate::objects::{Array, Dictionary, Stream};
use rust_decimal::Decimal;
use std::fmt;

/// Index of a value stored in a [`Document`](crate::document::Document) arena.
///
/// Handles are the identity of shared values: two handles are the same
/// object only if they are equal, regardless of the values they point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub(crate) u32);

impl ObjectHandle {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Number and generation of an indirect object in the written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Number(Decimal),
    /// Literal string, written between parentheses.
    String(Vec<u8>),
    /// Hexadecimal string, written between angle brackets.
    HexString(Vec<u8>),
    Name(String),
    Array(Array),
    Dictionary(Dictionary),
    Stream(Stream),
    /// Non-owning link to a value stored in the document arena.
    Reference(ObjectHandle),
}

impl Object {
    pub fn name(name: impl Into<String>) -> Self {
        Object::Name(name.into())
    }

    pub fn hex_string(bytes: impl Into<Vec<u8>>) -> Self {
        Object::HexString(bytes.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Boolean(_) => "boolean",
            Object::Number(_) => "number",
            Object::String(_) => "string",
            Object::HexString(_) => "hex string",
            Object::Name(_) => "name",
            Object::Array(_) => "array",
            Object::Dictionary(_) => "dictionary",
            Object::Stream(_) => "stream",
            Object::Reference(_) => "reference",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Arrays, dictionaries and streams.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Object::Array(_) | Object::Dictionary(_) | Object::Stream(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Object::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integral part of a number, if it fits.
    pub fn as_integer(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        self.as_number().and_then(|n| n.trunc().to_i64())
    }

    /// Bytes of either string flavour.
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) | Object::HexString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(stream.dictionary()),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Object::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectHandle> {
        match self {
            Object::Reference(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Boolean(b)
    }
}

impl From<i32> for Object {
    fn from(i: i32) -> Self {
        Object::Number(Decimal::from(i))
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Object::Number(Decimal::from(i))
    }
}

impl From<u32> for Object {
    fn from(i: u32) -> Self {
        Object::Number(Decimal::from(i))
    }
}

impl From<usize> for Object {
    fn from(i: usize) -> Self {
        Object::Number(Decimal::from(i))
    }
}

impl From<Decimal> for Object {
    fn from(d: Decimal) -> Self {
        Object::Number(d)
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Object::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Object {
    fn from(s: String) -> Self {
        Object::String(s.into_bytes())
    }
}

impl From<Vec<Object>> for Object {
    fn from(v: Vec<Object>) -> Self {
        Object::Array(Array::from(v))
    }
}

impl From<Array> for Object {
    fn from(a: Array) -> Self {
        Object::Array(a)
    }
}

impl From<Dictionary> for Object {
    fn from(d: Dictionary) -> Self {
        Object::Dictionary(d)
    }
}

impl From<Stream> for Object {
    fn from(s: Stream) -> Self {
        Object::Stream(s)
    }
}

impl From<ObjectHandle> for Object {
    fn from(handle: ObjectHandle) -> Self {
        Object::Reference(handle)
    }
}
