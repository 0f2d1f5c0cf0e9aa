//! Primitive PDF values.

mod array;
mod dictionary;
mod primitive;
mod stream;

pub use array::Array;
pub use dictionary::Dictionary;
pub use primitive::{Object, ObjectHandle, ObjectId};
pub use stream::Stream;
