use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::{Object, ObjectHandle, ObjectId};
use crate::writer::registry::TransformerRegistry;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::io::Write;
use tracing::debug;

/// Byte sink that knows how many bytes went through it.
struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    position: u64,
}

impl CountingWriter<'_> {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }
}

/// State shared by every transformer during one serialization session.
///
/// Holds the destination, the document being written, the registry used to
/// dispatch nested values, and the table of object numbers handed out so far.
/// Numbers are assigned on first encounter, starting at 1, and each assigned
/// handle is queued so the driver writes it exactly once.
pub struct WriteTransformerContext<'a> {
    destination: CountingWriter<'a>,
    document: &'a Document,
    registry: &'a TransformerRegistry,
    references: HashMap<ObjectHandle, ObjectId>,
    pending: VecDeque<ObjectHandle>,
    offsets: BTreeMap<u32, u64>,
    inline_stack: Vec<ObjectHandle>,
    depth: usize,
    compress_streams: bool,
}

impl<'a> WriteTransformerContext<'a> {
    pub fn new(
        destination: &'a mut dyn Write,
        document: &'a Document,
        registry: &'a TransformerRegistry,
    ) -> Self {
        Self {
            destination: CountingWriter {
                inner: destination,
                position: 0,
            },
            document,
            registry,
            references: HashMap::new(),
            pending: VecDeque::new(),
            offsets: BTreeMap::new(),
            inline_stack: Vec::new(),
            depth: 0,
            compress_streams: false,
        }
    }

    pub(crate) fn with_compression(mut self, compress_streams: bool) -> Self {
        self.compress_streams = compress_streams;
        self
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn registry(&self) -> &'a TransformerRegistry {
        self.registry
    }

    pub fn compress_streams(&self) -> bool {
        self.compress_streams
    }

    /// Bytes written to the destination so far.
    pub fn position(&self) -> u64 {
        self.destination.position
    }

    /// Nesting level of the value currently being written; the top value of
    /// an indirect object is at depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.destination.write_all(data)
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.destination.write_all(text.as_bytes())
    }

    /// Writes `value` with the first transformer that accepts it.
    pub fn write_value(&mut self, value: &Object) -> Result<()> {
        let registry = self.registry;
        let transformer = registry.find(value, self.document)?;
        self.depth += 1;
        let result = transformer.transform(value, self);
        self.depth -= 1;
        result
    }

    /// Writes a value nested in a container. With `force_inline`, a link to
    /// an arena value is replaced by the value itself even when the value is
    /// referenceable.
    pub fn write_child(&mut self, value: &Object, force_inline: bool) -> Result<()> {
        match value {
            Object::Reference(handle) if force_inline => self.write_inline(*handle),
            _ => self.write_value(value),
        }
    }

    /// Writes the arena value behind `handle` in place.
    pub fn write_inline(&mut self, handle: ObjectHandle) -> Result<()> {
        if self.inline_stack.contains(&handle) {
            return Err(PdfError::CircularReference(handle.index()));
        }
        let document = self.document;
        let object = document.try_get(handle)?;

        self.inline_stack.push(handle);
        let result = self.write_value(object);
        self.inline_stack.pop();
        result
    }

    /// Object id for `handle`, assigning the next free number on first use.
    pub fn reference(&mut self, handle: ObjectHandle) -> Result<ObjectId> {
        if let Some(id) = self.references.get(&handle) {
            return Ok(*id);
        }
        self.document.try_get(handle)?;

        let id = ObjectId::new(self.references.len() as u32 + 1, 0);
        self.references.insert(handle, id);
        self.pending.push_back(handle);
        Ok(id)
    }

    pub fn reference_for(&self, handle: ObjectHandle) -> Option<ObjectId> {
        self.references.get(&handle).copied()
    }

    /// Number of object ids handed out.
    pub fn object_count(&self) -> usize {
        self.references.len()
    }

    pub fn is_flushed(&self, number: u32) -> bool {
        self.offsets.contains_key(&number)
    }

    pub fn offsets(&self) -> &BTreeMap<u32, u64> {
        &self.offsets
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn next_pending(&mut self) -> Option<ObjectHandle> {
        self.pending.pop_front()
    }

    /// Assigns numbers to the referenceable values reachable from `object`
    /// without writing anything. Non-referenceable arena values are walked
    /// through.
    pub(crate) fn collect_references(&mut self, object: &Object) -> Result<()> {
        let mut visited = HashSet::new();
        self.collect_into(object, &mut visited)
    }

    fn collect_into(&mut self, object: &Object, visited: &mut HashSet<ObjectHandle>) -> Result<()> {
        match object {
            Object::Reference(handle) => {
                let document = self.document;
                if document.is_referenceable(*handle) {
                    self.reference(*handle)?;
                } else if visited.insert(*handle) {
                    self.collect_into(document.try_get(*handle)?, visited)?;
                }
            }
            Object::Array(array) => {
                for value in array {
                    self.collect_into(value, visited)?;
                }
            }
            Object::Dictionary(dict) => {
                for value in dict.values() {
                    self.collect_into(value, visited)?;
                }
            }
            Object::Stream(stream) => {
                for value in stream.dictionary().values() {
                    self.collect_into(value, visited)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Writes `n 0 obj`, the value behind `handle`, and `endobj`, recording
    /// the byte offset of the object.
    pub(crate) fn write_indirect(&mut self, handle: ObjectHandle) -> Result<()> {
        let id = self.reference(handle)?;
        self.offsets.insert(id.number(), self.position());
        debug!(number = id.number(), handle = %handle, "writing indirect object");

        let document = self.document;
        let object = document.try_get(handle)?;

        self.write_str(&format!("{} {} obj\n", id.number(), id.generation()))?;
        self.inline_stack.push(handle);
        let result = self.write_value(object);
        self.inline_stack.pop();
        result?;
        self.write_bytes(b"\nendobj\n")
    }

    pub(crate) fn into_offsets(self) -> BTreeMap<u32, u64> {
        self.offsets
    }
}
