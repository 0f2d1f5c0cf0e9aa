use crate::canvas::event::{Event, EventListener};
use crate::canvas::operator::OperatorRegistry;
use crate::canvas::state::CanvasGraphicsState;
use crate::canvas::Canvas;
use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::fonts::Font;
use crate::objects::{Dictionary, Object, ObjectHandle};
use crate::parser::{ContentItem, ContentParser};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Options for [`CanvasStreamProcessor`].
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Fail when a stream ends with marked content still open
    pub require_balanced_marked_content: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            require_balanced_marked_content: true,
        }
    }
}

impl ProcessorOptions {
    pub fn with_balanced_marked_content(mut self, required: bool) -> Self {
        self.require_balanced_marked_content = required;
        self
    }
}

/// Interprets content streams against a [`Canvas`], delivering render events
/// to the registered listeners.
pub struct CanvasStreamProcessor<'a> {
    canvas: Canvas,
    document: &'a Document,
    resources: Option<&'a Dictionary>,
    operators: Arc<OperatorRegistry>,
    fonts: HashMap<String, Font>,
    listeners: Vec<&'a mut dyn EventListener>,
    operands: Vec<Object>,
    options: ProcessorOptions,
}

impl<'a> CanvasStreamProcessor<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            canvas: Canvas::new(),
            document,
            resources: None,
            operators: OperatorRegistry::shared(),
            fonts: HashMap::new(),
            listeners: Vec::new(),
            operands: Vec::new(),
            options: ProcessorOptions::default(),
        }
    }

    /// Resources used to look up fonts, colour spaces and property lists.
    pub fn with_resources(mut self, resources: &'a Dictionary) -> Self {
        self.set_resources(Some(resources));
        self
    }

    pub fn with_operators(mut self, operators: Arc<OperatorRegistry>) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_options(mut self, options: ProcessorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_listener(mut self, listener: &'a mut dyn EventListener) -> Self {
        self.add_listener(listener);
        self
    }

    pub fn add_listener(&mut self, listener: &'a mut dyn EventListener) {
        self.listeners.push(listener);
    }

    pub fn set_resources(&mut self, resources: Option<&'a Dictionary>) {
        self.resources = resources;
        self.fonts.clear();
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn resources(&self) -> Option<&'a Dictionary> {
        self.resources
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn graphics_state(&self) -> &CanvasGraphicsState {
        &self.canvas.graphics_state
    }

    pub fn graphics_state_mut(&mut self) -> &mut CanvasGraphicsState {
        &mut self.canvas.graphics_state
    }

    /// Operands pushed since the last operator.
    pub fn pending_operands(&self) -> &[Object] {
        &self.operands
    }

    /// Delivers `event` to every listener, in registration order.
    pub fn emit(&mut self, event: Event) {
        for listener in self.listeners.iter_mut() {
            listener.on_event(&event);
        }
    }

    /// Looks up `name` in the `category` sub-dictionary of the current
    /// resources, following references.
    pub fn resource(&self, category: &str, name: &str) -> Option<&'a Object> {
        lookup_resource(self.document, self.resources, category, name)
    }

    /// Metrics of the font resource `name`. An unknown font is replaced by
    /// one whose glyphs all have zero width.
    pub fn font(&mut self, name: &str) -> &Font {
        let document = self.document;
        let resources = self.resources;
        self.fonts.entry(name.to_string()).or_insert_with(|| {
            match lookup_resource(document, resources, "Font", name).and_then(Object::as_dict) {
                Some(dict) => Font::from_dictionary(dict, document),
                None => {
                    warn!(font = name, "font not found in resources, glyph widths default to 0");
                    Font::fallback()
                }
            }
        })
    }

    /// Runs another operator directly, bypassing the operand stack. Used by
    /// operators defined in terms of others, such as `TD` and `'`.
    pub fn invoke_operator(&mut self, operator: &str, operands: &[Object]) -> Result<()> {
        let handler = self
            .operators
            .get(operator)
            .ok_or_else(|| PdfError::UnknownOperator(operator.to_string()))?;
        let expected = handler.operand_count(&self.canvas.graphics_state);
        if operands.len() < expected {
            return Err(PdfError::MissingOperands {
                operator: operator.to_string(),
                expected,
                found: operands.len(),
            });
        }
        handler.invoke(self, &operands[operands.len() - expected..])
    }

    /// Interprets `content` against the current canvas.
    ///
    /// Fails on an unknown operator outside a `BX`/`EX` section, on too few
    /// operands, and, unless disabled in the options, when marked content is
    /// left open at the end of the stream.
    pub fn process_content(&mut self, content: &[u8]) -> Result<()> {
        let mut parser = ContentParser::new(content);
        let mut operator_count = 0usize;

        while let Some(item) = parser.next_item()? {
            match item {
                ContentItem::Operand(operand) => self.operands.push(operand),
                ContentItem::Operator(operator) => {
                    operator_count += 1;
                    self.dispatch(&operator)?;
                }
            }
        }

        if !self.operands.is_empty() {
            debug!(count = self.operands.len(), "discarding trailing operands");
            self.operands.clear();
        }

        let open = self.canvas.marked_content().len();
        if open > 0 && self.options.require_balanced_marked_content {
            return Err(PdfError::UnbalancedMarkedContent(open));
        }

        debug!(operators = operator_count, bytes = content.len(), "processed content stream");
        Ok(())
    }

    /// Interprets the content of a page, wrapped in page boundary events.
    /// The canvas is reset and the page's (possibly inherited) resources are
    /// installed first.
    pub fn process_page(&mut self, page: ObjectHandle) -> Result<()> {
        let document = self.document;
        let dict = document
            .try_get(page)?
            .as_dict()
            .filter(|dict| dict.is_type("Page"))
            .ok_or_else(|| {
                PdfError::ContractViolation(format!("object {page} is not a page dictionary"))
            })?;

        self.canvas = Canvas::new();
        self.operands.clear();
        self.set_resources(inherited_resources(document, dict));
        let content = page_content(document, dict)?;

        self.emit(Event::BeginPage(page));
        self.process_content(&content)?;
        self.emit(Event::EndPage(page));
        Ok(())
    }

    fn dispatch(&mut self, operator: &str) -> Result<()> {
        trace!(operator, operands = self.operands.len(), "dispatching operator");

        let Some(handler) = self.operators.get(operator) else {
            if self.canvas.in_compatibility_section() {
                debug!(
                    operator,
                    discarded = self.operands.len(),
                    "ignoring unknown operator inside compatibility section"
                );
                self.operands.clear();
                return Ok(());
            }
            return Err(PdfError::UnknownOperator(operator.to_string()));
        };

        let expected = handler.operand_count(&self.canvas.graphics_state);
        if self.operands.len() < expected {
            return Err(PdfError::MissingOperands {
                operator: operator.to_string(),
                expected,
                found: self.operands.len(),
            });
        }

        let operands = self.operands.split_off(self.operands.len() - expected);
        self.operands.clear();
        handler.invoke(self, &operands)
    }
}

fn lookup_resource<'a>(
    document: &'a Document,
    resources: Option<&'a Dictionary>,
    category: &str,
    name: &str,
) -> Option<&'a Object> {
    let entries = document.resolve_key(resources?, category)?.as_dict()?;
    document.resolve_key(entries, name)
}

/// `/Resources` of the page or of the nearest ancestor that has them.
fn inherited_resources<'a>(document: &'a Document, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut node = page;
    let mut visited = HashSet::new();
    loop {
        if let Some(resources) = document.resolve_key(node, "Resources").and_then(Object::as_dict) {
            return Some(resources);
        }
        if let Some(handle) = node.get("Parent").and_then(Object::as_reference) {
            if !visited.insert(handle) {
                return None;
            }
        }
        node = document.resolve_key(node, "Parent")?.as_dict()?;
    }
}

/// Decoded `/Contents` of a page. An array of streams is joined with
/// newlines so tokens never run together across stream boundaries.
fn page_content(document: &Document, page: &Dictionary) -> Result<Vec<u8>> {
    let stream_data = |object: &Object| -> Result<Vec<u8>> {
        let stream = document
            .resolve(object)
            .and_then(Object::as_stream)
            .ok_or_else(|| PdfError::InvalidStructure("page /Contents must be a stream".to_string()))?;
        Ok(stream.decoded_data()?.into_owned())
    };

    match page.get("Contents") {
        None | Some(Object::Null) => Ok(Vec::new()),
        Some(contents) => match document.resolve(contents) {
            Some(Object::Array(streams)) => {
                let mut content = Vec::new();
                for (i, stream) in streams.iter().enumerate() {
                    if i > 0 {
                        content.push(b'\n');
                    }
                    content.extend_from_slice(&stream_data(stream)?);
                }
                Ok(content)
            }
            _ => stream_data(contents),
        },
    }
}
