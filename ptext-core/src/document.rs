use crate::error::{PdfError, Result};
use crate::objects::{Array, Dictionary, Object, ObjectHandle};
use chrono::{DateTime, Local, Utc};

/// A PDF document: the trailer dictionary plus an arena holding every value
/// that can be shared or referenced.
///
/// Values in the arena are addressed by [`ObjectHandle`]; links between them
/// are [`Object::Reference`] handles, so the graph may contain cycles (a page
/// points to its parent `/Pages` node and back) without shared ownership.
///
/// # Example
///
/// ```rust
/// use ptext::{Dictionary, Document, Object};
///
/// let mut doc = Document::new();
/// doc.set_title("My Document");
///
/// let mut page = Dictionary::new();
/// page.set("MediaBox", vec![Object::from(0), Object::from(0), Object::from(612), Object::from(792)]);
/// doc.add_page(page).unwrap();
///
/// assert_eq!(doc.page_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    trailer: Dictionary,
}

#[derive(Debug, Clone)]
struct Slot {
    object: Object,
    referenceable: bool,
}

impl Document {
    /// Creates a document whose trailer points to a catalog with an empty
    /// page tree.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            trailer: Dictionary::new(),
        };

        let mut pages = Dictionary::new();
        pages.set("Type", Object::name("Pages"));
        pages.set("Kids", Array::new());
        pages.set("Count", 0);
        let pages = doc.add(pages);

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::name("Catalog"));
        catalog.set("Pages", pages);
        let catalog = doc.add(catalog);

        doc.trailer.set("Root", catalog);
        doc
    }

    /// Stores `object` in the arena. Containers are referenceable by default,
    /// other values are written inline unless marked otherwise.
    pub fn add(&mut self, object: impl Into<Object>) -> ObjectHandle {
        let object = object.into();
        let referenceable = object.is_container();
        self.push_slot(object, referenceable)
    }

    /// Stores `object` in the arena with referencing disabled, so every link
    /// to it is written inline.
    pub fn add_inline(&mut self, object: impl Into<Object>) -> ObjectHandle {
        self.push_slot(object.into(), false)
    }

    fn push_slot(&mut self, object: Object, referenceable: bool) -> ObjectHandle {
        let handle = ObjectHandle(self.slots.len() as u32);
        self.slots.push(Slot {
            object,
            referenceable,
        });
        handle
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&Object> {
        self.slots.get(handle.0 as usize).map(|slot| &slot.object)
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut Object> {
        self.slots.get_mut(handle.0 as usize).map(|slot| &mut slot.object)
    }

    pub fn try_get(&self, handle: ObjectHandle) -> Result<&Object> {
        self.get(handle).ok_or(PdfError::InvalidHandle(handle.0))
    }

    fn try_get_mut(&mut self, handle: ObjectHandle) -> Result<&mut Object> {
        self.get_mut(handle).ok_or(PdfError::InvalidHandle(handle.0))
    }

    pub fn is_referenceable(&self, handle: ObjectHandle) -> bool {
        self.slots
            .get(handle.0 as usize)
            .is_some_and(|slot| slot.referenceable)
    }

    /// Clearing the flag forces every link to `handle` to be written inline.
    pub fn set_referenceable(&mut self, handle: ObjectHandle, referenceable: bool) -> Result<()> {
        let slot = self
            .slots
            .get_mut(handle.0 as usize)
            .ok_or(PdfError::InvalidHandle(handle.0))?;
        slot.referenceable = referenceable;
        Ok(())
    }

    /// Follows reference links until a direct value is reached.
    ///
    /// Returns `None` for dangling handles and for chains of references that
    /// loop back on themselves.
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        let mut current = object;
        for _ in 0..=self.slots.len() {
            match current {
                Object::Reference(handle) => current = self.get(*handle)?,
                direct => return Some(direct),
            }
        }
        None
    }

    /// Looks up `key` in `dict` and resolves the value.
    pub fn resolve_key<'a>(&'a self, dict: &'a Dictionary, key: &str) -> Option<&'a Object> {
        dict.get(key).and_then(|value| self.resolve(value))
    }

    pub fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut Dictionary {
        &mut self.trailer
    }

    /// Handle of the document catalog (`/Root`).
    pub fn catalog(&self) -> Option<ObjectHandle> {
        self.trailer.get("Root").and_then(Object::as_reference)
    }

    /// Handle of the root `/Pages` node, reached through trailer, catalog.
    pub fn pages(&self) -> Option<ObjectHandle> {
        let catalog = self.get(self.catalog()?)?.as_dict()?;
        catalog.get("Pages").and_then(Object::as_reference)
    }

    /// Appends a page to the root page tree and returns its handle.
    ///
    /// `/Type /Page` is set on the dictionary; `/Parent` is supplied when
    /// the page is written.
    pub fn add_page(&mut self, mut page: Dictionary) -> Result<ObjectHandle> {
        let pages = self
            .pages()
            .ok_or_else(|| PdfError::InvalidStructure("document has no /Pages node".to_string()))?;
        page.set("Type", Object::name("Page"));
        let handle = self.add(page);

        let Object::Dictionary(pages_dict) = self.try_get_mut(pages)? else {
            return Err(PdfError::InvalidStructure(
                "/Pages node is not a dictionary".to_string(),
            ));
        };
        // updated in place so /Kids keeps its position ahead of /Count
        if !matches!(pages_dict.get("Kids"), Some(Object::Array(_))) {
            pages_dict.set("Kids", Array::new());
        }
        let count = match pages_dict.get_mut("Kids") {
            Some(Object::Array(kids)) => {
                kids.push(handle);
                kids.len()
            }
            _ => 0,
        };
        pages_dict.set("Count", count);
        Ok(handle)
    }

    /// Leaf pages in document order, descending through nested `/Pages` nodes.
    pub fn page_handles(&self) -> Vec<ObjectHandle> {
        let mut out = Vec::new();
        if let Some(root) = self.pages() {
            let mut visited = Vec::new();
            self.collect_pages(root, &mut out, &mut visited);
        }
        out
    }

    fn collect_pages(
        &self,
        node: ObjectHandle,
        out: &mut Vec<ObjectHandle>,
        visited: &mut Vec<ObjectHandle>,
    ) {
        if visited.contains(&node) {
            return;
        }
        visited.push(node);
        let Some(dict) = self.get(node).and_then(Object::as_dict) else {
            return;
        };
        if dict.is_type("Page") {
            out.push(node);
            return;
        }
        let Some(kids) = self.resolve_key(dict, "Kids").and_then(Object::as_array) else {
            return;
        };
        for kid in kids {
            if let Some(kid) = kid.as_reference() {
                self.collect_pages(kid, out, visited);
            }
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_handles().len()
    }

    pub fn page(&self, index: usize) -> Option<ObjectHandle> {
        self.page_handles().get(index).copied()
    }

    /// The document information dictionary, created on first use.
    fn info_mut(&mut self) -> &mut Dictionary {
        let existing = self.trailer.get("Info").and_then(Object::as_reference);
        let handle = match existing {
            Some(handle) if matches!(self.get(handle), Some(Object::Dictionary(_))) => handle,
            _ => {
                let handle = self.add(Dictionary::new());
                self.trailer.set("Info", handle);
                handle
            }
        };
        match &mut self.slots[handle.0 as usize].object {
            Object::Dictionary(dict) => dict,
            _ => unreachable!("info handle always points to a dictionary"),
        }
    }

    /// Sets the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.info_mut().set("Title", title.into());
    }

    /// Sets the document author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.info_mut().set("Author", author.into());
    }

    /// Sets the document subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.info_mut().set("Subject", subject.into());
    }

    /// Sets the document keywords.
    pub fn set_keywords(&mut self, keywords: impl Into<String>) {
        self.info_mut().set("Keywords", keywords.into());
    }

    /// Sets the document creator (software that created the original document).
    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.info_mut().set("Creator", creator.into());
    }

    /// Sets the document producer (software that produced the PDF).
    pub fn set_producer(&mut self, producer: impl Into<String>) {
        self.info_mut().set("Producer", producer.into());
    }

    pub fn set_creation_date(&mut self, date: DateTime<Utc>) {
        self.info_mut().set("CreationDate", format_pdf_date(date));
    }

    pub fn set_creation_date_local(&mut self, date: DateTime<Local>) {
        self.set_creation_date(date.with_timezone(&Utc));
    }

    pub fn set_modification_date(&mut self, date: DateTime<Utc>) {
        self.info_mut().set("ModDate", format_pdf_date(date));
    }

    /// Sets the modification date to the current time.
    pub fn update_modification_date(&mut self) {
        self.set_modification_date(Utc::now());
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a DateTime as a PDF date string (D:YYYYMMDDHHmmSSOHH'mm)
pub(crate) fn format_pdf_date(date: DateTime<Utc>) -> String {
    let formatted = date.format("D:%Y%m%d%H%M%S");

    // For UTC, the offset is always +00'00
    format!("{formatted}+00'00")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_document_has_page_tree() {
        let doc = Document::new();
        let catalog = doc.catalog().unwrap();
        let pages = doc.pages().unwrap();

        assert!(doc.get(catalog).unwrap().as_dict().unwrap().is_type("Catalog"));
        let pages_dict = doc.get(pages).unwrap().as_dict().unwrap();
        assert!(pages_dict.is_type("Pages"));
        assert_eq!(pages_dict.get("Count"), Some(&Object::from(0)));
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_add_page_updates_kids_and_count() {
        let mut doc = Document::new();
        let first = doc.add_page(Dictionary::new()).unwrap();
        let second = doc.add_page(Dictionary::new()).unwrap();

        let pages_dict = doc.get(doc.pages().unwrap()).unwrap().as_dict().unwrap();
        assert_eq!(pages_dict.get("Count"), Some(&Object::from(2)));
        assert_eq!(doc.page_handles(), vec![first, second]);
        assert_eq!(doc.page(1), Some(second));
        assert!(doc.get(first).unwrap().as_dict().unwrap().is_type("Page"));
    }

    #[test]
    fn test_add_page_keeps_pages_key_order() {
        let mut doc = Document::new();
        doc.add_page(Dictionary::new()).unwrap();
        doc.add_page(Dictionary::new()).unwrap();

        let pages_dict = doc.get(doc.pages().unwrap()).unwrap().as_dict().unwrap();
        let keys: Vec<&str> = pages_dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Type", "Kids", "Count"]);
    }

    #[test]
    fn test_referenceable_defaults() {
        let mut doc = Document::new();
        let dict = doc.add(Dictionary::new());
        let number = doc.add(42);
        let inline = doc.add_inline(Array::new());

        assert!(doc.is_referenceable(dict));
        assert!(!doc.is_referenceable(number));
        assert!(!doc.is_referenceable(inline));

        doc.set_referenceable(number, true).unwrap();
        assert!(doc.is_referenceable(number));
        assert!(doc.set_referenceable(ObjectHandle(999), true).is_err());
    }

    #[test]
    fn test_resolve_follows_links_and_stops_on_loops() {
        let mut doc = Document::new();
        let target = doc.add(7);
        let link = doc.add(Object::Reference(target));
        assert_eq!(doc.resolve(&Object::Reference(link)), Some(&Object::from(7)));

        let a = doc.add(Object::Null);
        let b = doc.add(Object::Reference(a));
        *doc.get_mut(a).unwrap() = Object::Reference(b);
        assert_eq!(doc.resolve(&Object::Reference(a)), None);
        assert_eq!(doc.resolve(&Object::Reference(ObjectHandle(500))), None);
    }

    #[test]
    fn test_info_dictionary() {
        let mut doc = Document::new();
        doc.set_title("Report");
        doc.set_author("Finance");
        doc.set_creation_date(Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap());

        let info = doc.trailer().get("Info").and_then(Object::as_reference).unwrap();
        let info = doc.get(info).unwrap().as_dict().unwrap();
        assert_eq!(info.get("Title"), Some(&Object::from("Report")));
        assert_eq!(info.get("Author"), Some(&Object::from("Finance")));
        assert_eq!(
            info.get("CreationDate"),
            Some(&Object::from("D:20230101120000+00'00"))
        );
    }

    #[test]
    fn test_format_pdf_date() {
        let date = Utc.with_ymd_and_hms(2023, 6, 15, 18, 30, 0).unwrap();
        assert_eq!(format_pdf_date(date), "D:20230615183000+00'00");
    }
}
