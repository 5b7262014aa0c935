//! Data models for Redaktor
//!
//! Defines the document graph: pages made of ordered elements (text blocks
//! and links to other pages), and the document root that owns them.
//!
//! Elements serialize as internally tagged JSON objects (`"type": "text"` or
//! `"type": "link"`). Objects carrying a tag this build does not know are kept
//! verbatim as [`OpaqueElement`]s so they survive a load/save cycle.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ordering::Identified;

/// Keys and tags used in the serialized element structure
mod keys {
    pub const TYPE: &str = "type";
    pub const ID: &str = "id";
    pub const TEXT: &str = "text";
    pub const IS_NEW: &str = "is_new";

    pub const TAG_TEXT: &str = "text";
    pub const TAG_LINK: &str = "link";
}

/// A frozen `(id, title)` copy of a page, captured when a link is saved
///
/// Not a live reference: renaming or deleting the page leaves it untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSnapshot {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

impl PageSnapshot {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A block of plain text (rendered as markdown by clients)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextElement {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_new: bool,
}

impl TextElement {
    /// Create a text element that has not been stored yet
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            is_new: false,
        }
    }
}

/// A link to another page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkElement {
    pub id: String,
    pub text: String,
    /// Target page at the time the link was last saved; `None` when unbound
    #[serde(default)]
    pub related_page: Option<PageSnapshot>,
    #[serde(default)]
    pub is_new: bool,
}

impl LinkElement {
    /// Create an unbound link element that has not been stored yet
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            related_page: None,
            is_new: false,
        }
    }

    /// Create a link bound to a snapshot of `page`
    pub fn bound_to(text: impl Into<String>, page: &Page) -> Self {
        let mut link = Self::new(text);
        link.bind(page);
        link
    }

    /// Point the link at `page`, capturing its current id and title
    pub fn bind(&mut self, page: &Page) {
        self.related_page = Some(page.snapshot());
    }

    pub fn unbind(&mut self) {
        self.related_page = None;
    }

    pub fn is_bound(&self) -> bool {
        self.related_page.is_some()
    }
}

/// An element whose `"type"` tag is unknown to this build
///
/// Holds the raw JSON object, tag included, and writes it back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueElement {
    fields: Map<String, Value>,
}

impl OpaqueElement {
    /// The unrecognized type tag
    pub fn kind(&self) -> &str {
        self.fields
            .get(keys::TYPE)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        self.fields
            .get(keys::ID)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// An ordered item within a page
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextElement),
    Link(LinkElement),
    /// Element written by a newer build, carried through untouched
    Opaque(OpaqueElement),
}

impl Element {
    /// A blank text element awaiting user confirmation
    pub fn empty_text() -> Self {
        let mut element = TextElement::new(String::new());
        element.is_new = true;
        Element::Text(element)
    }

    /// A blank, unbound link element awaiting user confirmation
    pub fn empty_link() -> Self {
        let mut element = LinkElement::new(String::new());
        element.is_new = true;
        Element::Link(element)
    }

    pub fn id(&self) -> &str {
        match self {
            Element::Text(text) => &text.id,
            Element::Link(link) => &link.id,
            Element::Opaque(opaque) => opaque.id(),
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        match self {
            Element::Text(text) => text.id = id,
            Element::Link(link) => link.id = id,
            Element::Opaque(opaque) => {
                opaque.fields.insert(keys::ID.to_string(), Value::String(id));
            }
        }
    }

    pub fn is_new(&self) -> bool {
        match self {
            Element::Text(text) => text.is_new,
            Element::Link(link) => link.is_new,
            Element::Opaque(opaque) => opaque
                .fields
                .get(keys::IS_NEW)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    pub fn set_new(&mut self, is_new: bool) {
        match self {
            Element::Text(text) => text.is_new = is_new,
            Element::Link(link) => link.is_new = is_new,
            Element::Opaque(opaque) => {
                opaque
                    .fields
                    .insert(keys::IS_NEW.to_string(), Value::Bool(is_new));
            }
        }
    }

    /// The serialized type tag
    pub fn kind(&self) -> &str {
        match self {
            Element::Text(_) => keys::TAG_TEXT,
            Element::Link(_) => keys::TAG_LINK,
            Element::Opaque(opaque) => opaque.kind(),
        }
    }

    /// Display text, if the element has any
    pub fn text(&self) -> Option<&str> {
        match self {
            Element::Text(text) => Some(&text.text),
            Element::Link(link) => Some(&link.text),
            Element::Opaque(opaque) => opaque.fields.get(keys::TEXT).and_then(Value::as_str),
        }
    }

    pub fn as_link(&self) -> Option<&LinkElement> {
        match self {
            Element::Link(link) => Some(link),
            _ => None,
        }
    }
}

impl From<TextElement> for Element {
    fn from(element: TextElement) -> Self {
        Element::Text(element)
    }
}

impl From<LinkElement> for Element {
    fn from(element: LinkElement) -> Self {
        Element::Link(element)
    }
}

impl Identified for Element {
    fn id(&self) -> &str {
        Element::id(self)
    }
}

/// Borrowed view used to serialize the known variants with their tag
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedElement<'a> {
    Text(&'a TextElement),
    Link(&'a LinkElement),
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Element::Text(text) => TaggedElement::Text(text).serialize(serializer),
            Element::Link(link) => TaggedElement::Link(link).serialize(serializer),
            Element::Opaque(opaque) => opaque.fields.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;

        let kind = match fields.get(keys::TYPE) {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => return Err(de::Error::custom("element \"type\" must be a string")),
            None => return Err(de::Error::missing_field(keys::TYPE)),
        };

        match kind.as_str() {
            keys::TAG_TEXT => serde_json::from_value(Value::Object(fields))
                .map(Element::Text)
                .map_err(de::Error::custom),
            keys::TAG_LINK => serde_json::from_value(Value::Object(fields))
                .map(Element::Link)
                .map_err(de::Error::custom),
            _ => Ok(Element::Opaque(OpaqueElement { fields })),
        }
    }
}

/// A named, ordered collection of elements; the unit of navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub is_new: bool,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            elements: Vec::new(),
            is_new: false,
        }
    }

    /// A blank page awaiting an id and a title
    pub fn empty() -> Self {
        Self {
            is_new: true,
            ..Self::new(String::new(), String::new())
        }
    }

    /// Reduce to the `(id, title)` pair stored by links
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot::new(self.id.clone(), self.title.clone())
    }

    /// Copy of the page with its element bodies dropped (catalog view)
    pub fn without_elements(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            elements: Vec::new(),
            is_new: self.is_new,
        }
    }

    pub fn element(&self, element_id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == element_id)
    }

    pub fn element_position(&self, element_id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == element_id)
    }

    /// Whether the title is blank (an unnamed page)
    pub fn is_untitled(&self) -> bool {
        self.title.trim().is_empty()
    }
}

impl Identified for Page {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The full set of pages plus the start page pointer; the unit of persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub pages: Vec<Page>,
    /// Empty when unset
    pub start_page_id: String,
}

impl Document {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    pub fn page_mut(&mut self, page_id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == page_id)
    }

    /// The page referenced by `start_page_id`, if it resolves
    pub fn start_page(&self) -> Option<&Page> {
        if self.start_page_id.is_empty() {
            return None;
        }
        self.page(&self.start_page_id)
    }

    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.start_page_id.is_empty()
    }
}
