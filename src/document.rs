/*!
 * Live document model.
 *
 * Wraps an html5ever `RcDom` and exposes the handful of operations the
 * translation engine needs: text units with stable identity, the declared
 * document language, a rendered-text prefix for detection, and the state
 * marker on `<body>`.
 */

use std::rc::{Rc, Weak};

use html5ever::interface::{Attribute, QualName};
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

use crate::errors::AppError;

/// Attribute on `<body>` mirroring the engine's pass state
pub const STATE_ATTRIBUTE: &str = "data-pagetrans-state";

/// Elements whose text is never shown to a reader
const NON_RENDERED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// A parsed HTML document owned by the host
pub struct Document {
    dom: RcDom,
}

impl Document {
    /// Parse an HTML string into a live document
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// The document node
    pub fn root(&self) -> Handle {
        self.dom.document.clone()
    }

    /// The `<html>` element, if present
    pub fn html_element(&self) -> Option<Handle> {
        child_element(&self.dom.document, "html")
    }

    /// The `<body>` element, if present
    pub fn body(&self) -> Option<Handle> {
        self.html_element().and_then(|html| child_element(&html, "body"))
    }

    /// Language declared on the `<html>` element, e.g. `lang="de-AT"`
    pub fn declared_language(&self) -> Option<String> {
        self.html_element()
            .and_then(|html| element_attr(&html, "lang"))
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
    }

    /// Up to `max_chars` characters of the text a reader would see in `<body>`
    pub fn rendered_text(&self, max_chars: usize) -> String {
        let Some(body) = self.body() else {
            return String::new();
        };

        let mut pieces = Vec::new();
        let mut remaining = max_chars;
        collect_rendered_text(&body, &mut pieces, &mut remaining);
        pieces.join(" ")
    }

    /// Value of the pass-state marker on `<body>`
    pub fn state_marker(&self) -> Option<String> {
        self.body().and_then(|body| element_attr(&body, STATE_ATTRIBUTE))
    }

    /// Write the pass-state marker on `<body>`
    pub(crate) fn set_state_marker(&self, value: &str) {
        if let Some(body) = self.body() {
            set_element_attr(&body, STATE_ATTRIBUTE, value);
        }
    }

    /// Serialize the document back into HTML
    pub fn to_html(&self) -> Result<String, AppError> {
        let mut buf: Vec<u8> = Vec::new();
        let serializable: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut buf, &serializable, SerializeOpts::default())
            .map_err(|e| AppError::Document(format!("Unable to serialize DOM: {}", e)))?;

        String::from_utf8(buf).map_err(|e| AppError::Document(e.to_string()))
    }
}

/// A leaf text node of the live document.
///
/// Identity is the node allocation itself: two `TextUnit`s are the same unit
/// exactly when they point at the same node.
#[derive(Clone)]
pub struct TextUnit {
    handle: Handle,
}

impl TextUnit {
    /// Wrap a handle if it refers to a text node
    pub fn from_handle(handle: Handle) -> Option<Self> {
        match handle.data {
            NodeData::Text { .. } => Some(Self { handle }),
            _ => None,
        }
    }

    /// Current live value
    pub fn text(&self) -> String {
        match &self.handle.data {
            NodeData::Text { contents } => contents.borrow().to_string(),
            _ => String::new(),
        }
    }

    /// Replace the live value
    pub fn set_text(&self, value: &str) {
        if let NodeData::Text { contents } = &self.handle.data {
            *contents.borrow_mut() = StrTendril::from_slice(value);
        }
    }

    /// Structural parent, if the unit is still attached
    pub fn parent(&self) -> Option<Handle> {
        let parent = self.handle.parent.take();
        let upgraded = parent.as_ref().and_then(Weak::upgrade);
        self.handle.parent.set(parent);
        upgraded
    }

    /// Local name of the parent element
    pub fn parent_tag(&self) -> Option<String> {
        self.parent().and_then(|parent| element_name(&parent))
    }

    /// Identity key, stable for as long as anything references the node
    pub fn key(&self) -> usize {
        Rc::as_ptr(&self.handle) as usize
    }

    /// Non-owning reference to this unit
    pub fn downgrade(&self) -> WeakUnit {
        WeakUnit {
            node: Rc::downgrade(&self.handle),
        }
    }

    /// Underlying DOM handle
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Whether both values refer to the same node
    pub fn same_unit(&self, other: &TextUnit) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }
}

impl std::fmt::Debug for TextUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextUnit")
            .field("key", &self.key())
            .field("text", &self.text())
            .finish()
    }
}

/// A text unit reference that does not keep the node alive
#[derive(Clone)]
pub struct WeakUnit {
    node: Weak<Node>,
}

impl WeakUnit {
    /// Upgrade back to a live unit, if the document still holds it
    pub fn upgrade(&self) -> Option<TextUnit> {
        self.node.upgrade().map(|handle| TextUnit { handle })
    }

    /// Identity key, equal to [`TextUnit::key`] of the unit it came from
    pub fn key(&self) -> usize {
        Weak::as_ptr(&self.node) as usize
    }

    /// Whether the node has been dropped
    pub fn is_dead(&self) -> bool {
        self.node.strong_count() == 0
    }
}

/// Local name of an element node
pub fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Value of an attribute on an element node
pub fn element_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

fn set_element_attr(node: &Handle, attr_name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|attr| &*attr.name.local == attr_name) {
            Some(attr) => attr.value = StrTendril::from_slice(value),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                value: StrTendril::from_slice(value),
            }),
        }
    }
}

fn child_element(parent: &Handle, name: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| element_name(child).as_deref() == Some(name))
        .cloned()
}

fn collect_rendered_text(node: &Handle, pieces: &mut Vec<String>, remaining: &mut usize) {
    for child in node.children.borrow().iter() {
        if *remaining == 0 {
            return;
        }
        match &child.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let piece: String = trimmed.chars().take(*remaining).collect();
                *remaining -= piece.chars().count();
                pieces.push(piece);
            }
            NodeData::Element { name, .. } => {
                if !NON_RENDERED_ELEMENTS.contains(&&*name.local) {
                    collect_rendered_text(child, pieces, remaining);
                }
            }
            _ => {}
        }
    }
}
