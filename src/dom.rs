//! Document model - the markup the reveal controllers read and write.
//!
//! A flat arena of elements addressed by [`NodeId`]. Each element has an
//! optional DOM id, string attributes, a class list, a parent link and a
//! text content. Elements are cheap handles: cloning one shares the
//! underlying node, so a reveal task can keep writing to it from host loop
//! callbacks after the controller returned.
//!
//! Text, classes and the element list are signals. An `effect` that reads
//! them (see `renderer::live`) re-runs whenever a reveal writes a frame,
//! the overlay is shown or hidden, or an element is appended.
//!
//! # Example
//!
//! ```ignore
//! use decrypt_reveal::dom::{Document, ElementSpec};
//!
//! let doc = Document::new();
//! doc.set_root_attribute("data-decrypt-overlay-text", "WELCOME");
//! let title = doc.append(ElementSpec::new().attr("data-decrypt", "").text("Hello"));
//! assert_eq!(doc.query_attribute("data-decrypt").len(), 1);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::types::{NodeId, HIDDEN_CLASS};

// =============================================================================
// Element
// =============================================================================

struct ElementData {
    node: NodeId,
    dom_id: Option<String>,
    parent: Option<NodeId>,
    attributes: RefCell<HashMap<String, String>>,
    classes: Signal<BTreeSet<String>>,
    text: Signal<String>,
}

/// Shared handle to a document element.
#[derive(Clone)]
pub struct Element {
    inner: Rc<ElementData>,
}

impl Element {
    /// Arena index of this element.
    pub fn node_id(&self) -> NodeId {
        self.inner.node
    }

    /// DOM id, if any.
    pub fn dom_id(&self) -> Option<&str> {
        self.inner.dom_id.as_deref()
    }

    /// Parent element, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.inner.parent
    }

    /// Attribute value.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.attributes.borrow().get(name).cloned()
    }

    /// Check for an attribute, whatever its value.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner.attributes.borrow().contains_key(name)
    }

    /// Set an attribute.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.inner
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Check for a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.inner.classes.with(|classes| classes.contains(class))
    }

    /// Add a class. Adding one already present notifies nobody.
    pub fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.inner.classes.update(|classes| {
                classes.insert(class.to_string());
            });
        }
    }

    /// Remove a class.
    pub fn remove_class(&self, class: &str) {
        if self.has_class(class) {
            self.inner.classes.update(|classes| {
                classes.remove(class);
            });
        }
    }

    /// True if this element itself carries the hidden class.
    pub fn is_hidden(&self) -> bool {
        self.has_class(HIDDEN_CLASS)
    }

    /// Current text content.
    pub fn text(&self) -> String {
        self.inner.text.get()
    }

    /// Replace the text content.
    pub fn set_text(&self, text: &str) {
        self.inner.text.set(text.to_string());
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("node", &self.inner.node)
            .field("dom_id", &self.inner.dom_id)
            .field("parent", &self.inner.parent)
            .finish()
    }
}

// =============================================================================
// Element Spec
// =============================================================================

/// Description of an element to append to a document.
#[derive(Clone, Debug, Default)]
pub struct ElementSpec {
    pub id: Option<String>,
    pub parent: Option<NodeId>,
    pub attributes: Vec<(String, String)>,
    pub classes: Vec<String>,
    pub text: String,
}

impl ElementSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn child_of(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

// =============================================================================
// Document
// =============================================================================

/// Element arena plus root (`<html>`) attributes.
pub struct Document {
    root_attributes: RefCell<HashMap<String, String>>,
    elements: RefCell<Vec<Element>>,
    /// Element count; read to track appends.
    size: Signal<usize>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root_attributes: RefCell::new(HashMap::new()),
            elements: RefCell::new(Vec::new()),
            size: signal(0),
        }
    }

    /// Set an attribute on the document root.
    pub fn set_root_attribute(&self, name: &str, value: &str) {
        self.root_attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Attribute on the document root.
    pub fn root_attribute(&self, name: &str) -> Option<String> {
        self.root_attributes.borrow().get(name).cloned()
    }

    /// Append an element and return its handle.
    ///
    /// A parent id that does not exist is dropped and the element becomes a
    /// top-level node.
    pub fn append(&self, spec: ElementSpec) -> Element {
        let mut elements = self.elements.borrow_mut();
        let node = NodeId(elements.len());
        let parent = spec.parent.filter(|p| p.0 < elements.len());

        let element = Element {
            inner: Rc::new(ElementData {
                node,
                dom_id: spec.id,
                parent,
                attributes: RefCell::new(spec.attributes.into_iter().collect()),
                classes: signal(spec.classes.into_iter().collect()),
                text: signal(spec.text),
            }),
        };
        elements.push(element.clone());
        let size = elements.len();
        // Effects re-run synchronously and read the arena
        drop(elements);
        self.size.set(size);
        element
    }

    /// Element by arena index.
    pub fn get(&self, node: NodeId) -> Option<Element> {
        self.elements.borrow().get(node.0).cloned()
    }

    /// First element with the given DOM id.
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.elements
            .borrow()
            .iter()
            .find(|el| el.dom_id() == Some(id))
            .cloned()
    }

    /// All elements carrying `name`, in document order.
    pub fn query_attribute(&self, name: &str) -> Vec<Element> {
        self.elements
            .borrow()
            .iter()
            .filter(|el| el.has_attribute(name))
            .cloned()
            .collect()
    }

    /// Descendants of `root` carrying `name`. `root` itself is excluded.
    pub fn query_attribute_within(&self, root: NodeId, name: &str) -> Vec<Element> {
        self.query_attribute(name)
            .into_iter()
            .filter(|el| self.is_descendant(el.node_id(), root))
            .collect()
    }

    /// True if `ancestor` is a strict ancestor of `node`.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let elements = self.elements.borrow();
        let mut current = elements.get(node.0).and_then(|el| el.parent());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = elements.get(parent.0).and_then(|el| el.parent());
        }
        false
    }

    /// True if neither the element nor any ancestor is hidden.
    pub fn is_rendered(&self, node: NodeId) -> bool {
        let elements = self.elements.borrow();
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(el) = elements.get(id.0) else {
                return false;
            };
            if el.is_hidden() {
                return false;
            }
            current = el.parent();
        }
        true
    }

    /// All elements, in document order.
    pub fn elements(&self) -> Vec<Element> {
        self.size.with(|_| ());
        self.elements.borrow().clone()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.size.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_lookup() {
        let doc = Document::new();
        let a = doc.append(ElementSpec::new().id("first").text("one"));
        let b = doc.append(ElementSpec::new().id("second"));

        assert_eq!(a.node_id(), NodeId(0));
        assert_eq!(b.node_id(), NodeId(1));
        assert_eq!(doc.get_element_by_id("first").unwrap().text(), "one");
        assert!(doc.get_element_by_id("missing").is_none());
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_handles_share_state() {
        let doc = Document::new();
        let el = doc.append(ElementSpec::new().text("before"));
        let other = doc.get(el.node_id()).unwrap();

        other.set_text("after");
        assert_eq!(el.text(), "after");
    }

    #[test]
    fn test_effect_tracks_text_classes_and_appends() {
        use std::cell::Cell;
        use spark_signals::effect;

        let doc = Rc::new(Document::new());
        let el = doc.append(ElementSpec::new().text("a"));
        let runs = Rc::new(Cell::new(0));

        let stop = {
            let doc = doc.clone();
            let runs = runs.clone();
            effect(move || {
                for el in doc.elements() {
                    let _ = el.text();
                    let _ = el.is_hidden();
                }
                runs.set(runs.get() + 1);
            })
        };
        assert_eq!(runs.get(), 1);

        el.set_text("b");
        assert_eq!(runs.get(), 2);
        el.add_class(HIDDEN_CLASS);
        assert_eq!(runs.get(), 3);
        // Already present: no change, no re-run
        el.add_class(HIDDEN_CLASS);
        assert_eq!(runs.get(), 3);
        doc.append(ElementSpec::new().text("c"));
        assert_eq!(runs.get(), 4);

        stop();
        el.set_text("d");
        assert_eq!(runs.get(), 4);
    }

    #[test]
    fn test_query_attribute_order() {
        let doc = Document::new();
        doc.append(ElementSpec::new().attr("data-decrypt", "").text("a"));
        doc.append(ElementSpec::new().text("skip"));
        doc.append(ElementSpec::new().attr("data-decrypt", "").text("b"));

        let texts: Vec<String> = doc
            .query_attribute("data-decrypt")
            .iter()
            .map(|el| el.text())
            .collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_query_within_subtree() {
        let doc = Document::new();
        let section = doc.append(ElementSpec::new().attr("data-decrypt", ""));
        let inner = doc.append(ElementSpec::new().child_of(section.node_id()));
        let deep = doc.append(
            ElementSpec::new()
                .child_of(inner.node_id())
                .attr("data-decrypt", ""),
        );
        doc.append(ElementSpec::new().attr("data-decrypt", ""));

        let found = doc.query_attribute_within(section.node_id(), "data-decrypt");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node_id(), deep.node_id());
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let doc = Document::new();
        let overlay = doc.append(ElementSpec::new().class(HIDDEN_CLASS));
        let text = doc.append(ElementSpec::new().child_of(overlay.node_id()));

        assert!(!doc.is_rendered(text.node_id()));
        overlay.remove_class(HIDDEN_CLASS);
        assert!(doc.is_rendered(text.node_id()));
    }

    #[test]
    fn test_unknown_parent_dropped() {
        let doc = Document::new();
        let el = doc.append(ElementSpec::new().child_of(NodeId(99)));
        assert_eq!(el.parent(), None);
    }

    #[test]
    fn test_attributes_and_classes() {
        let doc = Document::new();
        let el = doc.append(ElementSpec::new().attr("aria-hidden", "true").class("x"));
        assert_eq!(el.attribute("aria-hidden").as_deref(), Some("true"));
        el.set_attribute("aria-hidden", "false");
        assert_eq!(el.attribute("aria-hidden").as_deref(), Some("false"));
        assert!(el.has_class("x"));
        el.add_class(HIDDEN_CLASS);
        assert!(el.is_hidden());
    }
}
