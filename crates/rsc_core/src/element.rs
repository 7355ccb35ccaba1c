//! Element tree
//!
//! [`Node`] is the heterogeneous value that every pass walks: primitives,
//! arrays, plain mappings and [`Element`]s. An element's kind is a tagged
//! union, so a tag, an implementation and a module path can never be
//! populated at the same time.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Number;

use crate::component::Component;

/// Prop holding an element's children
pub const CHILDREN_PROP: &str = "children";

/// Prop marking a composite as a client boundary; its value is the module path
pub const BOUNDARY_PROP: &str = "__isClient__";

/// Insertion-ordered prop mapping
pub type Props = IndexMap<String, Node>;

/// Identity used by an external reconciler to match nodes across regenerations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Create a new key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Any value that can appear in an element tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Null, also "render nothing"
    Null,
    /// Boolean
    Bool(bool),
    /// Number, integer or float preserved
    Number(Number),
    /// String
    String(String),
    /// Ordered siblings
    Array(Vec<Node>),
    /// Plain mapping (for example a prop value)
    Object(Props),
    /// Tree node
    Element(Element),
}

impl Node {
    /// Get type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Element(_) => "element",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if value is a primitive (passes through every pass unchanged)
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_)
        )
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Try to get as array
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get as mapping
    pub fn as_object(&self) -> Option<&Props> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get as element
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Count the elements in this subtree, props included
    pub fn element_count(&self) -> usize {
        match self {
            Self::Array(items) => items.iter().map(Node::element_count).sum(),
            Self::Object(map) => map.values().map(Node::element_count).sum(),
            Self::Element(element) => {
                1 + element.props.values().map(Node::element_count).sum::<usize>()
            }
            _ => 0,
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Node {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no wire form and become null
impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Self::Array(value)
    }
}

impl From<Props> for Node {
    fn from(value: Props) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// What an element is
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Groups children without a presentational primitive
    Fragment,
    /// Presentational primitive named by a tag (e.g. `div`)
    Intrinsic(String),
    /// Content produced by invoking an implementation
    Composite(Component),
    /// Serializable stand-in for a client boundary
    BoundaryReference(String),
}

impl ElementKind {
    /// Get kind name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fragment => "fragment",
            Self::Intrinsic(_) => "intrinsic",
            Self::Composite(_) => "composite",
            Self::BoundaryReference(_) => "reference",
        }
    }

    /// Tag of an intrinsic element
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Intrinsic(tag) => Some(tag),
            _ => None,
        }
    }

    /// Implementation of a composite element
    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Composite(component) => Some(component),
            _ => None,
        }
    }

    /// Module locator of a boundary reference
    pub fn module_path(&self) -> Option<&str> {
        match self {
            Self::BoundaryReference(path) => Some(path),
            _ => None,
        }
    }
}

/// A node of the composition tree
///
/// Props are fixed once the element is built: passes take an element apart
/// with [`Element::into_parts`] and assemble a new one.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    props: Props,
    key: Option<Key>,
}

impl Element {
    /// Create an element from its parts
    pub fn new(kind: ElementKind, props: Props, key: Option<Key>) -> Self {
        Self { kind, props, key }
    }

    /// Create a fragment with the given children
    pub fn fragment<I, N>(children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Self::new(ElementKind::Fragment, Props::new(), None).children(children)
    }

    /// Create an intrinsic element
    pub fn intrinsic(tag: impl Into<String>) -> Self {
        Self::new(ElementKind::Intrinsic(tag.into()), Props::new(), None)
    }

    /// Create a composite element
    pub fn composite(component: Component) -> Self {
        Self::new(ElementKind::Composite(component), Props::new(), None)
    }

    /// Create a composite marked as a client boundary with [`BOUNDARY_PROP`]
    ///
    /// Evaluators configured with another marker prop will not see this as a
    /// boundary; use [`Element::boundary`] for those.
    pub fn client(component: Component, module_path: impl Into<String>) -> Self {
        Self::boundary(component, BOUNDARY_PROP, module_path)
    }

    /// Create a composite marked as a client boundary with `marker_prop`
    pub fn boundary(
        component: Component,
        marker_prop: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Self {
        let module_path: String = module_path.into();
        Self::composite(component).prop(marker_prop, module_path)
    }

    /// Create a boundary reference
    pub fn reference(module_path: impl Into<String>) -> Self {
        Self::new(ElementKind::BoundaryReference(module_path.into()), Props::new(), None)
    }

    /// Set a prop
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Node>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Replace the children
    pub fn children<I, N>(self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        let children: Vec<Node> = children.into_iter().map(Into::into).collect();
        self.prop(CHILDREN_PROP, children)
    }

    /// Append one child
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        let child = child.into();
        match self.props.get_mut(CHILDREN_PROP) {
            Some(Node::Array(children)) => children.push(child),
            Some(single) => {
                let first = std::mem::replace(single, Node::Null);
                *single = Node::Array(vec![first, child]);
            }
            None => {
                self.props.insert(CHILDREN_PROP.to_string(), Node::Array(vec![child]));
            }
        }
        self
    }

    /// Set an explicit key
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Get the kind
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Get the props
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Get the explicit key
    pub fn get_key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Get the children prop, if any
    pub fn get_children(&self) -> Option<&Node> {
        self.props.get(CHILDREN_PROP)
    }

    /// Name for logs: tag, component name, module path or `Fragment`
    pub fn display_name(&self) -> &str {
        match &self.kind {
            ElementKind::Fragment => "Fragment",
            ElementKind::Intrinsic(tag) => tag,
            ElementKind::Composite(component) => component.name(),
            ElementKind::BoundaryReference(path) => path,
        }
    }

    /// Take the element apart
    pub fn into_parts(self) -> (ElementKind, Props, Option<Key>) {
        (self.kind, self.props, self.key)
    }
}

/// Prop order is part of an element's identity; a plain mapping's is not
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.key == other.key
            && self.props.len() == other.props.len()
            && self.props.iter().zip(other.props.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ElementKind::BoundaryReference(path) => write!(f, "<@{}", path)?,
            _ => write!(f, "<{}", self.display_name())?,
        }
        if let Some(key) = &self.key {
            write!(f, " key={:?}", key.as_str())?;
        }
        write!(f, ">")
    }
}
