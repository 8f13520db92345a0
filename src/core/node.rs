//! XMP node tree
//!
//! This module defines the generic tree that sits between the XML/RDF codec
//! and the typed models:
//! - XmlNode: a named node with a text value, attributes and child nodes
//! - Attr: a named attribute
//! - ArrayType: the three RDF container kinds (Seq, Bag, Alt)
//!
//! Names are always stored in `prefix:local` form using the canonical
//! prefixes of the registry the tree was parsed with.

use std::fmt;

/// Type of array container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayType {
    /// Ordered array (rdf:Seq)
    Ordered,
    /// Unordered array (rdf:Bag)
    Unordered,
    /// Alternative array (rdf:Alt)
    Alternative,
}

impl ArrayType {
    /// Get the RDF type name for this array type
    pub fn rdf_type(&self) -> &'static str {
        match self {
            ArrayType::Ordered => "Seq",
            ArrayType::Unordered => "Bag",
            ArrayType::Alternative => "Alt",
        }
    }

    /// Qualified element name of the container (e.g. `rdf:Seq`)
    pub fn element_name(&self) -> &'static str {
        match self {
            ArrayType::Ordered => "rdf:Seq",
            ArrayType::Unordered => "rdf:Bag",
            ArrayType::Alternative => "rdf:Alt",
        }
    }

    /// Recognize a container element name
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "rdf:Seq" => Some(ArrayType::Ordered),
            "rdf:Bag" => Some(ArrayType::Unordered),
            "rdf:Alt" => Some(ArrayType::Alternative),
            _ => None,
        }
    }
}

/// A named attribute on a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Qualified attribute name (`prefix:local`)
    pub name: String,
    /// Attribute value
    pub value: String,
}

impl Attr {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A node in the XML/RDF tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Qualified element name (`prefix:local`)
    pub name: String,
    /// Text content
    pub value: String,
    /// Attributes in document order
    pub attrs: Vec<Attr>,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create a new empty node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a node holding a text value
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Namespace prefix of the node name (empty if unqualified)
    pub fn prefix(&self) -> &str {
        split_name(&self.name).0
    }

    /// Local part of the node name
    pub fn local_name(&self) -> &str {
        split_name(&self.name).1
    }

    /// Get an attribute value by qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attr { name, value }),
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// Append a child node
    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// First child with the given qualified name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given qualified name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search for the first descendant (or self) with the given name
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Whether the node carries neither a value, attributes nor children
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.attrs.is_empty() && self.children.is_empty()
    }

    /// Whether the node has element children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

impl fmt::Display for XmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for attr in &self.attrs {
            write!(f, " {}=\"{}\"", attr.name, attr.value)?;
        }
        if self.value.is_empty() && self.children.is_empty() {
            return write!(f, "/>");
        }
        write!(f, ">{}", self.value)?;
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.name)
    }
}

/// Split a qualified name into `(prefix, local)`
pub fn split_name(name: &str) -> (&str, &str) {
    match name.find(':') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name),
    }
}
