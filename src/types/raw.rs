//! Verbatim node storage for catch-all fields
//!
//! A model field declared with the `any` modifier collects the properties of
//! its namespace that no other field claims, and writes them back unchanged.

use crate::core::codec::DecodeContext;
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::{Field, FieldType, PathEntries};
use crate::core::node::XmlNode;
use crate::core::reflect::{Capabilities, FieldKind};
use crate::core::xpath::Selector;

/// Properties kept verbatim
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNodes(Vec<XmlNode>);

impl RawNodes {
    /// Stored nodes in decode order
    pub fn nodes(&self) -> &[XmlNode] {
        &self.0
    }

    /// Store a node
    pub fn push(&mut self, node: XmlNode) {
        self.0.push(node);
    }

    /// Stored node with a qualified name
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        self.0.iter().find(|n| n.name == name)
    }
}

fn not_addressable() -> XmpError {
    XmpError::BadXPath("catch-all properties are not addressable by path".to_string())
}

impl Field for RawNodes {
    fn kind(&self) -> FieldKind {
        FieldKind::Raw
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn contains(&self, selector: &Selector) -> bool {
        *selector == Selector::None && !self.0.is_empty()
    }

    fn get(&self, _selector: &Selector) -> XmpResult<Option<String>> {
        Err(not_addressable())
    }

    fn set(&mut self, _selector: &Selector, _value: &str) -> XmpResult<()> {
        Err(not_addressable())
    }

    fn append(&mut self, _value: &str, _lang: Option<&str>, _unique: bool) -> XmpResult<bool> {
        Err(not_addressable())
    }

    fn remove(&mut self, selector: &Selector) -> bool {
        if *selector != Selector::None || self.0.is_empty() {
            return false;
        }
        self.0.clear();
        true
    }

    fn marshal_text(&self) -> XmpResult<String> {
        Err(XmpError::Marshal(
            "catch-all properties have no text form".to_string(),
        ))
    }

    fn unmarshal_text(&mut self, _text: &str) -> XmpResult<()> {
        Err(XmpError::Unmarshal(
            "catch-all properties have no text form".to_string(),
        ))
    }

    fn encode(&self, _name: &str, _as_attr: bool) -> XmpResult<Option<XmlNode>> {
        // written inline by the owning schema
        Ok(None)
    }

    fn decode(&mut self, node: &XmlNode, _cx: &mut DecodeContext<'_>) -> XmpResult<()> {
        self.0.push(node.clone());
        Ok(())
    }

    fn list(&self, _path: &str, _out: &mut PathEntries) -> XmpResult<()> {
        Ok(())
    }

    fn as_raw(&self) -> Option<&RawNodes> {
        Some(self)
    }

    fn as_raw_mut(&mut self) -> Option<&mut RawNodes> {
        Some(self)
    }
}

impl FieldType for RawNodes {
    const KIND: FieldKind = FieldKind::Raw;
    const CAPABILITIES: Capabilities = Capabilities::TREE;
}
