//! Pantry extensions
//!
//! An [`Extension`] is a nested description embedded in a field, such as an
//! entry of `xmpMM:Pantry`: a complete set of namespace models describing
//! another resource, kept for round-tripping and addressable through nested
//! paths like `xmpMM:Pantry[0]/dc:format`.

use super::ModelSet;
use crate::core::codec::DecodeContext;
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::{Element, Navigable};
use crate::core::node::XmlNode;
use crate::core::reflect::{Capabilities, FieldKind};

/// A nested set of namespace models
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extension {
    models: ModelSet,
}

impl Extension {
    /// Create an empty extension
    pub fn new() -> Self {
        Self::default()
    }

    /// Nested models
    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    /// Mutable nested models
    pub fn models_mut(&mut self) -> &mut ModelSet {
        &mut self.models
    }
}

impl From<ModelSet> for Extension {
    fn from(models: ModelSet) -> Self {
        Self { models }
    }
}

impl Element for Extension {
    const KIND: FieldKind = FieldKind::Struct;
    const CAPABILITIES: Capabilities = Capabilities::TREE;

    fn to_text(&self) -> XmpResult<String> {
        Err(XmpError::Marshal(
            "extension has no text form".to_string(),
        ))
    }

    fn from_text(_text: &str) -> XmpResult<Self> {
        Err(XmpError::Unmarshal(
            "extension cannot be read from text".to_string(),
        ))
    }

    fn is_zero(&self) -> bool {
        self.models.is_empty()
    }

    fn encode_element(&self, name: &str, _as_attr: bool) -> XmpResult<XmlNode> {
        let mut node = XmlNode::new(name);
        node.set_attr("rdf:parseType", "Resource");
        self.models.encode_into(&mut node)?;
        Ok(node)
    }

    fn decode_element(node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<Self> {
        let source = match node.children.as_slice() {
            [inner] if inner.name == "rdf:Description" => inner,
            _ => node,
        };
        let mut models = ModelSet::new();
        models.decode_description(source, cx)?;
        Ok(Self { models })
    }

    fn navigable(&self) -> Option<&dyn Navigable> {
        Some(&self.models)
    }

    fn navigable_mut(&mut self) -> Option<&mut dyn Navigable> {
        Some(&mut self.models)
    }
}
