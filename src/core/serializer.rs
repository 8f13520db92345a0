//! XMP XML/RDF serializer
//!
//! This module writes an [`XmlNode`] tree back to RDF/XML. Every prefix used
//! by an element or attribute name is declared once on the outermost element,
//! resolving URIs through the registry first and through the extra namespace
//! map (namespaces preserved from parsed input) second.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{ns, NamespaceMap, Registry};
use crate::core::node::{split_name, XmlNode};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;
use std::io::Cursor;

/// Serializer for XMP Packets
pub struct XmpSerializer<'r> {
    registry: &'r Registry,
    namespaces: NamespaceMap,
}

impl<'r> XmpSerializer<'r> {
    /// Create a new XMP serializer
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            namespaces: NamespaceMap::new(),
        }
    }

    /// Add namespaces that are not part of the registry
    pub fn with_namespaces(mut self, namespaces: &NamespaceMap) -> Self {
        self.namespaces.extend_from(namespaces);
        self
    }

    /// Serialize an `rdf:RDF` tree to RDF/XML
    pub fn serialize_rdf(&self, rdf: &XmlNode) -> XmpResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        self.write_root(&mut writer, rdf)?;
        Self::finish(writer)
    }

    /// Serialize to XMP Packet format
    pub fn serialize_packet(&self, rdf: &XmlNode) -> XmpResult<String> {
        let mut meta = XmlNode::new("x:xmpmeta");
        meta.push(rdf.clone());

        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        self.write_root(&mut writer, &meta)?;
        let body = Self::finish(writer)?;

        Ok(format!(
            r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
{}
<?xpacket end="w"?>"#,
            body
        ))
    }

    fn finish(writer: Writer<Cursor<Vec<u8>>>) -> XmpResult<String> {
        let result = writer.into_inner().into_inner();
        String::from_utf8(result)
            .map_err(|e| XmpError::SerializationError(format!("UTF-8 encoding error: {}", e)))
    }

    /// Write the outermost element with every namespace declaration of the tree
    fn write_root(&self, writer: &mut Writer<Cursor<Vec<u8>>>, root: &XmlNode) -> XmpResult<()> {
        let mut prefixes = BTreeSet::new();
        Self::collect_prefixes(root, &mut prefixes);

        let mut declarations = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            // the xml prefix is bound implicitly
            if prefix == ns::XML_PREFIX {
                continue;
            }
            let uri = self.resolve_uri(prefix).ok_or_else(|| {
                XmpError::SerializationError(format!("Undeclared namespace prefix '{}'", prefix))
            })?;
            declarations.push((format!("xmlns:{}", prefix), uri.to_string()));
        }

        self.write_node(writer, root, &declarations)
    }

    fn resolve_uri(&self, prefix: &str) -> Option<&str> {
        self.registry
            .get_namespace(prefix)
            .ok()
            .map(|n| n.uri())
            .or_else(|| self.namespaces.get_uri(prefix))
    }

    fn collect_prefixes<'a>(node: &'a XmlNode, prefixes: &mut BTreeSet<&'a str>) {
        let (prefix, _) = split_name(&node.name);
        if !prefix.is_empty() {
            prefixes.insert(prefix);
        }
        for attr in &node.attrs {
            let (prefix, _) = split_name(&attr.name);
            if !prefix.is_empty() {
                prefixes.insert(prefix);
            }
        }
        for child in &node.children {
            Self::collect_prefixes(child, prefixes);
        }
    }

    /// Serialize a node and its descendants
    fn write_node(
        &self,
        writer: &mut Writer<Cursor<Vec<u8>>>,
        node: &XmlNode,
        declarations: &[(String, String)],
    ) -> XmpResult<()> {
        let mut start = BytesStart::new(node.name.as_str());
        for (name, uri) in declarations {
            start.push_attribute((name.as_str(), uri.as_str()));
        }
        for attr in &node.attrs {
            start.push_attribute((attr.name.as_str(), attr.value.as_str()));
        }

        // If there is no content, use Empty (self-closing) tag
        if node.value.is_empty() && node.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if node.children.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&node.value)))?;
        } else {
            for child in &node.children {
                self.write_node(writer, child, &[])?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new(node.name.as_str())))?;
        Ok(())
    }
}
