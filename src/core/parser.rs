//! XMP XML/RDF parser
//!
//! This module turns an XMP Packet (with or without the `<?xpacket?>` wrapper)
//! into an [`XmlNode`] tree. Element and attribute prefixes are rewritten to
//! the canonical prefixes of the registry by namespace URI, so that models can
//! match properties by `prefix:name` regardless of the prefixes chosen by the
//! writer of the packet. Namespaces the registry does not know keep their
//! declared prefix and are remembered in [`XmpParser::unknown_namespaces`].

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{NamespaceMap, Registry};
use crate::core::node::{split_name, Attr, XmlNode};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parser for XMP Packets
pub struct XmpParser<'r> {
    registry: &'r Registry,
    namespaces: NamespaceMap,
    scopes: Vec<(String, String)>,
}

impl<'r> XmpParser<'r> {
    /// Create a new XMP parser resolving prefixes against `registry`
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            namespaces: NamespaceMap::new(),
            scopes: Vec::new(),
        }
    }

    /// Namespaces declared in the parsed packets that the registry does not know
    pub fn unknown_namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// Parse an XMP Packet from a string
    ///
    /// This function extracts the XMP Packet from the `<?xpacket>` wrapper
    /// and parses the RDF/XML content. The returned node is the outermost
    /// element of the packet (`x:xmpmeta` or `rdf:RDF`).
    pub fn parse_packet(&mut self, xml: &str) -> XmpResult<XmlNode> {
        let packet_content = self.extract_packet_content(xml)?;
        self.parse_xml(&packet_content)
    }

    /// Extract the XMP Packet content from the `<?xpacket>` wrapper
    fn extract_packet_content(&self, xml: &str) -> XmpResult<String> {
        let Some(start_pos) = xml.find("<?xpacket") else {
            return self.validate_and_return_xml(xml);
        };

        let Some(end_pos) = xml[start_pos..].find("?>") else {
            return self.validate_and_return_xml(xml);
        };

        let pi_end = start_pos + end_pos + 2;
        let Some(close_pos) = xml[pi_end..].find("<?xpacket end") else {
            return self.validate_and_return_xml(xml);
        };

        let content = xml[pi_end..pi_end + close_pos].trim().to_string();
        Ok(content)
    }

    /// Validate XML content and return it if valid
    fn validate_and_return_xml(&self, xml: &str) -> XmpResult<String> {
        let trimmed = xml.trim();
        if trimmed.is_empty() || !trimmed.starts_with('<') {
            return Err(XmpError::ParseError("Invalid XML content".to_string()));
        }
        Ok(trimmed.to_string())
    }

    /// Parse XML content into a node tree
    fn parse_xml(&mut self, xml: &str) -> XmpResult<XmlNode> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        // open elements with the scope depth they started at
        let mut stack: Vec<(XmlNode, usize)> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let mark = self.scopes.len();
                    let node = self.open_element(&e)?;
                    stack.push((node, mark));
                }
                Ok(Event::Empty(e)) => {
                    let mark = self.scopes.len();
                    let node = self.open_element(&e)?;
                    self.scopes.truncate(mark);
                    Self::attach(&mut stack, &mut root, node);
                }
                Ok(Event::End(_)) => {
                    let Some((mut node, mark)) = stack.pop() else {
                        return Err(XmpError::ParseError("Unbalanced end tag".to_string()));
                    };
                    self.scopes.truncate(mark);
                    // text between child elements is formatting whitespace
                    if node.has_children() {
                        node.value.clear();
                    }
                    Self::attach(&mut stack, &mut root, node);
                }
                Ok(Event::Text(e)) => {
                    if let Some((node, _)) = stack.last_mut() {
                        let raw_text = String::from_utf8_lossy(e.as_ref());
                        match unescape(&raw_text) {
                            Ok(text) => node.value.push_str(&text),
                            Err(_) => node.value.push_str(&raw_text),
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((node, _)) = stack.last_mut() {
                        node.value.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Ok(Event::GeneralRef(e)) => {
                    if let Some((node, _)) = stack.last_mut() {
                        let name = String::from_utf8_lossy(e.as_ref()).to_string();
                        let resolved = resolve_entity(&name).ok_or_else(|| {
                            XmpError::ParseError(format!("Unknown entity reference '&{};'", name))
                        })?;
                        node.value.push(resolved);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(XmpError::ParseError(format!("XML parsing error: {}", e)));
                }
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(XmpError::ParseError("Unclosed element".to_string()));
        }
        root.ok_or_else(|| XmpError::ParseError("No root element".to_string()))
    }

    fn attach(stack: &mut [(XmlNode, usize)], root: &mut Option<XmlNode>, node: XmlNode) {
        match stack.last_mut() {
            Some((parent, _)) => parent.push(node),
            None => {
                if root.is_none() {
                    *root = Some(node);
                }
            }
        }
    }

    /// Build a node for an element, processing its namespace declarations first
    fn open_element(&mut self, e: &BytesStart<'_>) -> XmpResult<XmlNode> {
        let attrs = Self::collect_attributes(e);

        for (attr_name, attr_value) in &attrs {
            if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                self.declare(prefix, attr_value);
            }
        }

        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let mut node = XmlNode::new(self.canonical_name(&name));
        for (attr_name, attr_value) in attrs {
            if attr_name == "xmlns" || attr_name.starts_with("xmlns:") {
                continue;
            }
            node.attrs
                .push(Attr::new(self.canonical_name(&attr_name), attr_value));
        }
        Ok(node)
    }

    fn declare(&mut self, prefix: &str, uri: &str) {
        self.scopes.push((prefix.to_string(), uri.to_string()));
        if self.registry.namespace_by_uri(uri).is_none() {
            if let Err(err) = self.namespaces.register(uri, prefix) {
                log::warn!("ignoring namespace declaration: {}", err);
            }
        }
    }

    /// Rewrite `prefix:local` to the registry's prefix for the bound URI
    fn canonical_name(&self, name: &str) -> String {
        let (prefix, local) = split_name(name);
        if prefix.is_empty() || prefix == "xml" {
            return name.to_string();
        }
        let uri = self
            .scopes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str());
        match uri.and_then(|uri| self.registry.namespace_by_uri(uri)) {
            Some(namespace) if namespace.prefix() != prefix => {
                format!("{}:{}", namespace.prefix(), local)
            }
            _ => name.to_string(),
        }
    }

    /// Collect attributes from XML element
    fn collect_attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
        e.attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                // Decode XML entities in attribute values (e.g., &quot; -> ")
                let raw_value = String::from_utf8_lossy(attr.value.as_ref());
                let value = match unescape(&raw_value) {
                    Ok(unescaped) => unescaped.to_string(),
                    Err(_) => raw_value.to_string(),
                };
                (key, value)
            })
            .collect()
    }
}

/// Resolve a predefined entity or character reference name (without `&` and `;`)
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}
