//! Tree codec for fields, arrays and structures
//!
//! Property shapes handled here:
//!
//! ```text
//! <dc:format>image/png</dc:format>                     simple value
//! <dc:subject><rdf:Bag><rdf:li>a</rdf:li>...</dc:subject>  array (Seq, Bag, Alt)
//! <xmpMM:DerivedFrom rdf:parseType="Resource">...       structure
//! <xmpMM:DerivedFrom stRef:documentID="..."/>           structure in attribute form
//! ```
//!
//! Decoding is best-effort per field: a malformed field is reported through
//! the [`DecodeContext`] and reset, unless the context is strict.

use crate::core::error::{XmpError, XmpResult};
use crate::core::field::Element;
use crate::core::namespace::Registry;
use crate::core::node::{split_name, ArrayType, Attr, XmlNode};
use crate::core::options::DocumentOptions;
use crate::core::reflect::{describe_fields, find_field, FieldFlags, FieldKind, Schema};
use log::{debug, warn};

/// State shared by one decode pass
pub struct DecodeContext<'a> {
    registry: &'a Registry,
    options: DocumentOptions,
    namespace: Option<&'static str>,
    path: Vec<String>,
    errors: Vec<XmpError>,
}

impl<'a> DecodeContext<'a> {
    /// Create a context
    pub fn new(registry: &'a Registry, options: DocumentOptions) -> Self {
        Self {
            registry,
            options,
            namespace: None,
            path: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Registry used to instantiate models
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Decode options
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Whether the first error aborts decoding
    pub fn is_strict(&self) -> bool {
        self.options.strict
    }

    /// Set the namespace errors are attributed to, returning the previous one
    pub fn set_namespace(&mut self, namespace: Option<&'static str>) -> Option<&'static str> {
        std::mem::replace(&mut self.namespace, namespace)
    }

    /// Path of the property being decoded
    pub fn path(&self) -> String {
        self.path.join("/")
    }

    /// Build a decode error for the property being decoded
    pub fn decode_error(&self, reason: impl Into<String>) -> XmpError {
        XmpError::Decode {
            path: self.path(),
            reason: reason.into(),
        }
    }

    /// Record a field error
    ///
    /// In strict mode the error is returned; otherwise it is logged and kept.
    pub fn report(&mut self, err: XmpError) -> XmpResult<()> {
        let err = match self.namespace {
            Some(namespace) => err.in_namespace(namespace),
            None => err,
        };
        if self.options.strict {
            return Err(err);
        }
        warn!("skipping malformed field: {}", err);
        self.errors.push(err);
        Ok(())
    }

    /// Errors collected so far
    pub fn errors(&self) -> &[XmpError] {
        &self.errors
    }

    /// Consume the context, returning collected errors
    pub fn into_errors(self) -> Vec<XmpError> {
        self.errors
    }

    fn enter(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    fn leave(&mut self) {
        self.path.pop();
    }
}

pub(crate) fn is_syntax_attr(name: &str) -> bool {
    matches!(split_name(name).0, "rdf" | "xml" | "xmlns")
}

/// Text of a simple property
///
/// Accepts element text, an `rdf:resource` reference, or an `rdf:value`
/// qualified value.
pub fn decode_text(node: &XmlNode, cx: &DecodeContext<'_>) -> XmpResult<String> {
    if let Some(resource) = node.attr("rdf:resource") {
        return Ok(resource.to_string());
    }
    if node.has_children() {
        if let Some(value) = node.child("rdf:value") {
            return Ok(value.value.clone());
        }
        return Err(cx.decode_error("expected a simple value, found nested elements"));
    }
    Ok(node.value.clone())
}

/// Array container of a property node, if any
pub fn array_container(node: &XmlNode) -> Option<(ArrayType, &XmlNode)> {
    node.children
        .iter()
        .find_map(|c| ArrayType::from_element_name(&c.name).map(|t| (t, c)))
}

/// Decode an array property into its elements
///
/// A property without a container holds a single element (or none if empty).
pub fn decode_array<T: Element>(node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<Vec<T>> {
    let Some((_, container)) = array_container(node) else {
        if node.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![T::decode_element(node, cx)?]);
    };

    let mut items = Vec::with_capacity(container.children.len());
    for (index, li) in container.children.iter().enumerate() {
        if li.name != "rdf:li" {
            return Err(cx.decode_error(format!("unexpected '{}' in array", li.name)));
        }
        cx.enter(format!("[{}]", index));
        let item = T::decode_element(li, cx);
        cx.leave();
        items.push(item?);
    }
    Ok(items)
}

/// Encode elements as an array property
pub fn encode_array<'e, T: Element + 'e>(
    name: &str,
    array_type: ArrayType,
    items: impl IntoIterator<Item = &'e T>,
) -> XmpResult<XmlNode> {
    let mut container = XmlNode::new(array_type.element_name());
    for item in items {
        container.push(item.encode_element("rdf:li", false)?);
    }
    let mut node = XmlNode::new(name);
    node.push(container);
    Ok(node)
}

/// Encode a structure as a property node
pub fn encode_struct<S: Schema + ?Sized>(
    schema: &S,
    name: &str,
    as_attr: bool,
) -> XmpResult<XmlNode> {
    let mut node = XmlNode::new(name);
    encode_fields(schema, &mut node, as_attr)?;
    if !as_attr || node.has_children() {
        node.attrs.insert(0, Attr::new("rdf:parseType", "Resource"));
    }
    Ok(node)
}

/// Decode a structure from a property node; unknown members are dropped
pub fn decode_struct<S: Schema + Default>(
    node: &XmlNode,
    cx: &mut DecodeContext<'_>,
) -> XmpResult<S> {
    let mut value = S::default();
    for leftover in decode_fields(&mut value, node, cx)? {
        debug!("dropping unknown structure member '{}'", leftover.name);
    }
    Ok(value)
}

/// Encode every field of a schema into `target`
///
/// Scalars flagged `attr` (or every scalar when `attr_form` is set) become
/// attributes of `target`; everything else becomes a child property.
pub fn encode_fields<S: Schema + ?Sized>(
    schema: &S,
    target: &mut XmlNode,
    attr_form: bool,
) -> XmpResult<()> {
    for info in describe_fields(schema)? {
        if info.is_omitted() {
            continue;
        }
        let Some(field) = schema.field(info.name) else {
            continue;
        };
        if info.is_any() {
            if let Some(raw) = field.as_raw() {
                target.children.extend(raw.nodes().iter().cloned());
            }
            continue;
        }
        if field.is_empty() {
            continue;
        }

        let name = info.wire_name();
        let omit_empty = info.flags.contains(FieldFlags::OMIT_EMPTY);
        if info.kind == FieldKind::Scalar && (info.is_attr() || attr_form) {
            let text = field.marshal_text()?;
            if !(omit_empty && text.is_empty()) {
                target.set_attr(name, text);
            }
            continue;
        }
        if let Some(node) = field.encode(&name, info.is_attr())? {
            if omit_empty && node.is_empty() {
                continue;
            }
            target.push(node);
        }
    }
    Ok(())
}

/// Decode the attributes and child properties of `node` into a schema
///
/// A structure wrapped in a nested `rdf:Description` is unwrapped first.
/// Returns the properties no field claimed.
pub fn decode_fields<S: Schema + ?Sized>(
    schema: &mut S,
    node: &XmlNode,
    cx: &mut DecodeContext<'_>,
) -> XmpResult<Vec<XmlNode>> {
    let mut leftovers = Vec::new();
    let source = match node.children.as_slice() {
        [inner] if inner.name == "rdf:Description" => inner,
        _ => node,
    };

    let mut attrs: Vec<&Attr> = node.attrs.iter().collect();
    if !std::ptr::eq(source, node) {
        attrs.extend(source.attrs.iter());
    }
    for attr in attrs {
        if is_syntax_attr(&attr.name) {
            continue;
        }
        let prop = XmlNode::with_value(attr.name.clone(), attr.value.clone());
        if let Some(leftover) = decode_property(schema, &prop, cx)? {
            leftovers.push(leftover);
        }
    }
    for child in &source.children {
        if let Some(leftover) = decode_property(schema, child, cx)? {
            leftovers.push(leftover);
        }
    }
    Ok(leftovers)
}

/// Decode one property into the matching field of a schema
///
/// Unknown properties of the schema's own namespace go to its catch-all
/// field when it has one; anything else is handed back.
pub fn decode_property<S: Schema + ?Sized>(
    schema: &mut S,
    prop: &XmlNode,
    cx: &mut DecodeContext<'_>,
) -> XmpResult<Option<XmlNode>> {
    let (prefix, local) = split_name(&prop.name);

    if let Some(info) = find_field(schema, prefix, local)? {
        let Some(field) = schema.field_mut(info.name) else {
            return Ok(Some(prop.clone()));
        };
        cx.enter(prop.name.clone());
        let result = field.decode(prop, cx);
        cx.leave();
        if let Err(err) = result {
            field.clear();
            cx.report(err)?;
        }
        return Ok(None);
    }

    if prefix == schema.prefix() {
        let any = describe_fields(schema)?.iter().find(|f| f.is_any());
        if let Some(raw) = any
            .and_then(|info| schema.field_mut(info.name))
            .and_then(|field| field.as_raw_mut())
        {
            raw.push(prop.clone());
            return Ok(None);
        }
    }
    Ok(Some(prop.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn li(value: &str) -> XmlNode {
        XmlNode::with_value("rdf:li", value)
    }

    #[test]
    fn test_decode_text_shapes() {
        let registry = Registry::new();
        let cx = DecodeContext::new(&registry, DocumentOptions::default());

        assert_eq!(decode_text(&XmlNode::with_value("dc:format", "a"), &cx).unwrap(), "a");

        let mut node = XmlNode::new("dc:source");
        node.set_attr("rdf:resource", "http://example.com/");
        assert_eq!(decode_text(&node, &cx).unwrap(), "http://example.com/");

        let mut node = XmlNode::new("dc:format");
        node.set_attr("rdf:parseType", "Resource");
        node.push(XmlNode::with_value("rdf:value", "b"));
        assert_eq!(decode_text(&node, &cx).unwrap(), "b");

        let mut node = XmlNode::new("dc:format");
        node.push(XmlNode::new("rdf:Bag"));
        assert!(matches!(
            decode_text(&node, &cx),
            Err(XmpError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_array_shapes() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());

        let mut seq = XmlNode::new("rdf:Seq");
        seq.push(li("one"));
        seq.push(li("two"));
        let mut prop = XmlNode::new("dc:creator");
        prop.push(seq);
        let items: Vec<String> = decode_array(&prop, &mut cx).unwrap();
        assert_eq!(items, vec!["one", "two"]);

        // plain text is a single element
        let items: Vec<String> =
            decode_array(&XmlNode::with_value("dc:creator", "solo"), &mut cx).unwrap();
        assert_eq!(items, vec!["solo"]);

        let items: Vec<String> = decode_array(&XmlNode::new("dc:creator"), &mut cx).unwrap();
        assert!(items.is_empty());

        let mut bad = XmlNode::new("rdf:Bag");
        bad.push(XmlNode::with_value("rdf:item", "x"));
        let mut prop = XmlNode::new("dc:subject");
        prop.push(bad);
        let err = decode_array::<String>(&prop, &mut cx).unwrap_err();
        assert!(matches!(err, XmpError::Decode { .. }));
    }

    #[test]
    fn test_encode_array() {
        let items = vec!["a".to_string(), "b".to_string()];
        let node = encode_array("dc:subject", ArrayType::Unordered, &items).unwrap();
        assert_eq!(
            node.to_string(),
            "<dc:subject><rdf:Bag><rdf:li>a</rdf:li><rdf:li>b</rdf:li></rdf:Bag></dc:subject>"
        );
    }

    #[test]
    fn test_report_modes() {
        let registry = Registry::new();
        let mut lenient = DecodeContext::new(&registry, DocumentOptions::default());
        lenient.set_namespace(Some("dc"));
        lenient.report(XmpError::Unmarshal("bad".into())).unwrap();
        assert_eq!(lenient.errors().len(), 1);
        assert_eq!(lenient.errors()[0].namespace(), Some("dc"));

        let mut strict = DecodeContext::new(&registry, DocumentOptions::default().strict());
        assert!(strict.report(XmpError::Unmarshal("bad".into())).is_err());
        assert!(strict.into_errors().is_empty());
    }
}
