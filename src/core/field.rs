//! Field capability traits
//!
//! Every value that can live in a model field implements [`Field`], the
//! object-safe surface used by the path engine, the native tag accessor and
//! the codec. Element types stored inside fields (scalars and structures)
//! implement [`Element`]; `Option<E>`, `Seq<E>` and `Bag<E>` lift any element
//! into a field. Types that contain addressable sub-fields (structures and
//! pantry extensions) implement [`Navigable`].

use crate::core::codec::{self, DecodeContext};
use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::Registry;
use crate::core::node::XmlNode;
use crate::core::reflect::{describe_fields, find_field, Capabilities, FieldInfo, FieldKind, Schema};
use crate::core::xpath::Selector;
use crate::types::alt::AltString;
use crate::types::raw::RawNodes;
use crate::utils::datetime::XmpDate;
use std::fmt;

/// Flattened `(path, text)` pairs produced by listing
pub type PathEntries = Vec<(String, String)>;

/// A typed model field
pub trait Field: fmt::Debug + Send + Sync {
    /// Container kind
    fn kind(&self) -> FieldKind;

    /// Whether the field holds no value
    fn is_empty(&self) -> bool;

    /// Reset to the zero value
    fn clear(&mut self);

    /// Number of elements (0 or 1 for single values)
    fn len(&self) -> usize;

    /// Whether the slot addressed by `selector` holds a value
    fn contains(&self, selector: &Selector) -> bool;

    /// Text of the slot addressed by `selector`, `None` if the slot is absent
    fn get(&self, selector: &Selector) -> XmpResult<Option<String>>;

    /// Store text into the slot addressed by `selector`
    fn set(&mut self, selector: &Selector, value: &str) -> XmpResult<()>;

    /// Add an element; returns `false` if `unique` suppressed a duplicate
    fn append(&mut self, value: &str, lang: Option<&str>, unique: bool) -> XmpResult<bool>;

    /// Remove the slot addressed by `selector`; returns whether anything was removed
    fn remove(&mut self, selector: &Selector) -> bool;

    /// Whole-field text form
    fn marshal_text(&self) -> XmpResult<String>;

    /// Replace the whole field from its text form
    fn unmarshal_text(&mut self, text: &str) -> XmpResult<()>;

    /// Encode as a property node named `name`, `None` when there is nothing to write
    fn encode(&self, name: &str, as_attr: bool) -> XmpResult<Option<XmlNode>>;

    /// Replace the field from a property node
    fn decode(&mut self, node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<()>;

    /// Append `(path, text)` pairs for every value of the field
    fn list(&self, path: &str, out: &mut PathEntries) -> XmpResult<()>;

    /// Addressable structure inside the slot
    fn child(&self, _selector: &Selector) -> Option<&dyn Navigable> {
        None
    }

    /// Mutable addressable structure inside the slot, created on demand
    fn child_mut(&mut self, _selector: &Selector, _create: bool) -> Option<&mut dyn Navigable> {
        None
    }

    /// Alternative text view
    fn as_alt(&self) -> Option<&AltString> {
        None
    }

    /// Mutable alternative text view
    fn as_alt_mut(&mut self) -> Option<&mut AltString> {
        None
    }

    /// Catch-all node storage view
    fn as_raw(&self) -> Option<&RawNodes> {
        None
    }

    /// Mutable catch-all node storage view
    fn as_raw_mut(&mut self) -> Option<&mut RawNodes> {
        None
    }
}

/// Static reflection data of a field type
pub trait FieldType: Field + Default {
    /// Container kind
    const KIND: FieldKind;
    /// Codec capabilities
    const CAPABILITIES: Capabilities;
}

/// A value stored in a field: a scalar or a structure
pub trait Element: Clone + fmt::Debug + Default + PartialEq + Send + Sync + 'static {
    /// `Scalar` or `Struct`
    const KIND: FieldKind = FieldKind::Scalar;
    /// Codec capabilities
    const CAPABILITIES: Capabilities = Capabilities::TEXT
        .union(Capabilities::TREE)
        .union(Capabilities::ATTR);

    /// Text form
    fn to_text(&self) -> XmpResult<String>;

    /// Parse the text form
    fn from_text(text: &str) -> XmpResult<Self>;

    /// Whether the value equals its zero value
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Encode as a node named `name`
    fn encode_element(&self, name: &str, _as_attr: bool) -> XmpResult<XmlNode> {
        Ok(XmlNode::with_value(name, self.to_text()?))
    }

    /// Decode from a node
    fn decode_element(node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<Self> {
        let text = codec::decode_text(node, cx)?;
        Self::from_text(&text)
    }

    /// Addressable sub-fields of a structure
    fn navigable(&self) -> Option<&dyn Navigable> {
        None
    }

    /// Mutable addressable sub-fields of a structure
    fn navigable_mut(&mut self) -> Option<&mut dyn Navigable> {
        None
    }
}

/// A container of addressable fields
pub trait Navigable {
    /// Find the field `prefix:name`; `Ok(None)` when its owner is absent
    fn lookup(&self, prefix: &str, name: &str) -> XmpResult<Option<&dyn Field>>;

    /// Find the field `prefix:name` for mutation, creating its owner when `create` is set
    fn lookup_mut(
        &mut self,
        registry: &Registry,
        prefix: &str,
        name: &str,
        create: bool,
    ) -> XmpResult<Option<&mut dyn Field>>;

    /// Remove a whole namespace model
    fn remove_namespace(&mut self, prefix: &str) -> XmpResult<bool> {
        Err(XmpError::BadXPath(format!(
            "'{}:' does not address a namespace model",
            prefix
        )))
    }

    /// Append `(path, text)` pairs for every value, prefixing paths with `base`
    fn list(&self, base: &str, out: &mut PathEntries) -> XmpResult<()>;

    /// Position to return to with [`rollback`](Self::rollback)
    fn checkpoint(&self) -> usize {
        0
    }

    /// Detach models attached since `checkpoint`
    fn rollback(&mut self, _checkpoint: usize) {}
}

fn missing_field(info: &FieldInfo) -> XmpError {
    XmpError::InternalError(format!("field '{}' is described but not accessible", info.name))
}

/// Look up a declared field of a schema by wire name
pub fn schema_lookup<'a, S: Schema + ?Sized>(
    schema: &'a S,
    prefix: &str,
    name: &str,
) -> XmpResult<&'a dyn Field> {
    let info = find_field(schema, prefix, name)?
        .ok_or_else(|| XmpError::PathNotFound(format!("{}:{}", prefix, name)))?;
    schema.field(info.name).ok_or_else(|| missing_field(info))
}

/// Look up a declared field of a schema by wire name for mutation
pub fn schema_lookup_mut<'a, S: Schema + ?Sized>(
    schema: &'a mut S,
    prefix: &str,
    name: &str,
) -> XmpResult<&'a mut dyn Field> {
    let info = find_field(schema, prefix, name)?
        .ok_or_else(|| XmpError::PathNotFound(format!("{}:{}", prefix, name)))?;
    schema.field_mut(info.name).ok_or_else(|| missing_field(info))
}

/// List every encodable field of a schema
pub fn schema_list<S: Schema + ?Sized>(
    schema: &S,
    base: &str,
    out: &mut PathEntries,
) -> XmpResult<()> {
    for info in describe_fields(schema)? {
        if info.is_omitted() || info.is_any() {
            continue;
        }
        let field = schema.field(info.name).ok_or_else(|| missing_field(info))?;
        if !field.is_empty() {
            field.list(&format!("{}{}:{}", base, info.prefix, info.local), out)?;
        }
    }
    Ok(())
}

fn selects_single(selector: &Selector) -> bool {
    matches!(selector, Selector::None | Selector::Default | Selector::Index(0))
}

fn lang_on_single() -> XmpError {
    XmpError::BadXPath("language selector on a field without alternatives".to_string())
}

impl<E: Element> Field for Option<E> {
    fn kind(&self) -> FieldKind {
        E::KIND
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn len(&self) -> usize {
        usize::from(self.is_some())
    }

    fn contains(&self, selector: &Selector) -> bool {
        self.is_some() && selects_single(selector)
    }

    fn get(&self, selector: &Selector) -> XmpResult<Option<String>> {
        if let Selector::Lang(_) = selector {
            return Err(lang_on_single());
        }
        match self {
            Some(value) if selects_single(selector) => value.to_text().map(Some),
            _ => Ok(None),
        }
    }

    fn set(&mut self, selector: &Selector, value: &str) -> XmpResult<()> {
        match selector {
            Selector::Lang(_) => Err(lang_on_single()),
            s if selects_single(s) => {
                *self = Some(E::from_text(value)?);
                Ok(())
            }
            _ => Err(XmpError::PathNotFound(format!(
                "index {} on a single value",
                selector
            ))),
        }
    }

    fn append(&mut self, _value: &str, _lang: Option<&str>, _unique: bool) -> XmpResult<bool> {
        Err(XmpError::BadParam(
            "cannot append to a single-valued field".to_string(),
        ))
    }

    fn remove(&mut self, selector: &Selector) -> bool {
        selects_single(selector) && self.take().is_some()
    }

    fn marshal_text(&self) -> XmpResult<String> {
        match self {
            Some(value) => value.to_text(),
            None => Ok(String::new()),
        }
    }

    fn unmarshal_text(&mut self, text: &str) -> XmpResult<()> {
        *self = if text.is_empty() {
            None
        } else {
            Some(E::from_text(text)?)
        };
        Ok(())
    }

    fn encode(&self, name: &str, as_attr: bool) -> XmpResult<Option<XmlNode>> {
        self.as_ref()
            .map(|value| value.encode_element(name, as_attr))
            .transpose()
    }

    fn decode(&mut self, node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<()> {
        *self = Some(E::decode_element(node, cx)?);
        Ok(())
    }

    fn list(&self, path: &str, out: &mut PathEntries) -> XmpResult<()> {
        let Some(value) = self else {
            return Ok(());
        };
        match value.navigable() {
            Some(nav) => nav.list(&format!("{}/", path), out),
            None => {
                out.push((path.to_string(), value.to_text()?));
                Ok(())
            }
        }
    }

    fn child(&self, selector: &Selector) -> Option<&dyn Navigable> {
        if !selects_single(selector) {
            return None;
        }
        self.as_ref().and_then(Element::navigable)
    }

    fn child_mut(&mut self, selector: &Selector, create: bool) -> Option<&mut dyn Navigable> {
        if !selects_single(selector) || E::KIND != FieldKind::Struct {
            return None;
        }
        if self.is_none() && create {
            *self = Some(E::default());
        }
        self.as_mut().and_then(Element::navigable_mut)
    }
}

impl<E: Element> FieldType for Option<E> {
    const KIND: FieldKind = E::KIND;
    const CAPABILITIES: Capabilities = E::CAPABILITIES;
}

impl Element for String {
    fn to_text(&self) -> XmpResult<String> {
        Ok(self.clone())
    }

    fn from_text(text: &str) -> XmpResult<Self> {
        Ok(text.to_string())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Element for bool {
    fn to_text(&self) -> XmpResult<String> {
        Ok(if *self { "True" } else { "False" }.to_string())
    }

    fn from_text(text: &str) -> XmpResult<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(XmpError::Unmarshal(format!("invalid boolean '{}'", text))),
        }
    }
}

/// Scalars whose text form is their `Display` / `FromStr` form
macro_rules! text_element {
    ($($ty:ty),* $(,)?) => {$(
        impl Element for $ty {
            fn to_text(&self) -> XmpResult<String> {
                Ok(self.to_string())
            }

            fn from_text(text: &str) -> XmpResult<Self> {
                text.trim().parse::<$ty>().map_err(|e| {
                    XmpError::Unmarshal(format!(
                        "invalid {} '{}': {}",
                        stringify!($ty),
                        text,
                        e
                    ))
                })
            }
        }
    )*};
}

text_element!(i32, i64, u8, u16, u32, u64, f64, XmpDate);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_scalar_slots() {
        let mut field: Option<String> = None;
        assert!(field.is_empty());
        assert!(!field.contains(&Selector::None));
        assert_eq!(field.get(&Selector::None).unwrap(), None);

        field.set(&Selector::None, "image/png").unwrap();
        assert_eq!(field.get(&Selector::Default).unwrap().as_deref(), Some("image/png"));
        assert_eq!(field.get(&Selector::Index(0)).unwrap().as_deref(), Some("image/png"));
        assert_eq!(field.get(&Selector::Index(1)).unwrap(), None);
        assert!(field.get(&Selector::Lang("en".into())).is_err());
        assert!(field.set(&Selector::Index(2), "x").is_err());
        assert!(field.append("x", None, false).is_err());

        assert!(field.remove(&Selector::None));
        assert!(!field.remove(&Selector::None));
    }

    #[test]
    fn test_numeric_unmarshal() {
        let mut field: Option<u32> = None;
        field.unmarshal_text(" 42 ").unwrap();
        assert_eq!(field, Some(42));
        assert_eq!(field.marshal_text().unwrap(), "42");

        let err = field.unmarshal_text("forty-two").unwrap_err();
        assert!(matches!(err, XmpError::Unmarshal(_)));

        field.unmarshal_text("").unwrap();
        assert_eq!(field, None);
    }

    #[test]
    fn test_bool_text() {
        assert_eq!(true.to_text().unwrap(), "True");
        assert!(bool::from_text("false").is_ok_and(|b| !b));
        assert!(bool::from_text("maybe").is_err());
    }

    #[test]
    fn test_encode_scalar() {
        let field = Some(7i64);
        let node = field.encode("xmp:Rating", false).unwrap().unwrap();
        assert_eq!(node, XmlNode::with_value("xmp:Rating", "7"));
        assert_eq!(None::<i64>.encode("xmp:Rating", false).unwrap(), None);
    }

    #[test]
    fn test_list_scalar() {
        let mut out = Vec::new();
        Some("a".to_string()).list("dc:format", &mut out).unwrap();
        assert_eq!(out, vec![("dc:format".to_string(), "a".to_string())]);
    }
}
