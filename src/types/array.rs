//! Ordered and unordered arrays
//!
//! [`Seq`] maps to `rdf:Seq` and keeps element order; [`Bag`] maps to
//! `rdf:Bag`, where order carries no meaning. Both lift any [`Element`]
//! (scalar or structure) into a field.

use crate::core::codec::{decode_array, encode_array, DecodeContext};
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::{Element, Field, FieldType, Navigable, PathEntries};
use crate::core::node::{ArrayType, XmlNode};
use crate::core::reflect::{Capabilities, FieldKind};
use crate::core::xpath::Selector;

/// Element position addressed by a selector, `None` for the whole array
fn position(selector: &Selector) -> XmpResult<Option<usize>> {
    match selector {
        Selector::None => Ok(None),
        Selector::Default => Ok(Some(0)),
        Selector::Index(i) => Ok(Some(*i)),
        Selector::Lang(lang) => Err(XmpError::BadXPath(format!(
            "language selector [{}] on an array",
            lang
        ))),
    }
}

macro_rules! array_field {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<T>(Vec<T>);

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self(Vec::new())
            }
        }

        impl<T: Element> $name<T> {
            /// Create an empty array
            pub fn new() -> Self {
                Self(Vec::new())
            }

            /// Elements
            pub fn items(&self) -> &[T] {
                &self.0
            }

            /// Mutable access to the elements
            pub fn items_mut(&mut self) -> &mut Vec<T> {
                &mut self.0
            }

            /// Consume into the elements
            pub fn into_inner(self) -> Vec<T> {
                self.0
            }

            /// Number of elements
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the array has no elements
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Element at a position
            pub fn get(&self, index: usize) -> Option<&T> {
                self.0.get(index)
            }

            /// First element
            pub fn first(&self) -> Option<&T> {
                self.0.first()
            }

            /// Add an element at the end
            pub fn push(&mut self, item: T) {
                self.0.push(item);
            }

            /// Whether an equal element is present
            pub fn contains(&self, item: &T) -> bool {
                self.0.contains(item)
            }

            /// Iterate over the elements
            pub fn iter(&self) -> std::slice::Iter<'_, T> {
                self.0.iter()
            }
        }

        impl<T> From<Vec<T>> for $name<T> {
            fn from(items: Vec<T>) -> Self {
                Self(items)
            }
        }

        impl<T> FromIterator<T> for $name<T> {
            fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl<'a, T> IntoIterator for &'a $name<T> {
            type Item = &'a T;
            type IntoIter = std::slice::Iter<'a, T>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl<T: Element> Field for $name<T> {
            fn kind(&self) -> FieldKind {
                FieldKind::$kind
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
                match position(selector) {
                    Ok(None) => !self.0.is_empty(),
                    Ok(Some(i)) => i < self.0.len(),
                    Err(_) => false,
                }
            }

            fn get(&self, selector: &Selector) -> XmpResult<Option<String>> {
                match position(selector)? {
                    None if self.0.is_empty() => Ok(None),
                    None => self.marshal_text().map(Some),
                    Some(i) => self.0.get(i).map(Element::to_text).transpose(),
                }
            }

            fn set(&mut self, selector: &Selector, value: &str) -> XmpResult<()> {
                let item = T::from_text(value)?;
                match position(selector)? {
                    // whole-field set truncates to a single element
                    None => self.0 = vec![item],
                    Some(i) if i < self.0.len() => self.0[i] = item,
                    Some(i) if i == self.0.len() => self.0.push(item),
                    Some(i) => {
                        return Err(XmpError::PathNotFound(format!(
                            "index {} beyond {} elements",
                            i,
                            self.0.len()
                        )))
                    }
                }
                Ok(())
            }

            fn append(&mut self, value: &str, _lang: Option<&str>, unique: bool) -> XmpResult<bool> {
                let item = T::from_text(value)?;
                if unique && self.0.contains(&item) {
                    return Ok(false);
                }
                self.0.push(item);
                Ok(true)
            }

            fn remove(&mut self, selector: &Selector) -> bool {
                match position(selector) {
                    Ok(None) => {
                        let removed = !self.0.is_empty();
                        self.0.clear();
                        removed
                    }
                    Ok(Some(i)) if i < self.0.len() => {
                        self.0.remove(i);
                        true
                    }
                    _ => false,
                }
            }

            fn marshal_text(&self) -> XmpResult<String> {
                let texts = self
                    .0
                    .iter()
                    .map(Element::to_text)
                    .collect::<XmpResult<Vec<_>>>()?;
                Ok(texts.join(", "))
            }

            fn unmarshal_text(&mut self, text: &str) -> XmpResult<()> {
                self.0 = text
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(T::from_text)
                    .collect::<XmpResult<Vec<_>>>()?;
                Ok(())
            }

            fn encode(&self, name: &str, _as_attr: bool) -> XmpResult<Option<XmlNode>> {
                if self.0.is_empty() {
                    return Ok(None);
                }
                encode_array(name, ArrayType::$kind, &self.0).map(Some)
            }

            fn decode(&mut self, node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<()> {
                self.0 = decode_array(node, cx)?;
                Ok(())
            }

            fn list(&self, path: &str, out: &mut PathEntries) -> XmpResult<()> {
                for (i, item) in self.0.iter().enumerate() {
                    match item.navigable() {
                        Some(nav) => nav.list(&format!("{}[{}]/", path, i), out)?,
                        None => out.push((format!("{}[{}]", path, i), item.to_text()?)),
                    }
                }
                Ok(())
            }

            fn child(&self, selector: &Selector) -> Option<&dyn Navigable> {
                let index = position(selector).ok()?.unwrap_or(0);
                self.0.get(index).and_then(Element::navigable)
            }

            fn child_mut(&mut self, selector: &Selector, create: bool) -> Option<&mut dyn Navigable> {
                if T::KIND != FieldKind::Struct {
                    return None;
                }
                let index = position(selector).ok()?.unwrap_or(0);
                if create && index == self.0.len() {
                    self.0.push(T::default());
                }
                self.0.get_mut(index).and_then(Element::navigable_mut)
            }
        }

        impl<T: Element> FieldType for $name<T> {
            const KIND: FieldKind = FieldKind::$kind;
            const CAPABILITIES: Capabilities = Capabilities::TEXT.union(Capabilities::TREE);
        }
    };
}

array_field! {
    /// Ordered array (`rdf:Seq`)
    Seq, Ordered
}

array_field! {
    /// Unordered array (`rdf:Bag`)
    Bag, Unordered
}

/// Ordered list of text values
pub type StringList = Seq<String>;

/// Unordered set of text values
pub type StringArray = Bag<String>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::namespace::Registry;
    use crate::core::options::DocumentOptions;

    fn list(items: &[&str]) -> StringList {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_indexed_access() {
        let mut seq = list(&["one", "two"]);
        assert_eq!(Field::get(&seq, &Selector::Index(1)).unwrap().as_deref(), Some("two"));
        assert_eq!(Field::get(&seq, &Selector::Default).unwrap().as_deref(), Some("one"));
        assert_eq!(Field::get(&seq, &Selector::None).unwrap().as_deref(), Some("one, two"));
        assert_eq!(Field::get(&seq, &Selector::Index(5)).unwrap(), None);
        assert!(Field::get(&seq, &Selector::Lang("en".into())).is_err());

        Field::set(&mut seq, &Selector::Index(2), "three").unwrap();
        assert_eq!(seq.len(), 3);
        assert!(Field::set(&mut seq, &Selector::Index(7), "x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_shifts_indices() {
        let mut seq = list(&["one", "two", "three"]);
        assert!(Field::remove(&mut seq, &Selector::Index(1)));
        assert_eq!(seq, list(&["one", "three"]));
        assert!(!Field::remove(&mut seq, &Selector::Index(4)));
        assert!(Field::remove(&mut seq, &Selector::None));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_whole_field_set_truncates() {
        let mut bag: StringArray = list(&["a", "b", "c"]).into_inner().into();
        Field::set(&mut bag, &Selector::None, "z").unwrap();
        assert_eq!(bag.items(), ["z".to_string()]);
    }

    #[test]
    fn test_append_unique() {
        let mut seq = list(&["one"]);
        assert!(!Field::append(&mut seq, "one", None, true).unwrap());
        assert_eq!(seq.len(), 1);
        assert!(Field::append(&mut seq, "one", None, false).unwrap());
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_text_form() {
        let mut seq: Seq<u32> = Seq::new();
        seq.unmarshal_text("1, 2,3,").unwrap();
        assert_eq!(seq.items(), [1, 2, 3]);
        assert_eq!(seq.marshal_text().unwrap(), "1, 2, 3");
        assert!(seq.unmarshal_text("1, x").is_err());
    }

    #[test]
    fn test_tree_form() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let seq = list(&["b", "a"]);
        let node = seq.encode("dc:creator", false).unwrap().unwrap();
        assert_eq!(node.children[0].name, "rdf:Seq");

        let mut decoded = StringList::new();
        decoded.decode(&node, &mut cx).unwrap();
        assert_eq!(decoded, seq);
        assert_eq!(StringList::new().encode("dc:creator", false).unwrap(), None);
    }

    #[test]
    fn test_list_paths() {
        let mut out = Vec::new();
        list(&["x", "y"]).list("dc:subject", &mut out).unwrap();
        assert_eq!(
            out,
            vec![
                ("dc:subject[0]".to_string(), "x".to_string()),
                ("dc:subject[1]".to_string(), "y".to_string()),
            ]
        );
    }
}
