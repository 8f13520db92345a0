//! Alternative (language-keyed) text
//!
//! An [`AltString`] holds one entry per language with exactly one entry
//! marked default whenever it is non-empty. Entries keep insertion order,
//! which is the order positional selectors (`[0]`, `[1]`, ...) address.
//!
//! On the wire the default entry is announced by an `x-default` item; when
//! the default entry carries a concrete language, an `x-default` copy of it
//! is written first and merged back on decode.

use crate::core::codec::{array_container, DecodeContext};
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::{Field, FieldType, PathEntries};
use crate::core::node::{ArrayType, XmlNode};
use crate::core::reflect::{Capabilities, FieldKind};
use crate::core::xpath::Selector;
use log::debug;

/// Language tag of the default entry
pub const X_DEFAULT: &str = "x-default";

/// One language entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltItem {
    /// Language tag (`x-default` when unknown)
    pub lang: String,
    /// Text
    pub value: String,
    /// Whether this is the default entry
    pub is_default: bool,
}

/// Language-keyed alternative text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltString {
    items: Vec<AltItem>,
}

fn is_default_key(lang: &str) -> bool {
    lang.is_empty() || lang.eq_ignore_ascii_case(X_DEFAULT)
}

impl AltString {
    /// Create an empty value
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a value with a single `x-default` entry
    pub fn from_default(value: impl Into<String>) -> Self {
        let mut alt = Self::new();
        alt.set_default_value(value);
        alt
    }

    /// Entries in insertion order
    pub fn items(&self) -> &[AltItem] {
        &self.items
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn default_index(&self) -> Option<usize> {
        self.items.iter().position(|i| i.is_default)
    }

    fn lang_index(&self, lang: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.lang.eq_ignore_ascii_case(lang))
    }

    /// The default entry
    pub fn default_item(&self) -> Option<&AltItem> {
        self.default_index().map(|i| &self.items[i])
    }

    /// Text of the default entry
    pub fn default_value(&self) -> Option<&str> {
        self.default_item().map(|i| i.value.as_str())
    }

    /// Text for a language
    ///
    /// An empty key or `x-default` returns the default entry; unknown
    /// languages return `None`.
    pub fn get(&self, lang: &str) -> Option<&str> {
        if is_default_key(lang) {
            return self.default_value();
        }
        self.lang_index(lang).map(|i| self.items[i].value.as_str())
    }

    /// Text for a language, falling back to the default entry
    pub fn get_or_default(&self, lang: &str) -> Option<&str> {
        self.get(lang).or_else(|| self.default_value())
    }

    /// Entry at a position
    pub fn get_index(&self, index: usize) -> Option<&AltItem> {
        self.items.get(index)
    }

    /// Whether an entry exists for a language (or a default for the default key)
    pub fn contains(&self, lang: &str) -> bool {
        self.get(lang).is_some()
    }

    /// Create or update the entry for a language
    ///
    /// The first entry of an empty value becomes the default.
    pub fn set(&mut self, lang: &str, value: impl Into<String>) {
        if is_default_key(lang) {
            self.set_default_value(value);
            return;
        }
        let value = value.into();
        match self.lang_index(lang) {
            Some(i) => self.items[i].value = value,
            None => {
                let is_default = self.items.is_empty();
                self.items.push(AltItem {
                    lang: lang.to_string(),
                    value,
                    is_default,
                });
            }
        }
    }

    /// Update the default entry, creating an `x-default` entry if there is none
    pub fn set_default_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self.default_index() {
            Some(i) => self.items[i].value = value,
            None => self.items.push(AltItem {
                lang: X_DEFAULT.to_string(),
                value,
                is_default: true,
            }),
        }
    }

    /// Create or update the entry for a language and make it the default
    ///
    /// A separate `x-default` entry is dropped: the language entry takes
    /// its place.
    pub fn set_default(&mut self, lang: &str, value: impl Into<String>) {
        if is_default_key(lang) {
            self.set_default_value(value);
            return;
        }
        self.set(lang, value);
        self.items.retain(|i| !is_default_key(&i.lang));
        if let Some(index) = self.lang_index(lang) {
            for (i, item) in self.items.iter_mut().enumerate() {
                item.is_default = i == index;
            }
        }
    }

    /// Update the entry at a position
    pub fn set_index(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Add a new entry
    ///
    /// Returns `Ok(false)` when `unique` is set and the language already holds
    /// the same text; a language holding different text is a conflict.
    pub fn add(&mut self, lang: &str, value: &str, unique: bool) -> XmpResult<bool> {
        if let Some(existing) = self.get(lang) {
            if unique && existing == value {
                return Ok(false);
            }
            return Err(XmpError::Conflict(format!(
                "language '{}' already present",
                if lang.is_empty() { X_DEFAULT } else { lang }
            )));
        }
        self.set(lang, value);
        Ok(true)
    }

    /// Remove the entry for a language
    pub fn remove(&mut self, lang: &str) -> bool {
        let index = if is_default_key(lang) {
            self.default_index()
        } else {
            self.lang_index(lang)
        };
        match index {
            Some(i) => self.remove_index(i),
            None => false,
        }
    }

    /// Remove the entry at a position
    pub fn remove_index(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        self.ensure_default();
        true
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Fill the default entry only when there is none
    pub fn fill_default(&mut self, value: &str) -> bool {
        if self.is_empty() && !value.is_empty() {
            self.set_default_value(value);
            return true;
        }
        false
    }

    /// Restore the single-default invariant: an `x-default` entry is always
    /// the default, then the first marked default wins, otherwise the first
    /// entry becomes default
    fn ensure_default(&mut self) {
        if let Some(index) = self.items.iter().position(|i| is_default_key(&i.lang)) {
            for (i, item) in self.items.iter_mut().enumerate() {
                item.is_default = i == index;
            }
            return;
        }
        let mut seen = false;
        for item in &mut self.items {
            if item.is_default {
                if seen {
                    item.is_default = false;
                }
                seen = true;
            }
        }
        if !seen {
            if let Some(first) = self.items.first_mut() {
                first.is_default = true;
            }
        }
    }

    fn decode_items(&mut self, node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<()> {
        let mut entries: Vec<(String, String)> = Vec::new();
        match array_container(node) {
            Some((_, container)) => {
                for li in &container.children {
                    if li.name != "rdf:li" || li.has_children() {
                        return Err(cx.decode_error(format!(
                            "alternative entry '{}' is not a simple value",
                            li.name
                        )));
                    }
                    if li.value.is_empty() && !li.attrs.is_empty() {
                        return Err(cx.decode_error("alternative entry without a value"));
                    }
                    let lang = li.attr("xml:lang").unwrap_or(X_DEFAULT);
                    entries.push((lang.to_string(), li.value.clone()));
                }
            }
            None if node.has_children() => {
                return Err(cx.decode_error("expected rdf:Alt"));
            }
            None if !node.value.is_empty() => {
                let lang = node.attr("xml:lang").unwrap_or(X_DEFAULT);
                entries.push((lang.to_string(), node.value.clone()));
            }
            None => {}
        }

        // An x-default item directly followed by a language item with the
        // same text marks that language as the default; any other x-default
        // item is an entry of its own.
        let mut default_lang: Option<String> = None;
        let mut own_default: Option<String> = None;
        for (i, (lang, value)) in entries.iter().enumerate() {
            if is_default_key(lang) {
                if default_lang.is_some() || own_default.is_some() {
                    debug!("ignoring duplicate x-default entry in {}", cx.path());
                    continue;
                }
                match entries.get(i + 1) {
                    Some((next, text)) if !is_default_key(next) && text == value => {
                        default_lang = Some(next.clone());
                    }
                    _ => own_default = Some(value.clone()),
                }
                continue;
            }
            if self.lang_index(lang).is_none() {
                self.items.push(AltItem {
                    lang: lang.clone(),
                    value: value.clone(),
                    is_default: false,
                });
            }
        }

        if let Some(value) = own_default {
            self.items.insert(
                0,
                AltItem {
                    lang: X_DEFAULT.to_string(),
                    value,
                    is_default: true,
                },
            );
        } else if let Some(index) = default_lang.and_then(|lang| self.lang_index(&lang)) {
            self.items[index].is_default = true;
        }
        self.ensure_default();
        Ok(())
    }
}

impl From<&str> for AltString {
    fn from(value: &str) -> Self {
        Self::from_default(value)
    }
}

impl Field for AltString {
    fn kind(&self) -> FieldKind {
        FieldKind::Alternative
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn contains(&self, selector: &Selector) -> bool {
        match selector {
            Selector::None | Selector::Default => !self.is_empty(),
            Selector::Index(i) => *i < self.items.len(),
            Selector::Lang(lang) => AltString::contains(self, lang),
        }
    }

    fn get(&self, selector: &Selector) -> XmpResult<Option<String>> {
        let value = match selector {
            Selector::None | Selector::Default => self.default_value(),
            Selector::Index(i) => self.items.get(*i).map(|item| item.value.as_str()),
            Selector::Lang(lang) => AltString::get(self, lang),
        };
        Ok(value.map(str::to_string))
    }

    fn set(&mut self, selector: &Selector, value: &str) -> XmpResult<()> {
        match selector {
            Selector::None => {
                // whole-field set keeps only the default entry
                let lang = self
                    .default_item()
                    .map(|i| i.lang.clone())
                    .unwrap_or_else(|| X_DEFAULT.to_string());
                self.items = vec![AltItem {
                    lang,
                    value: value.to_string(),
                    is_default: true,
                }];
            }
            Selector::Default => self.set_default_value(value),
            Selector::Lang(lang) => AltString::set(self, lang, value),
            Selector::Index(i) if *i < self.items.len() => {
                self.set_index(*i, value);
            }
            Selector::Index(i) if *i == 0 => self.set_default_value(value),
            Selector::Index(i) => {
                return Err(XmpError::PathNotFound(format!(
                    "index {} beyond {} entries",
                    i,
                    self.items.len()
                )))
            }
        }
        Ok(())
    }

    fn append(&mut self, value: &str, lang: Option<&str>, unique: bool) -> XmpResult<bool> {
        self.add(lang.unwrap_or(X_DEFAULT), value, unique)
    }

    fn remove(&mut self, selector: &Selector) -> bool {
        match selector {
            Selector::None => {
                let removed = !self.items.is_empty();
                self.items.clear();
                removed
            }
            Selector::Default => AltString::remove(self, X_DEFAULT),
            Selector::Index(i) => self.remove_index(*i),
            Selector::Lang(lang) => AltString::remove(self, lang),
        }
    }

    fn marshal_text(&self) -> XmpResult<String> {
        Ok(self.default_value().unwrap_or_default().to_string())
    }

    fn unmarshal_text(&mut self, text: &str) -> XmpResult<()> {
        if text.is_empty() {
            self.items.clear();
        } else {
            self.set_default_value(text);
        }
        Ok(())
    }

    fn encode(&self, name: &str, _as_attr: bool) -> XmpResult<Option<XmlNode>> {
        if self.is_empty() {
            return Ok(None);
        }
        let li = |lang: &str, value: &str| {
            let mut li = XmlNode::with_value("rdf:li", value);
            li.set_attr("xml:lang", lang);
            li
        };
        // a standalone x-default entry followed by the same text would read
        // back as a copy of that language, so it moves to the end
        let own_default_last = match self.items.as_slice() {
            [first, next, ..] => is_default_key(&first.lang) && next.value == first.value,
            _ => false,
        };
        let mut alt = XmlNode::new(ArrayType::Alternative.element_name());
        for item in &self.items {
            if is_default_key(&item.lang) {
                if !own_default_last {
                    alt.push(li(X_DEFAULT, &item.value));
                }
                continue;
            }
            if item.is_default {
                alt.push(li(X_DEFAULT, &item.value));
            }
            alt.push(li(&item.lang, &item.value));
        }
        if own_default_last {
            if let Some(first) = self.items.first() {
                alt.push(li(X_DEFAULT, &first.value));
            }
        }
        let mut node = XmlNode::new(name);
        node.push(alt);
        Ok(Some(node))
    }

    fn decode(&mut self, node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<()> {
        self.items.clear();
        self.decode_items(node, cx)
    }

    fn list(&self, path: &str, out: &mut PathEntries) -> XmpResult<()> {
        // default first so that replaying the list restores the default marker
        let default = self.default_item();
        let rest = self.items.iter().filter(|i| !i.is_default);
        for item in default.into_iter().chain(rest) {
            out.push((format!("{}[{}]", path, item.lang), item.value.clone()));
        }
        Ok(())
    }

    fn as_alt(&self) -> Option<&AltString> {
        Some(self)
    }

    fn as_alt_mut(&mut self) -> Option<&mut AltString> {
        Some(self)
    }
}

impl FieldType for AltString {
    const KIND: FieldKind = FieldKind::Alternative;
    const CAPABILITIES: Capabilities = Capabilities::TEXT.union(Capabilities::TREE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::namespace::Registry;
    use crate::core::options::DocumentOptions;

    fn description() -> AltString {
        let mut alt = AltString::new();
        alt.set("en", "english");
        alt.set("de", "german");
        alt
    }

    #[test]
    fn test_default_lookup() {
        let alt = description();
        assert_eq!(alt.get("de"), Some("german"));
        assert_eq!(alt.get(""), Some("english"));
        assert_eq!(alt.get("x-default"), Some("english"));
        assert_eq!(alt.get("fr"), None);
        assert_eq!(alt.get_or_default("fr"), Some("english"));
        assert_eq!(alt.default_item().map(|i| i.lang.as_str()), Some("en"));
    }

    #[test]
    fn test_remove_default_promotes_first() {
        let mut alt = description();
        assert!(alt.remove(""));
        assert_eq!(alt.len(), 1);
        assert_eq!(alt.default_value(), Some("german"));
        assert!(!alt.remove("fr"));
    }

    #[test]
    fn test_add_unique() {
        let mut alt = description();
        assert!(!alt.add("de", "german", true).unwrap());
        assert!(alt.add("de", "deutsch", true).unwrap_err().is_conflict());
        assert!(alt.add("de", "german", false).unwrap_err().is_conflict());
        assert!(alt.add("fr", "french", true).unwrap());
        assert_eq!(alt.len(), 3);
    }

    #[test]
    fn test_set_default_moves_marker() {
        let mut alt = description();
        alt.set_default("de", "german");
        assert_eq!(alt.get(""), Some("german"));
        assert_eq!(alt.items().iter().filter(|i| i.is_default).count(), 1);
    }

    #[test]
    fn test_whole_field_set_truncates() {
        let mut alt = description();
        Field::set(&mut alt, &Selector::None, "only").unwrap();
        assert_eq!(alt.len(), 1);
        assert_eq!(alt.get("en"), Some("only"));
    }

    #[test]
    fn test_encode_decode_default_marker() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let alt = description();
        let node = alt.encode("dc:description", false).unwrap().unwrap();
        let lis = &node.children[0].children;
        assert_eq!(lis.len(), 3);
        assert_eq!(lis[0].attr("xml:lang"), Some("x-default"));

        let mut decoded = AltString::new();
        decoded.decode(&node, &mut cx).unwrap();
        assert_eq!(decoded, alt);
    }

    fn round_trip(alt: &AltString) -> AltString {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let node = alt.encode("dc:title", false).unwrap().unwrap();
        let mut decoded = AltString::new();
        decoded.decode(&node, &mut cx).unwrap();
        decoded
    }

    fn default_lang(alt: &AltString) -> Option<&str> {
        alt.default_item().map(|i| i.lang.as_str())
    }

    #[test]
    fn test_round_trip_own_default_with_same_text() {
        let mut alt = AltString::from_default("a");
        alt.set("en", "a");
        let decoded = round_trip(&alt);
        assert_eq!(decoded, alt);
        assert_eq!(default_lang(&decoded), Some(X_DEFAULT));

        alt.set("de", "b");
        assert_eq!(round_trip(&alt), alt);
    }

    #[test]
    fn test_round_trip_own_default_among_languages() {
        let mut alt = AltString::from_default("a");
        alt.set("en", "b");
        alt.set("de", "a");
        let decoded = round_trip(&alt);
        assert_eq!(decoded, alt);
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn test_round_trip_languages_sharing_default_text() {
        let mut alt = AltString::new();
        alt.set("de", "same");
        alt.set_default("en", "same");
        assert_eq!(default_lang(&alt), Some("en"));
        let decoded = round_trip(&alt);
        assert_eq!(decoded, alt);
        assert_eq!(default_lang(&decoded), Some("en"));

        let mut alt = AltString::new();
        alt.set("en", "x");
        alt.set("de", "same");
        alt.set_default("en", "same");
        assert_eq!(round_trip(&alt), alt);
    }

    #[test]
    fn test_set_default_replaces_own_default() {
        let mut alt = AltString::from_default("old");
        alt.set("de", "german");
        alt.set_default("en", "english");
        assert_eq!(alt.len(), 2);
        assert_eq!(alt.get(""), Some("english"));
        assert_eq!(round_trip(&alt), alt);
    }

    #[test]
    fn test_decode_default_copy() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let mut alt_node = XmlNode::new("rdf:Alt");
        for (lang, value) in [("x-default", "hello"), ("en", "hello"), ("fr", "hello")] {
            let mut li = XmlNode::with_value("rdf:li", value);
            li.set_attr("xml:lang", lang);
            alt_node.push(li);
        }
        let mut node = XmlNode::new("dc:title");
        node.push(alt_node);

        let mut alt = AltString::new();
        alt.decode(&node, &mut cx).unwrap();
        assert_eq!(alt.len(), 2);
        assert_eq!(default_lang(&alt), Some("en"));
    }

    #[test]
    fn test_decode_without_default() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let mut alt_node = XmlNode::new("rdf:Alt");
        for (lang, value) in [("fr", "bonjour"), ("en", "hello")] {
            let mut li = XmlNode::with_value("rdf:li", value);
            li.set_attr("xml:lang", lang);
            alt_node.push(li);
        }
        let mut node = XmlNode::new("dc:title");
        node.push(alt_node);

        let mut alt = AltString::new();
        alt.decode(&node, &mut cx).unwrap();
        assert_eq!(alt.default_value(), Some("bonjour"));
    }

    #[test]
    fn test_decode_attribute_only_entry_fails() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let mut li = XmlNode::new("rdf:li");
        li.set_attr("xml:lang", "en");
        let mut alt_node = XmlNode::new("rdf:Alt");
        alt_node.push(li);
        let mut node = XmlNode::new("dc:title");
        node.push(alt_node);

        let err = AltString::new().decode(&node, &mut cx).unwrap_err();
        assert!(matches!(err, XmpError::Decode { .. }));
    }

    #[test]
    fn test_list_default_first() {
        let mut alt = AltString::new();
        alt.set("de", "german");
        alt.set_default("en", "english");
        let mut out = Vec::new();
        alt.list("dc:title", &mut out).unwrap();
        assert_eq!(out[0], ("dc:title[en]".to_string(), "english".to_string()));
        assert_eq!(out[1], ("dc:title[de]".to_string(), "german".to_string()));
    }
}
