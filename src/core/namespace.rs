//! Namespace management for XMP models
//!
//! This module handles namespace registration and lookup. A [`Registry`]
//! maps namespace prefixes and URIs to [`Namespace`] entries; entries that
//! carry a model factory can be instantiated into a document. The process
//! wide registry returned by [`Registry::global`] is built once with the
//! built-in models and is read-only afterwards. Custom vocabularies are added
//! by building a private registry and injecting it into a document.

use crate::core::error::{XmpError, XmpResult};
use crate::core::model::Model;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// Well-known namespace URIs and prefixes
pub mod ns {
    /// XMP Basic namespace
    pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";
    /// Dublin Core namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// EXIF namespace
    pub const EXIF: &str = "http://ns.adobe.com/exif/1.0/";
    /// EXIF 2.3 extension namespace
    pub const EXIF_EX: &str = "http://cipa.jp/exif/1.0/";
    /// EXIF Aux namespace
    pub const EXIF_AUX: &str = "http://ns.adobe.com/exif/1.0/aux/";
    /// TIFF namespace
    pub const TIFF: &str = "http://ns.adobe.com/tiff/1.0/";
    /// XMP Rights namespace
    pub const XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
    /// XMP Media Management namespace
    pub const XMP_MM: &str = "http://ns.adobe.com/xap/1.0/mm/";
    /// ResourceRef structure namespace
    pub const ST_REF: &str = "http://ns.adobe.com/xap/1.0/sType/ResourceRef#";
    /// ResourceEvent structure namespace
    pub const ST_EVT: &str = "http://ns.adobe.com/xap/1.0/sType/ResourceEvent#";
    /// PDF namespace
    pub const PDF: &str = "http://ns.adobe.com/pdf/1.3/";
    /// XMP Dynamic Media namespace
    pub const XMP_DM: &str = "http://ns.adobe.com/xmp/1.0/DynamicMedia/";
    /// ID3 namespace
    pub const ID3: &str = "http://id3.org/id3v2.4.0/";
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XML namespace (for xml:lang, etc.)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Adobe XMP meta wrapper namespace
    pub const ADOBE_META: &str = "adobe:ns:meta/";

    /// XMP prefix
    pub const XMP_PREFIX: &str = "xmp";
    /// Dublin Core prefix
    pub const DC_PREFIX: &str = "dc";
    /// EXIF prefix
    pub const EXIF_PREFIX: &str = "exif";
    /// EXIF extension prefix
    pub const EXIF_EX_PREFIX: &str = "exifEX";
    /// EXIF Aux prefix
    pub const EXIF_AUX_PREFIX: &str = "aux";
    /// TIFF prefix
    pub const TIFF_PREFIX: &str = "tiff";
    /// XMP Rights prefix
    pub const XMP_RIGHTS_PREFIX: &str = "xmpRights";
    /// XMP Media Management prefix
    pub const XMP_MM_PREFIX: &str = "xmpMM";
    /// ResourceRef prefix
    pub const ST_REF_PREFIX: &str = "stRef";
    /// ResourceEvent prefix
    pub const ST_EVT_PREFIX: &str = "stEvt";
    /// PDF prefix
    pub const PDF_PREFIX: &str = "pdf";
    /// XMP Dynamic Media prefix
    pub const XMP_DM_PREFIX: &str = "xmpDM";
    /// ID3 prefix
    pub const ID3_PREFIX: &str = "id3";
    /// RDF prefix
    pub const RDF_PREFIX: &str = "rdf";
    /// XML prefix
    pub const XML_PREFIX: &str = "xml";
    /// Adobe XMP meta wrapper prefix
    pub const ADOBE_META_PREFIX: &str = "x";
}

/// Metadata category a namespace belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceGroup {
    /// XMP base vocabularies (dc, xmp, xmpMM)
    Xmp,
    /// Still image metadata
    Image,
    /// Rights management
    Rights,
    /// Audio metadata
    Sound,
    /// Video metadata
    Movie,
    /// Paged documents
    Document,
    /// Camera and lens information
    Camera,
}

impl NamespaceGroup {
    /// All groups, in declaration order
    pub const ALL: [NamespaceGroup; 7] = [
        NamespaceGroup::Xmp,
        NamespaceGroup::Image,
        NamespaceGroup::Rights,
        NamespaceGroup::Sound,
        NamespaceGroup::Movie,
        NamespaceGroup::Document,
        NamespaceGroup::Camera,
    ];

    /// Canonical lowercase name of the group
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceGroup::Xmp => "xmp",
            NamespaceGroup::Image => "image",
            NamespaceGroup::Rights => "rights",
            NamespaceGroup::Sound => "sound",
            NamespaceGroup::Movie => "movie",
            NamespaceGroup::Document => "document",
            NamespaceGroup::Camera => "camera",
        }
    }
}

impl fmt::Display for NamespaceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespaceGroup {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_namespace_group(s)
            .ok_or_else(|| XmpError::BadParam(format!("Unknown namespace group '{}'", s)))
    }
}

/// Parse a group name (case-insensitive); returns `None` for unknown names
pub fn parse_namespace_group(name: &str) -> Option<NamespaceGroup> {
    NamespaceGroup::ALL
        .into_iter()
        .find(|g| g.as_str().eq_ignore_ascii_case(name.trim()))
}

/// Constructor producing a fresh, empty model instance
pub type ModelFactory = fn() -> Box<dyn Model>;

/// A registered metadata vocabulary
#[derive(Clone)]
pub struct Namespace {
    prefix: String,
    uri: String,
    groups: Vec<NamespaceGroup>,
    factory: Option<ModelFactory>,
}

impl Namespace {
    /// Create a namespace without a model (used only to qualify names)
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
            groups: Vec::new(),
            factory: None,
        }
    }

    /// Attach the model constructor
    pub fn with_factory(mut self, factory: ModelFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Add metadata categories
    pub fn with_groups(mut self, groups: &[NamespaceGroup]) -> Self {
        for group in groups {
            if !self.groups.contains(group) {
                self.groups.push(*group);
            }
        }
        self
    }

    /// Short prefix, e.g. `dc`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Categories this namespace belongs to
    pub fn groups(&self) -> &[NamespaceGroup] {
        &self.groups
    }

    /// Whether this namespace belongs to `group`
    pub fn in_group(&self, group: NamespaceGroup) -> bool {
        self.groups.contains(&group)
    }

    /// Whether a model can be instantiated for this namespace
    pub fn has_model(&self) -> bool {
        self.factory.is_some()
    }

    /// Instantiate a fresh model
    pub fn new_model(&self) -> XmpResult<Box<dyn Model>> {
        let factory = self.factory.ok_or_else(|| {
            XmpError::NotFound(format!("No model registered for namespace '{}'", self.prefix))
        })?;
        Ok(factory())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("prefix", &self.prefix)
            .field("uri", &self.uri)
            .field("groups", &self.groups)
            .field("has_model", &self.factory.is_some())
            .finish()
    }
}

/// Map of namespace URI to prefix
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    uri_to_prefix: HashMap<String, String>,
    prefix_to_uri: HashMap<String, String>,
}

impl NamespaceMap {
    /// Create an empty namespace map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace URI with a prefix
    ///
    /// Returns an error if the prefix is already registered to a different URI
    pub fn register(&mut self, uri: &str, prefix: &str) -> XmpResult<()> {
        if let Some(existing_uri) = self.prefix_to_uri.get(prefix) {
            if existing_uri != uri {
                return Err(XmpError::BadParam(format!(
                    "Prefix '{}' is already registered to '{}'",
                    prefix, existing_uri
                )));
            }
            return Ok(());
        }

        self.uri_to_prefix
            .entry(uri.to_string())
            .or_insert_with(|| prefix.to_string());
        self.prefix_to_uri
            .insert(prefix.to_string(), uri.to_string());
        Ok(())
    }

    /// Get the prefix for a namespace URI
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.uri_to_prefix.get(uri).map(|s| s.as_str())
    }

    /// Get the URI for a namespace prefix
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.prefix_to_uri.get(prefix).map(|s| s.as_str())
    }

    /// Check if a namespace URI is registered
    pub fn has_uri(&self, uri: &str) -> bool {
        self.uri_to_prefix.contains_key(uri)
    }

    /// Check if a namespace prefix is registered
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix_to_uri.contains_key(prefix)
    }

    /// Add every entry of `other` that does not clash with this map
    pub fn extend_from(&mut self, other: &NamespaceMap) {
        for (prefix, uri) in &other.prefix_to_uri {
            let _ = self.register(uri, prefix);
        }
    }

    /// Number of registered prefixes
    pub fn len(&self) -> usize {
        self.prefix_to_uri.len()
    }

    /// Whether no prefix is registered
    pub fn is_empty(&self) -> bool {
        self.prefix_to_uri.is_empty()
    }
}

/// Registry of namespaces keyed by prefix and by URI
#[derive(Debug, Clone, Default)]
pub struct Registry {
    namespaces: Vec<Namespace>,
    by_prefix: HashMap<String, usize>,
    by_uri: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry (only rdf/xml/x are known)
    pub fn new() -> Self {
        let mut registry = Self::default();
        for (prefix, uri) in [
            (ns::RDF_PREFIX, ns::RDF),
            (ns::XML_PREFIX, ns::XML),
            (ns::ADOBE_META_PREFIX, ns::ADOBE_META),
        ] {
            registry.insert(Namespace::new(prefix, uri));
        }
        registry
    }

    /// Create a registry holding every built-in model
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        // built-in prefixes and URIs are distinct, so this cannot clash
        if let Err(err) = crate::models::register_builtins(&mut registry) {
            log::error!("failed to register built-in namespaces: {}", err);
        }
        registry
    }

    /// The process-wide registry (built-in models), initialized on first use
    pub fn global() -> Arc<Registry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(Registry::with_builtins()))
            .clone()
    }

    /// Register a namespace
    ///
    /// Re-registering a prefix with the same URI replaces the entry (e.g. to
    /// attach a factory or groups); a prefix or URI that is already bound to
    /// something else is rejected.
    pub fn register(&mut self, namespace: Namespace) -> XmpResult<()> {
        if namespace.prefix.is_empty() {
            return Err(XmpError::BadParam("Prefix cannot be empty".to_string()));
        }
        if namespace.uri.is_empty() {
            return Err(XmpError::BadParam("URI cannot be empty".to_string()));
        }
        if let Some(existing) = self.by_prefix.get(&namespace.prefix) {
            let existing = &self.namespaces[*existing];
            if existing.uri != namespace.uri {
                return Err(XmpError::BadParam(format!(
                    "Prefix '{}' is already registered to '{}'",
                    namespace.prefix, existing.uri
                )));
            }
        } else if let Some(existing) = self.by_uri.get(&namespace.uri) {
            return Err(XmpError::BadParam(format!(
                "URI '{}' is already registered with prefix '{}'",
                namespace.uri, self.namespaces[*existing].prefix
            )));
        }
        self.insert(namespace);
        Ok(())
    }

    fn insert(&mut self, namespace: Namespace) {
        match self.by_prefix.get(&namespace.prefix) {
            Some(&index) => self.namespaces[index] = namespace,
            None => {
                let index = self.namespaces.len();
                self.by_prefix.insert(namespace.prefix.clone(), index);
                self.by_uri.insert(namespace.uri.clone(), index);
                self.namespaces.push(namespace);
            }
        }
    }

    /// Look up a namespace by prefix
    pub fn get_namespace(&self, prefix: &str) -> XmpResult<&Namespace> {
        self.by_prefix
            .get(prefix)
            .map(|&i| &self.namespaces[i])
            .ok_or_else(|| XmpError::NotFound(format!("Unknown namespace prefix '{}'", prefix)))
    }

    /// Look up a namespace by URI
    pub fn namespace_by_uri(&self, uri: &str) -> Option<&Namespace> {
        self.by_uri.get(uri).map(|&i| &self.namespaces[i])
    }

    /// Whether a prefix is registered
    pub fn contains(&self, prefix: &str) -> bool {
        self.by_prefix.contains_key(prefix)
    }

    /// All namespaces in registration order
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    /// Namespaces belonging to a group
    pub fn namespaces_in_group(&self, group: NamespaceGroup) -> Vec<&Namespace> {
        self.namespaces.iter().filter(|n| n.in_group(group)).collect()
    }

    /// Prefix/URI map of every registered namespace
    pub fn namespace_map(&self) -> NamespaceMap {
        let mut map = NamespaceMap::new();
        for namespace in &self.namespaces {
            let _ = map.register(&namespace.uri, &namespace.prefix);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_map_register() {
        let mut map = NamespaceMap::new();
        assert!(map.register("http://example.com/ns", "ex").is_ok());
        assert_eq!(map.get_prefix("http://example.com/ns"), Some("ex"));
        assert_eq!(map.get_uri("ex"), Some("http://example.com/ns"));
    }

    #[test]
    fn test_namespace_map_duplicate_prefix() {
        let mut map = NamespaceMap::new();
        assert!(map.register("http://example.com/ns1", "ex").is_ok());
        assert!(map.register("http://example.com/ns2", "ex").is_err());
        // Registering again with same URI and prefix should succeed
        assert!(map.register("http://example.com/ns1", "ex").is_ok());
    }

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::with_builtins();
        let dc = registry.get_namespace("dc").unwrap();
        assert_eq!(dc.uri(), ns::DC);
        assert!(dc.has_model());
        assert!(dc.in_group(NamespaceGroup::Xmp));

        let tiff = registry.get_namespace("tiff").unwrap();
        assert!(!tiff.has_model());
        assert!(tiff.new_model().is_err());

        assert_eq!(
            registry.namespace_by_uri(ns::XMP_MM).map(|n| n.prefix()),
            Some("xmpMM")
        );
        assert!(registry.get_namespace("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_register_conflicts() {
        let mut registry = Registry::new();
        registry
            .register(Namespace::new("ex", "http://example.com/ns/"))
            .unwrap();
        assert!(registry
            .register(Namespace::new("ex", "http://example.com/other/"))
            .is_err());
        assert!(registry
            .register(Namespace::new("ex2", "http://example.com/ns/"))
            .is_err());
        // same binding may be refined with groups
        registry
            .register(
                Namespace::new("ex", "http://example.com/ns/")
                    .with_groups(&[NamespaceGroup::Image]),
            )
            .unwrap();
        assert_eq!(registry.namespaces_in_group(NamespaceGroup::Image).len(), 1);
    }

    #[test]
    fn test_parse_namespace_group() {
        assert_eq!(parse_namespace_group("image"), Some(NamespaceGroup::Image));
        assert_eq!(parse_namespace_group("Sound"), Some(NamespaceGroup::Sound));
        assert_eq!(parse_namespace_group("bogus"), None);
        assert!("bogus".parse::<NamespaceGroup>().is_err());
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = Registry::global();
        let b = Registry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("xmpMM"));
    }
}
