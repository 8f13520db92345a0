//! XMP documents
//!
//! A [`Document`] owns an ordered set of namespace models (at most one per
//! namespace), the registry used to create them and a dirty flag set by
//! every mutation. It decodes packets into models, addresses values by path,
//! merges and filters documents, and runs model synchronization before
//! encoding.
//!
//! # Example
//!
//! ```rust
//! use xmpmodel::{Document, PathValue, SetFlags};
//!
//! let mut doc = Document::new();
//! doc.set_path(&PathValue::new("dc:type", "one").with_flags(SetFlags::CREATE))?;
//! doc.set_path(&PathValue::new("dc:type", "two").with_flags(SetFlags::APPEND))?;
//! assert_eq!(doc.get_path("dc:type[1]")?, "two");
//!
//! let packet = doc.to_packet()?;
//! let copy = Document::parse(&packet)?;
//! assert_eq!(copy.get_path("dc:type[0]")?, "one");
//! # Ok::<(), xmpmodel::XmpError>(())
//! ```

mod extension;
mod filter;
mod merge;
mod model_set;
mod path;
mod sync;

pub use extension::Extension;
pub use filter::Filter;
pub use model_set::ModelSet;
pub use path::{PathValue, PathValueList, SetFlags};
pub use sync::SyncReport;

use crate::core::codec::DecodeContext;
use crate::core::error::{XmpError, XmpResult};
use crate::core::model::Model;
use crate::core::namespace::{NamespaceMap, Registry};
use crate::core::node::XmlNode;
use crate::core::options::DocumentOptions;
use crate::core::parser::XmpParser;
use crate::core::serializer::XmpSerializer;
use crate::core::xpath::Path;
use log::{debug, warn};
use std::io::{Read, Write};
use std::str::FromStr;
use std::sync::Arc;

/// A decoded document together with the field errors lenient decoding skipped
#[derive(Debug)]
pub struct Decoded {
    /// The document
    pub document: Document,
    /// Field errors, each wrapped with its namespace
    pub errors: Vec<XmpError>,
}

/// An XMP document: namespace models plus the unknown properties read with them
#[derive(Debug, Clone)]
pub struct Document {
    registry: Arc<Registry>,
    options: DocumentOptions,
    about: String,
    models: ModelSet,
    namespaces: NamespaceMap,
    dirty: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document using the process-wide registry
    pub fn new() -> Self {
        Self::with_registry(Registry::global())
    }

    /// Create an empty document using a specific registry
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            options: DocumentOptions::default(),
            about: String::new(),
            models: ModelSet::new(),
            namespaces: NamespaceMap::new(),
            dirty: false,
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: DocumentOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Registry used to create models
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Subject of the description (`rdf:about`)
    pub fn about(&self) -> &str {
        &self.about
    }

    /// Set the subject of the description
    pub fn set_about(&mut self, about: impl Into<String>) {
        self.about = about.into();
    }

    /// Whether the document changed since the last synchronization
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the document for synchronization
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Parse a packet with the process-wide registry and default options
    ///
    /// Malformed fields are skipped and logged; use
    /// [`decode_str`](Self::decode_str) or [`parse_with`](Self::parse_with)
    /// to inspect them.
    pub fn parse(xml: &str) -> XmpResult<Self> {
        let mut document = Self::new();
        document.decode_str(xml)?;
        Ok(document)
    }

    /// Parse a packet with a specific registry and options
    pub fn parse_with(
        xml: &str,
        registry: Arc<Registry>,
        options: DocumentOptions,
    ) -> XmpResult<Decoded> {
        let mut document = Self::with_registry(registry).with_options(options);
        let errors = document.decode_str(xml)?;
        Ok(Decoded { document, errors })
    }

    /// Read and parse a packet
    pub fn read_from<R: Read>(mut reader: R) -> XmpResult<Self> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        Self::parse(&xml)
    }

    /// Decode a packet into this document, returning the skipped field errors
    pub fn decode_str(&mut self, xml: &str) -> XmpResult<Vec<XmpError>> {
        let registry = Arc::clone(&self.registry);
        let mut parser = XmpParser::new(&registry);
        let root = parser.parse_packet(xml)?;
        self.namespaces.extend_from(parser.unknown_namespaces());
        self.decode_node(&root)
    }

    /// Decode a node tree (`x:xmpmeta` or `rdf:RDF`) into this document
    ///
    /// Every `rdf:Description` contributes to the same model set. In strict
    /// mode the first field error is returned; otherwise the skipped field
    /// errors are returned.
    pub fn decode_node(&mut self, root: &XmlNode) -> XmpResult<Vec<XmpError>> {
        let rdf = if root.name == "rdf:RDF" {
            root
        } else {
            root.find("rdf:RDF")
                .ok_or_else(|| XmpError::ParseError("missing rdf:RDF element".to_string()))?
        };

        let registry = Arc::clone(&self.registry);
        let mut cx = DecodeContext::new(&registry, self.options);
        for description in rdf.children_named("rdf:Description") {
            if let Some(about) = description.attr("rdf:about") {
                if self.about.is_empty() {
                    self.about = about.to_string();
                }
            }
            self.models.decode_description(description, &mut cx)?;
        }
        debug!(
            "decoded {} models ({} field errors)",
            self.models.len(),
            cx.errors().len()
        );
        self.dirty = true;
        Ok(cx.into_errors())
    }

    /// Attached models
    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    /// Attach a model, replacing (and returning) the model of the same namespace
    pub fn add_model(&mut self, model: Box<dyn Model>) -> Option<Box<dyn Model>> {
        self.dirty = true;
        self.models.add(model)
    }

    /// Model attached for a namespace prefix
    pub fn find_model(&self, prefix: &str) -> Option<&dyn Model> {
        self.models.find(prefix)
    }

    /// Mutable model attached for a namespace prefix
    pub fn find_model_mut(&mut self, prefix: &str) -> Option<&mut dyn Model> {
        self.dirty = true;
        self.models.find_mut(prefix)
    }

    /// Find the model for a prefix, creating it from the registry if absent
    pub fn make_model(&mut self, prefix: &str) -> XmpResult<&mut dyn Model> {
        self.dirty = true;
        self.models.make(&self.registry, prefix)
    }

    /// Detach the model of a namespace
    pub fn remove_model(&mut self, prefix: &str) -> Option<Box<dyn Model>> {
        self.dirty = true;
        self.models.remove(prefix)
    }

    /// Attached model of type `T`
    pub fn find<T: Model>(&self) -> Option<&T> {
        self.models.find_as::<T>()
    }

    /// Mutable attached model of type `T`
    pub fn find_mut<T: Model>(&mut self) -> Option<&mut T> {
        self.dirty = true;
        self.models.find_as_mut::<T>()
    }

    /// Model of type `T`, attached with default values if absent
    pub fn make<T: Model + Default>(&mut self) -> XmpResult<&mut T> {
        self.dirty = true;
        self.models.make_as::<T>()
    }

    /// Read the text addressed by a path
    ///
    /// Fails with `PathNotFound` when the namespace, field or slot is absent.
    pub fn get_path(&self, path: &str) -> XmpResult<String> {
        let parsed: Path = path.parse()?;
        path::get_value(&self.models, &parsed).map_err(|e| e.in_namespace(parsed.namespace()))
    }

    /// Write a value addressed by a path
    pub fn set_path(&mut self, value: &PathValue) -> XmpResult<()> {
        path::set_value(&mut self.models, &self.registry, value)?;
        self.dirty = true;
        Ok(())
    }

    /// Apply several writes in order, stopping at the first error
    pub fn set_paths<'a>(&mut self, values: impl IntoIterator<Item = &'a PathValue>) -> XmpResult<()> {
        for value in values {
            self.set_path(value)?;
        }
        Ok(())
    }

    /// Every value of every model as path/value pairs
    ///
    /// Each entry names its owning model in `namespace`, so the list can be
    /// replayed with [`set_paths`](Self::set_paths).
    pub fn list_paths(&self) -> XmpResult<PathValueList> {
        let mut list = PathValueList::new();
        for model in self.models.iter() {
            let mut entries = Vec::new();
            crate::core::field::Navigable::list(model, "", &mut entries)
                .map_err(|e| e.in_namespace(model.namespace()))?;
            for (path, value) in entries {
                list.push(PathValue::new(path, value).with_namespace(model.namespace()));
            }
        }
        Ok(list)
    }

    /// Merge another document into this one
    ///
    /// See [`SetFlags`] for the modes; merging the same document twice has
    /// the same effect as merging it once.
    pub fn merge(&mut self, other: &Document, flags: SetFlags) -> XmpResult<()> {
        merge::merge_models(&mut self.models, &self.registry, &other.models, flags)?;
        self.namespaces.extend_from(&other.namespaces);
        self.dirty = true;
        Ok(())
    }

    /// Remove every model and unknown property the filter rejects
    ///
    /// Returns the number of removed models.
    pub fn filter(&mut self, filter: &Filter) -> usize {
        let before = self.models.len();
        let registry = Arc::clone(&self.registry);
        self.models
            .retain(|model| filter.accepts(&registry, model.namespace()));
        self.models.unknown_mut().retain(|node| filter.accepts(&registry, node.prefix()));
        let removed = before - self.models.len();
        if removed > 0 {
            debug!("filter removed {} models", removed);
            self.dirty = true;
        }
        removed
    }

    /// Inbound synchronization: every model pulls values from its siblings
    pub fn sync_models(&mut self) -> SyncReport {
        let report = sync::sync_models(&mut self.models);
        self.dirty = false;
        report
    }

    /// Outbound synchronization: every model pushes values to the base namespaces
    pub fn sync_xmp(&mut self) -> SyncReport {
        sync::sync_to_xmp(&mut self.models)
    }

    /// Inbound synchronization when dirty, then outbound synchronization
    pub fn sync(&mut self) -> SyncReport {
        let report = sync::sync_all(&mut self.models, self.dirty);
        self.dirty = false;
        report
    }

    /// Encode to an `rdf:RDF` tree
    ///
    /// Encoding works on a synchronized copy of the models unless the
    /// options disable synchronization; sync errors are logged.
    pub fn encode(&self) -> XmpResult<XmlNode> {
        let mut description = XmlNode::new("rdf:Description");
        description.set_attr("rdf:about", self.about.clone());

        if self.options.no_sync {
            self.models.encode_into(&mut description)?;
        } else {
            let mut models = self.models.clone();
            let report = sync::sync_all(&mut models, self.dirty);
            if !report.is_ok() {
                warn!("encoding with {} sync errors", report.errors().len());
            }
            models.encode_into(&mut description)?;
        }

        let mut rdf = XmlNode::new("rdf:RDF");
        rdf.push(description);
        Ok(rdf)
    }

    fn serializer(&self) -> XmpSerializer<'_> {
        XmpSerializer::new(&self.registry).with_namespaces(&self.namespaces)
    }

    /// Encode to RDF/XML
    pub fn to_rdf(&self) -> XmpResult<String> {
        self.serializer().serialize_rdf(&self.encode()?)
    }

    /// Encode to a complete XMP packet
    pub fn to_packet(&self) -> XmpResult<String> {
        self.serializer().serialize_packet(&self.encode()?)
    }

    /// Write a complete XMP packet
    pub fn write_to<W: Write>(&self, mut writer: W) -> XmpResult<()> {
        writer.write_all(self.to_packet()?.as_bytes())?;
        Ok(())
    }
}

impl FromStr for Document {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Document::parse(s)
    }
}

/// Equal when both hold the same non-empty models and unknown properties
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.about == other.about && self.models == other.models
    }
}
