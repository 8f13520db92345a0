//! XMP Core module
//!
//! This module contains the engine shared by every namespace model: the node
//! tree and its XML codec, the namespace registry, field reflection and
//! codecs, path addressing, and the document with its synchronization and
//! merge logic.

pub mod codec;
pub mod document;
pub mod error;
pub mod field;
pub mod macros;
pub mod model;
pub mod namespace;
pub mod native;
pub mod node;
pub mod options;
pub mod parser;
pub mod reflect;
pub mod serializer;
pub mod xpath;

pub use document::{
    Decoded, Document, Extension, Filter, ModelSet, PathValue, PathValueList, SetFlags, SyncReport,
};
pub use error::{XmpError, XmpResult};
pub use field::{Element, Field, FieldType, Navigable};
pub use model::Model;
pub use namespace::{Namespace, NamespaceGroup, NamespaceMap, Registry};
pub use native::{get_locale_field, get_native_field, set_locale_field, set_native_field};
pub use node::{ArrayType, Attr, XmlNode};
pub use options::DocumentOptions;
pub use parser::XmpParser;
pub use serializer::XmpSerializer;
pub use xpath::{parse_path, Path, PathSegment, Selector};
