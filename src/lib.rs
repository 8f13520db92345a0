//! # xmpmodel
//!
//! Typed XMP namespace models with path addressing and cross-namespace
//! synchronization.
//!
//! Each metadata vocabulary (Dublin Core, XMP Basic, EXIF, ID3, ...) is a
//! typed model declared with [`xmp_model!`]. A [`Document`] decodes an XMP
//! packet into models, addresses any value through paths such as
//! `dc:title[de]` or `xmpMM:Pantry[0]/dc:format`, keeps redundant facts
//! consistent across namespaces and encodes the models back to RDF/XML.
//!
//! ```rust
//! use xmpmodel::models::DublinCore;
//! use xmpmodel::{Document, PathValue};
//!
//! let mut doc = Document::new();
//! doc.set_path(&PathValue::new("dc:title[en]", "Sunset"))?;
//! doc.set_path(&PathValue::new("dc:title[de]", "Sonnenuntergang"))?;
//!
//! assert_eq!(doc.get_path("dc:title")?, "Sunset");
//! let dc = doc.find::<DublinCore>().expect("dc model");
//! assert_eq!(dc.title.get("de"), Some("Sonnenuntergang"));
//! # Ok::<(), xmpmodel::XmpError>(())
//! ```

pub mod core;
pub mod models;
pub mod types;
pub mod utils;

pub use crate::core::{
    Decoded, Document, DocumentOptions, Filter, Model, NamespaceGroup, PathValue, PathValueList,
    Registry, SetFlags, SyncReport, XmpError, XmpResult,
};
pub use crate::types::{AltString, Bag, Rational, Seq};
pub use crate::utils::XmpDate;
