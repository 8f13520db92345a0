//! Built-in namespace models
//!
//! [`register_builtins`] installs every model of this module, together with
//! the qualifier-only vocabularies they reference, into a [`Registry`].

pub mod dc;
pub mod exif;
pub mod id3;
pub mod pdf;
pub mod xmp_base;
pub mod xmp_dm;
pub mod xmp_mm;
pub mod xmp_rights;

pub use dc::DublinCore;
pub use exif::{ExifAux, ExifEx, ExifInfo};
pub use id3::Id3;
pub use pdf::PdfInfo;
pub use xmp_base::XmpBase;
pub use xmp_dm::{DynamicMedia, Marker};
pub use xmp_mm::MediaManagement;
pub use xmp_rights::XmpRights;

use crate::core::error::XmpResult;
use crate::core::model::Model;
use crate::core::namespace::{ns, ModelFactory, Namespace, NamespaceGroup, Registry};

fn factory<T: Model + Default>() -> Box<dyn Model> {
    Box::new(T::default())
}

/// Register the built-in namespaces
pub fn register_builtins(registry: &mut Registry) -> XmpResult<()> {
    use NamespaceGroup::{Camera, Document, Image, Movie, Rights, Sound, Xmp};

    let models: [(&str, &str, ModelFactory, &[NamespaceGroup]); 10] = [
        (ns::XMP_PREFIX, ns::XMP, factory::<XmpBase>, &[Xmp]),
        (ns::DC_PREFIX, ns::DC, factory::<DublinCore>, &[Xmp]),
        (ns::XMP_MM_PREFIX, ns::XMP_MM, factory::<MediaManagement>, &[Xmp]),
        (ns::XMP_RIGHTS_PREFIX, ns::XMP_RIGHTS, factory::<XmpRights>, &[Rights, Xmp]),
        (ns::EXIF_PREFIX, ns::EXIF, factory::<ExifInfo>, &[Image, Camera]),
        (ns::EXIF_EX_PREFIX, ns::EXIF_EX, factory::<ExifEx>, &[Image, Camera]),
        (ns::EXIF_AUX_PREFIX, ns::EXIF_AUX, factory::<ExifAux>, &[Image, Camera]),
        (ns::PDF_PREFIX, ns::PDF, factory::<PdfInfo>, &[Document]),
        (ns::XMP_DM_PREFIX, ns::XMP_DM, factory::<DynamicMedia>, &[Sound, Movie]),
        (ns::ID3_PREFIX, ns::ID3, factory::<Id3>, &[Sound]),
    ];
    for (prefix, uri, make, groups) in models {
        registry.register(Namespace::new(prefix, uri).with_factory(make).with_groups(groups))?;
    }

    // qualifiers only: tiff fields live in the EXIF model, the others in structures
    let vocabularies: [(&str, &str, &[NamespaceGroup]); 3] = [
        (ns::TIFF_PREFIX, ns::TIFF, &[Image, Camera]),
        (ns::ST_REF_PREFIX, ns::ST_REF, &[Xmp]),
        (ns::ST_EVT_PREFIX, ns::ST_EVT, &[Xmp]),
    ];
    for (prefix, uri, groups) in vocabularies {
        registry.register(Namespace::new(prefix, uri).with_groups(groups))?;
    }
    Ok(())
}
