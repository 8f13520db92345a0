//! Native tag access
//!
//! Container formats identify values by short native tags (ID3 frame ids,
//! EXIF tag numbers, QuickTime atoms). A model field declares its tag with
//! `tag "..."`; these functions get and set such fields as text. The model's
//! `map_native_tag` hook normalises tags first (legacy frame ids, letter
//! case). Nothing else changes: marking the document dirty and running
//! synchronization is up to the caller.

use crate::core::error::{XmpError, XmpResult};
use crate::core::field::Field;
use crate::core::model::Model;
use crate::core::reflect::find_tag;

fn tagged_field<'m>(model: &'m dyn Model, tag: &str) -> XmpResult<&'m dyn Field> {
    let tag = model.map_native_tag(tag);
    let info = find_tag(model, &tag)?.ok_or_else(|| XmpError::TagNotFound(tag.to_string()))?;
    model
        .field(info.name)
        .ok_or_else(|| XmpError::TagNotFound(tag.to_string()))
}

fn tagged_field_mut<'m>(model: &'m mut dyn Model, tag: &str) -> XmpResult<&'m mut dyn Field> {
    let tag = model.map_native_tag(tag).into_owned();
    let info = find_tag(&*model, &tag)?.ok_or_else(|| XmpError::TagNotFound(tag.clone()))?;
    model
        .field_mut(info.name)
        .ok_or(XmpError::TagNotFound(tag))
}

/// Text of the field declaring `tag`
pub fn get_native_field(model: &dyn Model, tag: &str) -> XmpResult<String> {
    tagged_field(model, tag)
        .and_then(|field| field.marshal_text())
        .map_err(|e| e.in_namespace(model.namespace()))
}

/// Replace the field declaring `tag` from text
pub fn set_native_field(model: &mut dyn Model, tag: &str, value: &str) -> XmpResult<()> {
    let namespace = model.namespace();
    tagged_field_mut(model, tag)
        .and_then(|field| field.unmarshal_text(value))
        .map_err(|e| e.in_namespace(namespace))
}

/// Text of the field declaring `tag` in a language
///
/// Alternative text falls back to the default entry when the language is
/// absent; other fields ignore the language.
pub fn get_locale_field(model: &dyn Model, tag: &str, lang: &str) -> XmpResult<String> {
    tagged_field(model, tag)
        .and_then(|field| match field.as_alt() {
            Some(alt) => Ok(alt.get_or_default(lang).unwrap_or_default().to_string()),
            None => field.marshal_text(),
        })
        .map_err(|e| e.in_namespace(model.namespace()))
}

/// Create or update the entry for a language of the field declaring `tag`
///
/// Other languages are kept. Fields without alternatives are replaced.
pub fn set_locale_field(model: &mut dyn Model, tag: &str, lang: &str, value: &str) -> XmpResult<()> {
    let namespace = model.namespace();
    tagged_field_mut(model, tag)
        .and_then(|field| match field.as_alt_mut() {
            Some(alt) => {
                alt.set(lang, value);
                Ok(())
            }
            None => field.unmarshal_text(value),
        })
        .map_err(|e| e.in_namespace(namespace))
}
