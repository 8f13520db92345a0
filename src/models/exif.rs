//! EXIF (`exif`, `exifEX`, `aux`)
//!
//! [`ExifInfo`] also carries the TIFF image-file-directory entries as
//! `tiff:` qualified fields, so an EXIF block read from an image fills one
//! model. Native tags are EXIF tag ids written `0x` plus four lowercase hex
//! digits.

use crate::core::document::ModelSet;
use crate::core::error::XmpResult;
use crate::core::model::Model;
use crate::models::{DublinCore, XmpBase};
use crate::types::{AltString, RawNodes, Rational, Seq};
use crate::utils::datetime::XmpDate;
use crate::xmp_model;
use std::borrow::Cow;

xmp_model! {
    /// EXIF and TIFF image properties
    pub struct ExifInfo("exif") {
        pub exif_version: Option<String> => "ExifVersion" tag "0x9000",
        pub date_time_original: Option<XmpDate> => "DateTimeOriginal" tag "0x9003",
        pub date_time_digitized: Option<XmpDate> => "DateTimeDigitized" tag "0x9004",
        pub exposure_time: Option<Rational> => "ExposureTime" tag "0x829a",
        pub f_number: Option<Rational> => "FNumber" tag "0x829d",
        pub iso_speed_ratings: Seq<u32> => "ISOSpeedRatings" tag "0x8827",
        pub focal_length: Option<Rational> => "FocalLength" tag "0x920a",
        pub pixel_x_dimension: Option<u32> => "PixelXDimension" tag "0xa002",
        pub pixel_y_dimension: Option<u32> => "PixelYDimension" tag "0xa003",
        pub user_comment: AltString => "UserComment" tag "0x9286",
        pub artist: Option<String> => "tiff:Artist" tag "0x013b",
        pub image_description: AltString => "tiff:ImageDescription" tag "0x010e",
        pub copyright: AltString => "tiff:Copyright" tag "0x8298",
        pub make: Option<String> => "tiff:Make" tag "0x010f",
        pub model: Option<String> => "tiff:Model" tag "0x0110",
        pub orientation: Option<u16> => "tiff:Orientation" tag "0x0112",
        pub software: Option<String> => "tiff:Software" tag "0x0131",
        pub date_time: Option<XmpDate> => "tiff:DateTime" tag "0x0132",
        pub extension: RawNodes => "extension,any",
    }
}

impl Model for ExifInfo {
    fn map_native_tag<'t>(&self, tag: &'t str) -> Cow<'t, str> {
        if tag.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(tag.to_ascii_lowercase())
        } else {
            Cow::Borrowed(tag)
        }
    }

    fn sync_models(&mut self, models: &ModelSet) -> XmpResult<()> {
        if let Some(dc) = models.find_as::<DublinCore>() {
            if self.artist.is_none() && !dc.creator.is_empty() {
                let names: Vec<&str> = dc.creator.iter().map(String::as_str).collect();
                self.artist = Some(names.join("; "));
            }
            if self.image_description.is_empty() {
                self.image_description = dc.description.clone();
            }
            if self.copyright.is_empty() {
                self.copyright = dc.rights.clone();
            }
        }
        if let Some(xmp) = models.find_as::<XmpBase>() {
            if self.date_time_original.is_none() {
                self.date_time_original = xmp.create_date;
            }
        }
        Ok(())
    }

    fn sync_to_xmp(&self, models: &mut ModelSet) -> XmpResult<()> {
        let has_dc = self.artist.is_some()
            || !self.image_description.is_empty()
            || !self.copyright.is_empty();
        if has_dc {
            let dc = models.make_as::<DublinCore>()?;
            if dc.creator.is_empty() {
                for name in self.artist.as_deref().unwrap_or_default().split(';') {
                    dc.add_creator(name);
                }
            }
            if dc.description.is_empty() {
                dc.description = self.image_description.clone();
            }
            if dc.rights.is_empty() {
                dc.rights = self.copyright.clone();
            }
        }
        if let Some(date) = self.date_time_original {
            let xmp = models.make_as::<XmpBase>()?;
            if xmp.create_date.is_none() {
                xmp.create_date = Some(date);
            }
        }
        Ok(())
    }
}

xmp_model! {
    /// EXIF 2.3 additions
    pub struct ExifEx("exifEX") {
        pub camera_owner_name: Option<String> => "CameraOwnerName" tag "0xa430",
        pub body_serial_number: Option<String> => "BodySerialNumber" tag "0xa431",
        pub lens_specification: Seq<Rational> => "LensSpecification" tag "0xa432",
        pub lens_make: Option<String> => "LensMake" tag "0xa433",
        pub lens_model: Option<String> => "LensModel" tag "0xa434",
        pub lens_serial_number: Option<String> => "LensSerialNumber" tag "0xa435",
        pub gamma: Option<Rational> => "Gamma" tag "0xa500",
    }
}

impl Model for ExifEx {
    fn map_native_tag<'t>(&self, tag: &'t str) -> Cow<'t, str> {
        Cow::Owned(tag.to_ascii_lowercase())
    }

    fn sync_models(&mut self, models: &ModelSet) -> XmpResult<()> {
        let Some(aux) = models.find_as::<ExifAux>() else {
            return Ok(());
        };
        for (slot, value) in [
            (&mut self.camera_owner_name, &aux.owner_name),
            (&mut self.body_serial_number, &aux.serial_number),
            (&mut self.lens_model, &aux.lens),
            (&mut self.lens_serial_number, &aux.lens_serial_number),
        ] {
            if slot.is_none() {
                slot.clone_from(value);
            }
        }
        if self.lens_specification.is_empty() {
            if let Some(info) = aux.lens_info.as_deref() {
                self.lens_specification = info
                    .split_whitespace()
                    .filter_map(|part| part.parse().ok())
                    .collect();
            }
        }
        Ok(())
    }
}

xmp_model! {
    /// Adobe auxiliary camera properties
    pub struct ExifAux("aux") {
        pub lens: Option<String> => "Lens",
        pub lens_id: Option<u32> => "LensID",
        pub lens_info: Option<String> => "LensInfo",
        pub lens_serial_number: Option<String> => "LensSerialNumber",
        pub serial_number: Option<String> => "SerialNumber",
        pub owner_name: Option<String> => "OwnerName",
        pub firmware: Option<String> => "Firmware",
        pub flash_compensation: Option<Rational> => "FlashCompensation",
        pub image_number: Option<u32> => "ImageNumber",
    }
}

impl Model for ExifAux {}
