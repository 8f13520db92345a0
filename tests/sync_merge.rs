//! Synchronization, merging and filtering of documents

use pretty_assertions::assert_eq;
use xmpmodel::core::{get_native_field, set_native_field};
use xmpmodel::models::{DublinCore, DynamicMedia, ExifInfo, Id3, PdfInfo, XmpBase, XmpRights};
use xmpmodel::{AltString, Document, Filter, NamespaceGroup, PathValue, SetFlags, XmpError};

fn doc_with(values: &[(&str, &str)]) -> Document {
    let mut doc = Document::new();
    for (path, value) in values {
        doc.set_path(&PathValue::new(*path, *value)).unwrap();
    }
    doc
}

mod sync {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn native_write_then_sync() {
        let mut doc = Document::new();
        let id3 = doc.make_model("id3").unwrap();
        set_native_field(id3, "TT2", "Song").unwrap();
        set_native_field(id3, "TPE1", "Ann/Bob").unwrap();
        set_native_field(id3, "TALB", "Blue").unwrap();
        assert_eq!(get_native_field(id3, "TIT2").unwrap(), "Song");
        doc.make::<DynamicMedia>().unwrap();

        // native writes do not propagate by themselves
        assert!(doc.find::<DublinCore>().is_none());

        let report = doc.sync();
        assert!(report.is_ok());
        assert!(!doc.is_dirty());
        assert_eq!(doc.get_path("dc:title").unwrap(), "Song");
        assert_eq!(doc.get_path("dc:creator[1]").unwrap(), "Bob");
        assert_eq!(doc.get_path("xmpDM:album").unwrap(), "Blue");
    }

    #[test]
    fn explicit_values_are_not_overwritten() {
        let mut doc = doc_with(&[("dc:title", "Chosen title"), ("pdf:Producer", "lib")]);
        doc.make::<PdfInfo>().unwrap().title = Some("Info title".to_string());
        doc.sync();
        assert_eq!(doc.get_path("dc:title").unwrap(), "Chosen title");
        assert_eq!(doc.find::<PdfInfo>().unwrap().title.as_deref(), Some("Info title"));
    }

    #[test]
    fn sync_converges() {
        let mut doc = doc_with(&[
            ("dc:creator", "Ada"),
            ("dc:rights", "CC-BY"),
            ("xmp:CreateDate", "2020-02-02"),
        ]);
        doc.make::<ExifInfo>().unwrap();
        doc.make::<PdfInfo>().unwrap();
        doc.make::<XmpRights>().unwrap();
        doc.sync();
        let once = doc.clone();
        doc.mark_dirty();
        doc.sync();
        assert_eq!(doc, once);

        let exif = doc.find::<ExifInfo>().unwrap();
        assert_eq!(exif.artist.as_deref(), Some("Ada"));
        assert_eq!(exif.copyright.default_value(), Some("CC-BY"));
        assert!(doc.get_path("pdf:Producer").unwrap_err().is_not_found());
        assert_eq!(get_native_field(doc.find_model("pdf").unwrap(), "Author").unwrap(), "Ada");
        assert_eq!(doc.find::<XmpRights>().unwrap().usage_terms, AltString::from_default("CC-BY"));
    }

    #[test]
    fn failing_hook_is_reported_and_others_still_run() {
        let mut doc = Document::new();
        doc.make::<Id3>().unwrap().track = Some("side A".to_string());
        doc.make::<Id3>().unwrap().title = Some("Song".to_string());
        doc.make::<DynamicMedia>().unwrap();
        doc.make::<XmpBase>().unwrap();

        let report = doc.sync();
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].namespace(), Some("xmpDM"));
        assert_eq!(doc.get_path("dc:title").unwrap(), "Song");
    }
}

mod merge {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source() -> Document {
        doc_with(&[
            ("dc:title[en]", "Source title"),
            ("dc:subject", "lake"),
            ("dc:format", "image/jpeg"),
            ("xmp:Label", "green"),
        ])
    }

    #[test]
    fn merge_is_idempotent() {
        let mut host = doc_with(&[("dc:format", "image/png"), ("dc:creator", "Ada")]);
        host.merge(&source(), SetFlags::MERGE).unwrap();
        let once = host.clone();
        host.merge(&source(), SetFlags::MERGE).unwrap();
        assert_eq!(host, once);

        assert_eq!(host.get_path("dc:format").unwrap(), "image/jpeg");
        assert_eq!(host.get_path("dc:creator[0]").unwrap(), "Ada");
        assert_eq!(host.get_path("dc:title[en]").unwrap(), "Source title");
        assert_eq!(host.get_path("xmp:Label").unwrap(), "green");
    }

    #[test]
    fn create_only_adds_missing_values() {
        let mut host = doc_with(&[("dc:format", "image/png")]);
        host.merge(&source(), SetFlags::CREATE).unwrap();
        assert_eq!(host.get_path("dc:format").unwrap(), "image/png");
        assert_eq!(host.get_path("dc:subject[0]").unwrap(), "lake");
        assert_eq!(host.get_path("xmp:Label").unwrap(), "green");
    }

    #[test]
    fn replace_only_overwrites_existing_values() {
        let mut host = doc_with(&[("dc:format", "image/png")]);
        host.merge(&source(), SetFlags::REPLACE).unwrap();
        assert_eq!(host.get_path("dc:format").unwrap(), "image/jpeg");
        assert!(host.get_path("dc:subject[0]").unwrap_err().is_not_found());
        assert!(host.find_model("xmp").is_none());
    }

    #[test]
    fn unsupported_modes() {
        let mut host = Document::new();
        let err = host.merge(&source(), SetFlags::APPEND).unwrap_err();
        assert!(matches!(err, XmpError::BadParam(_)));
        assert!(host.merge(&source(), SetFlags::DELETE).is_err());
    }
}

mod filter {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mixed() -> Document {
        let mut doc = doc_with(&[("dc:format", "image/jpeg"), ("xmpDM:album", "Blue")]);
        doc.make::<ExifInfo>().unwrap().make = Some("Acme".to_string());
        doc.make::<PdfInfo>().unwrap().producer = Some("lib".to_string());
        doc
    }

    fn prefixes(doc: &Document) -> Vec<&'static str> {
        doc.models().prefixes()
    }

    #[test]
    fn include_groups_and_prefixes() {
        let mut doc = mixed();
        let removed = doc.filter(&"+dc,image".parse::<Filter>().unwrap());
        assert_eq!(removed, 2);
        assert_eq!(prefixes(&doc), vec!["dc", "exif"]);
    }

    #[test]
    fn exclude_only() {
        let mut doc = mixed();
        doc.filter(&Filter::default().exclude("pdf").exclude("xmpDM"));
        assert_eq!(prefixes(&doc), vec!["dc", "exif"]);
    }

    #[test]
    fn exclusion_wins_over_group() {
        let mut doc = mixed();
        doc.filter(&Filter::default().group(NamespaceGroup::Sound).exclude("xmpDM"));
        assert!(doc.models().is_empty());
    }

    #[test]
    fn unknown_group() {
        assert!(matches!(
            "+dc,pictures".parse::<Filter>().unwrap_err(),
            XmpError::BadParam(_)
        ));
    }
}
