//! Path addressed reads and writes on documents

use pretty_assertions::assert_eq;
use xmpmodel::models::{DublinCore, ExifInfo, MediaManagement};
use xmpmodel::{AltString, Document, PathValue, SetFlags, XmpError};

fn set(doc: &mut Document, path: &str, value: &str, flags: SetFlags) -> Result<(), XmpError> {
    doc.set_path(&PathValue::new(path, value).with_flags(flags))
}

fn creators(doc: &Document) -> Vec<String> {
    doc.find::<DublinCore>()
        .map(|dc| dc.creator.items().to_vec())
        .unwrap_or_default()
}

mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_then_append() {
        let mut doc = Document::new();
        set(&mut doc, "dc:type", "one", SetFlags::CREATE).unwrap();
        set(&mut doc, "dc:type", "two", SetFlags::APPEND).unwrap();
        assert_eq!(doc.get_path("dc:type[1]").unwrap(), "two");
        assert_eq!(doc.get_path("dc:type[0]").unwrap(), "one");
        assert!(doc.is_dirty());
    }

    #[test]
    fn alternative_languages() {
        let mut doc = Document::new();
        let dc = doc.make::<DublinCore>().unwrap();
        dc.description.set("en", "english");
        dc.description.set("de", "german");

        assert_eq!(doc.get_path("dc:description[de]").unwrap(), "german");
        assert_eq!(doc.get_path("dc:description").unwrap(), "english");
        assert!(doc.get_path("dc:description[fr]").unwrap_err().is_not_found());
    }

    #[test]
    fn delete_from_sequence_shifts_indices() {
        let mut doc = Document::new();
        for name in ["one", "two", "three"] {
            set(&mut doc, "dc:creator", name, SetFlags::APPEND).unwrap();
        }
        doc.set_path(&PathValue::delete("dc:creator[1]")).unwrap();
        assert_eq!(creators(&doc), vec!["one", "three"]);
        assert_eq!(doc.get_path("dc:creator[1]").unwrap(), "three");
    }

    #[test]
    fn nested_pantry_value() {
        let mut doc = Document::new();
        set(&mut doc, "xmpMM:Pantry[0]/dc:format", "y", SetFlags::CREATE).unwrap();
        assert_eq!(doc.get_path("xmpMM:Pantry[0]/dc:format").unwrap(), "y");

        let mm = doc.find::<MediaManagement>().unwrap();
        assert_eq!(mm.pantry.len(), 1);
        assert!(doc.find::<DublinCore>().is_none());
    }
}

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_write_is_idempotent() {
        let mut once = Document::new();
        set(&mut once, "dc:format", "image/png", SetFlags::MERGE).unwrap();
        set(&mut once, "dc:title[en]", "Title", SetFlags::MERGE).unwrap();

        let mut twice = once.clone();
        set(&mut twice, "dc:format", "image/png", SetFlags::MERGE).unwrap();
        set(&mut twice, "dc:title[en]", "Title", SetFlags::MERGE).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn alternative_default_matches_empty_selector() {
        let mut doc = Document::new();
        set(&mut doc, "dc:rights[fr]", "droits", SetFlags::MERGE).unwrap();
        set(&mut doc, "dc:rights[en]", "rights", SetFlags::MERGE).unwrap();
        set(&mut doc, "dc:rights[x-default]", "default rights", SetFlags::MERGE).unwrap();

        let plain = doc.get_path("dc:rights").unwrap();
        assert_eq!(plain, doc.get_path("dc:rights[]").unwrap());
        let dc = doc.find::<DublinCore>().unwrap();
        assert_eq!(Some(plain.as_str()), dc.rights.default_value());
    }

    #[test]
    fn delete_then_get() {
        let mut doc = Document::new();
        set(&mut doc, "dc:format", "image/png", SetFlags::CREATE).unwrap();
        set(&mut doc, "dc:subject", "a", SetFlags::APPEND).unwrap();

        doc.set_path(&PathValue::delete("dc:format")).unwrap();
        assert!(doc.get_path("dc:format").unwrap_err().is_not_found());
        doc.set_path(&PathValue::delete("dc:subject[0]")).unwrap();
        assert!(doc.get_path("dc:subject[0]").unwrap_err().is_not_found());

        // deleting something that is not there succeeds
        doc.set_path(&PathValue::delete("dc:format")).unwrap();
        doc.set_path(&PathValue::delete("xmp:Label")).unwrap();
        doc.set_path(&PathValue::delete("xmpMM:Pantry[3]/dc:format")).unwrap();
        assert!(doc.find_model("xmp").is_none());
    }

    #[test]
    fn append_unique() {
        let mut doc = Document::new();
        set(&mut doc, "dc:subject", "lake", SetFlags::APPEND).unwrap();
        set(&mut doc, "dc:subject", "lake", SetFlags::APPEND | SetFlags::UNIQUE).unwrap();
        assert_eq!(doc.find::<DublinCore>().unwrap().subject.len(), 1);
        set(&mut doc, "dc:subject", "lake", SetFlags::APPEND).unwrap();
        assert_eq!(doc.find::<DublinCore>().unwrap().subject.len(), 2);

        set(&mut doc, "dc:title[en]", "Lake", SetFlags::APPEND).unwrap();
        set(&mut doc, "dc:title[en]", "Lake", SetFlags::APPEND | SetFlags::UNIQUE).unwrap();
        assert_eq!(doc.find::<DublinCore>().unwrap().title.len(), 1);
    }
}

mod flags {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_conflicts_with_existing_value() {
        let mut doc = Document::new();
        set(&mut doc, "dc:format", "a", SetFlags::CREATE).unwrap();
        let err = set(&mut doc, "dc:format", "b", SetFlags::CREATE).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.namespace(), Some("dc"));
        assert_eq!(doc.get_path("dc:format").unwrap(), "a");
    }

    #[test]
    fn replace_requires_existing_value() {
        let mut doc = Document::new();
        assert!(set(&mut doc, "dc:format", "a", SetFlags::REPLACE)
            .unwrap_err()
            .is_conflict());
        assert!(doc.find_model("dc").is_none());

        doc.make::<DublinCore>().unwrap();
        assert!(set(&mut doc, "dc:format", "a", SetFlags::REPLACE)
            .unwrap_err()
            .is_conflict());
        set(&mut doc, "dc:format", "a", SetFlags::CREATE).unwrap();
        set(&mut doc, "dc:format", "b", SetFlags::REPLACE).unwrap();
        assert_eq!(doc.get_path("dc:format").unwrap(), "b");
    }

    #[test]
    fn whole_field_replace_truncates() {
        let mut doc = Document::new();
        for name in ["a", "b", "c"] {
            set(&mut doc, "dc:creator", name, SetFlags::APPEND).unwrap();
        }
        set(&mut doc, "dc:creator[1]", "B", SetFlags::REPLACE).unwrap();
        assert_eq!(creators(&doc), vec!["a", "B", "c"]);
        set(&mut doc, "dc:creator", "only", SetFlags::REPLACE).unwrap();
        assert_eq!(creators(&doc), vec!["only"]);
    }

    #[test]
    fn delete_whole_namespace() {
        let mut doc = Document::new();
        set(&mut doc, "dc:format", "a", SetFlags::CREATE).unwrap();
        set(&mut doc, "xmp:Label", "red", SetFlags::CREATE).unwrap();
        doc.set_path(&PathValue::delete("dc:")).unwrap();
        assert!(doc.find_model("dc").is_none());
        assert_eq!(doc.get_path("xmp:Label").unwrap(), "red");
        assert!(set(&mut doc, "xmp:", "", SetFlags::CREATE).is_err());
    }

    #[test]
    fn nested_container_needs_create() {
        let mut doc = Document::new();
        let err = set(&mut doc, "xmpMM:Pantry[0]/dc:format", "y", SetFlags::REPLACE).unwrap_err();
        assert!(err.is_conflict());
        assert!(doc.find_model("xmpMM").is_none());
        set(&mut doc, "xmpMM:Pantry[0]/dc:format", "y", SetFlags::CREATE).unwrap();
        set(&mut doc, "xmpMM:Pantry[0]/dc:format", "z", SetFlags::MERGE).unwrap();
        set(&mut doc, "xmpMM:Pantry[1]/xmpMM:InstanceID", "uuid:2", SetFlags::CREATE).unwrap();
        assert_eq!(doc.get_path("xmpMM:Pantry[0]/dc:format").unwrap(), "z");

        let mm = doc.find::<MediaManagement>().unwrap();
        assert!(mm.pantry_entry("uuid:2").is_some());
        assert!(mm.pantry_entry("uuid:9").is_none());
    }

    #[test]
    fn failed_write_leaves_document_unchanged() {
        let mut doc = Document::new();
        let err = set(&mut doc, "xmpMM:History[0]/stEvt:bogus", "x", SetFlags::CREATE).unwrap_err();
        assert!(err.is_not_found());
        assert!(doc.find_model("xmpMM").is_none());
        assert!(!doc.is_dirty());
        assert!(!doc.to_rdf().unwrap().contains("xmpMM"));

        assert!(set(&mut doc, "tiff:Orientation", "sideways", SetFlags::CREATE).is_err());
        assert!(doc.find_model("exif").is_none());

        set(&mut doc, "xmpMM:History[0]/stEvt:action", "created", SetFlags::CREATE).unwrap();
        set(&mut doc, "xmpMM:Pantry[0]/dc:format", "y", SetFlags::CREATE).unwrap();
        let before = doc.list_paths().unwrap();

        assert!(set(&mut doc, "xmpMM:History[1]/stEvt:bogus", "x", SetFlags::CREATE).is_err());
        assert!(set(&mut doc, "xmpMM:Pantry[0]/xmpMM:History[0]/stEvt:bogus", "x", SetFlags::CREATE)
            .is_err());
        assert!(set(&mut doc, "xmpMM:Pantry[1]/dc:bogus", "x", SetFlags::CREATE).is_err());

        assert_eq!(doc.list_paths().unwrap(), before);
        let mm = doc.find::<MediaManagement>().unwrap();
        assert_eq!(mm.history.len(), 1);
        assert_eq!(mm.pantry.len(), 1);
        let entry = mm.pantry.get(0).unwrap();
        assert!(entry.models().find("xmpMM").is_none());
    }

    #[test]
    fn structure_fields() {
        let mut doc = Document::new();
        set(&mut doc, "xmpMM:DerivedFrom/stRef:instanceID", "uuid:1", SetFlags::CREATE).unwrap();
        set(&mut doc, "xmpMM:History[0]/stEvt:action", "created", SetFlags::CREATE).unwrap();
        set(&mut doc, "xmpMM:History[1]/stEvt:action", "saved", SetFlags::CREATE).unwrap();
        assert_eq!(doc.get_path("xmpMM:DerivedFrom/stRef:instanceID").unwrap(), "uuid:1");
        assert_eq!(doc.get_path("xmpMM:History[1]/stEvt:action").unwrap(), "saved");
        assert!(doc
            .get_path("xmpMM:History[2]/stEvt:action")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn foreign_qualified_fields_need_their_owner() {
        let mut doc = Document::new();
        let value = PathValue::new("tiff:Artist", "Jane")
            .with_namespace("exif")
            .with_flags(SetFlags::CREATE);
        doc.set_path(&value).unwrap();
        assert_eq!(doc.find::<ExifInfo>().unwrap().artist.as_deref(), Some("Jane"));
        // once the owner is attached the field is found without a hint
        assert_eq!(doc.get_path("tiff:Artist").unwrap(), "Jane");
        set(&mut doc, "tiff:Make", "Acme", SetFlags::CREATE).unwrap();
        assert_eq!(doc.find::<ExifInfo>().unwrap().make.as_deref(), Some("Acme"));
    }

    #[test]
    fn bad_paths() {
        let mut doc = Document::new();
        assert!(matches!(
            set(&mut doc, "format", "x", SetFlags::CREATE).unwrap_err().root(),
            XmpError::BadXPath(_)
        ));
        assert!(doc.get_path("nope:field").unwrap_err().is_not_found());
        assert!(set(&mut doc, "nope:field", "x", SetFlags::CREATE).is_err());
        assert!(set(&mut doc, "dc:format[en]", "x", SetFlags::CREATE).is_err());
    }
}

mod listing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_and_replay() {
        let mut doc = Document::new();
        let dc = doc.make::<DublinCore>().unwrap();
        dc.title = AltString::from_default("Default");
        dc.title.set("de", "Deutsch");
        dc.add_creator("Ada");
        set(&mut doc, "xmpMM:History[0]/stEvt:action", "created", SetFlags::CREATE).unwrap();

        let list = doc.list_paths().unwrap();
        let paths: Vec<&str> = list.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "dc:creator[0]",
                "dc:title[x-default]",
                "dc:title[de]",
                "xmpMM:History[0]/stEvt:action",
            ]
        );
        assert_eq!(list.get("dc:title[de]").unwrap().namespace.as_deref(), Some("dc"));

        let mut copy = Document::new();
        copy.set_paths(&list).unwrap();
        assert_eq!(copy, doc);
    }

    #[test]
    fn diff_turns_one_document_into_another() {
        let mut before = Document::new();
        for name in ["a", "b", "c"] {
            set(&mut before, "dc:creator", name, SetFlags::APPEND).unwrap();
        }
        set(&mut before, "dc:format", "image/png", SetFlags::CREATE).unwrap();

        let mut after = Document::new();
        set(&mut after, "dc:creator", "a", SetFlags::APPEND).unwrap();
        set(&mut after, "dc:format", "image/jpeg", SetFlags::CREATE).unwrap();
        set(&mut after, "xmp:Label", "red", SetFlags::CREATE).unwrap();

        let changes = before
            .list_paths()
            .unwrap()
            .diff(&after.list_paths().unwrap());
        before.set_paths(&changes).unwrap();
        assert_eq!(before.list_paths().unwrap(), after.list_paths().unwrap());
    }
}
