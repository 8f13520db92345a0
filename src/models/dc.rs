//! Dublin Core (`dc`)

use crate::core::model::Model;
use crate::types::{AltString, Seq, StringArray, StringList};
use crate::utils::datetime::XmpDate;
use crate::xmp_model;

xmp_model! {
    /// Dublin Core properties
    pub struct DublinCore("dc") {
        pub contributor: StringArray => "contributor",
        pub coverage: Option<String> => "coverage",
        pub creator: StringList => "creator",
        pub date: Seq<XmpDate> => "date",
        pub description: AltString => "description",
        pub format: Option<String> => "format",
        pub identifier: Option<String> => "identifier",
        pub language: StringArray => "language",
        pub publisher: StringArray => "publisher",
        pub relation: StringArray => "relation",
        pub rights: AltString => "rights",
        pub source: Option<String> => "source",
        pub subject: StringArray => "subject",
        pub title: AltString => "title",
        pub type_: StringArray => "type",
    }
}

impl Model for DublinCore {}

impl DublinCore {
    /// Add a creator unless already listed
    pub fn add_creator(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && !self.creator.iter().any(|c| c == name) {
            self.creator.push(name.to_string());
        }
    }

    /// Add a keyword unless already listed
    pub fn add_subject(&mut self, keyword: &str) {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !self.subject.iter().any(|s| s == keyword) {
            self.subject.push(keyword.to_string());
        }
    }
}
