//! Adobe PDF (`pdf`)
//!
//! The document information dictionary duplicates Dublin Core and XMP Basic
//! entries. Those mirrors are declared `omit`: they are reachable through
//! their native dictionary keys and are written out through `dc` and `xmp`
//! by synchronization, never as `pdf:` properties.

use crate::core::document::ModelSet;
use crate::core::error::XmpResult;
use crate::core::model::Model;
use crate::models::{DublinCore, XmpBase};
use crate::utils::datetime::XmpDate;
use crate::xmp_model;

xmp_model! {
    /// PDF properties and info dictionary mirrors
    pub struct PdfInfo("pdf") {
        pub title: Option<String> => "Title,omit" tag "Title",
        pub author: Option<String> => "Author,omit" tag "Author",
        pub subject: Option<String> => "Subject,omit" tag "Subject",
        pub creator: Option<String> => "Creator,omit" tag "Creator",
        pub creation_date: Option<XmpDate> => "CreationDate,omit" tag "CreationDate",
        pub mod_date: Option<XmpDate> => "ModDate,omit" tag "ModDate",
        pub keywords: Option<String> => "Keywords" tag "Keywords",
        pub producer: Option<String> => "Producer" tag "Producer",
        pub pdf_version: Option<String> => "PDFVersion",
        pub trapped: Option<bool> => "Trapped" tag "Trapped",
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
    if slot.is_none() {
        *slot = value.cloned();
    }
}

impl PdfInfo {
    /// Keywords split on the dictionary's separators
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .unwrap_or_default()
            .split([',', ';'])
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}

impl Model for PdfInfo {
    fn sync_models(&mut self, models: &ModelSet) -> XmpResult<()> {
        if let Some(dc) = models.find_as::<DublinCore>() {
            if self.title.is_none() {
                self.title = dc.title.default_value().map(str::to_string);
            }
            if self.author.is_none() && !dc.creator.is_empty() {
                let names: Vec<&str> = dc.creator.iter().map(String::as_str).collect();
                self.author = Some(names.join(", "));
            }
            if self.subject.is_none() {
                self.subject = dc.description.default_value().map(str::to_string);
            }
            if self.keywords.is_none() && !dc.subject.is_empty() {
                let keywords: Vec<&str> = dc.subject.iter().map(String::as_str).collect();
                self.keywords = Some(keywords.join(", "));
            }
        }
        if let Some(xmp) = models.find_as::<XmpBase>() {
            fill(&mut self.creator, xmp.creator_tool.as_ref());
            fill(&mut self.creation_date, xmp.create_date.as_ref());
            fill(&mut self.mod_date, xmp.modify_date.as_ref());
        }
        Ok(())
    }

    fn sync_to_xmp(&self, models: &mut ModelSet) -> XmpResult<()> {
        let has_dc = self.title.is_some()
            || self.author.is_some()
            || self.subject.is_some()
            || self.keywords.is_some();
        if has_dc {
            let dc = models.make_as::<DublinCore>()?;
            if let Some(title) = &self.title {
                dc.title.fill_default(title);
            }
            if let Some(author) = &self.author {
                if dc.creator.is_empty() {
                    dc.add_creator(author);
                }
            }
            if let Some(subject) = &self.subject {
                dc.description.fill_default(subject);
            }
            if dc.subject.is_empty() {
                for keyword in self.keyword_list() {
                    dc.add_subject(keyword);
                }
            }
        }

        let has_xmp =
            self.creator.is_some() || self.creation_date.is_some() || self.mod_date.is_some();
        if has_xmp {
            let xmp = models.make_as::<XmpBase>()?;
            fill(&mut xmp.creator_tool, self.creator.as_ref());
            fill(&mut xmp.create_date, self.creation_date.as_ref());
            fill(&mut xmp.modify_date, self.mod_date.as_ref());
        }
        Ok(())
    }
}
