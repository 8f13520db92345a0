//! XMP Rights Management (`xmpRights`)

use crate::core::document::ModelSet;
use crate::core::error::XmpResult;
use crate::core::model::Model;
use crate::models::DublinCore;
use crate::types::{AltString, StringArray};
use crate::xmp_model;

xmp_model! {
    /// Rights management properties
    pub struct XmpRights("xmpRights") {
        pub certificate: Option<String> => "Certificate",
        pub marked: Option<bool> => "Marked",
        pub owner: StringArray => "Owner",
        pub usage_terms: AltString => "UsageTerms",
        pub web_statement: Option<String> => "WebStatement,omitempty",
    }
}

impl Model for XmpRights {
    fn sync_models(&mut self, models: &ModelSet) -> XmpResult<()> {
        if let Some(dc) = models.find_as::<DublinCore>() {
            if self.usage_terms.is_empty() {
                self.usage_terms = dc.rights.clone();
            }
        }
        Ok(())
    }
}
