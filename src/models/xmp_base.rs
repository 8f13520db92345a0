//! XMP Basic (`xmp`)

use crate::core::model::Model;
use crate::types::StringArray;
use crate::utils::datetime::XmpDate;
use crate::xmp_model;

xmp_model! {
    /// XMP Basic properties
    pub struct XmpBase("xmp") {
        pub base_url: Option<String> => "BaseURL",
        pub create_date: Option<XmpDate> => "CreateDate",
        pub creator_tool: Option<String> => "CreatorTool",
        pub identifier: StringArray => "Identifier",
        pub label: Option<String> => "Label,omitempty",
        pub metadata_date: Option<XmpDate> => "MetadataDate",
        pub modify_date: Option<XmpDate> => "ModifyDate",
        pub nickname: Option<String> => "Nickname",
        pub rating: Option<f64> => "Rating",
    }
}

impl Model for XmpBase {}
