//! XMP Media Management (`xmpMM`)

use crate::core::document::Extension;
use crate::core::model::Model;
use crate::types::{Bag, ResourceEvent, ResourceRef, Seq};
use crate::xmp_model;

xmp_model! {
    /// Media management properties: identifiers, lineage and pantry
    pub struct MediaManagement("xmpMM") {
        pub document_id: Option<String> => "DocumentID",
        pub instance_id: Option<String> => "InstanceID",
        pub original_document_id: Option<String> => "OriginalDocumentID",
        pub version_id: Option<String> => "VersionID",
        pub rendition_class: Option<String> => "RenditionClass",
        pub rendition_params: Option<String> => "RenditionParams",
        pub derived_from: Option<ResourceRef> => "DerivedFrom,attr",
        pub managed_from: Option<ResourceRef> => "ManagedFrom",
        pub manager: Option<String> => "Manager",
        pub manage_to: Option<String> => "ManageTo",
        pub manage_ui: Option<String> => "ManageUI",
        pub history: Seq<ResourceEvent> => "History",
        pub ingredients: Bag<ResourceRef> => "Ingredients",
        pub pantry: Bag<Extension> => "Pantry",
    }
}

impl Model for MediaManagement {}

impl MediaManagement {
    /// Record a history step
    pub fn add_history(&mut self, event: ResourceEvent) {
        self.history.push(event);
    }

    /// Pantry entry describing the resource with the given instance id
    pub fn pantry_entry(&self, instance_id: &str) -> Option<&Extension> {
        self.pantry.iter().find(|entry| {
            entry
                .models()
                .find_as::<MediaManagement>()
                .and_then(|mm| mm.instance_id.as_deref())
                == Some(instance_id)
        })
    }
}
