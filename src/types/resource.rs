//! Structured resource types shared by media management properties

use crate::utils::datetime::XmpDate;
use crate::xmp_struct;

xmp_struct! {
    /// Reference to another resource (`stRef`), e.g. `xmpMM:DerivedFrom`
    pub struct ResourceRef("stRef") {
        pub instance_id: Option<String> => "instanceID",
        pub document_id: Option<String> => "documentID",
        pub original_document_id: Option<String> => "originalDocumentID",
        pub version_id: Option<String> => "versionID",
        pub rendition_class: Option<String> => "renditionClass",
        pub rendition_params: Option<String> => "renditionParams",
        pub manager: Option<String> => "manager",
        pub manager_variant: Option<String> => "managerVariant",
        pub manage_to: Option<String> => "manageTo",
        pub manage_ui: Option<String> => "manageUI",
        pub file_path: Option<String> => "filePath",
        pub from_part: Option<String> => "fromPart",
        pub to_part: Option<String> => "toPart",
        pub last_modify_date: Option<XmpDate> => "lastModifyDate",
    }
}

xmp_struct! {
    /// One step in a resource's history (`stEvt`), e.g. `xmpMM:History`
    pub struct ResourceEvent("stEvt") {
        pub action: Option<String> => "action",
        pub changed: Option<String> => "changed",
        pub instance_id: Option<String> => "instanceID",
        pub parameters: Option<String> => "parameters",
        pub software_agent: Option<String> => "softwareAgent",
        pub when: Option<XmpDate> => "when",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::{encode_struct, DecodeContext};
    use crate::core::field::{Element, Field, Navigable};
    use crate::core::namespace::Registry;
    use crate::core::node::XmlNode;
    use crate::core::options::DocumentOptions;
    use crate::core::xpath::Selector;
    use crate::types::Seq;

    fn event(action: &str) -> ResourceEvent {
        ResourceEvent {
            action: Some(action.to_string()),
            software_agent: Some("xmpmodel".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_struct_element_form() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let value = event("saved");
        let node = value.encode_element("rdf:li", false).unwrap();
        assert_eq!(node.attr("rdf:parseType"), Some("Resource"));
        assert_eq!(node.child("stEvt:action").map(|n| n.value.as_str()), Some("saved"));

        let decoded = ResourceEvent::decode_element(&node, &mut cx).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_struct_attribute_form() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let value = ResourceRef {
            document_id: Some("xmp.did:1".to_string()),
            instance_id: Some("xmp.iid:2".to_string()),
            ..Default::default()
        };
        let node = encode_struct(&value, "xmpMM:DerivedFrom", true).unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.attr("stRef:documentID"), Some("xmp.did:1"));
        assert_eq!(node.attr("rdf:parseType"), None);

        let decoded = ResourceRef::decode_element(&node, &mut cx).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_struct_in_description_form() {
        let registry = Registry::new();
        let mut cx = DecodeContext::new(&registry, DocumentOptions::default());
        let mut inner = XmlNode::new("rdf:Description");
        inner.set_attr("stEvt:action", "created");
        let mut li = XmlNode::new("rdf:li");
        li.push(inner);

        let decoded = ResourceEvent::decode_element(&li, &mut cx).unwrap();
        assert_eq!(decoded.action.as_deref(), Some("created"));
    }

    #[test]
    fn test_navigate_history() {
        let mut history: Seq<ResourceEvent> = Seq::new();
        history.push(event("created"));
        let nav = history.child(&Selector::Index(0)).unwrap();
        let field = nav.lookup("stEvt", "action").unwrap().unwrap();
        assert_eq!(field.get(&Selector::None).unwrap().as_deref(), Some("created"));

        let registry = Registry::new();
        let nav = history.child_mut(&Selector::Index(1), true).unwrap();
        let field = nav.lookup_mut(&registry, "stEvt", "action", true).unwrap().unwrap();
        field.set(&Selector::None, "saved").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).and_then(|e| e.action.as_deref()), Some("saved"));
    }
}
