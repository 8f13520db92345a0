//! Sharing documents and the registry across threads

use std::sync::{Arc, Mutex};
use std::thread;
use xmpmodel::{Document, PathValue, Registry, SetFlags};

const XML: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:xmp="http://ns.adobe.com/xap/1.0/"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about=""
                   xmp:CreatorTool="TestApp"
                   dc:format="image/png"/>
</rdf:RDF>
<?xpacket end="w"?>"#;

#[test]
fn concurrent_reads() {
    let doc = Arc::new(Document::parse(XML).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let doc = Arc::clone(&doc);
            thread::spawn(move || {
                if i % 2 == 0 {
                    assert_eq!(doc.get_path("xmp:CreatorTool").unwrap(), "TestApp");
                } else {
                    assert_eq!(doc.get_path("dc:format").unwrap(), "image/png");
                }
                doc.list_paths().unwrap().len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}

#[test]
fn global_registry_is_initialised_once() {
    let registries: Vec<Arc<Registry>> = (0..8)
        .map(|_| thread::spawn(Registry::global))
        .map(|handle| handle.join().unwrap())
        .collect();
    for registry in &registries[1..] {
        assert!(Arc::ptr_eq(registry, &registries[0]));
    }
}

#[test]
fn writers_behind_a_mutex() {
    let doc = Arc::new(Mutex::new(Document::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let doc = Arc::clone(&doc);
            thread::spawn(move || {
                let value = PathValue::new("dc:subject", format!("tag{}", i % 4))
                    .with_flags(SetFlags::APPEND | SetFlags::UNIQUE);
                doc.lock().unwrap().set_path(&value).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let doc = doc.lock().unwrap();
    assert_eq!(doc.list_paths().unwrap().len(), 4);
}
