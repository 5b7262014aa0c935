//! JSON codec for the whole document
//!
//! The on-disk shape is:
//!
//! ```text
//! {
//!   "pages": [ { "id", "title", "elements": [ { "type": "text" | "link", ... } ], "is_new" } ],
//!   "start_page_id": "..."
//! }
//! ```
//!
//! Unknown keys are ignored and `is_new` defaults to `false` when absent.

use crate::models::Document;

use super::error::{StorageError, StorageResult};

/// Encode a document, optionally pretty-printed
pub fn encode(doc: &Document, pretty: bool) -> StorageResult<String> {
    let encoded = if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    encoded.map_err(StorageError::Encode)
}

/// Decode a document
///
/// Empty or whitespace-only content is an error like any other malformed
/// input; deciding what to do about it is up to the caller.
pub fn decode(content: &str) -> StorageResult<Document> {
    if content.trim().is_empty() {
        return Err(StorageError::InvalidFormat {
            details: "content is empty".to_string(),
        });
    }

    serde_json::from_str(content).map_err(|e| StorageError::InvalidFormat {
        details: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Element, LinkElement, Page, TextElement};
    use serde_json::json;

    fn sample_document() -> Document {
        let target = Page::new("2", "Target");

        let mut text = TextElement::new("hello");
        text.id = "e1".to_string();

        let mut bound = LinkElement::bound_to("to target", &target);
        bound.id = "e2".to_string();

        let mut unbound = LinkElement::new("nowhere");
        unbound.id = "e3".to_string();
        unbound.is_new = true;

        let mut home = Page::new("1", "Home");
        home.elements = vec![text.into(), bound.into(), unbound.into()];

        Document {
            pages: vec![home, target],
            start_page_id: "1".to_string(),
        }
    }

    #[test]
    fn test_empty_document_round_trip() {
        let doc = Document::empty();
        let decoded = decode(&encode(&doc, false).unwrap()).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_document_round_trip() {
        let doc = sample_document();

        for pretty in [false, true] {
            let decoded = decode(&encode(&doc, pretty).unwrap()).unwrap();
            assert_eq!(decoded, doc);
        }
    }

    #[test]
    fn test_encoded_field_names() {
        let value: serde_json::Value =
            serde_json::from_str(&encode(&sample_document(), false).unwrap()).unwrap();

        assert_eq!(value["start_page_id"], "1");
        assert_eq!(value["pages"][0]["elements"][0]["type"], "text");
        assert_eq!(value["pages"][0]["elements"][1]["type"], "link");
        assert_eq!(
            value["pages"][0]["elements"][1]["related_page"],
            json!({"id": "2", "title": "Target"})
        );
        assert!(value["pages"][0]["elements"][2]["related_page"].is_null());
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let content = json!({
            "pages": [{
                "id": "1",
                "title": "A",
                "elements": [{"type": "text", "id": "x", "text": "t", "color": "red"}],
                "icon": "star"
            }],
            "start_page_id": "1",
            "schema_version": 3
        })
        .to_string();

        let doc = decode(&content).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].elements[0].text(), Some("t"));
        assert!(!doc.pages[0].elements[0].is_new());
    }

    #[test]
    fn test_decode_keeps_unknown_element_kinds() {
        let content = json!({
            "pages": [{
                "id": "1",
                "title": "A",
                "elements": [
                    {"type": "text", "id": "a", "text": "t"},
                    {"type": "checklist", "id": "b", "items": ["milk"]}
                ]
            }],
            "start_page_id": ""
        })
        .to_string();

        let doc = decode(&content).unwrap();
        let elements = &doc.pages[0].elements;
        assert!(matches!(elements[1], Element::Opaque(_)));
        assert_eq!(elements[1].id(), "b");

        let again = decode(&encode(&doc, false).unwrap()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(decode(""), Err(StorageError::InvalidFormat { .. })));
        assert!(matches!(decode("   \n"), Err(StorageError::InvalidFormat { .. })));
        assert!(matches!(decode("{not json"), Err(StorageError::InvalidFormat { .. })));
        // Missing required keys
        assert!(matches!(decode("{}"), Err(StorageError::InvalidFormat { .. })));
        assert!(matches!(
            decode(r#"{"pages": []}"#),
            Err(StorageError::InvalidFormat { .. })
        ));
    }
}
