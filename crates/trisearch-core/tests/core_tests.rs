use std::fs;
use tempfile::TempDir;

use trisearch_core::catalog;
use trisearch_core::response::{require_str, result_from_fields};
use trisearch_core::types::{EmbeddedProgram, IndexedDocument, Program};
use trisearch_core::Error;

fn sample_program() -> Program {
    Program {
        title: "Computer Science BS".to_string(),
        short_description: "<p>Study computing.</p>".to_string(),
        long_description: "A rigorous program covering algorithms and systems.".to_string(),
        image_url: "https://cdn.example.edu/cs.jpg".to_string(),
        detail_path: "/degree-programs/computer-science-bs".to_string(),
    }
}

#[test]
fn catalog_parses_camel_case_field_names() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("programs.json");
    fs::write(
        &path,
        r#"[{
            "title": "Computer Science BS",
            "shortDescription": "<p>Study computing.</p>",
            "longDescription": "A rigorous program.",
            "degreeImage": "https://cdn.example.edu/cs.jpg",
            "detailPage": "/degree-programs/computer-science-bs"
        }]"#,
    )
    .unwrap();

    let programs = catalog::load_programs(&path).expect("load");
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0].title, "Computer Science BS");
    assert_eq!(programs[0].detail_path, "/degree-programs/computer-science-bs");
}

#[test]
fn embeddings_artifact_round_trips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("programs_with_embeddings.json");
    let embedded = vec![EmbeddedProgram { program: sample_program(), embedding: vec![0.25; 4] }];

    catalog::save_embedded(&path, &embedded).expect("save");
    let loaded = catalog::load_embedded(&path).expect("load");

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].program.title, "Computer Science BS");
    assert_eq!(loaded[0].embedding, vec![0.25; 4]);

    // The flattened artifact keeps the catalog's own field names.
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw[0].get("shortDescription").is_some());
    assert!(raw[0].get("embedding").is_some());
}

#[test]
fn indexed_documents_get_fresh_ids_per_run() {
    let embedded = EmbeddedProgram { program: sample_program(), embedding: vec![0.0; 4] };
    let a = IndexedDocument::with_random_id(embedded.clone());
    let b = IndexedDocument::with_random_id(embedded);

    assert_ne!(a.id, b.id, "ids are random per run, not derived from the record");
    assert_eq!(a.id.len(), 32, "hyphenless uuid hex");
    assert!(a.id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn result_from_fields_populates_all_five_fields() {
    let fields = serde_json::json!({
        "title": "Computer Science BS",
        "shortDescription": "<p>Study computing.</p>",
        "description": "A rigorous program.",
        "image": "https://cdn.example.edu/cs.jpg",
        "url": "/degree-programs/computer-science-bs"
    });
    let fields = fields.as_object().unwrap();

    let result = result_from_fields("qdrant", fields, 0.87).expect("map");
    assert_eq!(result.title, "Computer Science BS");
    assert_eq!(result.url, "/degree-programs/computer-science-bs");
    assert_eq!(result.score, 0.87);
}

#[test]
fn missing_field_is_a_malformed_response() {
    let fields = serde_json::json!({
        "title": "Computer Science BS",
        "shortDescription": "x",
        "description": "y",
        "image": "z"
        // no "url"
    });
    let fields = fields.as_object().unwrap();

    let err = result_from_fields("elasticsearch", fields, 1.0).unwrap_err();
    match err {
        Error::MalformedResponse { backend, field } => {
            assert_eq!(backend, "elasticsearch");
            assert_eq!(field, "url");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[test]
fn non_string_field_is_a_malformed_response() {
    let fields = serde_json::json!({ "title": 42 });
    let fields = fields.as_object().unwrap();

    let err = require_str("typesense", fields, "title").unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { field: "title", .. }));
}
