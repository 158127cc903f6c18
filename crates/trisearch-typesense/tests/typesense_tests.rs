use trisearch_core::Error;
use trisearch_typesense::{
    build_search_request, encode_vector_query, parse_search_response, MultiSearchResponse,
};

fn response_with_hits(hits: serde_json::Value) -> MultiSearchResponse {
    serde_json::from_value(serde_json::json!({ "results": [{ "found": 1, "hits": hits }] }))
        .expect("deserialize")
}

fn full_hit(title: &str, distance: f32) -> serde_json::Value {
    serde_json::json!({
        "document": {
            "id": "0b9c1d2e3f4a5b6c7d8e9f0a1b2c3d4e",
            "title": title,
            "shortDescription": "<p>short</p>",
            "description": "long description",
            "image": "https://cdn.example.edu/img.jpg",
            "url": "/degree-programs/x"
        },
        "vector_distance": distance
    })
}

#[test]
fn vector_query_literal_embeds_k_and_round_trips_every_float() {
    let vector = vec![0.1f32, -2.5, 1.0e-7, 0.333_333_34, f32::MIN_POSITIVE];
    let literal = encode_vector_query(&vector, 5);

    assert!(literal.starts_with("embedding:(["));
    assert!(literal.ends_with("], k:5)"));

    let inner = literal
        .strip_prefix("embedding:([")
        .and_then(|s| s.strip_suffix("], k:5)"))
        .expect("literal shape");
    let parsed: Vec<f32> = inner.split(',').map(|t| t.parse().expect("float token")).collect();
    assert_eq!(parsed.len(), vector.len());
    for (original, round_tripped) in vector.iter().zip(parsed.iter()) {
        assert_eq!(
            original.to_bits(),
            round_tripped.to_bits(),
            "string encoding must be lossless"
        );
    }
}

#[test]
fn request_targets_the_collection_with_wildcard_filter_and_limit() {
    let body = serde_json::to_value(build_search_request(&[0.5, 0.25], 3)).expect("serialize");
    let search = &body["searches"][0];

    assert_eq!(search["collection"], "degree_programs");
    assert_eq!(search["q"], "*");
    assert_eq!(search["per_page"], 3);
    assert_eq!(search["vector_query"], "embedding:([0.5,0.25], k:3)");
    assert_eq!(body["searches"].as_array().map(Vec::len), Some(1));
}

#[test]
fn parse_yields_one_result_per_hit_with_distance_as_score() {
    let raw = response_with_hits(serde_json::json!([
        full_hit("Closest", 0.12),
        full_hit("Farther", 0.58),
    ]));

    let results = parse_search_response(raw).expect("parse");
    assert_eq!(results.len(), 2);
    // Lower-is-better distance carried through unmodified, order preserved.
    assert_eq!(results[0].title, "Closest");
    assert_eq!(results[0].score, 0.12);
    assert_eq!(results[1].score, 0.58);
}

#[test]
fn hit_without_vector_distance_scores_zero() {
    let raw = response_with_hits(serde_json::json!([{
        "document": {
            "title": "No distance",
            "shortDescription": "x",
            "description": "y",
            "image": "z",
            "url": "/x"
        }
    }]));

    let results = parse_search_response(raw).expect("parse");
    assert_eq!(results[0].score, 0.0);
}

#[test]
fn absent_hits_key_is_an_empty_result() {
    let raw: MultiSearchResponse =
        serde_json::from_value(serde_json::json!({ "results": [{ "found": 0 }] }))
            .expect("deserialize");
    assert!(parse_search_response(raw).expect("parse").is_empty());
}

#[test]
fn empty_results_array_is_malformed() {
    let raw: MultiSearchResponse =
        serde_json::from_value(serde_json::json!({ "results": [] })).expect("deserialize");
    let err = parse_search_response(raw).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { backend: "typesense", field: "results" }));
}

#[test]
fn missing_document_field_is_malformed() {
    let raw = response_with_hits(serde_json::json!([{
        "document": {
            "title": "Incomplete",
            "shortDescription": "x",
            "image": "z",
            "url": "/x"
            // description absent
        },
        "vector_distance": 0.3
    }]));

    let err = parse_search_response(raw).unwrap_err();
    match err {
        Error::MalformedResponse { backend, field } => {
            assert_eq!(backend, "typesense");
            assert_eq!(field, "description");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}
