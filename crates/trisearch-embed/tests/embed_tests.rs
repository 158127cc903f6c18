use trisearch_core::traits::Embedder;
use trisearch_core::types::EMBEDDING_DIM;
use trisearch_core::Error;
use trisearch_embed::{default_embedder, extract_embedding, EmbeddingResponse};

#[tokio::test]
async fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder so no provider call is made
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = default_embedder().expect("embedder");
    let v1 = embedder.embed("hello world").await.expect("embed");
    let v2 = embedder.embed("hello world").await.expect("embed");

    assert_eq!(v1.len(), EMBEDDING_DIM, "embedding dim is 1536");
    assert_eq!(embedder.dim(), EMBEDDING_DIM);

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[tokio::test]
async fn fake_embedder_distinguishes_texts() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let embedder = default_embedder().expect("embedder");

    let a = embedder.embed("computer science").await.expect("embed");
    let b = embedder.embed("culinary arts").await.expect("embed");
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    assert!(dot < 0.999, "different texts should not be identical vectors");
}

#[test]
fn wrong_length_vector_is_a_provider_error() {
    let response: EmbeddingResponse = serde_json::from_value(serde_json::json!({
        "data": [{ "embedding": [0.1, 0.2, 0.3] }]
    }))
    .expect("deserialize");

    let err = extract_embedding(response).unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
    assert!(err.to_string().contains("1536"));
}

#[test]
fn empty_data_is_a_provider_error() {
    let response: EmbeddingResponse =
        serde_json::from_value(serde_json::json!({ "data": [] })).expect("deserialize");
    let err = extract_embedding(response).unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}
