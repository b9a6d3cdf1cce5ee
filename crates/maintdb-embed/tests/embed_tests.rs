use maintdb_core::config::EmbeddingConfig;
use maintdb_core::traits::Embedder;
use maintdb_embed::{load_embedder, resolve_model_dir, FakeEmbedder};

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let config = EmbeddingConfig { use_fake: true, fake_dim: 384, ..Default::default() };
    let embedder = load_embedder(&config).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384);
    assert_eq!(embedder.dim(), 384);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn identical_text_scores_one_and_beats_other_text() {
    let embedder = FakeEmbedder::new(256);
    let passage = "Check hydraulic pressure before retracting the landing gear";
    let q = embedder.embed_query(passage).unwrap();
    let same = embedder.embed_query(passage).unwrap();
    let other = embedder.embed_query("Replace cabin air filter every 400 hours").unwrap();

    assert!((dot(&q, &same) - 1.0).abs() < 1e-4);
    assert!(dot(&q, &other) < dot(&q, &same));
}

#[test]
fn batch_preserves_order_and_length() {
    let embedder = FakeEmbedder::new(64);
    let texts: Vec<String> = ["alpha", "bravo", "charlie"].iter().map(|s| s.to_string()).collect();
    let batch = embedder.embed_batch(&texts).unwrap();
    assert_eq!(batch.len(), 3);
    for (text, vec) in texts.iter().zip(&batch) {
        assert_eq!(vec, &embedder.embed_query(text).unwrap());
    }
}

#[test]
fn fake_id_carries_dimension() {
    assert_eq!(FakeEmbedder::new(32).id(), "fake:xxh64:d32");
    assert_ne!(FakeEmbedder::new(32).id(), FakeEmbedder::new(64).id());
}

#[test]
fn configured_model_dir_wins() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = EmbeddingConfig {
        model_dir: Some(tmp.path().to_string_lossy().to_string()),
        ..Default::default()
    };
    assert_eq!(resolve_model_dir(&config).unwrap(), tmp.path());
}

#[test]
fn missing_model_dir_is_an_error() {
    let config = EmbeddingConfig {
        model: "nobody/definitely-not-downloaded".to_string(),
        model_dir: Some("/nonexistent/model/dir".to_string()),
        ..Default::default()
    };
    if std::env::var("APP_MODEL_DIR").is_err() && std::env::var("MODEL_DIR").is_err() {
        assert!(resolve_model_dir(&config).is_err());
    }
}

#[test]
fn lazy_embedder_loads_once() {
    use maintdb_embed::LazyEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let lazy = LazyEmbedder::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(16));
        Ok(embedder)
    });
    assert!(!lazy.is_loaded());

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| assert_eq!(lazy.get().unwrap().dim(), 16));
        }
    });
    assert!(lazy.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_embedder_retries_after_failure() {
    use maintdb_embed::LazyEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let lazy = LazyEmbedder::new(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            anyhow::bail!("model files not there yet");
        }
        let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(8));
        Ok(embedder)
    });
    assert!(lazy.get().is_err());
    assert_eq!(lazy.get().unwrap().dim(), 8);
}
