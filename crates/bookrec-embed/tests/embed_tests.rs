use bookrec_core::config::EmbeddingSettings;
use bookrec_core::{Embedder, Error};
use bookrec_embed::{embedder_from_settings, masked_mean_l2};
use candle_core::{DType, Device, Tensor};

#[test]
fn hashing_provider_from_settings() {
    let settings = EmbeddingSettings { provider: "hashing".into(), dim: 32, ..EmbeddingSettings::default() };
    let embedder = embedder_from_settings(&settings).expect("embedder");
    assert_eq!(embedder.dim(), 32);
    let v = embedder.embed("a quiet story about the sea").expect("embed");
    assert_eq!(v.len(), 32);
}

#[test]
fn missing_model_dir_is_an_init_error() {
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_ok() || std::env::var("APP_MODEL_DIR").is_ok() || std::env::var("MODEL_DIR").is_ok() {
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let settings = EmbeddingSettings {
        provider: "local".into(),
        model_dir: Some(tmp.path().join("no-such-model").to_string_lossy().to_string()),
        ..EmbeddingSettings::default()
    };
    match embedder_from_settings(&settings) {
        Err(e) => assert!(matches!(e, Error::Init(_)), "unexpected error: {e}"),
        Ok(_) => panic!("expected an init error"),
    }
}

#[test]
fn masked_mean_l2_basic() {
    let dev = Device::Cpu;
    // Two tokens with hidden dim 4; second token is masked out.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1i64, 0i64], (1, 2), &dev).unwrap().to_dtype(DType::F32).unwrap();
    let out = masked_mean_l2(&h, &mask).unwrap();
    let v: Vec<Vec<f32>> = out.to_vec2().unwrap();
    let norm: f32 = (1.0f32 + 4.0 + 9.0 + 16.0).sqrt();
    for (a, b) in v[0].iter().copied().zip([1.0 / norm, 2.0 / norm, 3.0 / norm, 4.0 / norm]) {
        assert!((a - b).abs() < 1e-5, "a={a} b={b}");
    }
}
