//! Shared utilities for integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use grpc_service_config::PropertyMap;

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

/// Build a property map from literal pairs.
pub fn props(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Write `content` to a fresh file in the system temp dir.
#[allow(dead_code)]
pub fn temp_config(content: &str) -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!("grpc-config-test-{}-{}.toml", std::process::id(), n));
    std::fs::write(&path, content).unwrap();
    path
}
