// src/notify/mod.rs
pub mod email;

use std::path::{Path, PathBuf};

use tracing::warn;

pub use email::EmailSender;

/// Keep only attachment paths that actually exist. A missing file means an
/// earlier step was skipped for that category; it is logged, not an error.
pub fn existing_files(paths: &[PathBuf]) -> Vec<&Path> {
    let mut out = Vec::with_capacity(paths.len());
    for p in paths {
        if p.exists() {
            out.push(p.as_path());
        } else {
            warn!(path = %p.display(), "skipping missing attachment");
        }
    }
    out
}
