//! Build script for storefront crate.
//!
//! Hashes the stylesheet so templates can append a cache-busting query
//! string (`main.css?v=<hash>`).

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=dev");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = match fs::read(&css_path) {
        Ok(content) => {
            let digest = format!("{:x}", Sha256::digest(&content));
            digest[..8].to_string()
        }
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            "dev".to_string()
        }
    };

    println!("cargo:rustc-env=CSS_HASH={hash}");
}
