#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Write a source file with the given lines, newline-terminated.
pub fn write_source(root: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = root.join(name);
    std::fs::write(&path, format!("{}\n", lines.join("\n"))).unwrap();
    path
}
