//! Manifest and lock-file detection over a tree listing

use crate::types::{Ecosystem, EntryKind, TreeEntry};

/// Manifest file names and the ecosystem each belongs to
const MANIFESTS: &[(&str, Ecosystem)] = &[
    ("package.json", Ecosystem::Npm),
    ("go.mod", Ecosystem::Go),
    ("requirements.txt", Ecosystem::Python),
    ("Pipfile", Ecosystem::Python),
    ("pyproject.toml", Ecosystem::Python),
    ("Cargo.toml", Ecosystem::Rust),
    ("Gemfile", Ecosystem::Ruby),
];

const LOCK_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "go.sum",
    "Pipfile.lock",
    "poetry.lock",
    "Cargo.lock",
    "Gemfile.lock",
];

/// A manifest found in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestCandidate {
    pub path: String,
    pub ecosystem: Ecosystem,
}

/// Ecosystem for a bare file name, if it is a known manifest
pub fn manifest_ecosystem(file_name: &str) -> Option<Ecosystem> {
    MANIFESTS
        .iter()
        .find(|(name, _)| *name == file_name)
        .map(|(_, ecosystem)| *ecosystem)
}

/// Blob entries whose file name is a known manifest, in tree order
pub fn find_manifests(tree: &[TreeEntry]) -> Vec<ManifestCandidate> {
    tree.iter()
        .filter(|entry| entry.kind == EntryKind::Blob)
        .filter_map(|entry| {
            manifest_ecosystem(entry.file_name()).map(|ecosystem| ManifestCandidate {
                path: entry.path.clone(),
                ecosystem,
            })
        })
        .collect()
}

/// Whether any entry in the tree is a known lock file
pub fn has_lock_file(tree: &[TreeEntry]) -> bool {
    tree.iter()
        .any(|entry| LOCK_FILES.contains(&entry.file_name()))
}
