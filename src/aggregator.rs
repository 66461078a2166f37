//! Dependency aggregation across every manifest in a tree snapshot

use crate::config::NetworkConfig;
use crate::detector::{find_manifests, has_lock_file, ManifestCandidate};
use crate::error::Result;
use crate::parsers::parse_manifest;
use crate::types::{DependencyFile, DependencyReport, TreeEntry};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Source of raw file content for a repository
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch a file at `reference` and return its content base64-encoded
    async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<String>;
}

/// Fetch, decode and parse every manifest in `tree`
///
/// Fetches run concurrently, bounded by `network.max_concurrent_fetches`.
/// Any manifest that cannot be fetched, decoded or yields no dependencies is
/// left out. When `network.analysis_timeout()` elapses, in-flight fetches are
/// dropped and the report holds what had completed. Files keep tree order.
pub async fn analyze_dependencies<F>(
    fetcher: &F,
    owner: &str,
    repo: &str,
    branch: &str,
    tree: &[TreeEntry],
    network: &NetworkConfig,
) -> DependencyReport
where
    F: ContentFetcher + ?Sized,
{
    let candidates = find_manifests(tree);
    let lock_file = has_lock_file(tree);

    info!(
        "Found {} manifest(s) in {}/{}@{}",
        candidates.len(),
        owner,
        repo,
        branch
    );

    let mut completed: Vec<(usize, DependencyFile)> = Vec::with_capacity(candidates.len());
    let mut pending = stream::iter(candidates.into_iter().enumerate())
        .map(move |(index, candidate)| async move {
            (index, process_manifest(fetcher, owner, repo, branch, candidate).await)
        })
        .buffer_unordered(network.max_concurrent_fetches.max(1));

    let collect = async {
        while let Some((index, file)) = pending.next().await {
            if let Some(file) = file {
                completed.push((index, file));
            }
        }
    };

    match network.analysis_timeout() {
        Some(limit) => {
            if tokio::time::timeout(limit, collect).await.is_err() {
                warn!(
                    "Manifest fetches for {}/{} exceeded {:?}; keeping completed results",
                    owner, repo, limit
                );
            }
        }
        None => collect.await,
    }
    drop(pending);

    completed.sort_by_key(|(index, _)| *index);
    let files: Vec<DependencyFile> = completed.into_iter().map(|(_, file)| file).collect();
    let report = DependencyReport::from_files(files, lock_file);

    info!(
        "Parsed {} dependencies from {} manifest(s)",
        report.total_deps,
        report.files.len()
    );

    report
}

async fn process_manifest<F>(
    fetcher: &F,
    owner: &str,
    repo: &str,
    branch: &str,
    candidate: ManifestCandidate,
) -> Option<DependencyFile>
where
    F: ContentFetcher + ?Sized,
{
    debug!("Fetching manifest: {}", candidate.path);

    let content = match fetcher
        .get_file_content(owner, repo, &candidate.path, branch)
        .await
    {
        Ok(content) => content,
        Err(e) => {
            debug!("Skipping {}: fetch failed: {}", candidate.path, e);
            return None;
        }
    };

    let decoded = match decode_content(&content) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Skipping {}: {}", candidate.path, e);
            return None;
        }
    };

    let (dependencies, ecosystem) = parse_manifest(candidate.ecosystem, &decoded);
    if dependencies.is_empty() {
        debug!("Skipping {}: no dependencies", candidate.path);
        return None;
    }

    Some(DependencyFile::new(candidate.path, ecosystem, dependencies))
}

/// Decode base64 file content, ignoring the line breaks GitHub inserts
pub fn decode_content(content: &str) -> Result<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}
