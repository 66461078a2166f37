//! # repo_inventory
//!
//! Inventory a GitHub repository, providing:
//! - **Dependency inventory**: manifests for npm, Go, Python, Rust and Ruby
//!   found anywhere in the tree, parsed into `{name, version, type}` records
//! - **Health score**: recent activity, issue responsiveness and contributor
//!   diversity combined into a 0-100 score
//! - **Bus factor**: how many top contributors hold the majority of commits
//! - **Maturity**: repository age, lock-file hygiene and language breadth
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_inventory::{analyze_repository, InventoryConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = InventoryConfig::default();
//! let report = analyze_repository("rust-lang/cargo", None, &config).await?;
//!
//! println!("health {} / bus factor {}", report.metrics.health_score, report.metrics.bus_factor);
//! for file in &report.dependencies.files {
//!     println!("{} ({}): {} dependencies", file.path, file.ecosystem, file.count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The manifest parsers and the metrics engine are plain functions and can be
//! used without network access:
//!
//! ```
//! use repo_inventory::{parse_manifest, Ecosystem};
//!
//! let (deps, tag) = parse_manifest(Ecosystem::Ruby, b"gem \"rails\", \"7.0\"\n");
//! assert_eq!(tag, Ecosystem::Ruby);
//! assert_eq!(deps[0].version, "7.0");
//! ```

mod aggregator;
mod config;
mod detector;
mod error;
mod github;
mod inventory;
mod metrics;
mod parsers;
mod types;

// Re-export public API
pub use aggregator::{analyze_dependencies, decode_content, ContentFetcher};
pub use config::{
    BusFactorPolicy, HealthWeights, InventoryConfig, InventoryConfigBuilder, MaturityThresholds,
    NetworkConfig,
};
pub use detector::{find_manifests, has_lock_file, manifest_ecosystem, ManifestCandidate};
pub use error::{InventoryError, Result};
pub use github::{parse_repo_ref, GitHubClient};
pub use inventory::{
    analyze_repository, analyze_with_client, compare_repositories, compare_with_client,
};
pub use metrics::{
    calculate_bus_factor, calculate_health_score, calculate_maturity_score, compute_metrics,
    determine_bus_risk, determine_maturity_level, recent_commit_count, MetricsInput,
};
pub use parsers::{parse_manifest, parser_for, ManifestParser};
pub use types::{
    AnalysisReport, BusRisk, Commit, ComparisonReport, ComponentScores, Contributor, Dependency,
    DependencyFile, DependencyKind, DependencyReport, Ecosystem, EntryKind, MaturityLevel,
    MetricsSnapshot, RepoInfo, TreeEntry,
};
