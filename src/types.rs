//! Core data types for repository inventory reports

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Package ecosystem a manifest belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    Go,
    Python,
    Rust,
    Ruby,
}

impl Ecosystem {
    /// Short tag used in reports (`npm`, `go`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Go => "go",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Ruby => "ruby",
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "npm" => Ok(Self::Npm),
            "go" => Ok(Self::Go),
            "python" => Ok(Self::Python),
            "rust" => Ok(Self::Rust),
            "ruby" => Ok(Self::Ruby),
            _ => Err(format!("Unknown ecosystem: {}", s)),
        }
    }
}

/// How a dependency is declared in its manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Production,
    Dev,
    Peer,
    /// Go requirement marked `// indirect`
    Indirect,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Dev => write!(f, "dev"),
            Self::Peer => write!(f, "peer"),
            Self::Indirect => write!(f, "indirect"),
        }
    }
}

/// A single declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    /// Declared constraint verbatim, or `*` when none was given
    pub version: String,
    #[serde(rename = "type")]
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind,
        }
    }
}

/// Parse result for one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    pub path: String,
    pub ecosystem: Ecosystem,
    pub dependencies: Vec<Dependency>,
    /// Always equal to `dependencies.len()`
    pub count: usize,
}

impl DependencyFile {
    pub fn new(path: impl Into<String>, ecosystem: Ecosystem, dependencies: Vec<Dependency>) -> Self {
        let count = dependencies.len();
        Self {
            path: path.into(),
            ecosystem,
            dependencies,
            count,
        }
    }
}

/// Cross-ecosystem dependency inventory for one tree snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    pub files: Vec<DependencyFile>,
    pub total_deps: usize,
    /// Ecosystem tags in first-seen order
    pub ecosystems_seen: IndexSet<Ecosystem>,
    pub has_lock_file: bool,
}

impl DependencyReport {
    /// Build a report from retained files, in the order given
    pub fn from_files(files: Vec<DependencyFile>, has_lock_file: bool) -> Self {
        let total_deps = files.iter().map(|f| f.count).sum();
        let ecosystems_seen = files.iter().map(|f| f.ecosystem).collect();
        Self {
            files,
            total_deps,
            ecosystems_seen,
            has_lock_file,
        }
    }
}

/// Bus factor risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusRisk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for BusRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Maturity level, ordered from youngest to most mature
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaturityLevel {
    Nascent,
    Growing,
    Established,
    Mature,
}

impl std::fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nascent => write!(f, "Nascent"),
            Self::Growing => write!(f, "Growing"),
            Self::Established => write!(f, "Established"),
            Self::Mature => write!(f, "Mature"),
        }
    }
}

/// Derived repository scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Overall health (0-100)
    pub health_score: u8,
    pub bus_factor: u32,
    pub bus_risk: BusRisk,
    /// Maturity (0-100)
    pub maturity_score: u8,
    pub maturity_level: MaturityLevel,
}

/// Individual health components (0-100 scale)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    /// Score based on commits in the last year
    pub activity: f32,
    /// Score based on open issues relative to activity
    pub responsiveness: f32,
    /// Score based on contributor count
    pub diversity: f32,
}

/// Kind of a git tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodules and anything else the API may return
    #[serde(other)]
    Other,
}

/// One entry of a recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Full path from the repository root
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Repository metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoInfo {
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub open_issues: u32,
    pub is_archived: bool,
    pub default_branch: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub pushed_at: DateTime<Utc>,
}

/// A commit from the history listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub author: Option<String>,
    pub message: String,
    pub date: DateTime<Utc>,
}

/// A contributor with their commit count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub commits: u32,
}

/// Complete inventory of one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub repository: RepoInfo,
    /// Branch whose tree was inventoried
    pub branch: String,
    /// Timestamp when the analysis was performed
    pub analyzed_at: DateTime<Utc>,
    /// Commits within the last year
    pub commit_count_1y: usize,
    pub contributor_count: usize,
    /// Up to ten contributors in API order
    pub top_contributors: Vec<Contributor>,
    /// Language name to bytes of code
    pub languages: BTreeMap<String, u64>,
    pub metrics: MetricsSnapshot,
    pub dependencies: DependencyReport,
}

impl AnalysisReport {
    /// Pretty-printed JSON export
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn dependency_keys(&self) -> BTreeSet<(Ecosystem, &str)> {
        self.dependencies
            .files
            .iter()
            .flat_map(|f| f.dependencies.iter().map(move |d| (f.ecosystem, d.name.as_str())))
            .collect()
    }
}

/// Two repositories analyzed side by side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub first: AnalysisReport,
    pub second: AnalysisReport,
}

impl ComparisonReport {
    /// Dependency names declared by both repositories, per ecosystem
    pub fn shared_dependencies(&self) -> Vec<(Ecosystem, String)> {
        let second = self.second.dependency_keys();
        self.first
            .dependency_keys()
            .intersection(&second)
            .map(|(ecosystem, name)| (*ecosystem, name.to_string()))
            .collect()
    }

    /// Pretty-printed JSON export
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_camel_case() {
        let file = DependencyFile::new(
            "package.json",
            Ecosystem::Npm,
            vec![Dependency::new("react", "^18.0.0", DependencyKind::Peer)],
        );
        let report = DependencyReport::from_files(vec![file], true);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalDeps"], 1);
        assert_eq!(json["hasLockFile"], true);
        assert_eq!(json["ecosystemsSeen"], serde_json::json!(["npm"]));
        assert_eq!(json["files"][0]["dependencies"][0]["type"], "peer");
        assert_eq!(json["files"][0]["count"], 1);
    }

    #[test]
    fn test_ecosystems_seen_keeps_first_seen_order() {
        let files = vec![
            DependencyFile::new("go.mod", Ecosystem::Go, vec![Dependency::new("a", "v1", DependencyKind::Production)]),
            DependencyFile::new("web/package.json", Ecosystem::Npm, vec![Dependency::new("b", "1", DependencyKind::Dev)]),
            DependencyFile::new("tools/go.mod", Ecosystem::Go, vec![Dependency::new("c", "v2", DependencyKind::Indirect)]),
        ];
        let report = DependencyReport::from_files(files, false);

        assert_eq!(report.total_deps, 3);
        let seen: Vec<_> = report.ecosystems_seen.iter().copied().collect();
        assert_eq!(seen, vec![Ecosystem::Go, Ecosystem::Npm]);
    }

    fn sample_report(name: &str, files: Vec<DependencyFile>) -> AnalysisReport {
        let created = "2020-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        AnalysisReport {
            repository: RepoInfo {
                full_name: name.to_string(),
                description: None,
                stars: 1,
                forks: 0,
                open_issues: 0,
                is_archived: false,
                default_branch: "main".to_string(),
                html_url: format!("https://github.com/{}", name),
                created_at: created,
                pushed_at: created,
            },
            branch: "main".to_string(),
            analyzed_at: created,
            commit_count_1y: 0,
            contributor_count: 0,
            top_contributors: Vec::new(),
            languages: BTreeMap::new(),
            metrics: MetricsSnapshot {
                health_score: 0,
                bus_factor: 0,
                bus_risk: BusRisk::High,
                maturity_score: 0,
                maturity_level: MaturityLevel::Nascent,
            },
            dependencies: DependencyReport::from_files(files, false),
        }
    }

    #[test]
    fn test_report_to_json() {
        let report = sample_report("octo/demo", Vec::new());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["repository"]["full_name"], "octo/demo");
        assert_eq!(json["dependencies"]["totalDeps"], 0);
        assert_eq!(json["metrics"]["busRisk"], "high");
    }

    #[test]
    fn test_shared_dependencies_match_on_ecosystem_and_name() {
        let first = sample_report(
            "octo/web",
            vec![
                DependencyFile::new(
                    "package.json",
                    Ecosystem::Npm,
                    vec![
                        Dependency::new("react", "^18.0.0", DependencyKind::Production),
                        Dependency::new("lodash", "4", DependencyKind::Production),
                    ],
                ),
                DependencyFile::new(
                    "requirements.txt",
                    Ecosystem::Python,
                    vec![Dependency::new("requests", "==2.31", DependencyKind::Production)],
                ),
            ],
        );
        let second = sample_report(
            "octo/app",
            vec![
                DependencyFile::new(
                    "ui/package.json",
                    Ecosystem::Npm,
                    vec![Dependency::new("react", "^17.0.0", DependencyKind::Dev)],
                ),
                DependencyFile::new(
                    "Gemfile",
                    Ecosystem::Ruby,
                    vec![Dependency::new("requests", "1", DependencyKind::Production)],
                ),
            ],
        );

        let comparison = ComparisonReport { first, second };
        assert_eq!(
            comparison.shared_dependencies(),
            vec![(Ecosystem::Npm, "react".to_string())]
        );
    }

    #[test]
    fn test_tree_entry_deserializes_submodules() {
        let entry: TreeEntry = serde_json::from_str(r#"{"path":"vendor/lib","type":"commit"}"#).unwrap();
        assert_eq!(entry.kind, EntryKind::Other);
        assert_eq!(entry.file_name(), "lib");
    }
}
