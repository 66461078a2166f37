//! Main analysis orchestration logic

use crate::aggregator::analyze_dependencies;
use crate::config::InventoryConfig;
use crate::detector::has_lock_file;
use crate::error::Result;
use crate::github::{parse_repo_ref, GitHubClient};
use crate::metrics::{compute_metrics, recent_commit_count, MetricsInput};
use crate::types::{AnalysisReport, ComparisonReport};
use chrono::{Duration, Utc};
use tracing::{info, warn};

/// Contributors kept in the report
const TOP_CONTRIBUTORS: usize = 10;

/// Analyze a GitHub repository and build its inventory report
///
/// `repo_ref` is `owner/repo` or a GitHub URL. The default branch is used
/// when `branch` is `None`.
pub async fn analyze_repository(
    repo_ref: &str,
    branch: Option<&str>,
    config: &InventoryConfig,
) -> Result<AnalysisReport> {
    config.validate()?;
    let (owner, repo) = parse_repo_ref(repo_ref)?;
    let client = GitHubClient::new(&config.network)?;

    analyze_with_client(&client, &owner, &repo, branch, config).await
}

/// Analyze two repositories concurrently for a side-by-side comparison
///
/// `branch` applies to the first repository only; the second is inventoried
/// on its default branch. Either analysis failing fails the comparison.
pub async fn compare_repositories(
    first: &str,
    second: &str,
    branch: Option<&str>,
    config: &InventoryConfig,
) -> Result<ComparisonReport> {
    config.validate()?;
    let (first_owner, first_repo) = parse_repo_ref(first)?;
    let (second_owner, second_repo) = parse_repo_ref(second)?;
    let client = GitHubClient::new(&config.network)?;

    compare_with_client(
        &client,
        (&first_owner, &first_repo),
        (&second_owner, &second_repo),
        branch,
        config,
    )
    .await
}

/// Compare using an existing client
pub async fn compare_with_client(
    client: &GitHubClient,
    first: (&str, &str),
    second: (&str, &str),
    branch: Option<&str>,
    config: &InventoryConfig,
) -> Result<ComparisonReport> {
    let (first, second) = tokio::try_join!(
        analyze_with_client(client, first.0, first.1, branch, config),
        analyze_with_client(client, second.0, second.1, None, config),
    )?;

    Ok(ComparisonReport { first, second })
}

/// Analyze using an existing client
///
/// Only the repository metadata request is fatal. History, contributors,
/// languages and the tree fall back to empty when their requests fail.
pub async fn analyze_with_client(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    branch: Option<&str>,
    config: &InventoryConfig,
) -> Result<AnalysisReport> {
    info!("Starting analysis of {}/{}", owner, repo);

    let repository = client.get_repository(owner, repo).await?;
    let branch = branch
        .map(str::to_string)
        .unwrap_or_else(|| repository.default_branch.clone());

    let now = Utc::now();
    let since = now - Duration::days(365);

    let (commits, contributors, languages, tree) = tokio::join!(
        client.get_commits(owner, repo, since),
        client.get_contributors(owner, repo),
        client.get_languages(owner, repo),
        client.get_tree(owner, repo, &branch),
    );
    let commits = or_empty("commit history", commits);
    let contributors = or_empty("contributors", contributors);
    let languages = or_empty("languages", languages);
    let tree = or_empty("tree listing", tree);

    info!(
        "Fetched {} commits, {} contributors, {} tree entries",
        commits.len(),
        contributors.len(),
        tree.len()
    );

    let lock_file = has_lock_file(&tree);
    let metrics = compute_metrics(
        &MetricsInput {
            repository: Some(&repository),
            commits: &commits,
            contributors: &contributors,
            languages: &languages,
            has_lock_file: lock_file,
        },
        config,
        now,
    );

    let dependencies =
        analyze_dependencies(client, owner, repo, &branch, &tree, &config.network).await;

    info!(
        "Analysis complete: health {}, bus factor {} ({}), maturity {} ({}), {} dependencies",
        metrics.health_score,
        metrics.bus_factor,
        metrics.bus_risk,
        metrics.maturity_score,
        metrics.maturity_level,
        dependencies.total_deps,
    );

    Ok(AnalysisReport {
        repository,
        branch,
        analyzed_at: now,
        commit_count_1y: recent_commit_count(&commits, now),
        contributor_count: contributors.len(),
        top_contributors: contributors.into_iter().take(TOP_CONTRIBUTORS).collect(),
        languages,
        metrics,
        dependencies,
    })
}

fn or_empty<T: Default>(what: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to fetch {}: {}", what, e);
            T::default()
        }
    }
}
