//! Derived repository metrics: health score, bus factor and maturity
//!
//! Everything here is a pure function of pre-fetched data. The reference
//! time is passed in so results are reproducible.

use crate::config::{BusFactorPolicy, HealthWeights, InventoryConfig, MaturityThresholds};
use crate::types::{
    BusRisk, Commit, ComponentScores, Contributor, MaturityLevel, MetricsSnapshot, RepoInfo,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Score ceiling for archived repositories
const ARCHIVED_HEALTH_CAP: u8 = 10;

/// Inputs to the metrics engine
#[derive(Debug, Clone, Copy)]
pub struct MetricsInput<'a> {
    pub repository: Option<&'a RepoInfo>,
    pub commits: &'a [Commit],
    pub contributors: &'a [Contributor],
    pub languages: &'a BTreeMap<String, u64>,
    pub has_lock_file: bool,
}

/// Compute all derived metrics at time `now`
pub fn compute_metrics(
    input: &MetricsInput<'_>,
    config: &InventoryConfig,
    now: DateTime<Utc>,
) -> MetricsSnapshot {
    let open_issues = input.repository.map(|r| r.open_issues).unwrap_or(0);
    let (mut health_score, _) = calculate_health_score(
        input.commits,
        input.contributors,
        open_issues,
        &config.health_weights,
        now,
    );
    if input.repository.map(|r| r.is_archived).unwrap_or(false) {
        health_score = health_score.min(ARCHIVED_HEALTH_CAP);
    }

    let bus_factor = calculate_bus_factor(input.contributors, config.bus_factor.majority_threshold);
    let bus_risk = determine_bus_risk(bus_factor, &config.bus_factor);

    let maturity_score = calculate_maturity_score(
        input.repository.map(|r| r.created_at),
        input.has_lock_file,
        input.languages.len(),
        now,
    );
    let maturity_level = determine_maturity_level(maturity_score, &config.maturity);

    MetricsSnapshot {
        health_score,
        bus_factor,
        bus_risk,
        maturity_score,
        maturity_level,
    }
}

/// Number of commits dated within the year before `now`
pub fn recent_commit_count(commits: &[Commit], now: DateTime<Utc>) -> usize {
    let since = now - Duration::days(365);
    commits.iter().filter(|c| c.date >= since).count()
}

/// Weighted health score (0-100) and its components
pub fn calculate_health_score(
    commits: &[Commit],
    contributors: &[Contributor],
    open_issues: u32,
    weights: &HealthWeights,
    now: DateTime<Utc>,
) -> (u8, ComponentScores) {
    let recent = recent_commit_count(commits, now);

    let scores = ComponentScores {
        activity: calculate_activity_score(recent),
        responsiveness: calculate_responsiveness_score(recent, open_issues),
        diversity: calculate_diversity_score(contributors.len()),
    };

    let overall = (scores.activity * weights.activity
        + scores.responsiveness * weights.responsiveness
        + scores.diversity * weights.diversity)
        .round()
        .clamp(0.0, 100.0) as u8;

    (overall, scores)
}

fn calculate_activity_score(recent_commits: usize) -> f32 {
    match recent_commits {
        0 => 0.0,
        1..=10 => 30.0,
        11..=50 => 60.0,
        51..=200 => 85.0,
        _ => 100.0,
    }
}

/// Share of recent work that is commits rather than open issues
fn calculate_responsiveness_score(recent_commits: usize, open_issues: u32) -> f32 {
    if recent_commits == 0 {
        return 0.0;
    }
    let commits = recent_commits as f32;
    (100.0 * commits / (commits + open_issues as f32)).clamp(0.0, 100.0)
}

fn calculate_diversity_score(contributor_count: usize) -> f32 {
    match contributor_count {
        0 => 0.0,
        1 => 20.0,
        2..=5 => 50.0,
        6..=20 => 75.0,
        _ => 100.0,
    }
}

/// Minimum number of top contributors holding `threshold` of all commits
///
/// Contributors are ranked by commit count; equal counts keep input order.
pub fn calculate_bus_factor(contributors: &[Contributor], threshold: f64) -> u32 {
    let total: u64 = contributors.iter().map(|c| u64::from(c.commits)).sum();
    if total == 0 {
        return 0;
    }

    let mut ranked: Vec<&Contributor> = contributors.iter().collect();
    ranked.sort_by(|a, b| b.commits.cmp(&a.commits));

    let needed = total as f64 * threshold;
    let mut covered = 0u64;
    let mut count = 0u32;
    for contributor in ranked {
        covered += u64::from(contributor.commits);
        count += 1;
        if covered as f64 >= needed {
            break;
        }
    }
    count
}

/// Risk label for a bus factor
pub fn determine_bus_risk(bus_factor: u32, policy: &BusFactorPolicy) -> BusRisk {
    if bus_factor <= policy.high_risk_max {
        BusRisk::High
    } else if bus_factor <= policy.medium_risk_max {
        BusRisk::Medium
    } else {
        BusRisk::Low
    }
}

/// Maturity score (0-100) from age, lock-file hygiene and language breadth
pub fn calculate_maturity_score(
    created_at: Option<DateTime<Utc>>,
    has_lock_file: bool,
    language_count: usize,
    now: DateTime<Utc>,
) -> u8 {
    let age_days = created_at
        .map(|created| now.signed_duration_since(created).num_days().max(0))
        .unwrap_or(0);

    let age_points: u8 = match age_days {
        0..=89 => 0,
        90..=364 => 15,
        365..=729 => 25,
        730..=1459 => 35,
        _ => 50,
    };

    let lock_points: u8 = if has_lock_file { 20 } else { 0 };

    let breadth_points: u8 = match language_count {
        0 => 0,
        1 => 15,
        2..=3 => 25,
        _ => 30,
    };

    (age_points + lock_points + breadth_points).min(100)
}

/// Level for a maturity score
pub fn determine_maturity_level(score: u8, thresholds: &MaturityThresholds) -> MaturityLevel {
    if score >= thresholds.mature {
        MaturityLevel::Mature
    } else if score >= thresholds.established {
        MaturityLevel::Established
    } else if score >= thresholds.growing {
        MaturityLevel::Growing
    } else {
        MaturityLevel::Nascent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn commits(count: usize, days_ago: i64) -> Vec<Commit> {
        (0..count)
            .map(|i| Commit {
                sha: format!("{:040x}", i),
                author: Some("dev".to_string()),
                message: "change".to_string(),
                date: now() - Duration::days(days_ago),
            })
            .collect()
    }

    fn contributors(counts: &[u32]) -> Vec<Contributor> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &commits)| Contributor {
                login: format!("user{}", i),
                commits,
            })
            .collect()
    }

    fn repo(created_days_ago: i64, open_issues: u32, archived: bool) -> RepoInfo {
        RepoInfo {
            full_name: "octo/demo".to_string(),
            description: None,
            stars: 10,
            forks: 1,
            open_issues,
            is_archived: archived,
            default_branch: "main".to_string(),
            html_url: "https://github.com/octo/demo".to_string(),
            created_at: now() - Duration::days(created_days_ago),
            pushed_at: now(),
        }
    }

    #[test]
    fn test_empty_input_yields_floors() {
        let languages = BTreeMap::new();
        let input = MetricsInput {
            repository: None,
            commits: &[],
            contributors: &[],
            languages: &languages,
            has_lock_file: false,
        };

        let snapshot = compute_metrics(&input, &InventoryConfig::default(), now());
        assert_eq!(snapshot.health_score, 0);
        assert_eq!(snapshot.bus_factor, 0);
        assert_eq!(snapshot.bus_risk, BusRisk::High);
        assert_eq!(snapshot.maturity_score, 0);
        assert_eq!(snapshot.maturity_level, MaturityLevel::Nascent);
    }

    #[test]
    fn test_empty_history_scores_zero_even_without_issues() {
        let (score, _) = calculate_health_score(&[], &[], 0, &HealthWeights::default(), now());
        assert_eq!(score, 0);
    }

    #[test]
    fn test_old_commits_do_not_count_as_activity() {
        let old = commits(300, 400);
        assert_eq!(recent_commit_count(&old, now()), 0);
        let (_, scores) = calculate_health_score(&old, &[], 0, &HealthWeights::default(), now());
        assert_eq!(scores.activity, 0.0);
    }

    #[test]
    fn test_health_score_is_monotonic() {
        let weights = HealthWeights::default();
        let team = contributors(&[10, 5, 3]);

        let (few, _) = calculate_health_score(&commits(5, 10), &team, 4, &weights, now());
        let (many, _) = calculate_health_score(&commits(80, 10), &team, 4, &weights, now());
        assert!(many > few);

        let (calm, _) = calculate_health_score(&commits(40, 10), &team, 0, &weights, now());
        let (swamped, _) = calculate_health_score(&commits(40, 10), &team, 400, &weights, now());
        assert!(calm > swamped);

        let (solo, _) = calculate_health_score(&commits(40, 10), &contributors(&[40]), 0, &weights, now());
        assert!(calm > solo);
    }

    #[test]
    fn test_busy_repository_scores_full_marks() {
        let (score, scores) = calculate_health_score(
            &commits(250, 1),
            &contributors(&[1; 30]),
            0,
            &HealthWeights::default(),
            now(),
        );
        assert_eq!(score, 100);
        assert_eq!(scores.responsiveness, 100.0);
    }

    #[test]
    fn test_archived_repository_is_capped() {
        let languages = BTreeMap::new();
        let history = commits(250, 1);
        let team = contributors(&[1; 30]);
        let archived = repo(1000, 0, true);
        let input = MetricsInput {
            repository: Some(&archived),
            commits: &history,
            contributors: &team,
            languages: &languages,
            has_lock_file: true,
        };

        let snapshot = compute_metrics(&input, &InventoryConfig::default(), now());
        assert_eq!(snapshot.health_score, ARCHIVED_HEALTH_CAP);
    }

    #[test]
    fn test_bus_factor() {
        assert_eq!(calculate_bus_factor(&[], 0.5), 0);
        assert_eq!(calculate_bus_factor(&contributors(&[0, 0]), 0.5), 0);
        assert_eq!(calculate_bus_factor(&contributors(&[120]), 0.5), 1);
        assert_eq!(calculate_bus_factor(&contributors(&[50, 30, 20]), 0.5), 1);
        assert_eq!(calculate_bus_factor(&contributors(&[10, 10, 10, 10]), 0.5), 2);
        assert_eq!(calculate_bus_factor(&contributors(&[5, 40, 5, 40, 10]), 0.5), 2);
        assert_eq!(calculate_bus_factor(&contributors(&[25, 25, 25, 25]), 0.75), 3);
    }

    #[test]
    fn test_bus_factor_non_increasing_with_concentration() {
        let spread = calculate_bus_factor(&contributors(&[20, 20, 20, 20, 20]), 0.5);
        let skewed = calculate_bus_factor(&contributors(&[40, 15, 15, 15, 15]), 0.5);
        let dominant = calculate_bus_factor(&contributors(&[90, 3, 3, 2, 2]), 0.5);
        assert!(spread >= skewed);
        assert!(skewed >= dominant);
        assert_eq!(dominant, 1);
    }

    #[test]
    fn test_bus_risk_cut_points() {
        let policy = BusFactorPolicy::default();
        assert_eq!(determine_bus_risk(0, &policy), BusRisk::High);
        assert_eq!(determine_bus_risk(1, &policy), BusRisk::High);
        assert_eq!(determine_bus_risk(2, &policy), BusRisk::Medium);
        assert_eq!(determine_bus_risk(3, &policy), BusRisk::Medium);
        assert_eq!(determine_bus_risk(4, &policy), BusRisk::Low);

        let risks: Vec<_> = (0..10).map(|b| determine_bus_risk(b, &policy)).collect();
        assert!(risks.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_maturity_score_and_level() {
        let thresholds = MaturityThresholds::default();

        let young = calculate_maturity_score(Some(now() - Duration::days(30)), false, 1, now());
        assert_eq!(young, 15);
        assert_eq!(determine_maturity_level(young, &thresholds), MaturityLevel::Nascent);

        let mid = calculate_maturity_score(Some(now() - Duration::days(400)), false, 2, now());
        assert_eq!(mid, 50);
        assert_eq!(determine_maturity_level(mid, &thresholds), MaturityLevel::Established);

        let old = calculate_maturity_score(Some(now() - Duration::days(2000)), true, 6, now());
        assert_eq!(old, 100);
        assert_eq!(determine_maturity_level(old, &thresholds), MaturityLevel::Mature);

        assert_eq!(determine_maturity_level(25, &thresholds), MaturityLevel::Growing);
    }

    #[test]
    fn test_future_creation_date_counts_as_new() {
        let score = calculate_maturity_score(Some(now() + Duration::days(10)), false, 0, now());
        assert_eq!(score, 0);
    }
}
