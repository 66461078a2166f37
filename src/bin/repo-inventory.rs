//! CLI tool for inventorying GitHub repositories

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use repo_inventory::{
    analyze_repository, compare_repositories, AnalysisReport, BusRisk, ComparisonReport,
    Ecosystem, InventoryConfig, MaturityLevel,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "repo-inventory")]
#[command(about = "Inventory a GitHub repository: dependencies, health, bus factor and maturity", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository to analyze (owner/repo or GitHub URL)
    repository: String,

    /// Branch to inventory (default: the repository's default branch)
    #[arg(short = 'b', long)]
    branch: Option<String>,

    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the repository and display a summary
    Scan {
        /// Fail if the health score is below this threshold (0-100)
        #[arg(long)]
        min_health: Option<u8>,

        /// Display every dependency
        #[arg(long)]
        detailed: bool,
    },

    /// Generate an exportable analysis report
    Report {
        /// Output format
        #[arg(short = 'f', long, default_value = "markdown")]
        format: ReportFormat,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// List declared dependencies per manifest
    Deps {
        /// Only show manifests of this ecosystem (npm, go, python, rust, ruby)
        #[arg(short = 'e', long)]
        ecosystem: Option<Ecosystem>,
    },

    /// Analyze a second repository and compare the two side by side
    Compare {
        /// Repository to compare against (owner/repo or GitHub URL)
        other: String,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Debug)]
enum ReportFormat {
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{} Failed to load config: {:#}", "Error:".red().bold(), e);
                process::exit(1);
            }
        },
        None => InventoryConfig::default(),
    };

    if let Commands::Compare { other, json } = &cli.command {
        let spinner = start_spinner(format!("Comparing {} with {}...", cli.repository, other));
        let result =
            compare_repositories(&cli.repository, other, cli.branch.as_deref(), &config).await;
        spinner.finish_and_clear();

        match result {
            Ok(comparison) if *json => println!("{}", generate_json_comparison(&comparison)),
            Ok(comparison) => display_comparison(&comparison),
            Err(e) => {
                eprintln!("{} Comparison failed: {}", "Error:".red().bold(), e);
                process::exit(1);
            }
        }
        return;
    }

    let spinner = start_spinner(format!("Analyzing {}...", cli.repository));
    let result = analyze_repository(&cli.repository, cli.branch.as_deref(), &config).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} Analysis failed: {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Scan {
            min_health,
            detailed,
        } => {
            display_summary(&report);

            if detailed {
                println!();
                display_dependencies(&report, None);
            }

            if let Some(threshold) = min_health {
                if report.metrics.health_score < threshold {
                    eprintln!(
                        "\n{} health score {} is below threshold {}",
                        "Failed:".red().bold(),
                        report.metrics.health_score,
                        threshold
                    );
                    process::exit(1);
                }
            }
        }

        Commands::Report { format, output } => {
            let content = match format {
                ReportFormat::Json => generate_json_report(&report),
                ReportFormat::Markdown => generate_markdown_report(&report),
            };

            if let Some(output_path) = output {
                match std::fs::write(&output_path, content) {
                    Ok(_) => println!("Report written to: {}", output_path.display()),
                    Err(e) => {
                        eprintln!("{} Failed to write report: {}", "Error:".red().bold(), e);
                        process::exit(1);
                    }
                }
            } else {
                println!("{}", content);
            }
        }

        Commands::Deps { ecosystem } => {
            display_dependencies(&report, ecosystem);
        }

        // Handled before the single-repository analysis
        Commands::Compare { .. } => {}
    }
}

fn start_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<InventoryConfig> {
    let config = InventoryConfig::from_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(config)
}

fn display_summary(report: &AnalysisReport) {
    let repo = &report.repository;
    let metrics = &report.metrics;

    println!("\n{}", "=== Repository Summary ===".bold());
    println!("Repository: {}", repo.full_name.cyan());
    if let Some(description) = &repo.description {
        println!("{}", description.dimmed());
    }
    println!(
        "Stars: {}  Forks: {}  Open issues: {}",
        repo.stars, repo.forks, repo.open_issues
    );
    println!("Branch: {}", report.branch);
    if repo.is_archived {
        println!("{}", "This repository is archived".yellow());
    }
    println!();

    let health = metrics.health_score.to_string();
    let health = if metrics.health_score >= 70 {
        health.green()
    } else if metrics.health_score >= 40 {
        health.yellow()
    } else {
        health.red()
    };
    println!("Health score: {}/100", health);

    let risk = match metrics.bus_risk {
        BusRisk::Low => metrics.bus_risk.to_string().green(),
        BusRisk::Medium => metrics.bus_risk.to_string().yellow(),
        BusRisk::High => metrics.bus_risk.to_string().red(),
    };
    println!("Bus factor: {} ({} risk)", metrics.bus_factor, risk);

    let level = match metrics.maturity_level {
        MaturityLevel::Mature | MaturityLevel::Established => {
            metrics.maturity_level.to_string().green()
        }
        MaturityLevel::Growing => metrics.maturity_level.to_string().yellow(),
        MaturityLevel::Nascent => metrics.maturity_level.to_string().red(),
    };
    println!("Maturity: {} ({})", level, metrics.maturity_score);
    println!("Commits (1 year): {}", report.commit_count_1y);
    println!("Contributors: {}", report.contributor_count);
    println!();

    let deps = &report.dependencies;
    let ecosystems: Vec<&str> = deps.ecosystems_seen.iter().map(|e| e.as_str()).collect();
    println!(
        "Dependencies: {} across {} manifest(s) [{}]",
        deps.total_deps,
        deps.files.len(),
        ecosystems.join(", ")
    );
    println!(
        "Lock file: {}",
        if deps.has_lock_file {
            "present".green()
        } else {
            "missing".yellow()
        }
    );
}

fn display_dependencies(report: &AnalysisReport, ecosystem: Option<Ecosystem>) {
    println!("{}", "=== Dependencies ===".bold());

    let files = report
        .dependencies
        .files
        .iter()
        .filter(|f| ecosystem.map_or(true, |e| f.ecosystem == e));

    let mut shown = 0;
    for file in files {
        shown += 1;
        println!(
            "\n{} [{}] {} dependencies",
            file.path.bold(),
            file.ecosystem,
            file.count
        );
        for dep in &file.dependencies {
            println!("  {} {} {}", dep.name, dep.version.dimmed(), format!("({})", dep.kind).dimmed());
        }
    }

    if shown == 0 {
        println!("No dependency manifests found");
    }
}

fn generate_json_report(report: &AnalysisReport) -> String {
    report.to_json().unwrap_or_else(|e| {
        eprintln!("Failed to serialize report: {}", e);
        process::exit(1);
    })
}

fn display_comparison(comparison: &ComparisonReport) {
    let (a, b) = (&comparison.first, &comparison.second);
    let width = a.repository.full_name.len().max(b.repository.full_name.len()).max(12);

    println!("\n{}", "=== Repository Comparison ===".bold());
    println!(
        "{:<20} {} {}",
        "",
        format!("{:>w$}", a.repository.full_name, w = width).cyan(),
        format!("{:>w$}", b.repository.full_name, w = width).cyan()
    );

    let rows: Vec<(&str, String, String)> = vec![
        ("Stars", a.repository.stars.to_string(), b.repository.stars.to_string()),
        ("Forks", a.repository.forks.to_string(), b.repository.forks.to_string()),
        (
            "Open issues",
            a.repository.open_issues.to_string(),
            b.repository.open_issues.to_string(),
        ),
        ("Commits (1 year)", a.commit_count_1y.to_string(), b.commit_count_1y.to_string()),
        ("Contributors", a.contributor_count.to_string(), b.contributor_count.to_string()),
        (
            "Health score",
            a.metrics.health_score.to_string(),
            b.metrics.health_score.to_string(),
        ),
        (
            "Bus factor",
            format!("{} ({})", a.metrics.bus_factor, a.metrics.bus_risk),
            format!("{} ({})", b.metrics.bus_factor, b.metrics.bus_risk),
        ),
        (
            "Maturity",
            format!("{} ({})", a.metrics.maturity_level, a.metrics.maturity_score),
            format!("{} ({})", b.metrics.maturity_level, b.metrics.maturity_score),
        ),
        (
            "Dependencies",
            a.dependencies.total_deps.to_string(),
            b.dependencies.total_deps.to_string(),
        ),
        (
            "Lock file",
            yes_no(a.dependencies.has_lock_file).to_string(),
            yes_no(b.dependencies.has_lock_file).to_string(),
        ),
    ];

    for (label, left, right) in rows {
        println!("{:<20} {:>w$} {:>w$}", label, left, right, w = width);
    }

    let shared = comparison.shared_dependencies();
    println!("\nShared dependencies: {}", shared.len());
    for (ecosystem, name) in shared {
        println!("  {} {}", name, format!("({})", ecosystem).dimmed());
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn generate_json_comparison(comparison: &ComparisonReport) -> String {
    comparison.to_json().unwrap_or_else(|e| {
        eprintln!("Failed to serialize comparison: {}", e);
        process::exit(1);
    })
}

fn generate_markdown_report(report: &AnalysisReport) -> String {
    let repo = &report.repository;
    let metrics = &report.metrics;
    let mut md = String::new();

    md.push_str(&format!("# Analysis for {}\n\n", repo.full_name));
    md.push_str(&format!(
        "*Exported: {}*\n\n",
        report.analyzed_at.format("%Y-%m-%d %H:%M")
    ));

    md.push_str("## Repository Info\n\n");
    md.push_str(&format!("- **Stars:** {}\n", repo.stars));
    md.push_str(&format!("- **Forks:** {}\n", repo.forks));
    md.push_str(&format!("- **Open Issues:** {}\n", repo.open_issues));
    md.push_str(&format!("- **Created:** {}\n", repo.created_at.format("%Y-%m-%d")));
    md.push_str(&format!("- **Last Push:** {}\n", repo.pushed_at.format("%Y-%m-%d")));
    md.push_str(&format!("- **Branch:** {}\n", report.branch));
    md.push_str(&format!("- **URL:** {}\n\n", repo.html_url));

    md.push_str("## Metrics\n\n");
    md.push_str(&format!("- **Health Score:** {}/100\n", metrics.health_score));
    md.push_str(&format!(
        "- **Bus Factor:** {} ({})\n",
        metrics.bus_factor, metrics.bus_risk
    ));
    md.push_str(&format!(
        "- **Maturity:** {} ({})\n",
        metrics.maturity_level, metrics.maturity_score
    ));
    md.push_str(&format!("- **Commits (1 year):** {}\n", report.commit_count_1y));
    md.push_str(&format!("- **Contributors:** {}\n\n", report.contributor_count));

    md.push_str("## Languages\n\n");
    let total: u64 = report.languages.values().sum();
    for (language, bytes) in &report.languages {
        let pct = if total > 0 {
            *bytes as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        md.push_str(&format!("- {}: {:.1}%\n", language, pct));
    }
    md.push('\n');

    md.push_str("## Top Contributors\n\n");
    for (i, contributor) in report.top_contributors.iter().enumerate() {
        md.push_str(&format!(
            "{}. {} ({} commits)\n",
            i + 1,
            contributor.login,
            contributor.commits
        ));
    }
    md.push('\n');

    let deps = &report.dependencies;
    md.push_str("## Dependencies\n\n");
    md.push_str(&format!("- Total dependencies: {}\n", deps.total_deps));
    md.push_str(&format!(
        "- Lock file: {}\n\n",
        if deps.has_lock_file { "yes" } else { "no" }
    ));
    md.push_str("| Manifest | Ecosystem | Name | Version | Type |\n");
    md.push_str("|----------|-----------|------|---------|------|\n");
    for file in &deps.files {
        for dep in &file.dependencies {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                file.path,
                file.ecosystem,
                dep.name,
                dep.version.replace('|', "\\|"),
                dep.kind
            ));
        }
    }

    md
}
