//! `Cargo.toml` parser
//!
//! A line-level approximation, not a TOML parser: the right-hand side of each
//! entry is taken whole, so inline tables come through as written.

use super::ManifestParser;
use crate::types::{Dependency, DependencyKind, Ecosystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Dependencies,
    DevDependencies,
}

pub struct CargoParser;

impl ManifestParser for CargoParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Rust
    }

    fn parse(&self, content: &[u8]) -> Vec<Dependency> {
        let text = String::from_utf8_lossy(content);
        let mut deps = Vec::new();
        let mut section = Section::None;

        for line in text.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "[dependencies]" {
                section = Section::Dependencies;
                continue;
            }
            if line == "[dev-dependencies]" {
                section = Section::DevDependencies;
                continue;
            }
            if line.starts_with('[') {
                section = Section::None;
                continue;
            }

            let kind = match section {
                Section::None => continue,
                Section::Dependencies => DependencyKind::Production,
                Section::DevDependencies => DependencyKind::Dev,
            };

            if let Some((name, value)) = line.split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let version = value.trim().trim_matches(|c| c == '"' || c == '\'');
                deps.push(Dependency::new(name, version, kind));
            }
        }

        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_and_dev_dependencies() {
        let content = b"[dependencies]\nserde = \"1.0\"\n[dev-dependencies]\nmockall = \"0.11\"\n";

        let deps = CargoParser.parse(content);
        assert_eq!(
            deps,
            vec![
                Dependency::new("serde", "1.0", DependencyKind::Production),
                Dependency::new("mockall", "0.11", DependencyKind::Dev),
            ]
        );
    }

    #[test]
    fn test_inline_table_kept_verbatim() {
        let content = br#"[package]
name = "demo"
version = "0.1.0"

[dependencies]
tokio = { version = "1.35", features = ["full"] }
log = '0.4'

[features]
default = []
"#;

        let deps = CargoParser.parse(content);
        assert_eq!(
            deps,
            vec![
                Dependency::new(
                    "tokio",
                    r#"{ version = "1.35", features = ["full"] }"#,
                    DependencyKind::Production
                ),
                Dependency::new("log", "0.4", DependencyKind::Production),
            ]
        );
    }

    #[test]
    fn test_comments_and_nameless_entries_skipped() {
        let content = b"[dependencies]\n# serde = \"1\"\n= \"1\"\n  = '2'\nrand = \"0.8\" # rng\n";

        let deps = CargoParser.parse(content);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "rand");
        assert!(deps.iter().all(|d| !d.name.is_empty()));
    }

    #[test]
    fn test_other_sections_end_dependency_sections() {
        let content = b"[dependencies]\nregex = \"1\"\n[target.'cfg(unix)'.dependencies]\nlibc = \"0.2\"\n[build-dependencies]\ncc = \"1\"\n";

        let deps = CargoParser.parse(content);
        assert_eq!(deps, vec![Dependency::new("regex", "1", DependencyKind::Production)]);
    }
}
