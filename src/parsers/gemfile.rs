//! `Gemfile` parser

use super::ManifestParser;
use crate::types::{Dependency, DependencyKind, Ecosystem};
use regex::Regex;
use std::sync::OnceLock;

static GEM: OnceLock<Regex> = OnceLock::new();

fn gem_pattern() -> &'static Regex {
    GEM.get_or_init(|| {
        Regex::new(r#"gem\s+['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#)
            .expect("valid gem pattern")
    })
}

/// Picks up `gem "name"[, "constraint"]` declarations
pub struct GemfileParser;

impl ManifestParser for GemfileParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Ruby
    }

    fn parse(&self, content: &[u8]) -> Vec<Dependency> {
        let text = String::from_utf8_lossy(content);

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| gem_pattern().captures(line))
            .map(|caps| {
                let version = caps
                    .get(2)
                    .map(|m| m.as_str())
                    .filter(|v| !v.is_empty())
                    .unwrap_or("*");
                Dependency::new(&caps[1], version, DependencyKind::Production)
            })
            .collect()
    }
}
