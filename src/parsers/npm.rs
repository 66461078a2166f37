//! `package.json` parser

use super::ManifestParser;
use crate::types::{Dependency, DependencyKind, Ecosystem};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, String>>,
    #[serde(default)]
    dev_dependencies: Option<BTreeMap<String, String>>,
    #[serde(default)]
    peer_dependencies: Option<BTreeMap<String, String>>,
}

/// Reads the production, dev and peer dependency maps
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn parse(&self, content: &[u8]) -> Vec<Dependency> {
        let pkg: PackageJson = match serde_json::from_slice(content) {
            Ok(pkg) => pkg,
            Err(_) => return Vec::new(),
        };

        let sections = [
            (pkg.dependencies, DependencyKind::Production),
            (pkg.dev_dependencies, DependencyKind::Dev),
            (pkg.peer_dependencies, DependencyKind::Peer),
        ];

        let mut deps: Vec<Dependency> = sections
            .into_iter()
            .filter_map(|(map, kind)| map.map(|m| (m, kind)))
            .flat_map(|(map, kind)| {
                map.into_iter()
                    .map(move |(name, version)| Dependency::new(name, version.trim(), kind))
            })
            .collect();

        // Stable: a name declared in several sections keeps section order
        deps.sort_by(|a, b| a.name.cmp(&b.name));
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_sections_sorted_by_name() {
        let content = br#"{
            "name": "demo",
            "dependencies": {"a": "^1.0"},
            "devDependencies": {"b": "~2.0"}
        }"#;

        let deps = PackageJsonParser.parse(content);
        assert_eq!(
            deps,
            vec![
                Dependency::new("a", "^1.0", DependencyKind::Production),
                Dependency::new("b", "~2.0", DependencyKind::Dev),
            ]
        );
    }

    #[test]
    fn test_sort_is_across_sections() {
        let content = br#"{
            "dependencies": {"zod": "3.22.0", "express": " ^4.18.2 "},
            "devDependencies": {"jest": "^29.0.0", "express": "4.17.0"},
            "peerDependencies": {"react": ">=17"}
        }"#;

        let deps = PackageJsonParser.parse(content);
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["express", "express", "jest", "react", "zod"]);
        assert_eq!(deps[0], Dependency::new("express", "^4.18.2", DependencyKind::Production));
        assert_eq!(deps[1].kind, DependencyKind::Dev);
        assert_eq!(deps[3].kind, DependencyKind::Peer);
    }

    #[test]
    fn test_malformed_json_is_empty() {
        assert!(PackageJsonParser.parse(b"{ \"dependencies\": ").is_empty());
        assert!(PackageJsonParser.parse(br#"{"dependencies": {"a": 1}}"#).is_empty());
        assert!(PackageJsonParser.parse(br#"{"name": "no-deps"}"#).is_empty());
    }
}
