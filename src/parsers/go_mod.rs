//! `go.mod` parser

use super::ManifestParser;
use crate::types::{Dependency, DependencyKind, Ecosystem};

const INDIRECT_MARKER: &str = "// indirect";

/// Line scanner for `require` directives, single-line and block form
pub struct GoModParser;

impl ManifestParser for GoModParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn parse(&self, content: &[u8]) -> Vec<Dependency> {
        let text = String::from_utf8_lossy(content);
        let mut deps = Vec::new();
        let mut in_require = false;

        for line in text.lines() {
            let line = line.trim();

            if line.starts_with("require (") {
                in_require = true;
                continue;
            }
            if line == ")" {
                in_require = false;
                continue;
            }

            if line.starts_with("require ") && !line.contains('(') {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 3 {
                    deps.push(Dependency::new(parts[1], parts[2], requirement_kind(line)));
                }
                continue;
            }

            if in_require && !line.is_empty() && !line.starts_with("//") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 {
                    deps.push(Dependency::new(parts[0], parts[1], requirement_kind(line)));
                }
            }
        }

        deps
    }
}

fn requirement_kind(line: &str) -> DependencyKind {
    if line.contains(INDIRECT_MARKER) {
        DependencyKind::Indirect
    } else {
        DependencyKind::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_block_with_indirect() {
        let content = b"module example.com/app\n\ngo 1.21\n\nrequire (\n\tgithub.com/x/y v1.2.3 // indirect\n\tgithub.com/p/q v0.1.0\n)\n";

        let deps = GoModParser.parse(content);
        assert_eq!(
            deps,
            vec![
                Dependency::new("github.com/x/y", "v1.2.3", DependencyKind::Indirect),
                Dependency::new("github.com/p/q", "v0.1.0", DependencyKind::Production),
            ]
        );
    }

    #[test]
    fn test_single_line_and_ignored_directives() {
        let content = b"module example.com/app\n\
require golang.org/x/sync v0.5.0\n\
replace example.com/old => example.com/new v1.0.0\n\
exclude example.com/bad v0.0.1\n\
require (\n\
    // pinned for CVE\n\
\n\
    github.com/spf13/cobra v1.8.0\n\
)\n\
toolchain go1.22.0\n";

        let deps = GoModParser.parse(content);
        assert_eq!(
            deps,
            vec![
                Dependency::new("golang.org/x/sync", "v0.5.0", DependencyKind::Production),
                Dependency::new("github.com/spf13/cobra", "v1.8.0", DependencyKind::Production),
            ]
        );
    }

    #[test]
    fn test_block_lines_outside_require_are_ignored() {
        let content = b"replace (\n\tgithub.com/a/b v1.0.0 => ../b\n)\nrequire incomplete\n";
        assert!(GoModParser.parse(content).is_empty());
    }
}
