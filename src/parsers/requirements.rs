//! `requirements.txt` style parser, also applied to `Pipfile` and
//! `pyproject.toml`

use super::ManifestParser;
use crate::types::{Dependency, DependencyKind, Ecosystem};
use regex::Regex;
use std::sync::OnceLock;

static VERSIONED: OnceLock<Regex> = OnceLock::new();
static BARE: OnceLock<Regex> = OnceLock::new();

fn versioned_pattern() -> &'static Regex {
    VERSIONED.get_or_init(|| {
        Regex::new(r"^([a-zA-Z0-9_-]+)\s*([=<>!~]+.*)$").expect("valid requirement pattern")
    })
}

fn bare_pattern() -> &'static Regex {
    BARE.get_or_init(|| Regex::new(r"^([a-zA-Z0-9_-]+)\s*$").expect("valid requirement pattern"))
}

/// One requirement per line; constraint kept verbatim
pub struct RequirementsParser;

impl ManifestParser for RequirementsParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }

    fn parse(&self, content: &[u8]) -> Vec<Dependency> {
        let text = String::from_utf8_lossy(content);
        let mut deps = Vec::new();

        for line in text.lines() {
            let line = line.trim();

            // Comments, blanks and pip options (-r, -e, --index-url)
            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                continue;
            }

            if let Some(caps) = versioned_pattern().captures(line) {
                deps.push(Dependency::new(
                    &caps[1],
                    caps[2].trim(),
                    DependencyKind::Production,
                ));
                continue;
            }

            if let Some(caps) = bare_pattern().captures(line) {
                deps.push(Dependency::new(&caps[1], "*", DependencyKind::Production));
            }
        }

        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_comment_and_bare() {
        let deps = RequirementsParser.parse(b"flask==2.0\n# comment\nrequests\n");
        assert_eq!(
            deps,
            vec![
                Dependency::new("flask", "==2.0", DependencyKind::Production),
                Dependency::new("requests", "*", DependencyKind::Production),
            ]
        );
    }

    #[test]
    fn test_operators_and_options() {
        let content = b"-r base.txt\n--index-url https://pypi.org/simple\n\
django >= 4.2, < 5.0\n\
numpy~=1.26\n\
urllib3!=2.0.0\n\
black<24 ; python_version >= '3.8'\n\
git+https://github.com/org/pkg.git\n\
pkg[extra]==1.0\n";

        let deps = RequirementsParser.parse(content);
        let pairs: Vec<_> = deps.iter().map(|d| (d.name.as_str(), d.version.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("django", ">= 4.2, < 5.0"),
                ("numpy", "~=1.26"),
                ("urllib3", "!=2.0.0"),
                ("black", "<24 ; python_version >= '3.8'"),
            ]
        );
    }

    #[test]
    fn test_pipfile_entries_keep_assignment_verbatim() {
        let content = b"[packages]\nrequests = \"*\"\n\n[dev-packages]\npytest = \">=7\"\n";

        let deps = RequirementsParser.parse(content);
        assert_eq!(
            deps,
            vec![
                Dependency::new("requests", "= \"*\"", DependencyKind::Production),
                Dependency::new("pytest", "= \">=7\"", DependencyKind::Production),
            ]
        );
    }
}
