//! Dependency manifest parsers, one per ecosystem
//!
//! Every parser is total: content it cannot make sense of yields an empty
//! list rather than an error. The aggregator drops empty results.

mod cargo;
mod gemfile;
mod go_mod;
mod npm;
mod requirements;

use crate::types::{Dependency, Ecosystem};

pub use cargo::CargoParser;
pub use gemfile::GemfileParser;
pub use go_mod::GoModParser;
pub use npm::PackageJsonParser;
pub use requirements::RequirementsParser;

/// Turns raw manifest bytes into dependency records
pub trait ManifestParser: Send + Sync {
    /// Ecosystem tag attached to everything this parser returns
    fn ecosystem(&self) -> Ecosystem;

    /// Parse manifest content; never fails
    fn parse(&self, content: &[u8]) -> Vec<Dependency>;
}

static NPM: PackageJsonParser = PackageJsonParser;
static GO: GoModParser = GoModParser;
static PYTHON: RequirementsParser = RequirementsParser;
static RUST: CargoParser = CargoParser;
static RUBY: GemfileParser = GemfileParser;

/// Parser registered for an ecosystem
pub fn parser_for(ecosystem: Ecosystem) -> &'static dyn ManifestParser {
    match ecosystem {
        Ecosystem::Npm => &NPM,
        Ecosystem::Go => &GO,
        Ecosystem::Python => &PYTHON,
        Ecosystem::Rust => &RUST,
        Ecosystem::Ruby => &RUBY,
    }
}

/// Parse content with the parser for `ecosystem`, returning the records and
/// the parser's own tag
pub fn parse_manifest(ecosystem: Ecosystem, content: &[u8]) -> (Vec<Dependency>, Ecosystem) {
    let parser = parser_for(ecosystem);
    (parser.parse(content), parser.ecosystem())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_ecosystem_has_matching_parser() {
        for ecosystem in [
            Ecosystem::Npm,
            Ecosystem::Go,
            Ecosystem::Python,
            Ecosystem::Rust,
            Ecosystem::Ruby,
        ] {
            assert_eq!(parser_for(ecosystem).ecosystem(), ecosystem);
        }
    }

    #[test]
    fn test_garbage_yields_empty_lists() {
        let garbage = b"\xff\xfe{{{ not a manifest";
        for ecosystem in [
            Ecosystem::Npm,
            Ecosystem::Go,
            Ecosystem::Python,
            Ecosystem::Rust,
            Ecosystem::Ruby,
        ] {
            let (deps, tag) = parse_manifest(ecosystem, garbage);
            assert!(deps.is_empty(), "{} parser produced {:?}", ecosystem, deps);
            assert_eq!(tag, ecosystem);
        }
    }
}
