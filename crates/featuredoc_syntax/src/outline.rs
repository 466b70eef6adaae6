//! Composite names of expanded outline scenarios.
//!
//! When a runner expands a `Scenario Outline`, each generated scenario is named
//! `<name> -- @<order> <subname>`, where `<order>` is `<examples table>.<row>` (for instance
//! `Login -- @1.1 valid credentials`).
//!
//! ## Examples
//! ```rust
//! use featuredoc_syntax::OutlineName;
//!
//! let name = OutlineName::parse("Login -- @1.1 valid credentials").unwrap();
//! assert_eq!(name.name, "Login");
//! assert_eq!(name.order, "1.1");
//! assert_eq!(name.subname, "valid credentials");
//! assert_eq!(name.title(), "Login - valid credentials");
//! assert_eq!(name.identifier(), "@1.1 Login - valid credentials");
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static OUTLINE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?) -- @(?P<order>\d+\.\d+)(?:\s+(?P<subname>.*))?$")
        .expect("INVARIANT: outline name pattern is a valid regex")
});

/// A composite outline scenario name that does not follow `<name> -- @<order> <subname>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed outline scenario name '{0}', expected '<name> -- @<order> <subname>'")]
pub struct OutlineNameError(pub String);

/// The parts of an expanded outline scenario name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineName {
    pub name: String,
    /// `<examples table>.<row>`, both 1-based.
    pub order: String,
    /// Usually the first cell of the example row. May be empty.
    pub subname: String,
}

impl OutlineName {
    pub fn parse(composite: &str) -> Result<Self, OutlineNameError> {
        let composite = composite.trim();
        let caps = OUTLINE_NAME
            .captures(composite)
            .ok_or_else(|| OutlineNameError(composite.to_string()))?;
        Ok(Self {
            name: caps["name"].trim().to_string(),
            order: caps["order"].to_string(),
            subname: caps.name("subname").map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        })
    }

    /// Human title: base name and subname.
    pub fn title(&self) -> String {
        if self.subname.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.subname)
        }
    }

    /// Title tagged with the example order, unique within a feature.
    pub fn identifier(&self) -> String {
        format!("@{} {}", self.order, self.title())
    }
}

impl fmt::Display for OutlineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_login_example() {
        let name = OutlineName::parse("Login -- @1.1 valid credentials").unwrap();
        assert_eq!(name.name, "Login");
        assert_eq!(name.subname, "valid credentials");
        assert_eq!(name.order, "1.1");
        assert!(name.title().contains("Login"));
        assert!(name.title().contains("valid credentials"));
        assert!(name.identifier().starts_with("@1.1"));
    }

    #[test]
    fn test_name_may_contain_dashes() {
        let name = OutlineName::parse("Sign-in - retry -- @2.10 bob").unwrap();
        assert_eq!(name.name, "Sign-in - retry");
        assert_eq!(name.order, "2.10");
    }

    #[test]
    fn test_empty_subname() {
        let name = OutlineName::parse("Login -- @1.2").unwrap();
        assert_eq!(name.subname, "");
        assert_eq!(name.title(), "Login");
    }

    #[test]
    fn test_malformed_names() {
        for bad in ["Login", "Login -- 1.1 x", "Login -- @1 x", " -- @1.1 x"] {
            let err = OutlineName::parse(bad).unwrap_err();
            assert_eq!(err.0, bad.trim());
        }
    }
}
