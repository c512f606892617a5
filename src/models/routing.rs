//! Routing rule model.

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// A named allow/block pattern set consumed by proxy repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Immutable; changing it forces replacement.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// ALLOW or BLOCK
    pub mode: String,

    /// Non-empty set of request-path regexes.
    pub matchers: Vec<String>,
}

impl RoutingRule {
    /// Pre-flight validation; runs before any API call.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.mode.as_str(), "ALLOW" | "BLOCK") {
            return Err(ProviderError::validation_at(
                "mode",
                format!("must be ALLOW or BLOCK, got {:?}", self.mode),
            ));
        }
        if self.matchers.is_empty() {
            return Err(ProviderError::validation_at(
                "matchers",
                "must contain at least one matcher",
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for matcher in &self.matchers {
            regex::Regex::new(matcher).map_err(|e| {
                ProviderError::validation_at("matchers", format!("invalid regex {matcher:?}: {e}"))
            })?;
            if !seen.insert(matcher) {
                return Err(ProviderError::validation_at(
                    "matchers",
                    format!("duplicate matcher {matcher:?}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matchers_rejected() {
        let rule = RoutingRule {
            name: "block-snapshots".into(),
            description: String::new(),
            mode: "BLOCK".into(),
            matchers: vec![],
        };
        let err = rule.validate().unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("matchers"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_matchers_rejected() {
        let rule = RoutingRule {
            name: "r".into(),
            description: String::new(),
            mode: "ALLOW".into(),
            matchers: vec![".*-SNAPSHOT.*".into(), ".*-SNAPSHOT.*".into()],
        };
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let rule = RoutingRule {
            name: "r".into(),
            description: String::new(),
            mode: "DENY".into(),
            matchers: vec![".*".into()],
        };
        assert!(rule.validate().is_err());
    }
}
