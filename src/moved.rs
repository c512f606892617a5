//! Deprecated resource aliases and state movers.
//!
//! A renamed resource is registered twice: the old name as a deprecated
//! alias with an identical schema plus a deprecation message, and a state
//! mover on the new name that claims states authored under the old name
//! and rewrites them in place. Renames are purely local; no API calls.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::formats::FormatAdapter;

/// Deprecation marker carried by an alias registration.
#[derive(Debug, Clone)]
pub struct Deprecation {
    pub message: String,
    pub replacement: String,
}

impl Deprecation {
    pub fn replaced_by(old_name: &str, new_name: &str) -> Self {
        Self {
            message: format!("{old_name} is deprecated; use {new_name} instead"),
            replacement: new_name.to_string(),
        }
    }
}

/// Rewrites a state authored under a deprecated type name into the state of
/// the type this mover is registered on. Old and new names share a schema,
/// so the adapter's state codec decodes either.
pub struct StateMover {
    claimed_source_types: Vec<String>,
    target_type: String,
    adapter: Arc<dyn FormatAdapter>,
}

impl StateMover {
    pub fn new(
        claimed_source_types: Vec<String>,
        target_type: impl Into<String>,
        adapter: Arc<dyn FormatAdapter>,
    ) -> Self {
        Self {
            claimed_source_types,
            target_type: target_type.into(),
            adapter,
        }
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    pub fn claims(&self, source_type_name: &str) -> bool {
        self.claimed_source_types
            .iter()
            .any(|claimed| claimed == source_type_name)
    }

    /// Move a source state into this mover's target type.
    ///
    /// Returns `Ok(None)` when the source type is not one this mover claims.
    /// A claimed source with no state is fatal: the host asked to migrate
    /// something that does not exist.
    pub fn move_state(
        &self,
        source_type_name: &str,
        source_state: Option<&Value>,
    ) -> Result<Option<Value>> {
        if !self.claims(source_type_name) {
            return Ok(None);
        }
        let raw = source_state.ok_or_else(|| {
            ProviderError::Inconsistent(format!(
                "cannot migrate {source_type_name} to {}: no source state",
                self.target_type
            ))
        })?;
        let spec = self.adapter.state_from_host_input(raw)?;
        tracing::info!(
            from = source_type_name,
            to = %self.target_type,
            name = %spec.name,
            "state moved"
        );
        Ok(Some(serde_json::to_value(spec)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats;
    use serde_json::json;

    fn maven_hosted_mover() -> StateMover {
        StateMover::new(
            vec!["nexus_repository_maven_hosted".to_string()],
            "nexus_repository_maven2_hosted",
            Arc::new(formats::maven::MavenHosted),
        )
    }

    fn maven_hosted_state() -> Value {
        json!({
            "name": "releases",
            "online": true,
            "url": "https://nexus.example.com/repository/releases",
            "storage": {
                "blob_store_name": "default",
                "strict_content_type_validation": true,
                "write_policy": "ALLOW_ONCE"
            },
            "component": {"proprietary_components": false},
            "maven": {
                "version_policy": "RELEASE",
                "layout_policy": "STRICT",
                "content_disposition": "ATTACHMENT"
            }
        })
    }

    #[test]
    fn test_unclaimed_source_returns_silently() {
        let mover = maven_hosted_mover();
        let result = mover
            .move_state("nexus_repository_npm_hosted", Some(&maven_hosted_state()))
            .expect("unclaimed source is not an error");
        assert!(result.is_none());
    }

    #[test]
    fn test_claimed_source_without_state_is_fatal() {
        let mover = maven_hosted_mover();
        let err = mover
            .move_state("nexus_repository_maven_hosted", None)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Inconsistent(_)));
    }

    #[test]
    fn test_move_preserves_user_settable_fields() {
        let mover = maven_hosted_mover();
        let source = maven_hosted_state();
        let moved = mover
            .move_state("nexus_repository_maven_hosted", Some(&source))
            .unwrap()
            .expect("claimed source must produce a state");
        assert_eq!(moved["name"], source["name"]);
        assert_eq!(moved["storage"], source["storage"]);
        assert_eq!(moved["maven"], source["maven"]);
        assert_eq!(moved["url"], source["url"]);
    }
}
