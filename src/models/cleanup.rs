//! Cleanup policy model.

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// A named cleanup policy referenced by repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupPolicy {
    /// Immutable; changing it forces replacement.
    pub name: String,

    /// Format the policy applies to, or "*" for all formats.
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub criteria: CleanupCriteria,

    /// RELEASES or PRERELEASES (maven2 / npm only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<String>,

    /// Minimum number of versions retained regardless of criteria.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<i64>,
}

/// Deletion criteria; at least one must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanupCriteria {
    /// Age in days since the component was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_blob_updated: Option<i64>,

    /// Age in days since the component was last downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_downloaded: Option<i64>,

    /// Regex matched against asset paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_regex: Option<String>,
}

impl CleanupPolicy {
    /// Pre-flight validation; runs before any API call.
    pub fn validate(&self) -> Result<()> {
        let c = &self.criteria;
        if c.last_blob_updated.is_none() && c.last_downloaded.is_none() && c.asset_regex.is_none() {
            return Err(ProviderError::validation_at(
                "criteria",
                "at least one criterion (last_blob_updated, last_downloaded, or asset_regex) \
                 must be specified",
            ));
        }
        if let Some(days) = c.last_blob_updated {
            if days < 1 {
                return Err(ProviderError::validation_at(
                    "criteria.last_blob_updated",
                    "must be at least 1 day",
                ));
            }
        }
        if let Some(days) = c.last_downloaded {
            if days < 1 {
                return Err(ProviderError::validation_at(
                    "criteria.last_downloaded",
                    "must be at least 1 day",
                ));
            }
        }
        if let Some(regex) = &c.asset_regex {
            regex::Regex::new(regex).map_err(|e| {
                ProviderError::validation_at("criteria.asset_regex", format!("invalid regex: {e}"))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_with(criteria: CleanupCriteria) -> CleanupPolicy {
        CleanupPolicy {
            name: "purge-old".into(),
            format: "maven2".into(),
            notes: None,
            criteria,
            release_type: None,
            retain: None,
        }
    }

    #[test]
    fn test_all_criteria_null_rejected() {
        let err = policy_with(CleanupCriteria::default()).validate().unwrap_err();
        match err {
            ProviderError::Validation { path, message } => {
                assert_eq!(path.as_deref(), Some("criteria"));
                assert!(message.contains("at least one criterion"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_single_criterion_accepted() {
        let policy = policy_with(CleanupCriteria {
            last_downloaded: Some(30),
            ..Default::default()
        });
        policy.validate().expect("one criterion is enough");
    }

    #[test]
    fn test_bad_asset_regex_rejected() {
        let policy = policy_with(CleanupCriteria {
            asset_regex: Some("([unclosed".into()),
            ..Default::default()
        });
        assert!(policy.validate().is_err());
    }
}
