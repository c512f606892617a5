//! Topology base schemas and composition.
//!
//! Three fixed bases carry everything common to a topology; a format
//! adapter's fragment is merged on top and wins on key collision, so a
//! format may tighten common validation but never weaken it by accident
//! (the fragment replaces the whole attribute, validators included).

use super::{AttrType, Attribute, Block, Schema, Validator, NAME_PATTERN};

/// Attributes every repository has regardless of topology.
fn common_base() -> Block {
    Block::new()
        .attr(
            "name",
            Attribute::required(AttrType::String)
                .force_new()
                .with_validator(Validator::LengthBetween(1, 255))
                .with_validator(Validator::Pattern(&NAME_PATTERN)),
        )
        .attr("online", Attribute::optional(AttrType::Bool))
        .attr("url", Attribute::computed(AttrType::String))
        .attr("last_updated", Attribute::computed(AttrType::String))
        .block(
            "storage",
            Block::required_block()
                .attr("blob_store_name", Attribute::required(AttrType::String))
                .attr(
                    "strict_content_type_validation",
                    Attribute::optional(AttrType::Bool),
                ),
        )
}

fn cleanup_block() -> Block {
    Block::new().attr(
        "policy_names",
        Attribute::required(AttrType::ListOfString).with_validator(Validator::NonEmpty),
    )
}

fn http_client_block() -> Block {
    Block::required_block()
        .attr("blocked", Attribute::optional(AttrType::Bool))
        .attr("auto_block", Attribute::optional(AttrType::Bool))
        .block(
            "connection",
            Block::new()
                .attr(
                    "retries",
                    Attribute::optional(AttrType::Int).with_validator(Validator::IntBetween(0, 10)),
                )
                .attr(
                    "timeout",
                    Attribute::optional(AttrType::Int)
                        .with_validator(Validator::IntBetween(1, 3600)),
                )
                .attr(
                    "enable_circular_redirects",
                    Attribute::optional(AttrType::Bool),
                )
                .attr("enable_cookies", Attribute::optional(AttrType::Bool))
                .attr("use_trust_store", Attribute::optional(AttrType::Bool))
                .attr("user_agent_suffix", Attribute::optional(AttrType::String)),
        )
        .block(
            "authentication",
            Block::new()
                .attr(
                    "type",
                    Attribute::required(AttrType::String)
                        .with_validator(Validator::OneOf(&["username", "ntlm"])),
                )
                .attr("username", Attribute::optional(AttrType::String))
                .attr(
                    "password",
                    Attribute::optional(AttrType::String).sensitive(),
                )
                .attr("ntlm_host", Attribute::optional(AttrType::String))
                .attr("ntlm_domain", Attribute::optional(AttrType::String)),
        )
}

/// Base schema for hosted repositories.
pub fn hosted_base() -> Block {
    common_base()
        .merge(Block::new().block(
            "storage",
            Block::required_block().attr(
                "write_policy",
                Attribute::required(AttrType::String)
                    .with_validator(Validator::OneOf(&["ALLOW", "ALLOW_ONCE", "DENY"])),
            ),
        ))
        .block("cleanup", cleanup_block())
        .block(
            "component",
            Block::new().attr(
                "proprietary_components",
                Attribute::optional(AttrType::Bool),
            ),
        )
}

/// Base schema for proxy repositories.
pub fn proxy_base() -> Block {
    common_base()
        .block("cleanup", cleanup_block())
        .block(
            "proxy",
            Block::required_block()
                .attr(
                    "remote_url",
                    Attribute::required(AttrType::String)
                        .with_validator(Validator::UrlWithScheme(&["http", "https"])),
                )
                .attr(
                    "content_max_age",
                    Attribute::optional(AttrType::Int).with_validator(Validator::IntAtLeast(0)),
                )
                .attr(
                    "metadata_max_age",
                    Attribute::optional(AttrType::Int).with_validator(Validator::IntAtLeast(0)),
                ),
        )
        .block(
            "negative_cache",
            Block::required_block()
                .attr("enabled", Attribute::optional(AttrType::Bool))
                .attr(
                    "time_to_live",
                    Attribute::optional(AttrType::Int).with_validator(Validator::IntAtLeast(0)),
                ),
        )
        .block("http_client", http_client_block())
        .attr("routing_rule", Attribute::optional(AttrType::String))
        .block(
            "replication",
            Block::new()
                .attr(
                    "preemptive_pull_enabled",
                    Attribute::optional(AttrType::Bool),
                )
                .attr("asset_path_regex", Attribute::optional(AttrType::String)),
        )
}

/// Base schema for group repositories.
pub fn group_base() -> Block {
    common_base().block(
        "group",
        Block::required_block().attr(
            "member_names",
            Attribute::required(AttrType::SetOfString)
                .with_validator(Validator::NonEmpty)
                .with_validator(Validator::UniqueItems),
        ),
    )
}

/// Compose a resource schema from a topology base and a format adapter's
/// fragments. Fragment keys that collide with base keys win.
pub fn compose(base: Block, fragments: Vec<(&'static str, Block)>) -> Schema {
    let mut root = base;
    for (name, fragment) in fragments {
        root = root.merge(Block::new().block(name, fragment));
    }
    Schema { version: 1, root }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hosted_base_requires_write_policy() {
        let schema = compose(hosted_base(), vec![]);
        let err = schema
            .validate(&json!({
                "name": "releases",
                "storage": {"blob_store_name": "default"}
            }))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("write_policy"), "got: {msg}");
    }

    #[test]
    fn test_proxy_base_requires_proxy_negative_cache_http_client() {
        let schema = compose(proxy_base(), vec![]);
        let err = schema
            .validate(&json!({
                "name": "central",
                "storage": {"blob_store_name": "default"}
            }))
            .unwrap_err();
        // First missing required block in tree order.
        assert!(err.to_string().contains("http_client") || err.to_string().contains("proxy"));
    }

    #[test]
    fn test_name_pattern_enforced_through_schema() {
        let schema = compose(hosted_base(), vec![]);
        let err = schema
            .validate(&json!({
                "name": "_leading-underscore",
                "storage": {"blob_store_name": "default", "write_policy": "ALLOW"}
            }))
            .unwrap_err();
        match err {
            crate::error::ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("name"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_proxy_base_rejects_negative_cache_ages() {
        let schema = compose(proxy_base(), vec![]);
        let err = schema
            .validate(&json!({
                "name": "central",
                "storage": {"blob_store_name": "default"},
                "proxy": {
                    "remote_url": "https://repo1.maven.org/maven2/",
                    "content_max_age": -1
                },
                "negative_cache": {"enabled": true, "time_to_live": 1440},
                "http_client": {"blocked": false, "auto_block": true}
            }))
            .unwrap_err();
        match err {
            crate::error::ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("proxy.content_max_age"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_group_base_rejects_empty_members() {
        let schema = compose(group_base(), vec![]);
        let err = schema
            .validate(&json!({
                "name": "all-npm",
                "storage": {"blob_store_name": "default"},
                "group": {"member_names": []}
            }))
            .unwrap_err();
        match err {
            crate::error::ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("group.member_names"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_fragment_tightens_storage_block() {
        // The docker hosted adapter adds latest_policy to storage.
        let fragment = Block::new().attr("latest_policy", Attribute::optional(AttrType::Bool));
        let schema = compose(
            hosted_base().merge(Block::new().block("storage", fragment)),
            vec![],
        );
        assert!(schema.root.blocks["storage"]
            .attributes
            .contains_key("latest_policy"));
        // Base storage attributes survive the merge.
        assert!(schema.root.blocks["storage"]
            .attributes
            .contains_key("blob_store_name"));
    }
}
