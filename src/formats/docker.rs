//! docker format adapters.
//!
//! Docker hosted tightens the common storage block with `latest_policy`;
//! the proxy variant adds the upstream index configuration.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block, Validator};

fn docker_block() -> Block {
    Block::required_block()
        .attr("force_basic_auth", Attribute::optional(AttrType::Bool))
        .attr("v1_enabled", Attribute::optional(AttrType::Bool))
        .attr(
            "http_port",
            Attribute::optional(AttrType::Int).with_validator(Validator::IntBetween(1, 65535)),
        )
        .attr(
            "https_port",
            Attribute::optional(AttrType::Int).with_validator(Validator::IntBetween(1, 65535)),
        )
        .attr("subdomain", Attribute::optional(AttrType::String))
        .attr("path_enabled", Attribute::optional(AttrType::Bool))
}

fn docker_proxy_block() -> Block {
    Block::required_block()
        .attr(
            "index_type",
            Attribute::required(AttrType::String)
                .with_validator(Validator::OneOf(&["HUB", "REGISTRY", "CUSTOM"])),
        )
        .attr(
            "index_url",
            Attribute::optional(AttrType::String)
                .with_validator(Validator::UrlWithScheme(&["http", "https"])),
        )
        .attr("cache_foreign_layers", Attribute::optional(AttrType::Bool))
        .attr(
            "foreign_layer_url_whitelist",
            Attribute::optional(AttrType::ListOfString),
        )
}

fn hosted_storage_fragment() -> Block {
    Block::required_block().attr("latest_policy", Attribute::optional(AttrType::Bool))
}

format_adapter!(DockerHosted, key: "docker", topology: Hosted,
    fragments: [("docker", docker_block()), ("storage", hosted_storage_fragment())]);

format_adapter!(DockerProxy, key: "docker", topology: Proxy,
    fragments: [("docker", docker_block()), ("docker_proxy", docker_proxy_block())]);

format_adapter!(DockerGroup, key: "docker", topology: Group,
    fragments: [("docker", docker_block())]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatAdapter;

    #[test]
    fn test_hosted_storage_gains_latest_policy() {
        let schema = DockerHosted.schema();
        let storage = &schema.root.blocks["storage"];
        assert!(storage.attributes.contains_key("latest_policy"));
        assert!(
            storage.attributes.contains_key("write_policy"),
            "tightening must not drop base attributes"
        );
    }

    #[test]
    fn test_proxy_requires_index_type() {
        let err = DockerProxy
            .schema()
            .validate(&serde_json::json!({
                "name": "docker-hub",
                "storage": {"blob_store_name": "default"},
                "proxy": {"remote_url": "https://registry-1.docker.io"},
                "negative_cache": {"enabled": true, "time_to_live": 1440},
                "http_client": {"blocked": false, "auto_block": true},
                "docker": {"force_basic_auth": true, "v1_enabled": false},
                "docker_proxy": {}
            }))
            .unwrap_err();
        assert!(err.to_string().contains("required"));
    }
}
