//! maven2 format adapters.
//!
//! The only format whose REST path segment (`maven`) differs from its
//! format key (`maven2`). Group repositories take no maven block.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block, Validator};

fn maven_block() -> Block {
    Block::required_block()
        .attr(
            "version_policy",
            Attribute::required(AttrType::String)
                .with_validator(Validator::OneOf(&["RELEASE", "SNAPSHOT", "MIXED"])),
        )
        .attr(
            "layout_policy",
            Attribute::required(AttrType::String)
                .with_validator(Validator::OneOf(&["STRICT", "PERMISSIVE"])),
        )
        .attr(
            "content_disposition",
            Attribute::required(AttrType::String)
                .with_validator(Validator::OneOf(&["INLINE", "ATTACHMENT"])),
        )
}

format_adapter!(MavenHosted, key: "maven2", path: "maven", topology: Hosted,
    fragments: [("maven", maven_block())]);

format_adapter!(MavenProxy, key: "maven2", path: "maven", topology: Proxy,
    fragments: [("maven", maven_block())]);

format_adapter!(MavenGroup, key: "maven2", path: "maven", topology: Group,
    fragments: []);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatAdapter;

    #[test]
    fn test_maven_block_is_required_for_hosted_and_proxy() {
        for schema in [MavenHosted.schema(), MavenProxy.schema()] {
            assert!(schema.root.blocks["maven"].required);
        }
        assert!(!MavenGroup.schema().root.blocks.contains_key("maven"));
    }

    #[test]
    fn test_version_policy_enum_enforced() {
        let err = MavenHosted
            .schema()
            .validate(&serde_json::json!({
                "name": "releases",
                "storage": {"blob_store_name": "default", "write_policy": "ALLOW_ONCE"},
                "maven": {
                    "version_policy": "LATEST",
                    "layout_policy": "STRICT",
                    "content_disposition": "INLINE"
                }
            }))
            .unwrap_err();
        assert!(err.to_string().contains("RELEASE"));
    }
}
