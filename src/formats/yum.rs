//! yum format adapters.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block, Validator};

fn yum_block() -> Block {
    Block::required_block()
        .attr(
            "repo_data_depth",
            Attribute::required(AttrType::Int).with_validator(Validator::IntBetween(0, 5)),
        )
        .attr(
            "deploy_policy",
            Attribute::optional(AttrType::String)
                .with_validator(Validator::OneOf(&["PERMISSIVE", "STRICT"])),
        )
}

format_adapter!(YumHosted, key: "yum", topology: Hosted,
    fragments: [("yum", yum_block())]);

format_adapter!(YumProxy, key: "yum", topology: Proxy, fragments: []);

format_adapter!(YumGroup, key: "yum", topology: Group, fragments: []);
