//! nuget format adapters.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block, Validator};

fn nuget_proxy_block() -> Block {
    Block::required_block()
        .attr(
            "nuget_version",
            Attribute::required(AttrType::String)
                .with_validator(Validator::OneOf(&["V2", "V3"])),
        )
        .attr(
            "query_cache_item_max_age",
            Attribute::optional(AttrType::Int).with_validator(Validator::IntAtLeast(0)),
        )
}

format_adapter!(NugetHosted, key: "nuget", topology: Hosted, fragments: []);

format_adapter!(NugetProxy, key: "nuget", topology: Proxy,
    fragments: [("nuget_proxy", nuget_proxy_block())]);

format_adapter!(NugetGroup, key: "nuget", topology: Group, fragments: []);
