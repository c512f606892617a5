//! raw format adapters.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block, Validator};

fn raw_block() -> Block {
    Block::new().attr(
        "content_disposition",
        Attribute::optional(AttrType::String)
            .with_validator(Validator::OneOf(&["INLINE", "ATTACHMENT"])),
    )
}

format_adapter!(RawHosted, key: "raw", topology: Hosted,
    fragments: [("raw", raw_block())]);

format_adapter!(RawProxy, key: "raw", topology: Proxy,
    fragments: [("raw", raw_block())]);

format_adapter!(RawGroup, key: "raw", topology: Group,
    fragments: [("raw", raw_block())]);
