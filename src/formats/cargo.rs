//! cargo format adapters.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block};

fn cargo_block() -> Block {
    Block::new().attr(
        "require_authentication",
        Attribute::optional(AttrType::Bool),
    )
}

format_adapter!(CargoHosted, key: "cargo", topology: Hosted,
    fragments: [("cargo", cargo_block())]);

format_adapter!(CargoProxy, key: "cargo", topology: Proxy,
    fragments: [("cargo", cargo_block())]);

format_adapter!(CargoGroup, key: "cargo", topology: Group,
    fragments: [("cargo", cargo_block())]);
