//! conan format adapters.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block, Validator};

fn conan_block() -> Block {
    Block::required_block().attr(
        "conan_version",
        Attribute::required(AttrType::String).with_validator(Validator::OneOf(&["V1", "V2"])),
    )
}

format_adapter!(ConanHosted, key: "conan", topology: Hosted, fragments: []);

format_adapter!(ConanProxy, key: "conan", topology: Proxy,
    fragments: [("conan", conan_block())]);
