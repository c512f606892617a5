//! apt format adapters.
//!
//! Hosted apt repositories require a signing key pair; the server never
//! echoes it back, so reads keep the declared value.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block};

fn apt_block() -> Block {
    Block::required_block()
        .attr("distribution", Attribute::required(AttrType::String))
        .attr("flat", Attribute::optional(AttrType::Bool))
}

fn apt_signing_block() -> Block {
    Block::required_block()
        .attr(
            "key_pair",
            Attribute::required(AttrType::String).sensitive(),
        )
        .attr(
            "passphrase",
            Attribute::optional(AttrType::String).sensitive(),
        )
}

format_adapter!(AptHosted, key: "apt", topology: Hosted,
    fragments: [("apt", apt_block()), ("apt_signing", apt_signing_block())]);

format_adapter!(AptProxy, key: "apt", topology: Proxy,
    fragments: [("apt", apt_block())]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatAdapter;

    #[test]
    fn test_hosted_requires_signing_block() {
        let err = AptHosted
            .schema()
            .validate(&serde_json::json!({
                "name": "debian-internal",
                "storage": {"blob_store_name": "default", "write_policy": "ALLOW"},
                "apt": {"distribution": "bookworm"}
            }))
            .unwrap_err();
        assert!(err.to_string().contains("apt_signing") || err.to_string().contains("required"));
    }
}
