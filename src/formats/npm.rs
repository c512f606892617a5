//! npm format adapters.
//!
//! Only the proxy variant carries an npm block (Firewall quarantine
//! handling); hosted and group are plain.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block};

fn npm_block() -> Block {
    Block::new().attr("remove_quarantined", Attribute::optional(AttrType::Bool))
}

format_adapter!(NpmHosted, key: "npm", topology: Hosted, fragments: []);

format_adapter!(NpmProxy, key: "npm", topology: Proxy,
    fragments: [("npm", npm_block())]);

format_adapter!(NpmGroup, key: "npm", topology: Group, fragments: []);
