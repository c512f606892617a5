//! pypi format adapters.

use super::format_adapter;
use crate::schema::{AttrType, Attribute, Block};

fn pypi_block() -> Block {
    Block::new().attr("remove_quarantined", Attribute::optional(AttrType::Bool))
}

format_adapter!(PypiHosted, key: "pypi", topology: Hosted, fragments: []);

format_adapter!(PypiProxy, key: "pypi", topology: Proxy,
    fragments: [("pypi", pypi_block())]);

format_adapter!(PypiGroup, key: "pypi", topology: Group, fragments: []);
