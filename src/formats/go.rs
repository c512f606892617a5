//! go format adapters. The server offers no hosted go topology.

use super::format_adapter;

format_adapter!(GoProxy, key: "go", topology: Proxy, fragments: []);

format_adapter!(GoGroup, key: "go", topology: Group, fragments: []);
