//! cocoapods format adapter. Proxy is the only server-side topology.

use super::format_adapter;

format_adapter!(CocoapodsProxy, key: "cocoapods", topology: Proxy, fragments: []);
