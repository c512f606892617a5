//! p2 format adapter. Proxy is the only server-side topology.

use super::format_adapter;

format_adapter!(P2Proxy, key: "p2", topology: Proxy, fragments: []);
