//! conda format adapter. Proxy is the only server-side topology.

use super::format_adapter;

format_adapter!(CondaProxy, key: "conda", topology: Proxy, fragments: []);
