//! terraform format adapter. Proxy is the only server-side topology.

use super::format_adapter;

format_adapter!(TerraformProxy, key: "terraform", topology: Proxy, fragments: []);
