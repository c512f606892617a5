//! helm format adapters.

use super::format_adapter;

format_adapter!(HelmHosted, key: "helm", topology: Hosted, fragments: []);

format_adapter!(HelmProxy, key: "helm", topology: Proxy, fragments: []);
