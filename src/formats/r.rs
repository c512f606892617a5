//! r (CRAN) format adapters.

use super::format_adapter;

format_adapter!(RHosted, key: "r", topology: Hosted, fragments: []);

format_adapter!(RProxy, key: "r", topology: Proxy, fragments: []);

format_adapter!(RGroup, key: "r", topology: Group, fragments: []);
