//! composer format adapters.

use super::format_adapter;

format_adapter!(ComposerHosted, key: "composer", topology: Hosted, fragments: []);

format_adapter!(ComposerProxy, key: "composer", topology: Proxy, fragments: []);
