//! huggingface format adapter. Proxy is the only server-side topology.

use super::format_adapter;

format_adapter!(HuggingfaceProxy, key: "huggingface", topology: Proxy, fragments: []);
