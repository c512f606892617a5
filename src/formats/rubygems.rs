//! rubygems format adapters.

use super::format_adapter;

format_adapter!(RubygemsHosted, key: "rubygems", topology: Hosted, fragments: []);

format_adapter!(RubygemsProxy, key: "rubygems", topology: Proxy, fragments: []);

format_adapter!(RubygemsGroup, key: "rubygems", topology: Group, fragments: []);
