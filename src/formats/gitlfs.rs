//! gitlfs format adapter. Hosted is the only server-side topology.

use super::format_adapter;

format_adapter!(GitlfsHosted, key: "gitlfs", topology: Hosted, fragments: []);
