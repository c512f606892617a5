//! Repository model.
//!
//! `RepositorySpec` is the host-facing shape of a repository: the declared
//! plan, and after an apply, the persisted state. Field names match the
//! attribute names in the composed schema (snake_case); blocks absent from
//! the declaration stay absent in state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    Hosted,
    Proxy,
    Group,
}

impl Topology {
    /// Path segment and resource-type-name suffix for this topology.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Hosted => "hosted",
            Topology::Proxy => "proxy",
            Topology::Group => "group",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Declared/observed state of one repository.
///
/// At most one format-specific block is set per resource type; the schema
/// for each resource type only exposes its own block, so a well-formed host
/// value can never carry two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySpec {
    pub name: String,

    #[serde(default = "default_true")]
    pub online: bool,

    /// Computed: `<base-url>/repository/<name>`, filled after apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Computed: timestamp of the most recent successful create/update.
    /// Not part of identity; ignored on import verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    pub storage: Storage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<Cleanup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_cache: Option<NegativeCache>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_client: Option<HttpClient>,

    /// Name reference to a routing rule (proxy only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_rule: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication: Option<Replication>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,

    // Format-specific blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maven: Option<MavenAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_proxy: Option<DockerProxyAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt: Option<AptAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt_signing: Option<AptSigningAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yum: Option<YumAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuget_proxy: Option<NugetProxyAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conan: Option<ConanAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<CargoAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<NpmAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pypi: Option<PypiAttributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawAttributes>,
}

impl RepositorySpec {
    /// Minimal spec carrying only a name, the seed for the import path.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            online: true,
            url: None,
            last_updated: None,
            storage: Storage::default(),
            cleanup: None,
            component: None,
            proxy: None,
            negative_cache: None,
            http_client: None,
            routing_rule: None,
            replication: None,
            group: None,
            maven: None,
            docker: None,
            docker_proxy: None,
            apt: None,
            apt_signing: None,
            yum: None,
            nuget_proxy: None,
            conan: None,
            cargo: None,
            npm: None,
            pypi: None,
            raw: None,
        }
    }
}

/// Storage settings (mandatory for every topology)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub blob_store_name: String,

    #[serde(default = "default_true")]
    pub strict_content_type_validation: bool,

    /// Required for hosted repositories: ALLOW, ALLOW_ONCE, or DENY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_policy: Option<String>,

    /// Docker hosted only. Write-only on several server versions; the
    /// declared value is kept when the server omits it on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_policy: Option<bool>,
}

/// Cleanup policy references, applied by the server in the given order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cleanup {
    pub policy_names: Vec<String>,
}

/// Component settings (hosted only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub proprietary_components: bool,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            proprietary_components: false,
        }
    }
}

/// Proxy settings (proxy topology, required)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyAttributes {
    pub remote_url: String,

    #[serde(default = "default_content_max_age")]
    pub content_max_age: i64,

    #[serde(default = "default_content_max_age")]
    pub metadata_max_age: i64,
}

fn default_content_max_age() -> i64 {
    1440
}

/// Negative cache settings (proxy topology, required)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeCache {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_content_max_age")]
    pub time_to_live: i64,
}

/// Outbound HTTP client settings (proxy topology, required)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpClient {
    #[serde(default)]
    pub blocked: bool,

    #[serde(default = "default_true")]
    pub auto_block: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<HttpClientConnection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<HttpClientAuthentication>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpClientConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_circular_redirects: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cookies: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_trust_store: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpClientAuthentication {
    /// "username" or "ntlm"
    #[serde(rename = "type")]
    pub auth_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Never echoed by the server; the declared value is kept on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_domain: Option<String>,
}

/// Replication settings (proxy topology, optional)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replication {
    #[serde(default)]
    pub preemptive_pull_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_path_regex: Option<String>,
}

/// Group membership (group topology, required)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Compared as a set; must be non-empty and duplicate-free.
    pub member_names: Vec<String>,
}

// --- Format-specific blocks ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MavenAttributes {
    pub version_policy: String,
    pub layout_policy: String,
    pub content_disposition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerAttributes {
    #[serde(default)]
    pub force_basic_auth: bool,

    #[serde(default)]
    pub v1_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_port: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerProxyAttributes {
    /// HUB, REGISTRY, or CUSTOM
    pub index_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,

    #[serde(default)]
    pub cache_foreign_layers: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_layer_url_whitelist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AptAttributes {
    pub distribution: String,

    #[serde(default)]
    pub flat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AptSigningAttributes {
    /// PGP signing key pair. Never echoed by the server.
    pub key_pair: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YumAttributes {
    pub repo_data_depth: i64,

    /// PERMISSIVE or STRICT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NugetProxyAttributes {
    /// V2 or V3
    pub nuget_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_cache_item_max_age: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConanAttributes {
    /// V1 or V2
    pub conan_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoAttributes {
    #[serde(default)]
    pub require_authentication: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpmAttributes {
    #[serde(default)]
    pub remove_quarantined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PypiAttributes {
    #[serde(default)]
    pub remove_quarantined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttributes {
    /// ATTACHMENT or INLINE
    pub content_disposition: String,
}
