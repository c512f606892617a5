//! Sonatype Nexus Repository REST API client.
//!
//! Wraps the server's `/service/rest/v1` surface with basic auth and
//! per-request timeouts. The wire DTOs mirror the server's OpenAPI types
//! (camelCase); conversions to and from the host-facing `RepositorySpec`
//! live here so the engine never names a wire shape.

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::models::repository::{
    AptAttributes, AptSigningAttributes, CargoAttributes, Cleanup, Component, ConanAttributes,
    DockerAttributes, DockerProxyAttributes, Group, HttpClient, HttpClientAuthentication,
    HttpClientConnection, MavenAttributes, NegativeCache, NpmAttributes, NugetProxyAttributes,
    ProxyAttributes, PypiAttributes, RawAttributes, Replication, RepositorySpec, Storage,
    YumAttributes,
};
use crate::models::Topology;

/// A raw HTTP outcome: status plus body, for the caller to classify.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Nexus REST API client, shared immutably by every resource instance.
pub struct NexusClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl NexusClient {
    /// Build a client from the provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(pem) = &config.ca_certificate {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes())
                .map_err(|e| ProviderError::validation_at("ca_certificate", e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }
        if config.insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build()?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Server base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Repository endpoint path for a (format, topology) pair.
    ///
    /// `format_segment` is the REST path segment, which matches the format
    /// key except for maven2 (path segment `maven`).
    pub fn repository_path(format_segment: &str, topology: Topology, name: Option<&str>) -> String {
        match name {
            Some(name) => format!(
                "/service/rest/v1/repositories/{format_segment}/{topology}/{name}"
            ),
            None => format!("/service/rest/v1/repositories/{format_segment}/{topology}"),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "nexus request");
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<HttpResponse> {
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<HttpResponse> {
        self.execute(self.request(Method::POST, path).json(body))
            .await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<HttpResponse> {
        self.execute(self.request(Method::PUT, path).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<HttpResponse> {
        self.execute(self.request(Method::DELETE, path)).await
    }
}

// --- Wire DTOs (server OpenAPI shapes) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRepository {
    pub name: String,

    /// Response only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Response only.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<String>,

    /// Response only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub online: bool,

    pub storage: ApiStorage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<ApiCleanup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ApiComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ApiProxy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_cache: Option<ApiNegativeCache>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_client: Option<ApiHttpClient>,

    /// Request field: routing rule name reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_rule: Option<String>,

    /// Response field: the server echoes the reference under this name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_rule_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication: Option<ApiReplication>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ApiGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maven: Option<ApiMaven>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<ApiDocker>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_proxy: Option<ApiDockerProxy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt: Option<ApiApt>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt_signing: Option<ApiAptSigning>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yum: Option<ApiYum>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuget_proxy: Option<ApiNugetProxy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conan: Option<ApiConan>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<ApiCargo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<ApiNpm>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pypi: Option<ApiPypi>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<ApiRaw>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStorage {
    pub blob_store_name: String,
    pub strict_content_type_validation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_policy: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCleanup {
    #[serde(default)]
    pub policy_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiComponent {
    pub proprietary_components: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProxy {
    pub remote_url: String,
    pub content_max_age: i64,
    pub metadata_max_age: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNegativeCache {
    pub enabled: bool,
    pub time_to_live: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHttpClient {
    pub blocked: bool,
    pub auto_block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ApiHttpClientConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ApiHttpClientAuthentication>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHttpClientConnection {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHttpClientAuthentication {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Write-only; the server never echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReplication {
    pub preemptive_pull_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_path_regex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    pub member_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMaven {
    pub version_policy: String,
    pub layout_policy: String,
    pub content_disposition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocker {
    pub force_basic_auth: bool,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDockerProxy {
    pub index_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
    pub cache_foreign_layers: bool,
    #[serde(default)]
    pub foreign_layer_url_whitelist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiApt {
    pub distribution: String,
    pub flat: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAptSigning {
    pub keypair: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiYum {
    pub repodata_depth: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_policy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNugetProxy {
    pub nuget_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_cache_item_max_age: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConan {
    pub conan_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCargo {
    pub require_authentication: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNpm {
    pub remove_quarantined: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPypi {
    pub remove_quarantined: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRaw {
    pub content_disposition: String,
}

// --- Conversions between the host-facing spec and the wire shape ---

impl ApiRepository {
    /// Build the create/update request body from a declared spec.
    pub fn from_spec(spec: &RepositorySpec) -> Self {
        Self {
            name: spec.name.clone(),
            format: None,
            repo_type: None,
            url: None,
            online: spec.online,
            storage: ApiStorage {
                blob_store_name: spec.storage.blob_store_name.clone(),
                strict_content_type_validation: spec.storage.strict_content_type_validation,
                write_policy: spec.storage.write_policy.clone(),
                latest_policy: spec.storage.latest_policy,
            },
            cleanup: spec.cleanup.as_ref().map(|c| ApiCleanup {
                policy_names: c.policy_names.clone(),
            }),
            component: spec.component.as_ref().map(|c| ApiComponent {
                proprietary_components: c.proprietary_components,
            }),
            proxy: spec.proxy.as_ref().map(|p| ApiProxy {
                remote_url: p.remote_url.clone(),
                content_max_age: p.content_max_age,
                metadata_max_age: p.metadata_max_age,
            }),
            negative_cache: spec.negative_cache.as_ref().map(|n| ApiNegativeCache {
                enabled: n.enabled,
                time_to_live: n.time_to_live,
            }),
            http_client: spec.http_client.as_ref().map(|h| ApiHttpClient {
                blocked: h.blocked,
                auto_block: h.auto_block,
                connection: h.connection.as_ref().map(|c| ApiHttpClientConnection {
                    retries: c.retries,
                    timeout: c.timeout,
                    enable_circular_redirects: c.enable_circular_redirects,
                    enable_cookies: c.enable_cookies,
                    use_trust_store: c.use_trust_store,
                    user_agent_suffix: c.user_agent_suffix.clone(),
                }),
                authentication: h
                    .authentication
                    .as_ref()
                    .map(|a| ApiHttpClientAuthentication {
                        auth_type: a.auth_type.clone(),
                        username: a.username.clone(),
                        password: a.password.clone(),
                        ntlm_host: a.ntlm_host.clone(),
                        ntlm_domain: a.ntlm_domain.clone(),
                    }),
            }),
            routing_rule: spec.routing_rule.clone(),
            routing_rule_name: None,
            replication: spec.replication.as_ref().map(|r| ApiReplication {
                preemptive_pull_enabled: r.preemptive_pull_enabled,
                asset_path_regex: r.asset_path_regex.clone(),
            }),
            group: spec.group.as_ref().map(|g| ApiGroup {
                member_names: g.member_names.clone(),
            }),
            maven: spec.maven.as_ref().map(|m| ApiMaven {
                version_policy: m.version_policy.clone(),
                layout_policy: m.layout_policy.clone(),
                content_disposition: m.content_disposition.clone(),
            }),
            docker: spec.docker.as_ref().map(|d| ApiDocker {
                force_basic_auth: d.force_basic_auth,
                v1_enabled: d.v1_enabled,
                http_port: d.http_port,
                https_port: d.https_port,
                subdomain: d.subdomain.clone(),
                path_enabled: d.path_enabled,
            }),
            docker_proxy: spec.docker_proxy.as_ref().map(|d| ApiDockerProxy {
                index_type: d.index_type.clone(),
                index_url: d.index_url.clone(),
                cache_foreign_layers: d.cache_foreign_layers,
                foreign_layer_url_whitelist: d.foreign_layer_url_whitelist.clone(),
            }),
            apt: spec.apt.as_ref().map(|a| ApiApt {
                distribution: a.distribution.clone(),
                flat: a.flat,
            }),
            apt_signing: spec.apt_signing.as_ref().map(|a| ApiAptSigning {
                keypair: a.key_pair.clone(),
                passphrase: a.passphrase.clone(),
            }),
            yum: spec.yum.as_ref().map(|y| ApiYum {
                repodata_depth: y.repo_data_depth,
                deploy_policy: y.deploy_policy.clone(),
            }),
            nuget_proxy: spec.nuget_proxy.as_ref().map(|n| ApiNugetProxy {
                nuget_version: n.nuget_version.clone(),
                query_cache_item_max_age: n.query_cache_item_max_age,
            }),
            conan: spec.conan.as_ref().map(|c| ApiConan {
                conan_version: c.conan_version.clone(),
            }),
            cargo: spec.cargo.as_ref().map(|c| ApiCargo {
                require_authentication: c.require_authentication,
            }),
            npm: spec.npm.as_ref().map(|n| ApiNpm {
                remove_quarantined: n.remove_quarantined,
            }),
            pypi: spec.pypi.as_ref().map(|p| ApiPypi {
                remove_quarantined: p.remove_quarantined,
            }),
            raw: spec.raw.as_ref().map(|r| ApiRaw {
                content_disposition: r.content_disposition.clone(),
            }),
        }
    }

    /// Merge this authoritative server response into a prior state.
    ///
    /// The server wins everywhere it answers. Write-only fields the server
    /// omits (`storage.latest_policy`, `apt_signing`, authentication
    /// passwords) and client-side defaults (`component`) keep the prior
    /// declared value instead of flipping to null. Blocks the server omits
    /// stay absent; an empty cleanup list normalizes to an absent block.
    pub fn merge_into_spec(&self, prior: &RepositorySpec) -> RepositorySpec {
        let mut spec = RepositorySpec::named(&self.name);
        spec.online = self.online;
        spec.url = self.url.clone();
        spec.last_updated = prior.last_updated;

        spec.storage = Storage {
            blob_store_name: self.storage.blob_store_name.clone(),
            strict_content_type_validation: self.storage.strict_content_type_validation,
            write_policy: self.storage.write_policy.clone(),
            latest_policy: self.storage.latest_policy.or(prior.storage.latest_policy),
        };

        spec.cleanup = self.cleanup.as_ref().and_then(|c| {
            if c.policy_names.is_empty() {
                None
            } else {
                Some(Cleanup {
                    policy_names: c.policy_names.clone(),
                })
            }
        });

        spec.component = self
            .component
            .as_ref()
            .map(|c| Component {
                proprietary_components: c.proprietary_components,
            })
            .or_else(|| prior.component.clone());

        spec.proxy = self.proxy.as_ref().map(|p| ProxyAttributes {
            remote_url: p.remote_url.clone(),
            content_max_age: p.content_max_age,
            metadata_max_age: p.metadata_max_age,
        });

        spec.negative_cache = self.negative_cache.as_ref().map(|n| NegativeCache {
            enabled: n.enabled,
            time_to_live: n.time_to_live,
        });

        spec.http_client = self.http_client.as_ref().map(|h| HttpClient {
            blocked: h.blocked,
            auto_block: h.auto_block,
            connection: h.connection.as_ref().map(|c| HttpClientConnection {
                retries: c.retries,
                timeout: c.timeout,
                enable_circular_redirects: c.enable_circular_redirects,
                enable_cookies: c.enable_cookies,
                use_trust_store: c.use_trust_store,
                user_agent_suffix: c.user_agent_suffix.clone(),
            }),
            authentication: h.authentication.as_ref().map(|a| HttpClientAuthentication {
                auth_type: a.auth_type.clone(),
                username: a.username.clone(),
                password: a.password.clone().or_else(|| {
                    prior
                        .http_client
                        .as_ref()
                        .and_then(|ph| ph.authentication.as_ref())
                        .and_then(|pa| pa.password.clone())
                }),
                ntlm_host: a.ntlm_host.clone(),
                ntlm_domain: a.ntlm_domain.clone(),
            }),
        });

        spec.routing_rule = self
            .routing_rule_name
            .clone()
            .or_else(|| self.routing_rule.clone());

        spec.replication = self.replication.as_ref().map(|r| Replication {
            preemptive_pull_enabled: r.preemptive_pull_enabled,
            asset_path_regex: r.asset_path_regex.clone(),
        });

        spec.group = self.group.as_ref().map(|g| Group {
            member_names: g.member_names.clone(),
        });

        spec.maven = self.maven.as_ref().map(|m| MavenAttributes {
            version_policy: m.version_policy.clone(),
            layout_policy: m.layout_policy.clone(),
            content_disposition: m.content_disposition.clone(),
        });

        spec.docker = self.docker.as_ref().map(|d| DockerAttributes {
            force_basic_auth: d.force_basic_auth,
            v1_enabled: d.v1_enabled,
            http_port: d.http_port,
            https_port: d.https_port,
            subdomain: d.subdomain.clone(),
            path_enabled: d.path_enabled,
        });

        spec.docker_proxy = self.docker_proxy.as_ref().map(|d| DockerProxyAttributes {
            index_type: d.index_type.clone(),
            index_url: d.index_url.clone(),
            cache_foreign_layers: d.cache_foreign_layers,
            foreign_layer_url_whitelist: d.foreign_layer_url_whitelist.clone(),
        });

        spec.apt = self.apt.as_ref().map(|a| AptAttributes {
            distribution: a.distribution.clone(),
            flat: a.flat,
        });

        // Signing keys are never echoed by the server.
        spec.apt_signing = self
            .apt_signing
            .as_ref()
            .map(|a| AptSigningAttributes {
                key_pair: a.keypair.clone(),
                passphrase: a.passphrase.clone(),
            })
            .or_else(|| prior.apt_signing.clone());

        spec.yum = self.yum.as_ref().map(|y| YumAttributes {
            repo_data_depth: y.repodata_depth,
            deploy_policy: y.deploy_policy.clone(),
        });

        spec.nuget_proxy = self.nuget_proxy.as_ref().map(|n| NugetProxyAttributes {
            nuget_version: n.nuget_version.clone(),
            query_cache_item_max_age: n.query_cache_item_max_age,
        });

        spec.conan = self.conan.as_ref().map(|c| ConanAttributes {
            conan_version: c.conan_version.clone(),
        });

        spec.cargo = self.cargo.as_ref().map(|c| CargoAttributes {
            require_authentication: c.require_authentication,
        });

        spec.npm = self.npm.as_ref().map(|n| NpmAttributes {
            remove_quarantined: n.remove_quarantined,
        });

        spec.pypi = self.pypi.as_ref().map(|p| PypiAttributes {
            remove_quarantined: p.remove_quarantined,
        });

        spec.raw = self.raw.as_ref().map(|r| RawAttributes {
            content_disposition: r.content_disposition.clone(),
        });

        spec
    }
}
