//! Format adapters: one capability object per (format, topology) pair.
//!
//! The reconciliation engine is generic over `FormatAdapter`; the default
//! trait methods carry all shared behavior, so a per-format file only names
//! its key, endpoint segment, topology, and schema fragments.

pub mod apt;
pub mod cargo;
pub mod cocoapods;
pub mod composer;
pub mod conan;
pub mod conda;
pub mod docker;
pub mod gitlfs;
pub mod go;
pub mod helm;
pub mod huggingface;
pub mod maven;
pub mod npm;
pub mod nuget;
pub mod p2;
pub mod pypi;
pub mod r;
pub mod raw;
pub mod rubygems;
pub mod terraform;
pub mod yum;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{ApiRepository, HttpResponse, NexusClient};
use crate::error::{classify_status, ProviderError, Result};
use crate::models::repository::Component;
use crate::models::{RepositorySpec, Topology};
use crate::schema::{compose, group_base, hosted_base, proxy_base, Block, Schema};

/// Lifecycle operation, used to select declared success statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Capability object driving the reconciliation engine for one
/// (format, topology) pair. Stateless; constructed once at provider init.
#[async_trait]
pub trait FormatAdapter: Send + Sync {
    /// Format key as the host sees it (e.g. `maven2`).
    fn key(&self) -> &'static str;

    /// REST path segment under `/v1/repositories/`. Matches the key for
    /// every format except maven2, whose segment is `maven`.
    fn endpoint_format(&self) -> &'static str {
        self.key()
    }

    fn topology(&self) -> Topology;

    /// Resource type name advertised to the host.
    fn resource_type_name(&self) -> String {
        format!(
            "{}_repository_{}_{}",
            crate::provider::PROVIDER_PREFIX,
            self.key(),
            self.topology()
        )
    }

    /// Format-specific schema fragments, merged over the topology base.
    /// A fragment sharing a name with a base block tightens it.
    fn format_attributes(&self) -> Vec<(&'static str, Block)> {
        Vec::new()
    }

    /// The composed attribute schema for this resource type.
    fn schema(&self) -> Schema {
        let base = match self.topology() {
            Topology::Hosted => hosted_base(),
            Topology::Proxy => proxy_base(),
            Topology::Group => group_base(),
        };
        compose(base, self.format_attributes())
    }

    /// Success statuses per operation. Endpoint-dependent; the shared
    /// defaults cover every current server endpoint.
    fn success_status_codes(&self, op: Operation) -> &'static [u16] {
        match op {
            Operation::Create => &[200, 201, 204],
            Operation::Read => &[200],
            Operation::Update => &[200, 204],
            Operation::Delete => &[204],
        }
    }

    /// Cross-field constraints not expressible attribute-by-attribute.
    /// Runs post-parse, before any API call.
    fn validate(&self, spec: &RepositorySpec) -> Result<()> {
        validate_for_topology(self.topology(), spec)
    }

    /// Decode a declared plan from the host, running schema validation and
    /// the cross-field checks.
    fn plan_from_host_input(&self, raw: &Value) -> Result<RepositorySpec> {
        self.schema().validate(raw)?;
        let spec: RepositorySpec = serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::validation(format!("invalid plan: {e}")))?;
        self.validate(&spec)?;
        Ok(spec)
    }

    /// Decode a previously persisted state. States were validated when they
    /// were written, so only the shape is checked.
    fn state_from_host_input(&self, raw: &Value) -> Result<RepositorySpec> {
        serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::validation(format!("invalid state: {e}")))
    }

    /// Merge an authoritative server response into a prior state. Hosted
    /// state always carries a component block, even when the server omits
    /// it and the prior state (an import seed) never had one.
    fn state_from_api(&self, prior: &RepositorySpec, api: &ApiRepository) -> RepositorySpec {
        let mut spec = api.merge_into_spec(prior);
        if self.topology() == Topology::Hosted && spec.component.is_none() {
            spec.component = Some(Component::default());
        }
        spec
    }

    /// Promote known-after-apply fields into the state after a successful
    /// create or update.
    fn plan_to_state(&self, spec: &mut RepositorySpec, base_url: &str) {
        if spec.url.is_none() {
            spec.url = Some(format!("{}/repository/{}", base_url, spec.name));
        }
        spec.last_updated = Some(chrono::Utc::now());
        if self.topology() == Topology::Hosted && spec.component.is_none() {
            spec.component = Some(Component::default());
        }
    }

    async fn api_create(&self, client: &NexusClient, spec: &RepositorySpec) -> Result<()> {
        let path = NexusClient::repository_path(self.endpoint_format(), self.topology(), None);
        let response = client.post_json(&path, &ApiRepository::from_spec(spec)).await?;
        self.expect_success(response, Operation::Create, &spec.name)?;
        Ok(())
    }

    async fn api_read(&self, client: &NexusClient, name: &str) -> Result<ApiRepository> {
        let path = NexusClient::repository_path(self.endpoint_format(), self.topology(), Some(name));
        let response = client.get(&path).await?;
        let response = self.expect_success(response, Operation::Read, name)?;
        response.json()
    }

    async fn api_update(
        &self,
        client: &NexusClient,
        name: &str,
        spec: &RepositorySpec,
    ) -> Result<()> {
        let path = NexusClient::repository_path(self.endpoint_format(), self.topology(), Some(name));
        let response = client.put_json(&path, &ApiRepository::from_spec(spec)).await?;
        self.expect_success(response, Operation::Update, name)?;
        Ok(())
    }

    async fn api_delete(&self, client: &NexusClient, name: &str) -> Result<()> {
        let path = NexusClient::repository_path(self.endpoint_format(), self.topology(), Some(name));
        let response = client.delete(&path).await?;
        self.expect_success(response, Operation::Delete, name)?;
        Ok(())
    }

    /// Classify a response that is not in the declared success set.
    fn expect_success(
        &self,
        response: HttpResponse,
        op: Operation,
        name: &str,
    ) -> Result<HttpResponse> {
        if self.success_status_codes(op).contains(&response.status) {
            Ok(response)
        } else {
            let context = format!(
                "{} {} repository {name}",
                self.key(),
                self.topology()
            );
            Err(classify_status(response.status, &response.body, &context))
        }
    }
}

/// Shared cross-field validation per topology. Schema validation already
/// covers per-attribute bounds; this catches constraints that need the
/// parsed value.
pub fn validate_for_topology(topology: Topology, spec: &RepositorySpec) -> Result<()> {
    match topology {
        Topology::Hosted => {
            if spec.storage.write_policy.is_none() {
                return Err(ProviderError::validation_at(
                    "storage.write_policy",
                    "is required for hosted repositories",
                ));
            }
        }
        Topology::Proxy => {
            let proxy = spec.proxy.as_ref().ok_or_else(|| {
                ProviderError::validation_at("proxy", "block is required for proxy repositories")
            })?;
            let parsed = url::Url::parse(&proxy.remote_url).map_err(|e| {
                ProviderError::validation_at("proxy.remote_url", format!("not a valid URL: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ProviderError::validation_at(
                    "proxy.remote_url",
                    format!("scheme must be http or https, got {:?}", parsed.scheme()),
                ));
            }
            if spec.negative_cache.is_none() {
                return Err(ProviderError::validation_at(
                    "negative_cache",
                    "block is required for proxy repositories",
                ));
            }
            if spec.http_client.is_none() {
                return Err(ProviderError::validation_at(
                    "http_client",
                    "block is required for proxy repositories",
                ));
            }
        }
        Topology::Group => {
            let group = spec.group.as_ref().ok_or_else(|| {
                ProviderError::validation_at("group", "block is required for group repositories")
            })?;
            if group.member_names.is_empty() {
                return Err(ProviderError::validation_at(
                    "group.member_names",
                    "must contain at least one member repository",
                ));
            }
            let unique: BTreeSet<_> = group.member_names.iter().collect();
            if unique.len() != group.member_names.len() {
                return Err(ProviderError::validation_at(
                    "group.member_names",
                    "member names must be unique",
                ));
            }
        }
    }
    Ok(())
}

/// Declare a format adapter with no behavior overrides.
macro_rules! format_adapter {
    ($(#[$meta:meta])* $name:ident, key: $key:literal, topology: $topology:ident) => {
        format_adapter!($(#[$meta])* $name, key: $key, path: $key, topology: $topology, fragments: []);
    };
    ($(#[$meta:meta])* $name:ident, key: $key:literal, topology: $topology:ident,
     fragments: [$( ($block_name:literal, $block:expr) ),* $(,)?]) => {
        format_adapter!($(#[$meta])* $name, key: $key, path: $key, topology: $topology,
                        fragments: [$( ($block_name, $block) ),*]);
    };
    ($(#[$meta:meta])* $name:ident, key: $key:literal, path: $path:literal, topology: $topology:ident,
     fragments: [$( ($block_name:literal, $block:expr) ),* $(,)?]) => {
        $(#[$meta])*
        pub struct $name;

        impl $crate::formats::FormatAdapter for $name {
            fn key(&self) -> &'static str {
                $key
            }

            fn endpoint_format(&self) -> &'static str {
                $path
            }

            fn topology(&self) -> $crate::models::Topology {
                $crate::models::Topology::$topology
            }

            #[allow(unused_mut)]
            fn format_attributes(&self) -> Vec<(&'static str, $crate::schema::Block)> {
                let mut fragments: Vec<(&'static str, $crate::schema::Block)> = Vec::new();
                $( fragments.push(($block_name, $block)); )*
                fragments
            }
        }
    };
}

pub(crate) use format_adapter;

/// Every supported adapter, in registration order. The provider builds its
/// resource table from this list once at init.
pub fn all_adapters() -> Vec<Arc<dyn FormatAdapter>> {
    vec![
        // hosted + proxy
        Arc::new(apt::AptHosted),
        Arc::new(apt::AptProxy),
        Arc::new(composer::ComposerHosted),
        Arc::new(composer::ComposerProxy),
        Arc::new(conan::ConanHosted),
        Arc::new(conan::ConanProxy),
        Arc::new(helm::HelmHosted),
        Arc::new(helm::HelmProxy),
        // hosted + proxy + group
        Arc::new(cargo::CargoHosted),
        Arc::new(cargo::CargoProxy),
        Arc::new(cargo::CargoGroup),
        Arc::new(docker::DockerHosted),
        Arc::new(docker::DockerProxy),
        Arc::new(docker::DockerGroup),
        Arc::new(maven::MavenHosted),
        Arc::new(maven::MavenProxy),
        Arc::new(maven::MavenGroup),
        Arc::new(npm::NpmHosted),
        Arc::new(npm::NpmProxy),
        Arc::new(npm::NpmGroup),
        Arc::new(nuget::NugetHosted),
        Arc::new(nuget::NugetProxy),
        Arc::new(nuget::NugetGroup),
        Arc::new(pypi::PypiHosted),
        Arc::new(pypi::PypiProxy),
        Arc::new(pypi::PypiGroup),
        Arc::new(r::RHosted),
        Arc::new(r::RProxy),
        Arc::new(r::RGroup),
        Arc::new(raw::RawHosted),
        Arc::new(raw::RawProxy),
        Arc::new(raw::RawGroup),
        Arc::new(rubygems::RubygemsHosted),
        Arc::new(rubygems::RubygemsProxy),
        Arc::new(rubygems::RubygemsGroup),
        Arc::new(yum::YumHosted),
        Arc::new(yum::YumProxy),
        Arc::new(yum::YumGroup),
        // proxy + group
        Arc::new(go::GoProxy),
        Arc::new(go::GoGroup),
        // proxy only
        Arc::new(cocoapods::CocoapodsProxy),
        Arc::new(conda::CondaProxy),
        Arc::new(huggingface::HuggingfaceProxy),
        Arc::new(p2::P2Proxy),
        Arc::new(terraform::TerraformProxy),
        // hosted only
        Arc::new(gitlfs::GitlfsHosted),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::repository::{Group, Storage};
    use serde_json::json;

    #[test]
    fn test_registry_has_no_duplicate_type_names() {
        let adapters = all_adapters();
        let names: BTreeSet<String> = adapters.iter().map(|a| a.resource_type_name()).collect();
        assert_eq!(names.len(), adapters.len(), "duplicate resource type name");
    }

    #[test]
    fn test_every_adapter_schema_composes() {
        for adapter in all_adapters() {
            let schema = adapter.schema();
            assert!(
                schema.root.attributes.contains_key("name"),
                "{} lost the name attribute",
                adapter.resource_type_name()
            );
            assert!(
                schema.root.blocks.contains_key("storage"),
                "{} lost the storage block",
                adapter.resource_type_name()
            );
        }
    }

    #[test]
    fn test_group_validation_rejects_duplicates() {
        let mut spec = RepositorySpec::named("all-npm");
        spec.storage = Storage {
            blob_store_name: "default".into(),
            strict_content_type_validation: true,
            write_policy: None,
            latest_policy: None,
        };
        spec.group = Some(Group {
            member_names: vec!["npm-hosted".into(), "npm-hosted".into()],
        });
        let err = validate_for_topology(Topology::Group, &spec).unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("group.member_names"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_group_plan_rejected_before_parse() {
        let adapter = npm::NpmGroup;
        let err = adapter
            .plan_from_host_input(&json!({
                "name": "all-npm",
                "storage": {"blob_store_name": "default"},
                "group": {"member_names": []}
            }))
            .unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("group.member_names"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_proxy_plan_rejects_non_http_remote_url() {
        let adapter = maven::MavenProxy;
        let err = adapter
            .plan_from_host_input(&json!({
                "name": "central",
                "storage": {"blob_store_name": "default"},
                "proxy": {"remote_url": "ftp://mirror.example.com/maven2"},
                "negative_cache": {"enabled": true, "time_to_live": 1440},
                "http_client": {"blocked": false, "auto_block": true},
                "maven": {
                    "version_policy": "RELEASE",
                    "layout_policy": "STRICT",
                    "content_disposition": "ATTACHMENT"
                }
            }))
            .unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("proxy.remote_url"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_maven2_uses_maven_path_segment() {
        let adapter = maven::MavenHosted;
        assert_eq!(adapter.key(), "maven2");
        assert_eq!(adapter.endpoint_format(), "maven");
        assert_eq!(adapter.resource_type_name(), "nexus_repository_maven2_hosted");
    }

    #[test]
    fn test_plan_to_state_fills_computed_fields() {
        let adapter = npm::NpmHosted;
        let mut spec = RepositorySpec::named("npm-internal");
        adapter.plan_to_state(&mut spec, "https://nexus.example.com");
        assert_eq!(
            spec.url.as_deref(),
            Some("https://nexus.example.com/repository/npm-internal")
        );
        assert!(spec.last_updated.is_some());
        assert_eq!(
            spec.component,
            Some(Component {
                proprietary_components: false
            }),
            "hosted state always carries the component default"
        );
    }
}
