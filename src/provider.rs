//! Provider surface: the resource type table and lifecycle dispatch the
//! plugin transport calls into.
//!
//! Everything here is built once at configure time; the client and the
//! table are immutable afterwards, so no locking is needed across resource
//! instances.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::NexusClient;
use crate::config::ProviderConfig;
use crate::engine::{self, LifecycleOutcome};
use crate::error::{error_diagnostic, Diagnostics, ProviderError, Result};
use crate::formats::{self, FormatAdapter};
use crate::moved::{Deprecation, StateMover};
use crate::resources::{cleanup_policy, routing_rule};
use crate::schema::Schema;

/// Prefix of every advertised resource type name.
pub const PROVIDER_PREFIX: &str = "nexus";

enum ResourceKind {
    Repository(Arc<dyn FormatAdapter>),
    CleanupPolicy,
    RoutingRule,
}

/// One advertised resource type.
pub struct ResourceRegistration {
    pub type_name: String,
    pub schema: Schema,
    pub deprecation: Option<Deprecation>,
    kind: ResourceKind,
}

/// The configured provider.
pub struct Provider {
    client: NexusClient,
    resources: BTreeMap<String, ResourceRegistration>,
    movers: Vec<StateMover>,
}

/// Renamed resource families: (old format segment, new format key).
const RENAMED_FORMATS: &[(&str, &str)] = &[("maven", "maven2"), ("ruby_gems", "rubygems")];

fn repository_type_name(format_key: &str, topology: &str) -> String {
    format!("{PROVIDER_PREFIX}_repository_{format_key}_{topology}")
}

fn build_resource_table() -> BTreeMap<String, ResourceRegistration> {
    let mut table = BTreeMap::new();

    for adapter in formats::all_adapters() {
        let type_name = adapter.resource_type_name();
        table.insert(
            type_name.clone(),
            ResourceRegistration {
                type_name: type_name.clone(),
                schema: adapter.schema(),
                deprecation: None,
                kind: ResourceKind::Repository(Arc::clone(&adapter)),
            },
        );

        // Twin registration: a deprecated alias with the identical schema
        // plus a marker pointing at the new name.
        for (old_key, new_key) in RENAMED_FORMATS {
            if adapter.key() == *new_key {
                let old_name = repository_type_name(old_key, adapter.topology().as_str());
                table.insert(
                    old_name.clone(),
                    ResourceRegistration {
                        type_name: old_name.clone(),
                        schema: adapter.schema(),
                        deprecation: Some(Deprecation::replaced_by(&old_name, &type_name)),
                        kind: ResourceKind::Repository(Arc::clone(&adapter)),
                    },
                );
            }
        }
    }

    table.insert(
        format!("{PROVIDER_PREFIX}_cleanup_policy"),
        ResourceRegistration {
            type_name: format!("{PROVIDER_PREFIX}_cleanup_policy"),
            schema: cleanup_policy::schema(),
            deprecation: None,
            kind: ResourceKind::CleanupPolicy,
        },
    );
    table.insert(
        format!("{PROVIDER_PREFIX}_routing_rule"),
        ResourceRegistration {
            type_name: format!("{PROVIDER_PREFIX}_routing_rule"),
            schema: routing_rule::schema(),
            deprecation: None,
            kind: ResourceKind::RoutingRule,
        },
    );

    table
}

fn build_movers() -> Vec<StateMover> {
    let mut movers = Vec::new();
    for adapter in formats::all_adapters() {
        for (old_key, new_key) in RENAMED_FORMATS {
            if adapter.key() == *new_key {
                movers.push(StateMover::new(
                    vec![repository_type_name(old_key, adapter.topology().as_str())],
                    adapter.resource_type_name(),
                    Arc::clone(&adapter),
                ));
            }
        }
    }
    movers
}

fn unknown_type(type_name: &str) -> LifecycleOutcome {
    let err = ProviderError::validation(format!("unknown resource type {type_name:?}"));
    let mut diagnostics = Diagnostics::default();
    diagnostics.push(error_diagnostic(&err, "Unknown resource type"));
    LifecycleOutcome {
        state: None,
        diagnostics,
    }
}

impl Provider {
    /// Build the provider from the host-supplied configuration value.
    pub fn configure(raw_config: &Value) -> Result<Self> {
        let config = ProviderConfig::from_host_value(raw_config)?;
        tracing::info!(url = %config.base_url(), "provider configured");
        let client = NexusClient::new(&config)?;
        Ok(Self {
            client,
            resources: build_resource_table(),
            movers: build_movers(),
        })
    }

    /// Every advertised resource type, deprecated aliases included.
    pub fn resource_types(&self) -> impl Iterator<Item = &ResourceRegistration> {
        self.resources.values()
    }

    pub fn resource(&self, type_name: &str) -> Option<&ResourceRegistration> {
        self.resources.get(type_name)
    }

    /// Advertised data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        vec![
            format!("{PROVIDER_PREFIX}_routing_rule"),
            format!("{PROVIDER_PREFIX}_routing_rules"),
        ]
    }

    pub async fn create(
        &self,
        type_name: &str,
        plan_raw: &Value,
        cancel: &CancellationToken,
    ) -> LifecycleOutcome {
        match self.resources.get(type_name).map(|r| &r.kind) {
            Some(ResourceKind::Repository(adapter)) => {
                engine::create(&self.client, adapter.as_ref(), plan_raw, cancel).await
            }
            Some(ResourceKind::CleanupPolicy) => {
                cleanup_policy::create(&self.client, plan_raw, cancel).await
            }
            Some(ResourceKind::RoutingRule) => {
                routing_rule::create(&self.client, plan_raw, cancel).await
            }
            None => unknown_type(type_name),
        }
    }

    pub async fn read(&self, type_name: &str, state_raw: &Value) -> LifecycleOutcome {
        match self.resources.get(type_name).map(|r| &r.kind) {
            Some(ResourceKind::Repository(adapter)) => {
                engine::read(&self.client, adapter.as_ref(), state_raw).await
            }
            Some(ResourceKind::CleanupPolicy) => {
                cleanup_policy::read(&self.client, state_raw).await
            }
            Some(ResourceKind::RoutingRule) => routing_rule::read(&self.client, state_raw).await,
            None => unknown_type(type_name),
        }
    }

    pub async fn update(
        &self,
        type_name: &str,
        plan_raw: &Value,
        state_raw: &Value,
        cancel: &CancellationToken,
    ) -> LifecycleOutcome {
        match self.resources.get(type_name).map(|r| &r.kind) {
            Some(ResourceKind::Repository(adapter)) => {
                engine::update(&self.client, adapter.as_ref(), plan_raw, state_raw, cancel).await
            }
            Some(ResourceKind::CleanupPolicy) => {
                cleanup_policy::update(&self.client, plan_raw, state_raw, cancel).await
            }
            Some(ResourceKind::RoutingRule) => {
                routing_rule::update(&self.client, plan_raw, state_raw, cancel).await
            }
            None => unknown_type(type_name),
        }
    }

    pub async fn delete(
        &self,
        type_name: &str,
        state_raw: &Value,
        cancel: &CancellationToken,
    ) -> LifecycleOutcome {
        match self.resources.get(type_name).map(|r| &r.kind) {
            Some(ResourceKind::Repository(adapter)) => {
                engine::delete(&self.client, adapter.as_ref(), state_raw, cancel).await
            }
            Some(ResourceKind::CleanupPolicy) => {
                cleanup_policy::delete(&self.client, state_raw, cancel).await
            }
            Some(ResourceKind::RoutingRule) => {
                routing_rule::delete(&self.client, state_raw, cancel).await
            }
            None => unknown_type(type_name),
        }
    }

    /// Import by identifier; for every resource here the identifier is the
    /// server-side name.
    pub async fn import(&self, type_name: &str, id: &str) -> LifecycleOutcome {
        match self.resources.get(type_name).map(|r| &r.kind) {
            Some(ResourceKind::Repository(adapter)) => {
                engine::import(&self.client, adapter.as_ref(), id).await
            }
            Some(ResourceKind::CleanupPolicy) => cleanup_policy::import(&self.client, id).await,
            Some(ResourceKind::RoutingRule) => routing_rule::import(&self.client, id).await,
            None => unknown_type(type_name),
        }
    }

    pub async fn read_data_source(&self, type_name: &str, config: &Value) -> LifecycleOutcome {
        match type_name
            .strip_prefix(PROVIDER_PREFIX)
            .unwrap_or(type_name)
        {
            "_routing_rule" => {
                let name = config
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.is_empty());
                match name {
                    Some(name) => routing_rule::data_source_read(&self.client, name).await,
                    None => {
                        let err = ProviderError::validation_at("name", "is required");
                        let mut diagnostics = Diagnostics::default();
                        diagnostics
                            .push(error_diagnostic(&err, "Error reading routing rule data source"));
                        LifecycleOutcome {
                            state: None,
                            diagnostics,
                        }
                    }
                }
            }
            "_routing_rules" => routing_rule::data_source_list(&self.client).await,
            _ => unknown_type(type_name),
        }
    }

    /// Run the state movers registered on `target_type` against a source
    /// state. `Ok(None)` means no mover claimed the source type.
    pub fn move_state(
        &self,
        target_type: &str,
        source_type: &str,
        source_state: Option<&Value>,
    ) -> Result<Option<Value>> {
        for mover in &self.movers {
            if mover.target_type() == target_type {
                if let Some(moved) = mover.move_state(source_type, source_state)? {
                    return Ok(Some(moved));
                }
            }
        }
        Ok(None)
    }
}
