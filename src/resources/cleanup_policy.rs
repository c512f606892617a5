//! Cleanup policy resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{HttpResponse, NexusClient};
use crate::engine::LifecycleOutcome;
use crate::error::{
    classify_status, error_diagnostic, Diagnostic, ProviderError, Result,
};
use crate::models::cleanup::{CleanupCriteria, CleanupPolicy};
use crate::schema::{AttrType, Attribute, Block, Schema, Validator};

const BASE_PATH: &str = "/service/rest/v1/cleanup-policies";

/// Wire shape: the server flattens criteria into top-level fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCleanupPolicy {
    name: String,
    format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    criteria_last_blob_updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    criteria_last_downloaded: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    criteria_asset_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    criteria_release_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retain: Option<i64>,
}

impl ApiCleanupPolicy {
    fn from_policy(policy: &CleanupPolicy) -> Self {
        Self {
            name: policy.name.clone(),
            format: policy.format.clone(),
            notes: policy.notes.clone(),
            criteria_last_blob_updated: policy.criteria.last_blob_updated,
            criteria_last_downloaded: policy.criteria.last_downloaded,
            criteria_asset_regex: policy.criteria.asset_regex.clone(),
            criteria_release_type: policy.release_type.clone(),
            retain: policy.retain,
        }
    }

    fn into_policy(self) -> CleanupPolicy {
        CleanupPolicy {
            name: self.name,
            format: self.format,
            notes: self.notes,
            criteria: CleanupCriteria {
                last_blob_updated: self.criteria_last_blob_updated,
                last_downloaded: self.criteria_last_downloaded,
                asset_regex: self.criteria_asset_regex,
            },
            release_type: self.criteria_release_type,
            retain: self.retain,
        }
    }
}

/// Attribute schema advertised for `nexus_cleanup_policy`.
pub fn schema() -> Schema {
    Schema {
        version: 1,
        root: Block::new()
            .attr(
                "name",
                Attribute::required(AttrType::String)
                    .force_new()
                    .with_validator(Validator::LengthBetween(1, 255)),
            )
            .attr("format", Attribute::required(AttrType::String))
            .attr("notes", Attribute::optional(AttrType::String))
            .attr(
                "release_type",
                Attribute::optional(AttrType::String)
                    .with_validator(Validator::OneOf(&["RELEASES", "PRERELEASES"])),
            )
            .attr(
                "retain",
                Attribute::optional(AttrType::Int).with_validator(Validator::IntAtLeast(1)),
            )
            .block(
                "criteria",
                Block::required_block()
                    .attr(
                        "last_blob_updated",
                        Attribute::optional(AttrType::Int)
                            .with_validator(Validator::IntAtLeast(1)),
                    )
                    .attr(
                        "last_downloaded",
                        Attribute::optional(AttrType::Int)
                            .with_validator(Validator::IntAtLeast(1)),
                    )
                    .attr("asset_regex", Attribute::optional(AttrType::String)),
            ),
    }
}

fn parse(raw: &Value) -> Result<CleanupPolicy> {
    schema().validate(raw)?;
    let policy: CleanupPolicy = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::validation(format!("invalid cleanup policy: {e}")))?;
    policy.validate()?;
    Ok(policy)
}

fn name_of(raw: &Value) -> Result<String> {
    raw.get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::validation_at("name", "is required"))
}

fn expect(response: HttpResponse, accepted: &[u16], context: &str) -> Result<HttpResponse> {
    if accepted.contains(&response.status) {
        Ok(response)
    } else {
        Err(classify_status(response.status, &response.body, context))
    }
}

async fn fetch(client: &NexusClient, name: &str) -> Result<CleanupPolicy> {
    let response = client.get(&format!("{BASE_PATH}/{name}")).await?;
    let response = expect(response, &[200], &format!("cleanup policy {name}"))?;
    let api: ApiCleanupPolicy = response.json()?;
    Ok(api.into_policy())
}

fn outcome_ok(policy: &CleanupPolicy) -> LifecycleOutcome {
    match serde_json::to_value(policy) {
        Ok(value) => LifecycleOutcome {
            state: Some(value),
            diagnostics: Default::default(),
        },
        Err(e) => LifecycleOutcome {
            state: None,
            diagnostics: {
                let mut d = crate::error::Diagnostics::default();
                d.push(error_diagnostic(
                    &ProviderError::from(e),
                    "Error persisting cleanup policy state",
                ));
                d
            },
        },
    }
}

fn outcome_err(state: Option<Value>, err: &ProviderError, summary: &str) -> LifecycleOutcome {
    let mut diagnostics = crate::error::Diagnostics::default();
    diagnostics.push(error_diagnostic(err, summary));
    LifecycleOutcome { state, diagnostics }
}

fn outcome_removed(warning: Diagnostic) -> LifecycleOutcome {
    let mut diagnostics = crate::error::Diagnostics::default();
    diagnostics.push(warning);
    LifecycleOutcome {
        state: None,
        diagnostics,
    }
}

pub async fn create(
    client: &NexusClient,
    plan_raw: &Value,
    cancel: &CancellationToken,
) -> LifecycleOutcome {
    let summary = "Error creating cleanup policy";
    let policy = match parse(plan_raw) {
        Ok(policy) => policy,
        Err(e) => return outcome_err(None, &e, summary),
    };
    if cancel.is_cancelled() {
        return outcome_err(None, &ProviderError::Cancelled, summary);
    }

    let result = async {
        let response = client
            .post_json(BASE_PATH, &ApiCleanupPolicy::from_policy(&policy))
            .await?;
        expect(
            response,
            &[200, 201, 204],
            &format!("cleanup policy {}", policy.name),
        )?;
        fetch(client, &policy.name).await
    }
    .await;

    match result {
        Ok(read_back) => outcome_ok(&read_back),
        Err(e) if e.is_gone() => outcome_err(
            None,
            &ProviderError::Inconsistent(format!(
                "server acknowledged creating cleanup policy {:?} but cannot read it back",
                policy.name
            )),
            summary,
        ),
        Err(e) => outcome_err(None, &e, summary),
    }
}

pub async fn read(client: &NexusClient, state_raw: &Value) -> LifecycleOutcome {
    let summary = "Error reading cleanup policy";
    let name = match name_of(state_raw) {
        Ok(name) => name,
        Err(e) => return outcome_err(Some(state_raw.clone()), &e, summary),
    };
    match fetch(client, &name).await {
        Ok(policy) => outcome_ok(&policy),
        Err(e) if e.is_gone() => outcome_removed(Diagnostic::warning(
            "Cleanup policy not found",
            format!("cleanup policy {name:?} no longer exists on the server; removing it from state"),
        )),
        Err(e) => outcome_err(Some(state_raw.clone()), &e, summary),
    }
}

pub async fn update(
    client: &NexusClient,
    plan_raw: &Value,
    state_raw: &Value,
    cancel: &CancellationToken,
) -> LifecycleOutcome {
    let summary = "Error updating cleanup policy";
    let policy = match parse(plan_raw) {
        Ok(policy) => policy,
        Err(e) => return outcome_err(Some(state_raw.clone()), &e, summary),
    };
    let name = match name_of(state_raw) {
        Ok(name) => name,
        Err(e) => return outcome_err(Some(state_raw.clone()), &e, summary),
    };
    if cancel.is_cancelled() {
        return outcome_err(Some(state_raw.clone()), &ProviderError::Cancelled, summary);
    }

    let result = async {
        let response = client
            .put_json(
                &format!("{BASE_PATH}/{name}"),
                &ApiCleanupPolicy::from_policy(&policy),
            )
            .await?;
        expect(response, &[200, 204], &format!("cleanup policy {name}"))?;
        fetch(client, &name).await
    }
    .await;

    match result {
        Ok(read_back) => outcome_ok(&read_back),
        Err(e) if e.is_gone() => outcome_removed(Diagnostic::warning(
            "Cleanup policy not found",
            format!("cleanup policy {name:?} no longer exists on the server; removing it from state"),
        )),
        Err(e) => outcome_err(Some(state_raw.clone()), &e, summary),
    }
}

pub async fn delete(
    client: &NexusClient,
    state_raw: &Value,
    cancel: &CancellationToken,
) -> LifecycleOutcome {
    let summary = "Error deleting cleanup policy";
    let name = match name_of(state_raw) {
        Ok(name) => name,
        Err(e) => return outcome_err(Some(state_raw.clone()), &e, summary),
    };
    if cancel.is_cancelled() {
        return outcome_err(Some(state_raw.clone()), &ProviderError::Cancelled, summary);
    }

    let result: Result<()> = async {
        let response = client.delete(&format!("{BASE_PATH}/{name}")).await?;
        expect(response, &[204], &format!("cleanup policy {name}"))?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => LifecycleOutcome {
            state: None,
            diagnostics: Default::default(),
        },
        Err(e) if e.is_gone() => outcome_removed(Diagnostic::warning(
            "Cleanup policy not found",
            format!("cleanup policy {name:?} did not exist to delete"),
        )),
        Err(e) => outcome_err(Some(state_raw.clone()), &e, summary),
    }
}

pub async fn import(client: &NexusClient, id: &str) -> LifecycleOutcome {
    read(client, &serde_json::json!({ "name": id })).await
}
