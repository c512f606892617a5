//! Routing rule resource and data sources.

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{HttpResponse, NexusClient};
use crate::engine::LifecycleOutcome;
use crate::error::{
    classify_status, error_diagnostic, Diagnostic, Diagnostics, ProviderError, Result,
};
use crate::models::routing::RoutingRule;
use crate::schema::{AttrType, Attribute, Block, Schema, Validator};

const BASE_PATH: &str = "/service/rest/v1/routing-rules";

/// Attribute schema advertised for `nexus_routing_rule`.
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
            .attr("description", Attribute::optional(AttrType::String))
            .attr(
                "mode",
                Attribute::required(AttrType::String)
                    .with_validator(Validator::OneOf(&["ALLOW", "BLOCK"])),
            )
            .attr(
                "matchers",
                Attribute::required(AttrType::SetOfString)
                    .with_validator(Validator::NonEmpty)
                    .with_validator(Validator::UniqueItems),
            ),
    }
}

fn parse(raw: &Value) -> Result<RoutingRule> {
    schema().validate(raw)?;
    let rule: RoutingRule = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::validation(format!("invalid routing rule: {e}")))?;
    rule.validate()?;
    Ok(rule)
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

async fn fetch(client: &NexusClient, name: &str) -> Result<RoutingRule> {
    let response = client.get(&format!("{BASE_PATH}/{name}")).await?;
    let response = expect(response, &[200], &format!("routing rule {name}"))?;
    response.json()
}

fn outcome_ok(rule: &RoutingRule) -> LifecycleOutcome {
    match serde_json::to_value(rule) {
        Ok(value) => LifecycleOutcome {
            state: Some(value),
            diagnostics: Diagnostics::default(),
        },
        Err(e) => outcome_err(
            None,
            &ProviderError::from(e),
            "Error persisting routing rule state",
        ),
    }
}

fn outcome_err(state: Option<Value>, err: &ProviderError, summary: &str) -> LifecycleOutcome {
    let mut diagnostics = Diagnostics::default();
    diagnostics.push(error_diagnostic(err, summary));
    LifecycleOutcome { state, diagnostics }
}

fn outcome_removed(warning: Diagnostic) -> LifecycleOutcome {
    let mut diagnostics = Diagnostics::default();
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
    let summary = "Error creating routing rule";
    let rule = match parse(plan_raw) {
        Ok(rule) => rule,
        Err(e) => return outcome_err(None, &e, summary),
    };
    if cancel.is_cancelled() {
        return outcome_err(None, &ProviderError::Cancelled, summary);
    }

    let result = async {
        let response = client.post_json(BASE_PATH, &rule).await?;
        expect(response, &[200, 201, 204], &format!("routing rule {}", rule.name))?;
        fetch(client, &rule.name).await
    }
    .await;

    match result {
        Ok(read_back) => outcome_ok(&read_back),
        Err(e) if e.is_gone() => outcome_err(
            None,
            &ProviderError::Inconsistent(format!(
                "server acknowledged creating routing rule {:?} but cannot read it back",
                rule.name
            )),
            summary,
        ),
        Err(e) => outcome_err(None, &e, summary),
    }
}

pub async fn read(client: &NexusClient, state_raw: &Value) -> LifecycleOutcome {
    let summary = "Error reading routing rule";
    let name = match name_of(state_raw) {
        Ok(name) => name,
        Err(e) => return outcome_err(Some(state_raw.clone()), &e, summary),
    };
    match fetch(client, &name).await {
        Ok(rule) => outcome_ok(&rule),
        Err(e) if e.is_gone() => outcome_removed(Diagnostic::warning(
            "Routing rule not found",
            format!("routing rule {name:?} no longer exists on the server; removing it from state"),
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
    let summary = "Error updating routing rule";
    let rule = match parse(plan_raw) {
        Ok(rule) => rule,
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
        let response = client.put_json(&format!("{BASE_PATH}/{name}"), &rule).await?;
        expect(response, &[200, 204], &format!("routing rule {name}"))?;
        fetch(client, &name).await
    }
    .await;

    match result {
        Ok(read_back) => outcome_ok(&read_back),
        Err(e) if e.is_gone() => outcome_removed(Diagnostic::warning(
            "Routing rule not found",
            format!("routing rule {name:?} no longer exists on the server; removing it from state"),
        )),
        Err(e) => outcome_err(Some(state_raw.clone()), &e, summary),
    }
}

pub async fn delete(
    client: &NexusClient,
    state_raw: &Value,
    cancel: &CancellationToken,
) -> LifecycleOutcome {
    let summary = "Error deleting routing rule";
    let name = match name_of(state_raw) {
        Ok(name) => name,
        Err(e) => return outcome_err(Some(state_raw.clone()), &e, summary),
    };
    if cancel.is_cancelled() {
        return outcome_err(Some(state_raw.clone()), &ProviderError::Cancelled, summary);
    }

    let result: Result<()> = async {
        let response = client.delete(&format!("{BASE_PATH}/{name}")).await?;
        expect(response, &[204], &format!("routing rule {name}"))?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => LifecycleOutcome {
            state: None,
            diagnostics: Diagnostics::default(),
        },
        Err(e) if e.is_gone() => outcome_removed(Diagnostic::warning(
            "Routing rule not found",
            format!("routing rule {name:?} did not exist to delete"),
        )),
        Err(e) => outcome_err(Some(state_raw.clone()), &e, summary),
    }
}

pub async fn import(client: &NexusClient, id: &str) -> LifecycleOutcome {
    read(client, &serde_json::json!({ "name": id })).await
}

/// Data source: look up one routing rule by name. A missing rule is an
/// error here, not a state removal.
pub async fn data_source_read(client: &NexusClient, name: &str) -> LifecycleOutcome {
    match fetch(client, name).await {
        Ok(rule) => outcome_ok(&rule),
        Err(e) => outcome_err(None, &e, "Error reading routing rule data source"),
    }
}

/// Data source: list every routing rule on the server.
pub async fn data_source_list(client: &NexusClient) -> LifecycleOutcome {
    let result: Result<Vec<RoutingRule>> = async {
        let response = client.get(BASE_PATH).await?;
        let response = expect(response, &[200], "routing rules")?;
        response.json()
    }
    .await;

    match result {
        Ok(rules) => match serde_json::to_value(&rules) {
            Ok(value) => LifecycleOutcome {
                state: Some(serde_json::json!({ "rules": value })),
                diagnostics: Diagnostics::default(),
            },
            Err(e) => outcome_err(
                None,
                &ProviderError::from(e),
                "Error reading routing rules data source",
            ),
        },
        Err(e) => outcome_err(None, &e, "Error reading routing rules data source"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_reports_empty_matchers_path() {
        let err = parse(&json!({
            "name": "block-all",
            "mode": "BLOCK",
            "matchers": []
        }))
        .unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("matchers"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_wire_shape_is_flat() {
        let rule = RoutingRule {
            name: "block-internal".into(),
            description: "no internal paths".into(),
            mode: "BLOCK".into(),
            matchers: vec!["^/internal/.*".into()],
        };
        let wire = serde_json::to_value(&rule).unwrap();
        assert_eq!(wire["mode"], "BLOCK");
        assert_eq!(wire["matchers"][0], "^/internal/.*");
    }
}
