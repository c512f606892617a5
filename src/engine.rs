//! Reconciliation engine: the five lifecycle operations, implemented once
//! and driven entirely by a format adapter.
//!
//! Every operation is sequential against the server. The host-supplied
//! cancellation token is honored at each suspension point; the one
//! best-effort path is a cancellation landing between a successful create
//! and the follow-up read, where a state synthesized from the plan is
//! persisted so the next reconcile re-reads instead of re-creating.

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::NexusClient;
use crate::error::{error_diagnostic, Diagnostic, Diagnostics, ProviderError};
use crate::formats::FormatAdapter;
use crate::models::RepositorySpec;

/// Result of one lifecycle call: the state to persist (None removes the
/// resource from state) plus any diagnostics for the host.
#[derive(Debug)]
pub struct LifecycleOutcome {
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl LifecycleOutcome {
    fn ok(state: Value) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::default(),
        }
    }

    fn removed(warning: Diagnostic) -> Self {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push(warning);
        Self {
            state: None,
            diagnostics,
        }
    }

    fn failed(state: Option<Value>, diagnostic: Diagnostic) -> Self {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push(diagnostic);
        Self {
            state,
            diagnostics,
        }
    }

    fn with_warning(mut self, warning: Diagnostic) -> Self {
        self.diagnostics.push(warning);
        self
    }
}

fn operation_summary(verb: &str, adapter: &dyn FormatAdapter) -> String {
    format!(
        "Error {verb} {} {} repository",
        adapter.key(),
        adapter.topology()
    )
}

fn persist(spec: &RepositorySpec) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(spec)?)
}

/// Create, then read back the server's view of the new repository.
pub async fn create(
    client: &NexusClient,
    adapter: &dyn FormatAdapter,
    plan_raw: &Value,
    cancel: &CancellationToken,
) -> LifecycleOutcome {
    let summary = operation_summary("creating", adapter);

    let plan = match adapter.plan_from_host_input(plan_raw) {
        Ok(plan) => plan,
        Err(e) => return LifecycleOutcome::failed(None, error_diagnostic(&e, &summary)),
    };

    if cancel.is_cancelled() {
        return LifecycleOutcome::failed(
            None,
            error_diagnostic(&ProviderError::Cancelled, &summary),
        );
    }

    if let Err(e) = adapter.api_create(client, &plan).await {
        return LifecycleOutcome::failed(None, error_diagnostic(&e, &summary));
    }
    tracing::info!(name = %plan.name, format = adapter.key(), "repository created");

    // The server acknowledged the create. If the host cancels before the
    // follow-up read finishes, persist a state synthesized from the plan so
    // the next reconcile reads instead of creating a duplicate.
    let api = tokio::select! {
        _ = cancel.cancelled() => {
            let mut state = plan.clone();
            adapter.plan_to_state(&mut state, client.base_url());
            return match persist(&state) {
                Ok(value) => LifecycleOutcome::ok(value).with_warning(Diagnostic::warning(
                    "Create interrupted",
                    format!(
                        "cancelled after the server acknowledged repository {:?}; \
                         state synthesized from the plan",
                        state.name
                    ),
                )),
                Err(e) => LifecycleOutcome::failed(None, error_diagnostic(&e, &summary)),
            };
        }
        result = adapter.api_read(client, &plan.name) => result,
    };

    let api = match api {
        Ok(api) => api,
        Err(e) if e.is_gone() => {
            let inconsistent = ProviderError::Inconsistent(format!(
                "server acknowledged creating repository {:?} but cannot read it back",
                plan.name
            ));
            return LifecycleOutcome::failed(None, error_diagnostic(&inconsistent, &summary));
        }
        Err(e) => return LifecycleOutcome::failed(None, error_diagnostic(&e, &summary)),
    };

    let mut state = adapter.state_from_api(&plan, &api);
    adapter.plan_to_state(&mut state, client.base_url());
    match persist(&state) {
        Ok(value) => LifecycleOutcome::ok(value),
        Err(e) => LifecycleOutcome::failed(None, error_diagnostic(&e, &summary)),
    }
}

/// Refresh state from the server. A missing repository is removed from
/// state with a warning so the host re-plans.
pub async fn read(
    client: &NexusClient,
    adapter: &dyn FormatAdapter,
    state_raw: &Value,
) -> LifecycleOutcome {
    let summary = operation_summary("reading", adapter);

    let prior = match adapter.state_from_host_input(state_raw) {
        Ok(prior) => prior,
        Err(e) => {
            return LifecycleOutcome::failed(
                Some(state_raw.clone()),
                error_diagnostic(&e, &summary),
            )
        }
    };

    match adapter.api_read(client, &prior.name).await {
        Ok(api) => {
            let state = adapter.state_from_api(&prior, &api);
            match persist(&state) {
                Ok(value) => LifecycleOutcome::ok(value),
                Err(e) => LifecycleOutcome::failed(
                    Some(state_raw.clone()),
                    error_diagnostic(&e, &summary),
                ),
            }
        }
        Err(e) if e.is_gone() => {
            tracing::warn!(name = %prior.name, "repository gone, removing from state");
            LifecycleOutcome::removed(Diagnostic::warning(
                "Repository not found",
                format!(
                    "repository {:?} no longer exists on the server; removing it from state",
                    prior.name
                ),
            ))
        }
        Err(e) => {
            LifecycleOutcome::failed(Some(state_raw.clone()), error_diagnostic(&e, &summary))
        }
    }
}

/// Apply a changed plan to an existing repository, then refresh.
pub async fn update(
    client: &NexusClient,
    adapter: &dyn FormatAdapter,
    plan_raw: &Value,
    state_raw: &Value,
    cancel: &CancellationToken,
) -> LifecycleOutcome {
    let summary = operation_summary("updating", adapter);
    let keep = || Some(state_raw.clone());

    let plan = match adapter.plan_from_host_input(plan_raw) {
        Ok(plan) => plan,
        Err(e) => return LifecycleOutcome::failed(keep(), error_diagnostic(&e, &summary)),
    };
    let prior = match adapter.state_from_host_input(state_raw) {
        Ok(prior) => prior,
        Err(e) => return LifecycleOutcome::failed(keep(), error_diagnostic(&e, &summary)),
    };

    let updated = tokio::select! {
        _ = cancel.cancelled() => {
            return LifecycleOutcome::failed(
                keep(),
                error_diagnostic(&ProviderError::Cancelled, &summary),
            );
        }
        result = adapter.api_update(client, &prior.name, &plan) => result,
    };

    match updated {
        Ok(()) => {}
        Err(e) if e.is_gone() => {
            // Same recovery as Read: drop the state so the next plan creates.
            tracing::warn!(name = %prior.name, "repository gone during update");
            return LifecycleOutcome::removed(Diagnostic::warning(
                "Repository not found",
                format!(
                    "repository {:?} no longer exists on the server; removing it from state",
                    prior.name
                ),
            ));
        }
        Err(e) => return LifecycleOutcome::failed(keep(), error_diagnostic(&e, &summary)),
    }

    let api = tokio::select! {
        _ = cancel.cancelled() => {
            return LifecycleOutcome::failed(
                keep(),
                error_diagnostic(&ProviderError::Cancelled, &summary),
            );
        }
        result = adapter.api_read(client, &prior.name) => result,
    };

    let api = match api {
        Ok(api) => api,
        Err(e) if e.is_gone() => {
            let inconsistent = ProviderError::Inconsistent(format!(
                "server acknowledged updating repository {:?} but cannot read it back",
                prior.name
            ));
            return LifecycleOutcome::failed(keep(), error_diagnostic(&inconsistent, &summary));
        }
        Err(e) => return LifecycleOutcome::failed(keep(), error_diagnostic(&e, &summary)),
    };

    let mut state = adapter.state_from_api(&plan, &api);
    adapter.plan_to_state(&mut state, client.base_url());
    match persist(&state) {
        Ok(value) => LifecycleOutcome::ok(value),
        Err(e) => LifecycleOutcome::failed(keep(), error_diagnostic(&e, &summary)),
    }
}

/// Delete the repository. A 404 is absorbed as success with a warning.
pub async fn delete(
    client: &NexusClient,
    adapter: &dyn FormatAdapter,
    state_raw: &Value,
    cancel: &CancellationToken,
) -> LifecycleOutcome {
    let summary = operation_summary("deleting", adapter);

    let prior = match adapter.state_from_host_input(state_raw) {
        Ok(prior) => prior,
        Err(e) => {
            return LifecycleOutcome::failed(
                Some(state_raw.clone()),
                error_diagnostic(&e, &summary),
            )
        }
    };

    let deleted = tokio::select! {
        _ = cancel.cancelled() => {
            return LifecycleOutcome::failed(
                Some(state_raw.clone()),
                error_diagnostic(&ProviderError::Cancelled, &summary),
            );
        }
        result = adapter.api_delete(client, &prior.name) => result,
    };

    match deleted {
        Ok(()) => {
            tracing::info!(name = %prior.name, "repository deleted");
            LifecycleOutcome {
                state: None,
                diagnostics: Diagnostics::default(),
            }
        }
        Err(e) if e.is_gone() => LifecycleOutcome::removed(Diagnostic::warning(
            "Repository not found",
            format!("repository {:?} did not exist to delete", prior.name),
        )),
        Err(e) => {
            LifecycleOutcome::failed(Some(state_raw.clone()), error_diagnostic(&e, &summary))
        }
    }
}

/// Import by repository name: seed a minimal state, then run the Read path.
pub async fn import(
    client: &NexusClient,
    adapter: &dyn FormatAdapter,
    id: &str,
) -> LifecycleOutcome {
    let summary = operation_summary("importing", adapter);
    let seed = RepositorySpec::named(id);
    match persist(&seed) {
        Ok(value) => read(client, adapter, &value).await,
        Err(e) => LifecycleOutcome::failed(None, error_diagnostic(&e, &summary)),
    }
}
