//! Operation handlers.
//!
//! Each handler is a single pass:
//!
//! ```text
//! validate → build CallSpec → acquire session → dispatch → release → decode → response
//! ```
//!
//! Validation failures return before any session is requested. The
//! acquire/dispatch/release stage runs on its own task (see
//! [`OperationContext::execute`]), so a caller that goes away mid-call does
//! not abort a dispatch in flight or leak its session.

use crate::dispatcher::TransactionDispatcher;
use crate::domain::codec;
use crate::domain::config::{ContractsConfig, GatewayConfig};
use crate::domain::correlation::CorrelationId;
use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::operations::OperationKind;
use crate::domain::types::{
    CallResult, CallSpec, CheckAccessRequest, CheckAccessResponse, CreateUserRequest,
    CreateUserResponse, RecordEventRequest, RecordEventResponse,
};
use crate::domain::validation::Validate;
use crate::ports::outbound::TimeSource;
use crate::session::SessionManager;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Everything a handler needs besides its request.
#[derive(Clone)]
pub struct OperationContext {
    sessions: Arc<SessionManager>,
    dispatcher: Arc<TransactionDispatcher>,
    clock: Arc<dyn TimeSource>,
    channel: String,
    contracts: ContractsConfig,
}

impl OperationContext {
    pub fn new(
        config: &GatewayConfig,
        sessions: Arc<SessionManager>,
        dispatcher: Arc<TransactionDispatcher>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            sessions,
            dispatcher,
            clock,
            channel: config.network.channel.clone(),
            contracts: config.contracts.clone(),
        }
    }

    /// Build the call for an operation from its table entry.
    pub fn call_spec(&self, operation: OperationKind, args: Vec<String>) -> CallSpec {
        let descriptor = operation.descriptor();
        debug_assert_eq!(args.len(), descriptor.arity);
        CallSpec::new(
            self.channel.clone(),
            self.contracts.name_for(descriptor.contract),
            descriptor.call,
            descriptor.function,
            args,
        )
    }

    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Acquire a session, dispatch `spec` once, release the session.
    ///
    /// The stage runs on a spawned task and reports back over a oneshot
    /// channel. If the caller is dropped, the task still finishes the call,
    /// releases the session and logs the outcome. A panic inside the stage
    /// surfaces as `InternalError`.
    pub async fn execute(
        &self,
        operation: OperationKind,
        spec: CallSpec,
    ) -> GatewayResult<CallResult> {
        let correlation_id = CorrelationId::new();
        let sessions = Arc::clone(&self.sessions);
        let dispatcher = Arc::clone(&self.dispatcher);
        let (tx, rx) = oneshot::channel();

        debug!(
            %correlation_id,
            %operation,
            function = %spec.function,
            "Executing operation"
        );

        tokio::spawn(async move {
            let outcome = run_call(&sessions, &dispatcher, &spec).await;
            log_outcome(correlation_id, operation, &spec, &outcome);

            if let Err(unclaimed) = tx.send(outcome) {
                match unclaimed {
                    Ok(_) => warn!(
                        %correlation_id,
                        %operation,
                        function = %spec.function,
                        "Caller went away; ledger call completed successfully"
                    ),
                    Err(e) => warn!(
                        %correlation_id,
                        %operation,
                        error = %e,
                        "Caller went away; ledger call failed"
                    ),
                }
            }
        });

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(%correlation_id, %operation, "Operation task terminated before reporting");
                Err(GatewayError::internal(format!(
                    "operation {} aborted (correlation id {})",
                    operation, correlation_id
                )))
            }
        }
    }
}

/// Scoped acquisition: the session is released on every path out of here.
/// A panic in `dispatch` unwinds through the guard's `Drop`.
async fn run_call(
    sessions: &SessionManager,
    dispatcher: &TransactionDispatcher,
    spec: &CallSpec,
) -> GatewayResult<CallResult> {
    let mut session = sessions.acquire().await?;
    let outcome = dispatcher.dispatch(session.session(), spec).await;
    session.release().await;
    outcome
}

fn log_outcome(
    correlation_id: CorrelationId,
    operation: OperationKind,
    spec: &CallSpec,
    outcome: &GatewayResult<CallResult>,
) {
    match outcome {
        Ok(_) => info!(
            %correlation_id,
            %operation,
            channel = %spec.channel,
            contract = %spec.contract,
            function = %spec.function,
            "Ledger call completed"
        ),
        Err(e) if e.is_ambiguous() => error!(
            %correlation_id,
            %operation,
            function = %spec.function,
            args = ?spec.args,
            error = %e,
            "Submit outcome unknown; reconcile against the ledger before retrying"
        ),
        Err(e) => warn!(
            %correlation_id,
            %operation,
            kind = %e.kind(),
            error = %e,
            "Ledger call failed"
        ),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `create_user(id, name, org, roles) -> {userId}`
pub async fn create_user(
    ctx: &OperationContext,
    request: &CreateUserRequest,
) -> GatewayResult<CreateUserResponse> {
    request.validate()?;

    let spec = ctx.call_spec(
        OperationKind::CreateUser,
        vec![
            request.id.clone(),
            request.name.clone(),
            request.org.clone(),
            codec::encode_list(&request.roles),
        ],
    );
    ctx.execute(OperationKind::CreateUser, spec).await?;

    Ok(CreateUserResponse {
        user_id: request.id.clone(),
    })
}

/// `check_access(userId, resourceId) -> {userId, resourceId, accessGranted, timestamp}`
pub async fn check_access(
    ctx: &OperationContext,
    request: &CheckAccessRequest,
) -> GatewayResult<CheckAccessResponse> {
    request.validate()?;

    let spec = ctx.call_spec(
        OperationKind::CheckAccess,
        vec![request.user_id.clone(), request.resource_id.clone()],
    );
    let result = ctx.execute(OperationKind::CheckAccess, spec).await?;

    let payload = result.payload().ok_or_else(|| {
        GatewayError::internal("evaluate call returned a submit acknowledgement")
    })?;
    let access_granted = codec::decode_bool(payload)?;

    Ok(CheckAccessResponse {
        user_id: request.user_id.clone(),
        resource_id: request.resource_id.clone(),
        access_granted,
        timestamp: ctx.now_millis(),
    })
}

/// `record_event(eventType, actor, resource, action, result, metadata?) -> {timestamp}`
pub async fn record_event(
    ctx: &OperationContext,
    request: &RecordEventRequest,
) -> GatewayResult<RecordEventResponse> {
    request.validate()?;

    let metadata = request.metadata.clone().unwrap_or_default();
    let spec = ctx.call_spec(
        OperationKind::RecordEvent,
        vec![
            request.event_type.clone(),
            request.actor.clone(),
            request.resource.clone(),
            request.action.clone(),
            request.result.clone(),
            codec::encode_object(&metadata),
        ],
    );
    ctx.execute(OperationKind::RecordEvent, spec).await?;

    Ok(RecordEventResponse {
        timestamp: ctx.now_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryLedger, StaticIdentities, StaticProfile};
    use crate::domain::error::{DispatchFailure, ErrorKind};
    use crate::domain::types::CallKind;
    use crate::ports::outbound::LedgerError;
    use serde_json::json;

    struct FixedClock(u64);

    impl TimeSource for FixedClock {
        fn now_millis(&self) -> u64 {
            self.0
        }
    }

    fn context(ledger: &InMemoryLedger) -> OperationContext {
        let config = GatewayConfig::default();
        let sessions = Arc::new(SessionManager::new(
            &config,
            Arc::new(StaticIdentities::with_admin()),
            Arc::new(StaticProfile::default()),
            Arc::new(ledger.clone()),
        ));
        OperationContext::new(
            &config,
            sessions,
            Arc::new(TransactionDispatcher::new(&config.timeouts)),
            Arc::new(FixedClock(1_700_000_000_000)),
        )
    }

    fn event() -> RecordEventRequest {
        RecordEventRequest {
            event_type: "ACCESS".into(),
            actor: "u1".into(),
            resource: "r1".into(),
            action: "read".into(),
            result: "granted".into(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_call_spec_resolves_table_and_config() {
        let ledger = InMemoryLedger::new();
        let spec = context(&ledger).call_spec(
            OperationKind::RecordEvent,
            vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into(), "{}".into()],
        );
        assert_eq!(spec.channel, "security-channel");
        assert_eq!(spec.contract, "securityaudit");
        assert_eq!(spec.operation, CallKind::Submit);
        assert_eq!(spec.function, "RecordEvent");
    }

    #[tokio::test]
    async fn test_record_event_defaults_metadata() {
        let ledger = InMemoryLedger::with_security_contracts();
        let ctx = context(&ledger);

        let response = record_event(&ctx, &event()).await.unwrap();
        assert_eq!(response.timestamp, 1_700_000_000_000);

        let calls = ledger.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].contract, "securityaudit");
        assert_eq!(calls[0].args.len(), 6);
        assert_eq!(calls[0].args[5], "{}");
        assert_eq!(ledger.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_record_event_metadata_is_canonical() {
        let ledger = InMemoryLedger::with_security_contracts();
        let ctx = context(&ledger);

        let mut request = event();
        request.metadata = json!({"userAgent": "curl/8.0", "ip": "10.0.0.7"})
            .as_object()
            .cloned();
        record_event(&ctx, &request).await.unwrap();

        assert_eq!(
            ledger.calls()[0].args[5],
            r#"{"ip":"10.0.0.7","userAgent":"curl/8.0"}"#
        );
    }

    #[tokio::test]
    async fn test_check_access_denied() {
        let ledger = InMemoryLedger::with_security_contracts();
        ledger.set_evaluate_response("CheckAccess", "false");
        let ctx = context(&ledger);

        let response = check_access(
            &ctx,
            &CheckAccessRequest {
                user_id: "u2".into(),
                resource_id: "r1".into(),
            },
        )
        .await
        .unwrap();
        assert!(!response.access_granted);
        assert_eq!(ledger.evaluate_count(), 1);
    }

    #[tokio::test]
    async fn test_check_access_malformed_payload_releases_session() {
        let ledger = InMemoryLedger::with_security_contracts();
        ledger.set_evaluate_response("CheckAccess", "{\"granted\":");
        let ctx = context(&ledger);

        let err = check_access(
            &ctx,
            &CheckAccessRequest {
                user_id: "u1".into(),
                resource_id: "r1".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.dispatch_reason(), Some(DispatchFailure::MalformedPayload));
        assert_eq!(ledger.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_validation_fails_before_session() {
        let ledger = InMemoryLedger::with_security_contracts();
        let ctx = context(&ledger);

        let err = record_event(
            &ctx,
            &RecordEventRequest {
                actor: String::new(),
                ..event()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(ledger.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn test_ambiguous_submit_is_reported() {
        let ledger = InMemoryLedger::with_security_contracts();
        ledger.fail_submits(LedgerError::Timeout("commit status".into()));
        let ctx = context(&ledger);

        let err = record_event(&ctx, &event()).await.unwrap_err();
        assert!(err.is_ambiguous());
        assert_eq!(ledger.submit_count(), 1);
        assert_eq!(ledger.close_calls(), 1);
    }
}
