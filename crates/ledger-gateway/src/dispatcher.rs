//! Transaction dispatcher: performs exactly one ledger call per [`CallSpec`].
//!
//! Submits are issued at most once and never retried here; a write that
//! fails in transit may still have been committed, and the resulting error
//! is flagged ambiguous. Evaluates are read-only.

use crate::domain::config::TimeoutConfig;
use crate::domain::error::{DispatchFailure, GatewayError, GatewayResult};
use crate::domain::types::{CallKind, CallResult, CallSpec};
use crate::ports::outbound::{LedgerError, LedgerSession};
use std::time::Duration;
use tracing::debug;

pub struct TransactionDispatcher {
    submit_timeout: Duration,
    evaluate_timeout: Duration,
}

impl TransactionDispatcher {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        Self {
            submit_timeout: timeouts.submit,
            evaluate_timeout: timeouts.evaluate,
        }
    }

    pub fn timeout_for(&self, kind: CallKind) -> Duration {
        match kind {
            CallKind::Submit => self.submit_timeout,
            CallKind::Evaluate => self.evaluate_timeout,
        }
    }

    /// Resolve the contract and perform the call described by `spec`.
    pub async fn dispatch(
        &self,
        session: &dyn LedgerSession,
        spec: &CallSpec,
    ) -> GatewayResult<CallResult> {
        // Contract lookup happens before anything is sent for ordering, so
        // its failures are never ambiguous.
        let contract = session
            .contract(&spec.channel, &spec.contract)
            .await
            .map_err(|e| classify(CallKind::Evaluate, e))?;

        let limit = self.timeout_for(spec.operation);

        debug!(
            channel = %spec.channel,
            contract = %spec.contract,
            function = %spec.function,
            kind = %spec.operation,
            args = spec.args.len(),
            "Dispatching ledger call"
        );

        let result = match spec.operation {
            CallKind::Submit => {
                tokio::time::timeout(limit, contract.submit(&spec.function, &spec.args))
                    .await
                    .map(|r| r.map(|()| CallResult::Submitted))
            }
            CallKind::Evaluate => {
                tokio::time::timeout(limit, contract.evaluate(&spec.function, &spec.args))
                    .await
                    .map(|r| r.map(CallResult::Evaluated))
            }
        };

        match result {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(classify(spec.operation, e)),
            Err(_) => Err(GatewayError::dispatch_for(
                spec.operation,
                DispatchFailure::Timeout,
                format!("{} {} exceeded {:?}", spec.operation, spec.function, limit),
            )),
        }
    }
}

/// Map a ledger client failure onto the dispatch taxonomy.
fn classify(call: CallKind, error: LedgerError) -> GatewayError {
    let reason = match &error {
        LedgerError::ChannelNotFound(_) => DispatchFailure::ChannelNotFound,
        LedgerError::ContractNotFound { .. } => DispatchFailure::ContractNotFound,
        LedgerError::Endorsement(_) => DispatchFailure::Endorsement,
        LedgerError::Timeout(_) => DispatchFailure::Timeout,
        LedgerError::Transport(_) | LedgerError::Connect(_) => DispatchFailure::Transport,
    };
    GatewayError::dispatch_for(call, reason, error.to_string())
}
