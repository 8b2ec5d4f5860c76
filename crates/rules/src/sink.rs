//! Diagnostic side-channel for rule evaluations.
//!
//! Every single rule evaluation is reported to a sink. Sinks only observe: they
//! cannot influence which failures the engine returns.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use orderscan_core::OrderId;

use crate::rule::RuleOutcome;

/// One rule applied to one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEvaluation {
    pub order_id: OrderId,
    pub rule: String,
    pub outcome: RuleOutcome,
}

/// Receiver of per-rule evaluation events.
pub trait RuleEventSink: Send + Sync {
    fn record(&self, evaluation: &RuleEvaluation);
}

/// Default sink: failures at `warn`, everything else at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRuleSink;

impl RuleEventSink for TracingRuleSink {
    fn record(&self, evaluation: &RuleEvaluation) {
        let order_id = &evaluation.order_id;
        let rule = evaluation.rule.as_str();
        match &evaluation.outcome {
            RuleOutcome::Failed(failure) => {
                warn!(order_id = %order_id, rule, reason = %failure, "order failed check");
            }
            RuleOutcome::Passed => debug!(order_id = %order_id, rule, "order passed check"),
            RuleOutcome::NotApplicable => {
                debug!(order_id = %order_id, rule, "check not applicable")
            }
        }
    }
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRuleSink {
    inner: Mutex<Vec<RuleEvaluation>>,
}

impl InMemoryRuleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<RuleEvaluation> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RuleEventSink for InMemoryRuleSink {
    fn record(&self, evaluation: &RuleEvaluation) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(evaluation.clone());
    }
}
