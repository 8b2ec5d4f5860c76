use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderscan_orders::Order;

/// Human-readable reason an order violated a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[error("{reason}")]
#[serde(transparent)]
pub struct RuleFailure {
    reason: String,
}

impl RuleFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Result of applying one rule to one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The order conforms.
    Passed,
    /// The rule's preconditions do not hold; the order is out of scope.
    NotApplicable,
    /// Preconditions hold but the consistency check was violated.
    Failed(RuleFailure),
}

impl RuleOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(RuleFailure::new(reason))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn failure(&self) -> Option<&RuleFailure> {
        match self {
            Self::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// A business-consistency check over a single order.
///
/// Implementations must not depend on other rules or on evaluation order, and must
/// give the same answer every time for the same order.
pub trait Rule: Send + Sync {
    fn apply(&self, order: &Order) -> RuleOutcome;
}

impl<F> Rule for F
where
    F: Fn(&Order) -> RuleOutcome + Send + Sync,
{
    fn apply(&self, order: &Order) -> RuleOutcome {
        self(order)
    }
}
