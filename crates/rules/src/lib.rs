//! `orderscan-rules`
//!
//! **Responsibility:** business-consistency checks over a single order.
//!
//! - Rules are pure: they read the fetched order and nothing else (no IO).
//! - Each rule answers with a [`RuleOutcome`]: passed, not applicable, or failed.
//! - The [`RuleEngine`] runs every registered rule and keeps only the failures.

pub mod common;
pub mod engine;
pub mod rule;
pub mod sink;

pub use engine::{RuleEngine, RuleEngineBuilder, RuleFailures};
pub use rule::{Rule, RuleFailure, RuleOutcome};
pub use sink::{InMemoryRuleSink, RuleEvaluation, RuleEventSink, TracingRuleSink};
