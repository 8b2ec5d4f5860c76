use std::collections::BTreeMap;
use std::sync::Arc;

use orderscan_orders::Order;

use crate::rule::{Rule, RuleFailure, RuleOutcome};
use crate::sink::{RuleEvaluation, RuleEventSink, TracingRuleSink};

/// Failures of one order, keyed by rule name.
pub type RuleFailures = BTreeMap<String, RuleFailure>;

/// Named collection of rules evaluated against each order.
///
/// Built once at startup through [`RuleEngine::builder`]; immutable afterwards.
#[derive(Clone)]
pub struct RuleEngine {
    rules: BTreeMap<String, Arc<dyn Rule>>,
    sink: Arc<dyn RuleEventSink>,
}

impl core::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl RuleEngine {
    pub fn builder() -> RuleEngineBuilder {
        RuleEngineBuilder::default()
    }

    /// Run every rule against `order` and return only the failures.
    ///
    /// Each evaluation is reported to the sink, whatever its outcome.
    pub fn process_order(&self, order: &Order) -> RuleFailures {
        let mut failures = RuleFailures::new();
        for (name, rule) in &self.rules {
            let outcome = rule.apply(order);
            self.sink.record(&RuleEvaluation {
                order_id: order.id.clone(),
                rule: name.clone(),
                outcome: outcome.clone(),
            });
            if let RuleOutcome::Failed(failure) = outcome {
                failures.insert(name.clone(), failure);
            }
        }
        failures
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Startup-time registration of rules.
///
/// Registering a name twice keeps the last rule registered under it.
#[derive(Default)]
pub struct RuleEngineBuilder {
    rules: BTreeMap<String, Arc<dyn Rule>>,
    sink: Option<Arc<dyn RuleEventSink>>,
}

impl RuleEngineBuilder {
    pub fn rule(mut self, name: impl Into<String>, rule: impl Rule + 'static) -> Self {
        self.rules.insert(name.into(), Arc::new(rule));
        self
    }

    /// Diagnostic sink; defaults to [`TracingRuleSink`].
    pub fn sink(mut self, sink: Arc<dyn RuleEventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> RuleEngine {
        RuleEngine {
            rules: self.rules,
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingRuleSink)),
        }
    }
}
