//! Evaluation of rules over a single record instance
use crate::{
    error::{ConstraintViolation, Violations},
    params::ValidationParams,
    path::FieldPath,
    rule::Rule,
};

/// Collects the outcome of every check run against one record.
///
/// A record is accepted only if no check failed. With
/// [`ValidationParams::fail_fast`] checks after the first failure are skipped.
#[derive(Debug)]
pub struct Evaluator<'a> {
    params: &'a ValidationParams,
    violations: Vec<ConstraintViolation>,
}

impl<'a> Evaluator<'a> {
    /// Start evaluating a record with the given parameters
    pub fn new(params: &'a ValidationParams) -> Self {
        Self {
            params,
            violations: Vec::new(),
        }
    }

    /// Parameters of this pass
    pub fn params(&self) -> &ValidationParams {
        self.params
    }

    /// Whether further checks would be skipped
    pub fn is_done(&self) -> bool {
        self.params.fail_fast && !self.violations.is_empty()
    }

    /// Check `rule` against the value found at `path`
    pub fn check<T: ?Sized>(&mut self, rule: &Rule<T>, value: &T, path: &FieldPath) {
        if self.is_done() {
            return;
        }
        tracing::trace!(rule = rule.name, field = path.as_str(), "evaluating rule");
        self.record(rule.check(value, path));
    }

    /// Record the outcome of a check that is not expressed as a [`Rule`]
    pub fn record(&mut self, outcome: Result<(), ConstraintViolation>) {
        if let Err(violation) = outcome {
            self.report(violation);
        }
    }

    /// Record a violation
    pub fn report(&mut self, violation: ConstraintViolation) {
        if self.is_done() {
            return;
        }
        tracing::debug!(
            rule = violation.rule.as_str(),
            field = violation.field.as_str(),
            reason = violation.reason.as_str(),
            "constraint violated"
        );
        self.violations.push(violation);
    }

    /// Accept or reject the record
    pub fn finish(self) -> Result<(), Violations> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(Violations::new(self.violations))
        }
    }
}
