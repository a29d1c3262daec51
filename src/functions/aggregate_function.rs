use std::sync::Arc;

use serde_json::Value;

use crate::{functions::{AggregationPhase, FunctionError, ParameterInfo}, types::TypeInfo};

/// Per-aggregate metadata + resolver.
/// One instance is registered globally per function name.
/// It is stateless and thread-safe to share.
pub trait AggregateFunction: Send + Sync {
    /// Canonical lowercase function name.
    fn name(&self) -> &'static str;

    /// Check the call-site signature and pick the evaluator family for the
    /// argument's primitive category.
    fn resolve(&self, info: &ParameterInfo) -> Result<Arc<dyn EvaluatorFactory>, FunctionError>;

    /// Rendering used by the engine's explain output.
    fn display(&self, args: &[String]) -> String {
        format!("{}({})", self.name(), args.join(", "))
    }
}

/// Builds bound evaluators for one resolved signature, one per phase and
/// plan instance.
pub trait EvaluatorFactory: Send + Sync {
    /// Type of the partial state exchanged between phases.
    fn partial_type(&self) -> TypeInfo;

    /// `inputs` are the raw argument types for raw-consuming phases, and
    /// `[partial_type()]` for merge phases.
    fn bind(&self, phase: AggregationPhase, inputs: &[TypeInfo]) -> Result<Box<dyn AggregateEvaluator>, FunctionError>;
}

/// Bound state of one plan instance.
pub trait AggregateEvaluator: Send + Sync {
    fn phase(&self) -> AggregationPhase;

    /// Final value type in SinglePass/FinalMerge, partial type otherwise.
    fn output_type(&self) -> &TypeInfo;

    /// Create a fresh accumulator for one group.
    fn new_accumulator(&self) -> Box<dyn Accumulator>;
}

/// The per-group state.
/// The executor will:
///   1) create one accumulator per group (or `reset` a recycled one)
///   2) feed it raw rows with `iterate` or partials with `merge`, depending on phase
///   3) at group end, call `terminate_partial` or `terminate`, depending on phase
///
/// An accumulator belongs to a single call stream; calls never overlap.
pub trait Accumulator: Send {
    /// Zero the state so the buffer can serve another group.
    fn reset(&mut self);

    /// Fold one raw row (the evaluated arguments of this row).
    fn iterate(&mut self, args: &[Value]) -> Result<(), FunctionError>;

    /// Fold a partial produced by `terminate_partial` of another accumulator.
    fn merge(&mut self, partial: &Value) -> Result<(), FunctionError>;

    /// Snapshot of the state in the partial representation.
    fn terminate_partial(&self) -> Result<Value, FunctionError>;

    /// Produce the final result.
    fn terminate(&self) -> Result<Value, FunctionError>;
}
