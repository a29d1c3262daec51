use serde_json::Value;

use crate::{functions::{DeferredValue, FunctionError}, types::TypeInfo};

/// Per-row function metadata + binder.
/// One instance is registered per function name; it is stateless and
/// thread-safe to share.
pub trait ScalarFunction: Send + Sync {
    /// Canonical lowercase function name.
    fn name(&self) -> &'static str;

    /// Validate the argument types and fix the read handles for this plan.
    /// Nothing is evaluated here; errors surface before the first row.
    fn bind(&self, args: &[TypeInfo]) -> Result<Box<dyn BoundScalar>, FunctionError>;

    /// Rendering used by the engine's explain output.
    fn display(&self, args: &[String]) -> String {
        format!("{}({})", self.name(), args.join(", "))
    }
}

/// A scalar function bound to one plan. Immutable after bind, so a single
/// instance may serve concurrent rows.
pub trait BoundScalar: Send + Sync {
    fn output_type(&self) -> &TypeInfo;

    /// `args.len()` equals the arity given to `bind`.
    fn evaluate(&self, args: &[&dyn DeferredValue]) -> Result<Value, FunctionError>;
}
