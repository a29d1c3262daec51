use serde_json::Value;

use crate::functions::FunctionError;

/// Lazily evaluated scalar argument. The engine hands these to
/// [`BoundScalar::evaluate`](crate::functions::BoundScalar::evaluate) so a
/// function only pays for the arguments it actually reads.
pub trait DeferredValue {
    fn get(&self) -> Result<Value, FunctionError>;
}

impl DeferredValue for Value {
    fn get(&self) -> Result<Value, FunctionError> { Ok(self.clone()) }
}

/// Adapter turning a closure into a [`DeferredValue`].
pub struct DeferredFn<F>(pub F);

impl<F> DeferredValue for DeferredFn<F>
where
    F: Fn() -> Result<Value, FunctionError>,
{
    fn get(&self) -> Result<Value, FunctionError> { (self.0)() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn closure_runs_only_when_read() {
        let calls = Cell::new(0);
        let d = DeferredFn(|| { calls.set(calls.get() + 1); Ok::<_, FunctionError>(json!("x")) });
        assert_eq!(calls.get(), 0);
        assert_eq!(d.get().unwrap(), json!("x"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn plain_value_is_its_own_accessor() {
        assert_eq!(DeferredValue::get(&json!(3)).unwrap(), json!(3));
    }
}
