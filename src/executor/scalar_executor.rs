use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    executor::{FunctionCall, Helpers, Schema},
    functions::{DeferredFn, DeferredValue, FunctionError, FunctionRegistry}
};

pub struct ScalarExecutor;

impl ScalarExecutor {
    /// Bind `call` once, then evaluate it for every row. Each output row is
    /// the input row plus one column named after the call's display string.
    pub fn project(
        registry: &FunctionRegistry,
        call: &FunctionCall,
        schema: &Schema,
        rows: &[Value],
    ) -> Result<Vec<Value>, FunctionError> {
        let fun = registry.require_scalar(&call.name)?;
        let bound = fun.bind(&call.arg_types(schema)?)?;
        let column = fun.display(&call.arg_labels());
        debug!(function = %call.name, %column, rows = rows.len(), "projecting scalar function");

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let obj = Helpers::row_object(row)?;
            let deferred: Vec<DeferredFn<_>> = call.args.iter()
                .map(|a| DeferredFn(move || Ok::<_, FunctionError>(a.eval(obj))))
                .collect();
            let args: Vec<&dyn DeferredValue> = deferred.iter().map(|d| d as &dyn DeferredValue).collect();
            let value = bound.evaluate(&args)?;
            trace!(%column, %value, "evaluated row");

            let mut m: Map<String, Value> = obj.clone();
            m.insert(column.clone(), value);
            out.push(Value::Object(m));
        }
        Ok(out)
    }
}
