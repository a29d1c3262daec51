use serde_json::Value;
use tracing::debug;

use crate::{
    functions::{BoundScalar, DeferredValue, FunctionError, ScalarFunction},
    types::{PrimitiveCategory, PrimitiveInspector, TypeInfo}
};

/// `hello(name)` and `hello(name, age)`, overloaded by arity.
/// A null name (or a null age) yields null.
pub struct Hello;

impl Hello {
    fn check(&self, index: usize, arg: &TypeInfo, accepts: fn(PrimitiveCategory) -> bool) -> Result<(), FunctionError> {
        match arg.primitive_category() {
            None => Err(FunctionError::WrongCategory { function: self.name().into(), index, type_name: arg.type_name() }),
            Some(PrimitiveCategory::Void) => Ok(()),
            Some(p) if accepts(p) => Ok(()),
            Some(_) => Err(FunctionError::UnsupportedPrimitive { function: self.name().into(), index, type_name: arg.type_name() }),
        }
    }
}

impl ScalarFunction for Hello {
    fn name(&self) -> &'static str { "hello" }

    fn bind(&self, args: &[TypeInfo]) -> Result<Box<dyn BoundScalar>, FunctionError> {
        let age_oi = match args {
            [name] => {
                self.check(0, name, |p| p.is_string_like())?;
                None
            }
            [name, age] => {
                self.check(0, name, |p| p.is_string_like())?;
                self.check(1, age, |p| p.is_integral())?;
                Some(PrimitiveInspector::new(PrimitiveCategory::Long))
            }
            _ => return Err(FunctionError::WrongArity { function: self.name().into(), expected: "1 or 2".into(), got: args.len() }),
        };
        debug!(function = self.name(), arity = args.len(), "bound scalar function");
        Ok(Box::new(BoundHello { name_oi: PrimitiveInspector::string(), age_oi, output: TypeInfo::string() }))
    }
}

struct BoundHello {
    name_oi: PrimitiveInspector,
    age_oi: Option<PrimitiveInspector>,
    output: TypeInfo,
}

impl BoundScalar for BoundHello {
    fn output_type(&self) -> &TypeInfo { &self.output }

    fn evaluate(&self, args: &[&dyn DeferredValue]) -> Result<Value, FunctionError> {
        let wrong_arity = || FunctionError::WrongArity { function: "hello".into(), expected: "1 or 2".into(), got: args.len() };
        let name = args.first().ok_or_else(wrong_arity)?;
        let Some(name) = self.name_oi.read_string(&name.get()?)? else { return Ok(Value::Null) };

        match (&self.age_oi, args) {
            (None, [_]) => Ok(Value::String(format!("hello, {name}."))),
            (Some(age_oi), [_, age]) => {
                let Some(age) = age_oi.read_int(&age.get()?)? else { return Ok(Value::Null) };
                Ok(Value::String(format!("hello, {name}, you are {age} age old.")))
            }
            _ => Err(wrong_arity()),
        }
    }
}
