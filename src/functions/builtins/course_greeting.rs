use serde_json::Value;
use tracing::debug;

use crate::{
    functions::{format_double, BoundScalar, DeferredValue, FunctionError, ScalarFunction},
    types::{Category, PrimitiveInspector, TypeInfo}
};

/// `course_greeting(name, score, ...)`: greets a student and reports the
/// total and average of the scores. Any null argument yields null.
pub struct CourseGreeting;

impl ScalarFunction for CourseGreeting {
    fn name(&self) -> &'static str { "course_greeting" }

    fn bind(&self, args: &[TypeInfo]) -> Result<Box<dyn BoundScalar>, FunctionError> {
        if args.len() < 2 {
            return Err(FunctionError::WrongArity { function: self.name().into(), expected: "at least 2".into(), got: args.len() });
        }
        for (index, arg) in args.iter().enumerate() {
            if arg.category() != Category::Primitive {
                return Err(FunctionError::WrongCategory { function: self.name().into(), index, type_name: arg.type_name() });
            }
        }
        debug!(function = self.name(), arity = args.len(), "bound scalar function");
        Ok(Box::new(BoundCourseGreeting {
            name_oi: PrimitiveInspector::string(),
            score_oi: PrimitiveInspector::string(),
            output: TypeInfo::string(),
        }))
    }
}

struct BoundCourseGreeting {
    name_oi: PrimitiveInspector,
    score_oi: PrimitiveInspector,
    output: TypeInfo,
}

impl BoundScalar for BoundCourseGreeting {
    fn output_type(&self) -> &TypeInfo { &self.output }

    fn evaluate(&self, args: &[&dyn DeferredValue]) -> Result<Value, FunctionError> {
        let [name, scores @ ..] = args else {
            return Err(FunctionError::WrongArity { function: "course_greeting".into(), expected: "at least 2".into(), got: 0 });
        };
        if scores.is_empty() {
            return Err(FunctionError::WrongArity { function: "course_greeting".into(), expected: "at least 2".into(), got: 1 });
        }

        let Some(name) = self.name_oi.read_string(&name.get()?)? else { return Ok(Value::Null) };
        let mut total = 0.0;
        for score in scores {
            let Some(score) = self.score_oi.read_double(&score.get()?)? else { return Ok(Value::Null) };
            total += score;
        }
        let count = scores.len();
        let average = total / count as f64;

        Ok(Value::String(format!(
            "Hello, {name}.You took {count} courses.Total score is {}, and average score is {}.",
            format_double(total),
            format_double(average),
        )))
    }
}
