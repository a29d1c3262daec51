use std::{collections::HashMap, sync::Arc};

use once_cell::sync::Lazy;

use crate::functions::{AggregateFunction, CourseGreeting, FunctionError, Hello, ScalarFunction, StudentScore};

static GLOBAL_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::default_registry);

/// Case-insensitive registry of scalar and aggregate functions.
#[derive(Default)]
pub struct FunctionRegistry {
    scalars: HashMap<String, Arc<dyn ScalarFunction>>,
    aggregates: HashMap<String, Arc<dyn AggregateFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register_scalar<F: ScalarFunction + 'static>(&mut self, fun: F) {
        self.scalars.insert(fun.name().to_ascii_lowercase(), Arc::new(fun));
    }

    pub fn register_aggregate<F: AggregateFunction + 'static>(&mut self, fun: F) {
        self.aggregates.insert(fun.name().to_ascii_lowercase(), Arc::new(fun));
    }

    pub fn scalar(&self, name: &str) -> Option<Arc<dyn ScalarFunction>> {
        self.scalars.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn aggregate(&self, name: &str) -> Option<Arc<dyn AggregateFunction>> {
        self.aggregates.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn is_aggregate(&self, name: &str) -> bool {
        self.aggregates.contains_key(&name.to_ascii_lowercase())
    }

    pub fn require_scalar(&self, name: &str) -> Result<Arc<dyn ScalarFunction>, FunctionError> {
        self.scalar(name).ok_or_else(|| FunctionError::FunctionNotFound(name.to_string()))
    }

    pub fn require_aggregate(&self, name: &str) -> Result<Arc<dyn AggregateFunction>, FunctionError> {
        self.aggregate(name).ok_or_else(|| FunctionError::FunctionNotFound(name.to_string()))
    }

    /// All registered names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut v: Vec<_> = self.scalars.keys().chain(self.aggregates.keys()).cloned().collect();
        v.sort();
        v
    }

    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        registry.register_scalar(CourseGreeting);
        registry.register_scalar(Hello);
        registry.register_aggregate(StudentScore);
        registry
    }

    /// Process-wide registry holding the built-ins.
    pub fn global() -> &'static FunctionRegistry {
        &GLOBAL_REGISTRY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use crate::{functions::{AggregationPhase, ParameterInfo}, types::TypeInfo};

    #[test]
    fn registry_contains_all_and_lookup_is_case_insensitive() {
        let r = FunctionRegistry::default_registry();
        assert_eq!(r.list(), vec!["course_greeting", "hello", "student_score"]);

        assert!(r.scalar("HELLO").is_some());
        assert!(r.scalar("Course_Greeting").is_some());
        assert!(r.aggregate("Student_Score").is_some());
        assert!(r.is_aggregate("STUDENT_SCORE"));
        assert!(!r.is_aggregate("hello"));
    }

    #[test]
    fn scalars_and_aggregates_live_in_separate_namespaces() {
        let r = FunctionRegistry::default_registry();
        assert!(r.aggregate("hello").is_none());
        assert!(r.scalar("student_score").is_none());
        assert_eq!(r.require_scalar("nope").err(), Some(FunctionError::FunctionNotFound("nope".into())));
    }

    #[test]
    fn global_registry_serves_the_builtins() {
        let hello = FunctionRegistry::global().require_scalar("hello").unwrap();
        let bound = hello.bind(&[TypeInfo::string()]).unwrap();
        let name = json!("alice");
        assert_eq!(bound.evaluate(&[&name]).unwrap(), json!("hello, alice."));
    }

    #[test]
    fn registered_aggregate_runs_single_pass() {
        let r = FunctionRegistry::default_registry();
        let factory = r.aggregate("student_score").unwrap()
            .resolve(&ParameterInfo::new(vec![TypeInfo::double()]))
            .unwrap();
        let eval = factory.bind(AggregationPhase::SinglePass, &[TypeInfo::double()]).unwrap();
        let mut acc = eval.new_accumulator();
        acc.iterate(&[json!(50)]).unwrap();
        acc.iterate(&[Value::Null]).unwrap();
        assert_eq!(
            acc.terminate().unwrap(),
            json!("This student took 1 subject, total score is 50.0, average score is 50.0.")
        );
    }
}
