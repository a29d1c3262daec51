use std::fmt::{self, Display};

use crate::functions::AggregationPhase;

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Bind time: the call has the wrong number of arguments.
    WrongArity { function: String, expected: String, got: usize },
    /// Bind time: argument `index` is not in the primitive category.
    WrongCategory { function: String, index: usize, type_name: String },
    /// Bind time: argument `index` is primitive but of a kind the function cannot read.
    UnsupportedPrimitive { function: String, index: usize, type_name: String },
    /// Bind time: `*` or DISTINCT on a function that does not support it.
    UnsupportedModifier { function: String, modifier: String },
    /// Bind time: the partial-state struct lacks a required field.
    MissingField { function: String, field: String },
    /// Runtime: an operation was invoked in a phase that does not perform it.
    PhaseViolation { function: String, operation: &'static str, phase: AggregationPhase },
    /// Runtime: a value could not be read with the bound handle.
    InvalidValue { message: String },
    FunctionNotFound(String),
    UnknownColumn(String),
    Other(String),
}

impl FunctionError {
    /// True for errors raised while binding, before any row is read.
    pub fn is_bind_error(&self) -> bool {
        matches!(
            self,
            FunctionError::WrongArity { .. }
                | FunctionError::WrongCategory { .. }
                | FunctionError::UnsupportedPrimitive { .. }
                | FunctionError::UnsupportedModifier { .. }
                | FunctionError::MissingField { .. }
        )
    }
}

impl Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionError::WrongArity { function, expected, got } =>
                write!(f, "{function}: expected {expected} argument(s), got {got}"),
            FunctionError::WrongCategory { function, index, type_name } =>
                write!(f, "{function}: argument {index}: only primitive type arguments are accepted but {type_name} is passed"),
            FunctionError::UnsupportedPrimitive { function, index, type_name } =>
                write!(f, "{function}: argument {index}: type {type_name} is not supported"),
            FunctionError::UnsupportedModifier { function, modifier } =>
                write!(f, "{function}: {modifier} is not supported"),
            FunctionError::MissingField { function, field } =>
                write!(f, "{function}: partial state has no field '{field}'"),
            FunctionError::PhaseViolation { function, operation, phase } =>
                write!(f, "{function}: {operation} is not valid in {phase} phase"),
            FunctionError::InvalidValue { message } => write!(f, "invalid value: {message}"),
            FunctionError::FunctionNotFound(name) => write!(f, "function not found: {name}"),
            FunctionError::UnknownColumn(name) => write!(f, "unknown column: {name}"),
            FunctionError::Other(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FunctionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_function_and_argument() {
        let err = FunctionError::WrongCategory { function: "course_greeting".into(), index: 1, type_name: "array<int>".into() };
        assert_eq!(
            err.to_string(),
            "course_greeting: argument 1: only primitive type arguments are accepted but array<int> is passed"
        );
        assert!(err.is_bind_error());
    }

    #[test]
    fn runtime_errors_are_not_bind_errors() {
        let err = FunctionError::PhaseViolation { function: "student_score".into(), operation: "iterate", phase: AggregationPhase::FinalMerge };
        assert_eq!(err.to_string(), "student_score: iterate is not valid in FINAL phase");
        assert!(!err.is_bind_error());
        assert!(!FunctionError::InvalidValue { message: "x".into() }.is_bind_error());
    }
}
