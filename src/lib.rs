pub mod types;
pub use types::{Category, PrimitiveCategory, TypeInfo, StructTypeInfo};

pub mod functions;
pub use functions::{FunctionError, FunctionRegistry, AggregationPhase};

pub mod executor;
pub use executor::{AggregateExecutor, ScalarExecutor, ExecutionConfig, ExecutionMode};
