pub mod function_error;
pub use function_error::*;

pub mod deferred;
pub use deferred::*;

pub mod render;
pub use render::*;

pub mod scalar_function;
pub use scalar_function::*;

pub mod aggregation_phase;
pub use aggregation_phase::*;

pub mod aggregate_function;
pub use aggregate_function::*;

pub mod function_registry;
pub use function_registry::*;

pub mod builtins;
pub use builtins::*;
